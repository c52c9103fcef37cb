use crate::cmd::{self, CmdOutput};
use crate::error::{DeployError, DeployResult};

/// Timeout for the initial connectivity probe, in seconds.
const CONNECT_TIMEOUT_SECS: u32 = 10;

/// One-shot SSH driver for a remote host. Every call is an
/// independent non-interactive `ssh` invocation; there is no
/// persistent session and no state shared between calls beyond
/// whatever the remote host keeps.
pub struct SshSession {
    host: String,
    user: String,
    key: String,
}

impl SshSession {
    #[must_use]
    pub fn new(host: &str, user: &str, key_path: &str) -> Self {
        Self {
            host: host.to_string(),
            user: user.to_string(),
            key: key_path.to_string(),
        }
    }

    /// Verify the host is reachable with the given credentials.
    /// Unknown host keys are accepted automatically; the connect
    /// timeout bounds how long an unreachable host can stall the
    /// run.
    pub fn probe(&self) -> DeployResult<()> {
        self.exec("echo ok").map(|_| ()).map_err(|e| {
            DeployError::SshFailed(format!(
                "{}@{} not reachable within {CONNECT_TIMEOUT_SECS}s ({e})",
                self.user, self.host
            ))
        })
    }

    /// Execute a single command on the remote host and capture
    /// its stdout. Non-zero exit is an error.
    pub fn exec(&self, command: &str) -> DeployResult<String> {
        let args = self.build_ssh_args(command);
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        cmd::run("ssh", &refs)
    }

    /// Run a multi-line shell batch on the remote host by piping
    /// it to `bash -s`, capturing status and combined output.
    /// The caller decides whether a non-zero exit is fatal.
    pub fn exec_script(&self, script: &str) -> DeployResult<CmdOutput> {
        let args = self.build_ssh_args("bash -s");
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        cmd::run_with_stdin("ssh", &refs, script.as_bytes())
    }

    /// Mirror a local directory to a remote path with rsync,
    /// excluding version-control metadata. `--delete` makes the
    /// remote tree an exact replica of the local one.
    pub fn rsync_to(&self, local_dir: &str, remote_dir: &str) -> DeployResult<CmdOutput> {
        let rsh = format!(
            "ssh -i {} -o StrictHostKeyChecking=accept-new -o BatchMode=yes",
            self.key
        );
        let src = format!("{}/", local_dir.trim_end_matches('/'));
        let dest = format!("{}:{remote_dir}/", self.destination());

        cmd::try_run(
            "rsync",
            &["-az", "--delete", "--exclude=.git", "-e", &rsh, &src, &dest],
        )
    }

    #[must_use]
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    /// The equivalent interactive command, printed in the final
    /// summary so the operator can copy it.
    #[must_use]
    pub fn login_hint(&self) -> String {
        format!("ssh -i {} {}", self.key, self.destination())
    }

    fn build_ssh_args(&self, command: &str) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "StrictHostKeyChecking=accept-new".to_string(),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={CONNECT_TIMEOUT_SECS}"),
            "-i".to_string(),
            self.key.clone(),
        ];
        args.push(self.destination());
        args.push(command.to_string());
        args
    }
}
