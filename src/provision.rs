use crate::error::{DeployError, DeployResult};
use crate::log::RunLog;
use crate::params::Params;
use crate::ssh::SshSession;

/// Install and enable the container runtime, the compose plugin,
/// and nginx on the remote host. Safe to re-run: packages
/// already present are skipped, `systemctl enable --now` is a
/// no-op for running services.
///
/// The group-membership change at the end is best-effort; it
/// only matters for interactive docker use and the rest of the
/// pipeline runs through the same SSH user anyway.
pub fn provision(ssh: &SshSession, params: &Params, log: &RunLog) -> DeployResult<()> {
    let script = provisioning_script(&params.ssh_user);

    let output = ssh.exec_script(&script)?;
    log.output(&output.combined());

    if !output.status.success() {
        return Err(DeployError::Other(format!(
            "provisioning failed on {} (exit {})",
            params.server, output.status
        )));
    }

    if output.combined().contains("GROUP_ADD_FAILED") {
        log.warn(&format!(
            "could not add '{}' to the docker group; continuing",
            params.ssh_user
        ));
    }

    Ok(())
}

fn provisioning_script(user: &str) -> String {
    format!(
        r"set -e
export DEBIAN_FRONTEND=noninteractive
sudo apt-get update -qq
if ! command -v docker >/dev/null 2>&1; then
    sudo apt-get install -y -qq docker.io
fi
if ! docker compose version >/dev/null 2>&1; then
    sudo apt-get install -y -qq docker-compose-plugin docker-compose-v2 || \
        sudo apt-get install -y -qq docker-compose
fi
if ! command -v nginx >/dev/null 2>&1; then
    sudo apt-get install -y -qq nginx
fi
sudo systemctl enable --now docker
sudo systemctl enable --now nginx
sudo usermod -aG docker {user} || echo GROUP_ADD_FAILED
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_guards_each_install() {
        let script = provisioning_script("deploy");

        assert!(script.starts_with("set -e"));
        assert!(script.contains("command -v docker"));
        assert!(script.contains("docker compose version"));
        assert!(script.contains("command -v nginx"));
        assert!(script.contains("systemctl enable --now docker"));
        assert!(script.contains("systemctl enable --now nginx"));
    }

    #[test]
    fn group_add_is_best_effort() {
        let script = provisioning_script("deploy");
        assert!(script.contains("usermod -aG docker deploy || echo GROUP_ADD_FAILED"));
    }
}
