use crate::detect::DeploymentType;
use crate::error::{DeployError, DeployResult};
use crate::log::RunLog;
use crate::params::Params;
use crate::ssh::SshSession;

/// Default base path for deployed projects on the remote host.
/// Each application owns `<base>/<name>`.
pub const DEFAULT_REMOTE_BASE: &str = "/opt";

/// Default seconds to let containers settle before reporting
/// status.
pub const DEFAULT_SETTLE_SECS: u32 = 10;

#[must_use]
pub fn remote_dir(base: &str, app_name: &str) -> String {
    format!("{}/{app_name}", base.trim_end_matches('/'))
}

/// Create the remote project directory and mirror the local
/// clone into it. Fatal on failure; a half-copied tree is not
/// worth building.
pub fn transfer(ssh: &SshSession, params: &Params, dir: &str, log: &RunLog) -> DeployResult<()> {
    ssh.exec(&format!(
        "sudo mkdir -p {dir} && sudo chown $(id -un):$(id -gn) {dir}"
    ))?;

    log.info(&format!("Syncing project to {}:{dir}", params.server));
    let output = ssh.rsync_to(&params.app_name, dir)?;
    if !output.status.success() {
        log.output(&output.combined());
        return Err(DeployError::Other(format!(
            "file transfer to {dir} failed (exit {})",
            output.status
        )));
    }

    Ok(())
}

/// Build and start the application on the remote host, replacing
/// whatever was running under the same name.
///
/// Single-container failures are fatal; a compose stack that
/// fails to come up is logged and left to the validation step,
/// which reports per-service state with more detail.
pub fn run_stack(
    ssh: &SshSession,
    params: &Params,
    deployment_type: DeploymentType,
    dir: &str,
    settle_secs: u32,
    log: &RunLog,
) -> DeployResult<()> {
    match deployment_type {
        DeploymentType::MultiContainer => {
            let script = compose_script(dir, settle_secs);
            let output = ssh.exec_script(&script)?;
            log.output(&output.combined());
            if !output.status.success() {
                log.warn(&format!(
                    "compose stack '{}' did not start cleanly (exit {}); \
                     validation will report service state",
                    params.app_name, output.status
                ));
            }
        }
        DeploymentType::SingleContainer => {
            let script = container_script(&params.app_name, params.port, dir, settle_secs);
            let output = ssh.exec_script(&script)?;
            log.output(&output.combined());
            if !output.status.success() {
                return Err(DeployError::Other(format!(
                    "build/run of container '{}' failed (exit {})",
                    params.app_name, output.status
                )));
            }
        }
    }

    Ok(())
}

/// Replace-and-restart batch for a compose project. Teardown and
/// image pruning are best-effort; the rebuild is what matters.
fn compose_script(dir: &str, settle_secs: u32) -> String {
    format!(
        r"set -e
cd {dir}
docker compose down --remove-orphans 2>/dev/null || true
docker compose up -d --build
sleep {settle_secs}
docker compose ps
docker image prune -f || true
"
    )
}

/// Replace-and-restart batch for a single container. The old
/// container and image are removed first so the name and tag are
/// free; both removals tolerate absence.
fn container_script(app: &str, port: u16, dir: &str, settle_secs: u32) -> String {
    format!(
        r"set -e
cd {dir}
docker rm -f {app} 2>/dev/null || true
docker rmi {app}:latest 2>/dev/null || true
docker build -t {app}:latest .
docker run -d --name {app} --restart unless-stopped -p {port}:{port} {app}:latest
sleep {settle_secs}
docker ps --filter name={app}
docker image prune -f || true
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_dir_per_app() {
        assert_eq!(remote_dir("/opt", "app"), "/opt/app");
        assert_eq!(remote_dir("/srv/deploys/", "app"), "/srv/deploys/app");
    }

    #[test]
    fn compose_script_rebuilds() {
        let script = compose_script("/opt/shop", 10);

        assert!(script.contains("cd /opt/shop"));
        assert!(script.contains("docker compose down --remove-orphans 2>/dev/null || true"));
        assert!(script.contains("docker compose up -d --build"));
        assert!(script.contains("sleep 10"));
        assert!(script.contains("docker image prune -f || true"));
    }

    #[test]
    fn container_script_maps_port() {
        let script = container_script("app", 3000, "/opt/app", 10);

        assert!(script.contains("docker rm -f app 2>/dev/null || true"));
        assert!(script.contains("docker build -t app:latest ."));
        assert!(script.contains("-p 3000:3000 app:latest"));
        assert!(script.contains("--name app"));
        assert!(script.contains("--restart unless-stopped"));
    }

    #[test]
    fn settle_delay_is_configurable() {
        assert!(compose_script("/opt/app", 30).contains("sleep 30"));
        assert!(container_script("app", 3000, "/opt/app", 5).contains("sleep 5"));
    }
}
