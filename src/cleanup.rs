use std::path::Path;

use crate::deploy;
use crate::error::DeployResult;
use crate::log::RunLog;
use crate::params::CleanupParams;
use crate::repo;
use crate::ssh::SshSession;

/// Tear down everything a prior deployment created: container or
/// stack, image, remote project directory, nginx site, and the
/// local clone. Every remote step tolerates absence, so cleaning
/// up a host that was never deployed to succeeds and does
/// nothing.
pub fn run(params: &CleanupParams, remote_base: &str, log: &RunLog) -> DeployResult<()> {
    let ssh = SshSession::new(&params.server, &params.ssh_user, &params.key_path);

    log.step(&format!("Cleaning up '{}' on {}", params.app_name, params.server));

    match ssh.probe() {
        Ok(()) => {
            let dir = deploy::remote_dir(remote_base, &params.app_name);
            let output = ssh.exec_script(&cleanup_script(&params.app_name, &dir))?;
            log.output(&output.combined());
            if !output.status.success() {
                log.warn(&format!(
                    "remote cleanup finished with exit {}; \
                     some resources may remain",
                    output.status
                ));
            }
        }
        Err(e) => {
            log.warn(&format!("{e}; skipping remote cleanup"));
        }
    }

    repo::remove_local_clone(Path::new(&params.app_name), log);

    log.info("Cleanup complete");
    Ok(())
}

/// One best-effort batch. No `set -e`: absence of any resource
/// is the expected case after a partial deployment, and later
/// steps must still run. The default nginx site comes back only
/// if no other site is left enabled.
fn cleanup_script(app: &str, dir: &str) -> String {
    format!(
        r#"docker rm -f {app} 2>/dev/null || true
if [ -d {dir} ]; then
    (cd {dir} && docker compose down -v --remove-orphans 2>/dev/null) || true
fi
docker rmi {app}:latest 2>/dev/null || true
sudo rm -rf {dir}
sudo rm -f /etc/nginx/sites-enabled/{app} /etc/nginx/sites-available/{app}
if [ -z "$(ls -A /etc/nginx/sites-enabled 2>/dev/null)" ] && \
   [ -f /etc/nginx/sites-available/default ]; then
    sudo ln -sf /etc/nginx/sites-available/default /etc/nginx/sites-enabled/default
fi
(sudo nginx -t >/dev/null 2>&1 && sudo systemctl reload nginx) || true
docker system prune -f || true
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_step_tolerates_absence() {
        let script = cleanup_script("app", "/opt/app");

        assert!(!script.contains("set -e"));
        assert!(script.contains("docker rm -f app 2>/dev/null || true"));
        assert!(script.contains("docker compose down -v --remove-orphans"));
        assert!(script.contains("docker rmi app:latest 2>/dev/null || true"));
        assert!(script.contains("sudo rm -rf /opt/app"));
    }

    #[test]
    fn removes_site_files() {
        let script = cleanup_script("shop", "/opt/shop");

        assert!(script.contains(
            "sudo rm -f /etc/nginx/sites-enabled/shop /etc/nginx/sites-available/shop"
        ));
    }

    #[test]
    fn restores_default_site_when_none_enabled() {
        let script = cleanup_script("app", "/opt/app");

        assert!(script.contains(r#"[ -z "$(ls -A /etc/nginx/sites-enabled 2>/dev/null)" ]"#));
        assert!(script.contains(
            "sudo ln -sf /etc/nginx/sites-available/default /etc/nginx/sites-enabled/default"
        ));
    }
}
