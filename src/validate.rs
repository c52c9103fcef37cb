use serde::Deserialize;

use crate::detect::DeploymentType;
use crate::error::{DeployError, DeployResult};
use crate::log::RunLog;
use crate::params::Params;
use crate::ssh::SshSession;

/// One service row from `docker compose ps --format json`.
#[derive(Debug, Deserialize)]
pub struct ComposeService {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "State")]
    pub state: String,
}

/// Parse `docker compose ps --format json` output. Compose v2
/// emits one JSON object per line; some builds emit a single
/// array instead. Unparseable lines are skipped.
#[must_use]
pub fn parse_compose_ps(output: &str) -> Vec<ComposeService> {
    let trimmed = output.trim();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).unwrap_or_default();
    }

    trimmed
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect()
}

/// Post-deployment checks, strictest first. An inactive runtime
/// or proxy is fatal; a missing single container is fatal; a
/// degraded compose stack and a failed liveness probe are
/// warnings only, since the operator can often fix those without
/// redeploying.
pub fn validate(
    ssh: &SshSession,
    params: &Params,
    deployment_type: DeploymentType,
    dir: &str,
    log: &RunLog,
) -> DeployResult<()> {
    check_service(ssh, "docker")?;
    check_service(ssh, "nginx")?;

    match deployment_type {
        DeploymentType::MultiContainer => check_stack(ssh, dir, log),
        DeploymentType::SingleContainer => check_container(ssh, params)?,
    }

    probe_http(ssh, params, log);
    Ok(())
}

/// Print the closing summary with everything the operator needs
/// to reach or debug the deployment.
pub fn summary(
    ssh: &SshSession,
    params: &Params,
    deployment_type: DeploymentType,
    dir: &str,
    log: &RunLog,
) {
    let logs_cmd = match deployment_type {
        DeploymentType::MultiContainer => format!("cd {dir} && docker compose logs -f"),
        DeploymentType::SingleContainer => format!("docker logs -f {}", params.app_name),
    };

    eprintln!();
    eprintln!("========================================");
    eprintln!("Deployment complete!");
    eprintln!("========================================");
    eprintln!();
    eprintln!("Application: {}", params.app_name);
    eprintln!("Server:      {}", params.server);
    eprintln!("URL:         http://{}/", params.server);
    eprintln!("Run log:     {}", log.path().display());
    eprintln!();
    eprintln!("Diagnostics:");
    eprintln!("  {}", ssh.login_hint());
    eprintln!("  {} '{logs_cmd}'", ssh.login_hint());
    eprintln!();

    log.info(&format!(
        "deployed '{}' to {} (http://{}/)",
        params.app_name, params.server, params.server
    ));
}

fn check_service(ssh: &SshSession, service: &'static str) -> DeployResult<()> {
    ssh.exec(&format!("systemctl is-active {service}"))
        .map(|_| ())
        .map_err(|_| DeployError::ServiceInactive(service.to_string()))
}

fn check_stack(ssh: &SshSession, dir: &str, log: &RunLog) {
    match ssh.exec(&format!("cd {dir} && docker compose ps --format json")) {
        Ok(output) => {
            let services = parse_compose_ps(&output);
            let down: Vec<&str> = services
                .iter()
                .filter(|s| s.state != "running")
                .map(|s| s.name.as_str())
                .collect();

            if services.is_empty() {
                log.warn("compose stack reports no services");
            } else if down.is_empty() {
                log.info(&format!("all {} compose services running", services.len()));
            } else {
                log.warn(&format!(
                    "compose services not running: {}",
                    down.join(", ")
                ));
            }
        }
        Err(e) => log.warn(&format!("could not query compose stack: {e}")),
    }
}

fn check_container(ssh: &SshSession, params: &Params) -> DeployResult<()> {
    let app = &params.app_name;
    let names = ssh.exec(&format!(
        "docker ps --filter name=^{app}$ --format '{{{{.Names}}}}'"
    ))?;

    if names.lines().any(|n| n.trim() == app) {
        Ok(())
    } else {
        Err(DeployError::ContainerMissing(app.clone()))
    }
}

/// HTTP liveness probe against the app port, falling back to the
/// proxy listener. Never fatal: a slow-starting application is
/// not a failed deployment.
fn probe_http(ssh: &SshSession, params: &Params, log: &RunLog) {
    let port = params.port;
    let probe = ssh.exec(&format!(
        "curl -fsS -m 10 -o /dev/null http://127.0.0.1:{port}/ || \
         curl -fsS -m 10 -o /dev/null http://127.0.0.1:80/"
    ));

    match probe {
        Ok(_) => log.info("HTTP liveness probe succeeded"),
        Err(_) => log.warn(&format!(
            "HTTP probe failed on ports {port} and 80; \
             the application may still be starting"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_line_delimited_ps() {
        let out = concat!(
            r#"{"Name":"shop-web-1","State":"running"}"#,
            "\n",
            r#"{"Name":"shop-db-1","State":"exited"}"#,
        );

        let services = parse_compose_ps(out);
        assert_eq!(services.len(), 2);
        assert_eq!(services[0].name, "shop-web-1");
        assert_eq!(services[1].state, "exited");
    }

    #[test]
    fn parses_array_ps() {
        let out = r#"[{"Name":"a","State":"running"},{"Name":"b","State":"running"}]"#;

        let services = parse_compose_ps(out);
        assert_eq!(services.len(), 2);
    }

    #[test]
    fn skips_garbage_lines() {
        let out = "warning: something\n{\"Name\":\"a\",\"State\":\"running\"}";

        let services = parse_compose_ps(out);
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].name, "a");
    }

    #[test]
    fn empty_output_is_empty() {
        assert!(parse_compose_ps("").is_empty());
        assert!(parse_compose_ps("[]").is_empty());
    }
}
