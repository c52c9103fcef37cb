use crate::error::{DeployError, DeployResult};
use crate::log::RunLog;
use crate::params::Params;
use crate::ssh::SshSession;

/// Marker emitted by the activation batch when other site
/// configs are already enabled on the host.
const OTHER_SITES_MARKER: &str = "OTHER_SITES:";

/// Render an nginx server block forwarding all paths on port 80
/// to the application's local port, preserving websocket upgrade
/// and forwarded-for headers.
#[must_use]
pub fn render(app_name: &str, port: u16) -> String {
    format!(
        r#"server {{
    listen 80;
    server_name {app_name};

    location / {{
        proxy_pass http://127.0.0.1:{port};
        proxy_http_version 1.1;
        proxy_set_header Upgrade $http_upgrade;
        proxy_set_header Connection "upgrade";
        proxy_set_header Host $host;
        proxy_set_header X-Real-IP $remote_addr;
        proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;
        proxy_set_header X-Forwarded-Proto $scheme;
    }}
}}
"#
    )
}

/// Write the site config, enable it, and reload nginx. The
/// config is syntax-checked before the reload; either failing is
/// fatal since the application would be deployed but unreachable.
///
/// Only the distro `default` site is disabled. Sites belonging
/// to other applications are left enabled and reported as a
/// warning, since every site here binds port 80 and the first
/// matching server block wins.
pub fn configure(ssh: &SshSession, params: &Params, log: &RunLog) -> DeployResult<()> {
    let config = render(&params.app_name, params.port);
    let script = activation_script(&params.app_name, &config);

    let output = ssh.exec_script(&script)?;
    log.output(&output.combined());

    for line in output.combined().lines() {
        if let Some(others) = line.strip_prefix(OTHER_SITES_MARKER) {
            log.warn(&format!(
                "other nginx sites already enabled ({}); they share \
                 port 80 with '{}' and may shadow each other",
                others.split_whitespace().collect::<Vec<_>>().join(", "),
                params.app_name
            ));
        }
    }

    if !output.status.success() {
        return Err(DeployError::ProxyConfigInvalid(format!(
            "site '{}' (exit {})",
            params.app_name, output.status
        )));
    }

    log.info(&format!("nginx site '{}' enabled", params.app_name));
    Ok(())
}

fn activation_script(app: &str, config: &str) -> String {
    format!(
        r#"set -e
sudo tee /etc/nginx/sites-available/{app} >/dev/null <<'ESTIVADOR_SITE'
{config}ESTIVADOR_SITE
others=$(ls /etc/nginx/sites-enabled 2>/dev/null | grep -vx default | grep -vx {app} || true)
if [ -n "$others" ]; then
    echo {OTHER_SITES_MARKER}$others
fi
sudo ln -sf /etc/nginx/sites-available/{app} /etc/nginx/sites-enabled/{app}
sudo rm -f /etc/nginx/sites-enabled/default
sudo nginx -t
sudo systemctl reload nginx
"#
    )
}
