use std::io::{BufRead, Write};
use std::path::Path;

use crate::error::{DeployError, DeployResult};

/// Immutable parameters for one deployment run, collected up
/// front so that every later step is pure command orchestration.
///
/// All fields are validated before any network or filesystem
/// action happens: required fields must be non-empty, the SSH
/// key must exist on disk, and the port must parse.
#[derive(Debug, Clone)]
pub struct Params {
    pub repo_url: String,
    pub token: String,
    pub branch: String,
    pub ssh_user: String,
    pub server: String,
    pub key_path: String,
    pub port: u16,
    /// Final path segment of the repository URL, `.git` suffix
    /// stripped. Names the clone directory, the container, the
    /// image, and the nginx site.
    pub app_name: String,
}

impl Params {
    /// Prompt for all deployment parameters on the terminal.
    /// The access token is read without echo.
    pub fn collect() -> DeployResult<Self> {
        let repo_url = prompt_required("Repository URL", "repository URL")?;
        let token = prompt_token()?;
        let branch = prompt_default("Branch", "main")?;
        let ssh_user = prompt_required("SSH username", "SSH username")?;
        let server = prompt_required("Server address", "server address")?;
        let key_path = expand_tilde(&prompt_default("SSH key path", "~/.ssh/id_rsa")?);
        let port = parse_port(&prompt_required("Application port", "application port")?)?;

        if !Path::new(&key_path).is_file() {
            return Err(DeployError::KeyFileMissing(key_path));
        }

        let app_name = app_name_from_url(&repo_url)?;

        Ok(Self {
            repo_url,
            token,
            branch,
            ssh_user,
            server,
            key_path,
            port,
            app_name,
        })
    }
}

/// Parameters for cleanup mode. The token, branch, and port are
/// irrelevant for teardown and are never asked for.
#[derive(Debug, Clone)]
pub struct CleanupParams {
    pub ssh_user: String,
    pub server: String,
    pub key_path: String,
    pub app_name: String,
}

impl CleanupParams {
    pub fn collect() -> DeployResult<Self> {
        let server = prompt_required("Server address", "server address")?;
        let ssh_user = prompt_required("SSH username", "SSH username")?;
        let key_path = expand_tilde(&prompt_default("SSH key path", "~/.ssh/id_rsa")?);
        let app_name = prompt_required("Application name", "application name")?;

        if !Path::new(&key_path).is_file() {
            return Err(DeployError::KeyFileMissing(key_path));
        }

        Ok(Self {
            ssh_user,
            server,
            key_path,
            app_name,
        })
    }
}

/// Derive the application name from a repository URL: the final
/// path segment with any trailing `.git` removed. Handles both
/// `https://host/org/app.git` and `git@host:org/app.git` forms.
pub fn app_name_from_url(url: &str) -> DeployResult<String> {
    let trimmed = url.trim_end_matches('/');
    let segment = trimmed
        .rsplit(['/', ':'])
        .next()
        .unwrap_or(trimmed);
    let name = segment.strip_suffix(".git").unwrap_or(segment);

    if name.is_empty() {
        return Err(DeployError::Other(format!(
            "cannot derive application name from URL: {url}"
        )));
    }
    Ok(name.to_string())
}

/// Expand a leading `~/` against `$HOME`. Paths without the
/// prefix pass through unchanged.
#[must_use]
pub fn expand_tilde(path: &str) -> String {
    if path == "~" {
        return std::env::var("HOME").unwrap_or_else(|_| path.to_string());
    }
    path.strip_prefix("~/").map_or_else(
        || path.to_string(),
        |rest| match std::env::var("HOME") {
            Ok(home) => format!("{home}/{rest}"),
            Err(_) => path.to_string(),
        },
    )
}

/// Reject empty (or whitespace-only) values for a required
/// field. This runs before any network or filesystem action, so
/// a blank answer ends the run with nothing touched.
pub fn non_empty(value: &str, field: &'static str) -> DeployResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DeployError::EmptyParameter(field));
    }
    Ok(trimmed.to_string())
}

fn parse_port(value: &str) -> DeployResult<u16> {
    value
        .parse::<u16>()
        .ok()
        .filter(|p| *p != 0)
        .ok_or_else(|| DeployError::InvalidPort(value.to_string()))
}

fn prompt(label: &str) -> DeployResult<String> {
    eprint!("{label}: ");
    std::io::stderr().flush()?;
    let mut input = String::new();
    std::io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn prompt_required(label: &str, field: &'static str) -> DeployResult<String> {
    let value = prompt(label)?;
    non_empty(&value, field)
}

fn prompt_default(label: &str, default: &str) -> DeployResult<String> {
    let value = prompt(&format!("{label} [{default}]"))?;
    if value.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(value)
    }
}

fn prompt_token() -> DeployResult<String> {
    let token = rpassword::prompt_password("Access token: ")?;
    non_empty(&token, "access token")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_name_strips_git_suffix() {
        let name = app_name_from_url("https://example.com/org/app.git").unwrap();
        assert_eq!(name, "app");
    }

    #[test]
    fn app_name_without_suffix() {
        let name = app_name_from_url("https://example.com/org/app").unwrap();
        assert_eq!(name, "app");
    }

    #[test]
    fn app_name_trailing_slash() {
        let name = app_name_from_url("https://example.com/org/app.git/").unwrap();
        assert_eq!(name, "app");
    }

    #[test]
    fn app_name_scp_style() {
        let name = app_name_from_url("git@example.com:app.git").unwrap();
        assert_eq!(name, "app");
    }

    #[test]
    fn app_name_empty_url() {
        assert!(app_name_from_url("").is_err());
    }

    #[test]
    fn tilde_expansion() {
        // SAFETY: tests in this module that touch HOME run in
        // one process; set_var is fine for a test fixture.
        unsafe { std::env::set_var("HOME", "/home/tester") };
        assert_eq!(expand_tilde("~/.ssh/id_rsa"), "/home/tester/.ssh/id_rsa");
        assert_eq!(expand_tilde("/abs/path"), "/abs/path");
        assert_eq!(expand_tilde("relative/path"), "relative/path");
    }

    #[test]
    fn required_fields_reject_empty_values() {
        assert_eq!(non_empty("deploy", "SSH username").unwrap(), "deploy");
        assert_eq!(non_empty("  main  ", "branch").unwrap(), "main");

        let err = non_empty("", "repository URL").unwrap_err();
        assert!(matches!(
            err,
            DeployError::EmptyParameter("repository URL")
        ));

        let err = non_empty("   ", "server address").unwrap_err();
        assert!(matches!(
            err,
            DeployError::EmptyParameter("server address")
        ));
    }

    #[test]
    fn port_parsing() {
        assert_eq!(parse_port("3000").unwrap(), 3000);
        assert!(parse_port("0").is_err());
        assert!(parse_port("65536").is_err());
        assert!(parse_port("http").is_err());
    }
}
