use std::path::Path;

use crate::cmd;
use crate::error::{DeployError, DeployResult};
use crate::log::RunLog;
use crate::params::Params;

/// Insert an access token as the HTTP basic-auth principal of a
/// clone URL. Non-HTTP URLs (ssh, git) pass through unchanged
/// and rely on ambient credentials.
#[must_use]
pub fn authenticated_url(url: &str, token: &str) -> String {
    for scheme in ["https://", "http://"] {
        if let Some(rest) = url.strip_prefix(scheme) {
            return format!("{scheme}{token}@{rest}");
        }
    }
    url.to_string()
}

/// Clone the requested branch into a directory named after the
/// app. An existing directory of the same name is removed first;
/// this is a destructive replace, never a fetch/merge.
///
/// Runs entirely locally. A failure here aborts the run before
/// the remote host is touched.
pub fn fetch(params: &Params, log: &RunLog) -> DeployResult<()> {
    let dest = &params.app_name;

    if Path::new(dest).exists() {
        log.info(&format!("Removing existing local clone '{dest}'"));
        std::fs::remove_dir_all(dest)?;
    }

    // Log the bare URL only; the token must never reach the log
    // file.
    log.info(&format!(
        "Cloning {} (branch '{}')",
        params.repo_url, params.branch
    ));

    let auth_url = authenticated_url(&params.repo_url, &params.token);
    let output = cmd::try_run(
        "git",
        &["clone", "--branch", &params.branch, "--single-branch", &auth_url, dest],
    )?;

    if !output.status.success() {
        log.output(&redact(&output.combined(), &params.token));
        return Err(DeployError::CloneFailed(params.repo_url.clone()));
    }

    log.info(&format!("Clone complete: ./{dest}"));
    Ok(())
}

/// Remove the local clone if present. Used by cleanup mode, so
/// a removal failure is a warning, never fatal: cleanup finishes
/// regardless of what it could not delete.
pub fn remove_local_clone(path: &Path, log: &RunLog) {
    if !path.exists() {
        return;
    }
    match std::fs::remove_dir_all(path) {
        Ok(()) => log.info(&format!("Removed local clone '{}'", path.display())),
        Err(e) => log.warn(&format!(
            "could not remove local clone '{}': {e}",
            path.display()
        )),
    }
}

/// Strip the token from captured git output before logging.
/// git prints the full remote URL in most error messages.
fn redact(output: &str, token: &str) -> String {
    output.replace(token, "***")
}
