use std::path::Path;

use clap::Parser;

use crate::cleanup;
use crate::deploy;
use crate::detect;
use crate::error::DeployResult;
use crate::log::RunLog;
use crate::nginx;
use crate::params::{CleanupParams, Params};
use crate::provision;
use crate::repo;
use crate::ssh::SshSession;
use crate::validate;

/// The deployment pipeline: an ordered sequence of steps, each a
/// named operation against the local clone or the remote host.
/// Fatal step failures short-circuit the run; warnings are
/// logged and execution continues. There is no rollback - a run
/// that dies mid-sequence leaves earlier steps' effects in place
/// and cleanup mode reverses them on demand.
pub struct Pipeline {
    remote_base: String,
    settle_secs: u32,
}

impl Pipeline {
    #[must_use]
    pub fn new() -> Self {
        Self {
            remote_base: deploy::DEFAULT_REMOTE_BASE.to_string(),
            settle_secs: deploy::DEFAULT_SETTLE_SECS,
        }
    }

    /// Base directory for project trees on the remote host.
    #[must_use]
    pub fn remote_base(mut self, dir: &str) -> Self {
        self.remote_base = dir.to_string();
        self
    }

    /// Seconds to wait after starting containers before
    /// reporting their status.
    #[must_use]
    pub const fn settle_secs(mut self, secs: u32) -> Self {
        self.settle_secs = secs;
        self
    }

    /// Parse CLI arguments and dispatch: the bare invocation
    /// deploys, `--cleanup` tears down. Every outcome, fatal or
    /// not, lands in the per-run log file.
    pub fn run(&self) -> DeployResult<()> {
        let cli = Cli::parse();
        let log = RunLog::create()?;
        log.info(&format!("run log: {}", log.path().display()));

        let result = if cli.cleanup {
            self.run_cleanup(&log)
        } else {
            self.run_deploy(&log)
        };

        if let Err(e) = &result {
            log.error(&e.to_string());
        }
        result
    }

    fn run_deploy(&self, log: &RunLog) -> DeployResult<()> {
        log.step("Collecting deployment parameters");
        let params = Params::collect()?;

        log.step("Fetching repository");
        repo::fetch(&params, log)?;

        log.step("Detecting deployment type");
        let deployment_type = detect::detect(Path::new(&params.app_name), log)?;

        let ssh = SshSession::new(&params.server, &params.ssh_user, &params.key_path);
        let dir = deploy::remote_dir(&self.remote_base, &params.app_name);

        log.step(&format!("Probing SSH connectivity to {}", ssh.destination()));
        ssh.probe()?;

        log.step("Provisioning remote host");
        provision::provision(&ssh, &params, log)?;

        log.step("Transferring project files");
        deploy::transfer(&ssh, &params, &dir, log)?;

        log.step("Building and starting containers");
        deploy::run_stack(&ssh, &params, deployment_type, &dir, self.settle_secs, log)?;

        log.step("Configuring nginx reverse proxy");
        nginx::configure(&ssh, &params, log)?;

        log.step("Validating deployment");
        validate::validate(&ssh, &params, deployment_type, &dir, log)?;

        validate::summary(&ssh, &params, deployment_type, &dir, log);
        Ok(())
    }

    fn run_cleanup(&self, log: &RunLog) -> DeployResult<()> {
        log.step("Collecting cleanup parameters");
        let params = CleanupParams::collect()?;
        cleanup::run(&params, &self.remote_base, log)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Parser)]
#[command(name = "estivador")]
#[command(about = "Interactive container deployment over SSH")]
struct Cli {
    /// Tear down a previous deployment instead of deploying
    #[arg(long)]
    cleanup: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn remote_base_default_and_override() {
        let pipeline = Pipeline::new();
        assert_eq!(pipeline.remote_base, "/opt");

        let pipeline = Pipeline::new().remote_base("/srv/apps");
        assert_eq!(pipeline.remote_base, "/srv/apps");
    }

    #[test]
    fn settle_delay_default_and_override() {
        let pipeline = Pipeline::new();
        assert_eq!(pipeline.settle_secs, 10);

        let pipeline = Pipeline::new().settle_secs(30);
        assert_eq!(pipeline.settle_secs, 30);
    }

    #[test]
    fn cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cleanup_flag_recognized() {
        let cli = Cli::parse_from(["estivador", "--cleanup"]);
        assert!(cli.cleanup);

        let cli = Cli::parse_from(["estivador"]);
        assert!(!cli.cleanup);
    }
}
