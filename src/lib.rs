//! Interactive deployment runner for containerized applications.
//!
//! Estivador walks you through deploying a containerized
//! application to a remote host: it prompts for connection
//! parameters, clones the source repository with token auth,
//! mirrors it to the server over SSH, builds and starts the
//! containers there, and puts nginx in front of the application.
//!
//! The name comes from Portuguese for *stevedore*: the worker
//! who loads the containers onto the ship.
//!
//! # Overview
//!
//! A run is an ordered [`Pipeline`] of steps:
//!
//! 1. **Collect** - prompt for repository URL, access token,
//!    branch, SSH credentials, and application port
//!    ([`params::Params`])
//! 2. **Fetch** - clone the requested branch locally
//!    ([`repo`])
//! 3. **Detect** - pick single- or multi-container mode from
//!    the build descriptor ([`detect::DeploymentType`])
//! 4. **Provision** - install docker, compose, and nginx on the
//!    host if missing ([`provision`])
//! 5. **Ship** - rsync the project tree to `/opt/<app>` and
//!    build/run it there ([`deploy`])
//! 6. **Route** - write and enable an nginx site forwarding
//!    port 80 to the application ([`nginx`])
//! 7. **Validate** - check services, container state, and HTTP
//!    liveness, then print a summary ([`validate`])
//!
//! Every step is a one-shot SSH batch with captured output, all
//! of it written to a per-run log file ([`log::RunLog`]). Fatal
//! failures end the run; warnings are logged and the run
//! continues. `--cleanup` reverses everything a prior run
//! created ([`cleanup`]).
//!
//! # Example
//!
//! ```rust,no_run
//! use estivador::Pipeline;
//!
//! fn main() -> anyhow::Result<()> {
//!     Pipeline::new().run()?;
//!     Ok(())
//! }
//! ```

// Allow noisy pedantic lints that don't add value for a
// deployment tool crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod cleanup;
pub mod cmd;
pub mod deploy;
pub mod detect;
pub mod error;
pub mod log;
pub mod nginx;
pub mod params;
pub mod pipeline;
pub mod provision;
pub mod repo;
pub mod ssh;
pub mod validate;

pub use detect::DeploymentType;
pub use error::{DeployError, DeployResult};
pub use log::RunLog;
pub use params::{CleanupParams, Params};
pub use pipeline::Pipeline;
pub use ssh::SshSession;
