use std::path::Path;

use docker_compose_types::Compose;

use crate::error::{DeployError, DeployResult};
use crate::log::RunLog;

/// How the cloned project gets built and run on the remote host.
/// Detected once from the clone's build descriptor and fixed for
/// the rest of the run; every remote build/run batch branches on
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentType {
    /// A lone `Dockerfile`: one image, one named container.
    SingleContainer,
    /// A compose file: an orchestrated stack of services.
    MultiContainer,
}

/// Compose file spellings recognized for multi-container
/// projects, checked in order.
const COMPOSE_FILES: [&str; 2] = ["docker-compose.yml", "docker-compose.yaml"];

/// Inspect the cloned tree for a build descriptor. A Dockerfile
/// wins over a compose file when both are present. Neither being
/// present is fatal; the run stops before any SSH connection is
/// attempted.
pub fn detect(project_dir: &Path, log: &RunLog) -> DeployResult<DeploymentType> {
    if project_dir.join("Dockerfile").is_file() {
        log.info("Detected single-container deployment (Dockerfile)");
        return Ok(DeploymentType::SingleContainer);
    }

    for name in COMPOSE_FILES {
        let path = project_dir.join(name);
        if path.is_file() {
            log.info(&format!("Detected multi-container deployment ({name})"));
            inspect_compose(&path, log);
            return Ok(DeploymentType::MultiContainer);
        }
    }

    Err(DeployError::NoDescriptor(
        project_dir.display().to_string(),
    ))
}

/// Parse the compose file and log its declared services. A
/// descriptor that does not parse still deploys as
/// multi-container; the remote `docker compose` invocation will
/// report the real error with better context than we can.
fn inspect_compose(path: &Path, log: &RunLog) {
    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|content| {
            serde_yaml::from_str::<Compose>(&content).map_err(|e| e.to_string())
        });

    match parsed {
        Ok(compose) => {
            let names: Vec<&str> = compose.services.0.keys().map(String::as_str).collect();
            if !names.is_empty() {
                log.info(&format!("Compose services: {}", names.join(", ")));
            }
        }
        Err(e) => {
            log.warn(&format!(
                "Compose file did not parse cleanly ({e}); \
                 deploying anyway"
            ));
        }
    }
}
