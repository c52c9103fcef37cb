pub type DeployResult<T> = Result<T, DeployError>;

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("required parameter is empty: {0}")]
    EmptyParameter(&'static str),

    #[error("SSH key file not found: {0}")]
    KeyFileMissing(String),

    #[error("invalid port: {0}")]
    InvalidPort(String),

    #[error("clone failed for {0}")]
    CloneFailed(String),

    #[error(
        "no build descriptor found in {0} \
         (expected Dockerfile or docker-compose.yml)"
    )]
    NoDescriptor(String),

    #[error("SSH connection failed: {0}")]
    SshFailed(String),

    /// `detail` is the child's captured stderr, or its exit
    /// status when nothing was printed, so the run log always
    /// ends with the remote diagnostic.
    #[error("command failed: {command}: {detail}")]
    CommandFailed { command: String, detail: String },

    #[error("command not found: {0}")]
    CommandNotFound(String),

    #[error("nginx configuration rejected: {0}")]
    ProxyConfigInvalid(String),

    #[error("service '{0}' is not active on the remote host")]
    ServiceInactive(String),

    #[error("container '{0}' is not running after deployment")]
    ContainerMissing(String),

    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
