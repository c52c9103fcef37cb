use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;

use crate::error::DeployResult;

/// Per-run log that tees every line to stderr and to a file
/// named by the run's start time. Records are append-only; a
/// write failure on the file side is ignored so logging can
/// never abort a deployment.
pub struct RunLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl RunLog {
    /// Create `deploy_YYYYmmdd_HHMMSS.log` in the working
    /// directory.
    pub fn create() -> DeployResult<Self> {
        Self::at(PathBuf::from(format!(
            "deploy_{}.log",
            Local::now().format("%Y%m%d_%H%M%S")
        )))
    }

    /// Create a log at an explicit path.
    pub fn at(path: PathBuf) -> DeployResult<Self> {
        let file = File::create(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&self, message: &str) {
        self.write("INFO", message);
    }

    pub fn warn(&self, message: &str) {
        self.write("WARN", message);
    }

    pub fn error(&self, message: &str) {
        self.write("ERROR", message);
    }

    /// Step banner, visually separating pipeline phases in the
    /// log.
    pub fn step(&self, name: &str) {
        self.info(&format!("==> {name}"));
    }

    /// Record multi-line command output, indented under the
    /// current step.
    pub fn output(&self, output: &str) {
        for line in output.lines() {
            self.info(&format!("    {line}"));
        }
    }

    fn write(&self, level: &str, message: &str) {
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        eprintln!("[{level}] {message}");
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "[{stamp}] [{level}] {message}");
        }
    }
}
