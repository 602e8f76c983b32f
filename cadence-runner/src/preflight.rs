//! Preflight checks
//!
//! Prepares the runner's infrastructure before the loop starts. Any failure
//! here is fatal; once the loop runs, nothing is.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::Config;
use crate::error::SetupError;
use crate::service::FileRunLog;

/// Absolute locations the loop runs with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub workdir: PathBuf,
    pub log_path: PathBuf,
    pub runtime_env: Option<PathBuf>,
}

/// Resolves and checks every path in the configuration without touching
/// the process state
pub fn resolve(config: &Config) -> Result<Workspace, SetupError> {
    config.validate()?;

    let workdir =
        std::fs::canonicalize(&config.workdir).map_err(|source| SetupError::WorkingDirectory {
            path: config.workdir.clone(),
            source,
        })?;

    if !workdir.is_dir() {
        return Err(SetupError::WorkingDirectory {
            path: config.workdir.clone(),
            source: std::io::Error::other("not a directory"),
        });
    }

    let runtime_env = match &config.runtime_env {
        Some(dir) => Some(resolve_runtime_env(&workdir, dir)?),
        None => None,
    };

    Ok(Workspace {
        log_path: workdir.join(&config.log_file),
        workdir,
        runtime_env,
    })
}

/// Enters the working directory and opens the run log
pub fn enter(workspace: &Workspace) -> Result<FileRunLog, SetupError> {
    std::env::set_current_dir(&workspace.workdir).map_err(|source| {
        SetupError::WorkingDirectory {
            path: workspace.workdir.clone(),
            source,
        }
    })?;
    info!("Entered working directory {}", workspace.workdir.display());

    let log = open_log(&workspace.log_path)?;
    info!("Appending to run log {}", log.path().display());

    Ok(log)
}

fn resolve_runtime_env(workdir: &Path, dir: &Path) -> Result<PathBuf, SetupError> {
    let dir = workdir.join(dir);
    if !dir.join("bin").is_dir() {
        return Err(SetupError::RuntimeEnvironment { path: dir });
    }
    Ok(dir)
}

fn open_log(path: &Path) -> Result<FileRunLog, SetupError> {
    FileRunLog::open(path).map_err(|source| SetupError::LogFile {
        path: path.to_path_buf(),
        source,
    })
}
