//! External command run before the analysis
//!
//! Typically a job that refreshes the holdings CSVs. The analysis only
//! proceeds when the command exits successfully.

use tokio::process::Command;
use tracing::{info, warn};

use crate::config::PrerunConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrerunStatus {
    Succeeded,
    /// Exit code, `None` when killed by a signal
    Failed(Option<i32>),
    SpawnError(String),
}

impl PrerunStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, PrerunStatus::Succeeded)
    }
}

pub async fn run_prerun(prerun: &PrerunConfig) -> PrerunStatus {
    info!("Running pre-run command: {} {:?}", prerun.program, prerun.args);

    let status = Command::new(&prerun.program)
        .args(&prerun.args)
        .stdout(std::io::stderr())
        .kill_on_drop(true)
        .status()
        .await;

    match status {
        Ok(status) if status.success() => {
            info!("Pre-run command completed successfully");
            PrerunStatus::Succeeded
        }
        Ok(status) => {
            warn!("Pre-run command failed with {}", status);
            PrerunStatus::Failed(status.code())
        }
        Err(err) => {
            warn!("Pre-run command could not start: {}", err);
            PrerunStatus::SpawnError(err.to_string())
        }
    }
}
