use crate::{alerts::AlertError, chart::ChartError, scanner::ScanError};

/// Errors reported to the operator as a single line. None of them end the shell.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Unknown command: {0}. Type ? to list commands.")]
    UnknownCommand(String),

    #[error("Invalid selection.")]
    InvalidSelection,

    #[error("Invalid input. Please enter a number.")]
    NotANumber,

    #[error("Hostname {0} not found.")]
    UnknownLabel(String),

    #[error("No miners registered. Use add or autofind first.")]
    NoDevices,

    #[error("Failed to fetch data from the selected miner.")]
    FetchFailed,

    #[error(transparent)]
    Alert(#[from] AlertError),

    #[error(transparent)]
    Chart(#[from] ChartError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("Chart session failed: {0:#}")]
    Session(anyhow::Error),

    /// Writing to the terminal failed; this one is fatal
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ShellError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, ShellError::Io(_))
    }
}
