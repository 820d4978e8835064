use std::time::Duration;
use thiserror::Error;

/// Result type for backend invocations
pub type Result<T> = std::result::Result<T, BackendError>;

/// Errors that can occur while running the gemini CLI
#[derive(Error, Debug)]
pub enum BackendError {
    /// No executable found
    #[error("gemini CLI not found in PATH. Install the Gemini CLI and ensure 'gemini' is available.")]
    NotFound,

    /// The process ran but reported failure
    #[error("{}", exit_message(.code, .stderr))]
    Exited { code: Option<i32>, stderr: String },

    /// The process did not finish in time
    #[error("gemini did not finish within {}s", .0.as_secs())]
    Timeout(Duration),

    /// Spawning or talking to the process failed
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl BackendError {
    /// Whether the failure was the Pro-model quota being exhausted
    #[must_use]
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(
            self,
            Self::Exited { stderr, .. } if stderr.contains(crate::cli::QUOTA_EXCEEDED_MARKER)
        )
    }
}

fn exit_message(code: &Option<i32>, stderr: &str) -> String {
    if !stderr.is_empty() {
        return stderr.to_string();
    }
    match *code {
        Some(code) => format!("gemini exited {code}"),
        None => "gemini was terminated by a signal".to_string(),
    }
}
