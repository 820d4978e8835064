use crate::error::{BackendError, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::time::timeout;

/// Model tried first on every request
pub const PRIMARY_MODEL: &str = "gemini-3-pro-preview";
pub const MODEL_PRO: &str = "gemini-2.5-pro";
pub const MODEL_FLASH: &str = "gemini-2.5-flash";

/// Substring of the CLI's stderr when the Pro quota is exhausted
pub const QUOTA_EXCEEDED_MARKER: &str = "Quota exceeded for quota metric 'Gemini 2.5 Pro Requests'";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10 * 60);

const PROGRAM_NAME: &str = "gemini";

/// Per-request generation options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Requested fallback model (defaults to [`MODEL_PRO`])
    pub model: Option<String>,
    /// Run the CLI with `-s`
    pub sandbox: bool,
}

/// Opaque text-in/text-out generator
#[async_trait]
pub trait TextBackend: Send + Sync {
    /// Generate a response for `prompt`
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String>;

    /// Usage text of the underlying tool
    async fn help_text(&self) -> Result<String>;
}

/// Models to try, in order, for one request.
///
/// The quota-triggered flash retry is conditional, so it is not part of this list.
#[must_use]
pub fn model_attempts(requested: Option<&str>) -> [String; 2] {
    let fallback = requested
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(MODEL_PRO);
    [PRIMARY_MODEL.to_string(), fallback.to_string()]
}

/// Runs the `gemini` executable as a subprocess
#[derive(Debug, Clone)]
pub struct GeminiCli {
    program: Option<PathBuf>,
    timeout: Duration,
}

impl Default for GeminiCli {
    fn default() -> Self {
        Self {
            program: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl GeminiCli {
    /// Use an explicit executable instead of searching `PATH`
    #[must_use]
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: Some(program.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve the executable; looked up on each call so installing the CLI later just works
    pub fn resolve_program(&self) -> Result<PathBuf> {
        if let Some(program) = &self.program {
            return if program.exists() {
                Ok(program.clone())
            } else {
                Err(BackendError::NotFound)
            };
        }
        find_on_path(PROGRAM_NAME).ok_or(BackendError::NotFound)
    }

    /// One invocation with a single model, no fallback
    pub async fn run_model(
        &self,
        prompt: &str,
        model: Option<&str>,
        sandbox: bool,
    ) -> Result<String> {
        let mut args: Vec<OsString> = Vec::new();
        if let Some(model) = model {
            args.push("-m".into());
            args.push(model.into());
        }
        if sandbox {
            args.push("-s".into());
        }
        args.push("-p".into());
        args.push(prompt.into());
        self.run_args(args).await
    }

    async fn run_args(&self, args: Vec<OsString>) -> Result<String> {
        let program = self.resolve_program()?;
        log::debug!("Running {} with {} args", program.display(), args.len());

        let mut command = tokio::process::Command::new(&program);
        command
            .args(&args)
            .env("NO_COLOR", "1")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = timeout(self.timeout, command.output())
            .await
            .map_err(|_| BackendError::Timeout(self.timeout))??;

        if !output.status.success() {
            return Err(BackendError::Exited {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl TextBackend for GeminiCli {
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String> {
        let [primary, fallback] = model_attempts(options.model.as_deref());

        match self.run_model(prompt, Some(&primary), options.sandbox).await {
            Ok(output) => return Ok(output),
            Err(BackendError::NotFound) => return Err(BackendError::NotFound),
            Err(err) => {
                log::info!("Model {primary} failed ({err}); falling back to {fallback}");
            }
        }

        match self.run_model(prompt, Some(&fallback), options.sandbox).await {
            Err(err) if err.is_quota_exceeded() && fallback != MODEL_FLASH => {
                log::info!("Quota exceeded on {fallback}; retrying with {MODEL_FLASH}");
                self.run_model(prompt, Some(MODEL_FLASH), options.sandbox)
                    .await
            }
            other => other,
        }
    }

    async fn help_text(&self) -> Result<String> {
        self.run_args(vec!["-help".into()]).await
    }
}

fn find_on_path(name: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path).find_map(|dir| {
        candidate_names(name)
            .into_iter()
            .map(|candidate| dir.join(candidate))
            .find(|candidate| is_executable(candidate))
    })
}

#[cfg(unix)]
fn candidate_names(name: &str) -> Vec<String> {
    vec![name.to_string()]
}

#[cfg(not(unix))]
fn candidate_names(name: &str) -> Vec<String> {
    vec![
        format!("{name}.exe"),
        format!("{name}.cmd"),
        name.to_string(),
    ]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempts_start_with_primary_then_requested() {
        assert_eq!(
            model_attempts(None),
            [PRIMARY_MODEL.to_string(), MODEL_PRO.to_string()]
        );
        assert_eq!(
            model_attempts(Some("gemini-2.5-flash")),
            [PRIMARY_MODEL.to_string(), MODEL_FLASH.to_string()]
        );
        assert_eq!(model_attempts(Some("  ")).get(1).map(String::as_str), Some(MODEL_PRO));
    }

    #[test]
    fn missing_explicit_program_is_not_found() {
        let cli = GeminiCli::with_program("/definitely/not/here/gemini");
        assert!(matches!(cli.resolve_program(), Err(BackendError::NotFound)));
    }

    #[test]
    fn quota_detection_reads_stderr() {
        let err = BackendError::Exited {
            code: Some(1),
            stderr: format!("Error: {QUOTA_EXCEEDED_MARKER} for today"),
        };
        assert!(err.is_quota_exceeded());
        assert!(!BackendError::Timeout(Duration::from_secs(1)).is_quota_exceeded());
    }

    #[test]
    fn exit_message_falls_back_to_code() {
        let err = BackendError::Exited {
            code: Some(3),
            stderr: String::new(),
        };
        assert_eq!(err.to_string(), "gemini exited 3");
    }

    #[cfg(unix)]
    mod process {
        use super::super::*;
        use std::os::unix::fs::PermissionsExt;

        fn stub(dir: &Path, body: &str) -> PathBuf {
            let path = dir.join("gemini");
            std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[tokio::test]
        async fn passes_model_sandbox_and_prompt() {
            let tmp = tempfile::tempdir().unwrap();
            let cli = GeminiCli::with_program(stub(tmp.path(), r#"echo "  $@  ""#));
            let out = cli.run_model("hello", Some("m1"), true).await.unwrap();
            assert_eq!(out, "-m m1 -s -p hello");
        }

        #[tokio::test]
        async fn non_zero_exit_surfaces_stderr() {
            let tmp = tempfile::tempdir().unwrap();
            let cli = GeminiCli::with_program(stub(tmp.path(), "echo 'boom' >&2\nexit 2"));
            let err = cli.run_model("p", None, false).await.unwrap_err();
            assert!(matches!(&err, BackendError::Exited { code: Some(2), .. }));
            assert_eq!(err.to_string(), "boom");
        }

        #[tokio::test]
        async fn quota_on_pro_falls_back_to_flash() {
            let tmp = tempfile::tempdir().unwrap();
            let script = format!(
                r#"case "$2" in
  gemini-2.5-flash) echo "flash answer" ;;
  gemini-2.5-pro) echo "{QUOTA_EXCEEDED_MARKER}" >&2; exit 1 ;;
  *) echo "model unavailable" >&2; exit 1 ;;
esac"#
            );
            let cli = GeminiCli::with_program(stub(tmp.path(), &script));
            let out = cli
                .generate("p", &GenerateOptions::default())
                .await
                .unwrap();
            assert_eq!(out, "flash answer");
        }

        #[tokio::test]
        async fn primary_model_wins_when_available() {
            let tmp = tempfile::tempdir().unwrap();
            let cli = GeminiCli::with_program(stub(tmp.path(), r#"echo "used $2""#));
            let out = cli
                .generate("p", &GenerateOptions::default())
                .await
                .unwrap();
            assert_eq!(out, format!("used {PRIMARY_MODEL}"));
        }

        #[tokio::test]
        async fn slow_process_times_out() {
            let tmp = tempfile::tempdir().unwrap();
            let cli = GeminiCli::with_program(stub(tmp.path(), "sleep 5"))
                .with_timeout(Duration::from_millis(100));
            let err = cli.run_model("p", None, false).await.unwrap_err();
            assert!(matches!(err, BackendError::Timeout(_)));
        }
    }
}
