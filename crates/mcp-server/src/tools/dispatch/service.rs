use super::GeminiService;
use crate::config::ServerConfig;
use crate::tools::catalog;
use anyhow::{Context, Result};
use gemini_backend::{GeminiCli, TextBackend};
use gemini_change_mode::{CacheBackend, ChangeModeConfig, ChangeModePipeline, StoreConfig};
use rmcp::model::{Implementation, ServerCapabilities, ServerInfo};
use rmcp::{tool_handler, ServerHandler};
use std::sync::Arc;

impl GeminiService {
    /// Service driven by the gemini CLI, configured from the environment
    pub fn new() -> Result<Self> {
        Self::from_config(&ServerConfig::from_env())
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let cli = match &config.cli_bin {
            Some(program) => GeminiCli::with_program(program),
            None => GeminiCli::default(),
        }
        .with_timeout(config.backend_timeout);
        let pipeline = open_pipeline(&config.change_mode).context("open change-mode pipeline")?;
        Ok(Self::with_backend(Arc::new(cli), pipeline))
    }

    pub fn with_backend(backend: Arc<dyn TextBackend>, pipeline: ChangeModePipeline) -> Self {
        Self {
            backend,
            pipeline: Arc::new(pipeline),
            tool_router: Self::tool_router(),
        }
    }
}

/// Open the configured chunk cache, degrading to an in-memory one when the file store is unusable
fn open_pipeline(config: &ChangeModeConfig) -> gemini_change_mode::Result<ChangeModePipeline> {
    ChangeModePipeline::from_config(config).or_else(|err| {
        if config.store.backend == CacheBackend::Memory {
            return Err(err);
        }
        log::warn!(
            "Failed to open chunk cache at {} ({err}); falling back to in-memory cache",
            config.store.dir.display()
        );
        ChangeModePipeline::from_config(&ChangeModeConfig {
            budget: config.budget,
            store: StoreConfig {
                backend: CacheBackend::Memory,
                ..config.store.clone()
            },
        })
    })
}

#[tool_handler]
impl ServerHandler for GeminiService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(catalog::tool_instructions()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }
}
