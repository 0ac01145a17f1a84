pub mod config;
pub mod fbt;
pub mod migrate;
pub mod recommend;
pub mod seed;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use platewise_core::cache::InMemoryTtlCache;
use platewise_core::config::{AppConfig, LoadOptions};
use platewise_core::recommendations::sources::{ItemCatalog, OrderHistory};
use platewise_core::recommendations::RecommendationEngine;
use platewise_db::{connect, DbPool, SqlItemCatalog, SqlOrderHistory};

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data: None,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn success_with_data(command: &str, message: impl Into<String>, data: Value) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data: Some(data),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) type CommandFailure = (&'static str, String, u8);

pub(crate) fn failure_result(command: &'static str, failure: CommandFailure) -> CommandResult {
    let (error_class, message, exit_code) = failure;
    CommandResult::failure(command, error_class, message, exit_code)
}

pub(crate) fn load_config() -> Result<AppConfig, CommandFailure> {
    AppConfig::load(LoadOptions::default())
        .map_err(|error| ("config_validation", format!("configuration issue: {error}"), 2u8))
}

/// Commands are synchronous entry points; each one drives its async work on
/// a throwaway current-thread runtime.
pub(crate) fn block_on<T, F>(future: F) -> Result<T, CommandFailure>
where
    F: std::future::Future<Output = Result<T, CommandFailure>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| {
            ("runtime_init", format!("failed to initialize async runtime: {error}"), 3u8)
        })?;
    runtime.block_on(future)
}

pub(crate) async fn connect_pool(config: &AppConfig) -> Result<DbPool, CommandFailure> {
    connect(&config.database).await.map_err(|error| ("db_connectivity", error.to_string(), 4u8))
}

/// Connect to the configured database and assemble the engine over the
/// sqlite-backed sources with a process-local cache.
pub(crate) async fn build_engine(
    config: &AppConfig,
) -> Result<(DbPool, RecommendationEngine), CommandFailure> {
    let pool = connect_pool(config).await?;

    let engine = RecommendationEngine::with_config(
        Arc::new(SqlOrderHistory::new(pool.clone())) as Arc<dyn OrderHistory>,
        Arc::new(SqlItemCatalog::new(pool.clone())) as Arc<dyn ItemCatalog>,
        Arc::new(InMemoryTtlCache::new()),
        &config.recommendations,
    );

    Ok((pool, engine))
}
