use serde_json::json;

use crate::commands::{failure_result, load_config, CommandResult};

pub fn run() -> CommandResult {
    let config = match load_config() {
        Ok(config) => config,
        Err(failure) => return failure_result("config", failure),
    };

    let data = json!({
        "database": {
            "url": config.database.url,
            "max_connections": config.database.max_connections,
            "timeout_secs": config.database.timeout_secs,
        },
        "recommendations": {
            "min_support": config.recommendations.min_support,
            "min_confidence": config.recommendations.min_confidence,
            "affinity_ttl_secs": config.recommendations.affinity_ttl_secs,
            "fbt_ttl_secs": config.recommendations.fbt_ttl_secs,
            "stats_ttl_secs": config.recommendations.stats_ttl_secs,
        },
        "logging": {
            "level": config.logging.level,
            "format": format!("{:?}", config.logging.format).to_lowercase(),
        },
    });

    CommandResult::success_with_data("config", "effective configuration", data)
}
