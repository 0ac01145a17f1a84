use crate::commands::{block_on, connect_pool, failure_result, load_config, CommandResult};
use platewise_db::{fixtures, migrations};

pub fn run() -> CommandResult {
    let outcome = load_config().and_then(|config| {
        block_on(async {
            let pool = connect_pool(&config).await?;
            migrations::run_pending(&pool)
                .await
                .map_err(|error| ("migration", error.to_string(), 5u8))?;
            let summary = fixtures::seed_demo_data(&pool)
                .await
                .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;
            pool.close().await;
            Ok(summary)
        })
    });

    match outcome {
        Ok(summary) => CommandResult::success(
            "seed",
            format!(
                "demo dataset loaded: {} sections, {} items, {} orders",
                summary.sections, summary.items, summary.orders
            ),
        ),
        Err(failure) => failure_result("seed", failure),
    }
}
