use crate::commands::{block_on, connect_pool, failure_result, load_config, CommandResult};
use platewise_db::migrations;

pub fn run() -> CommandResult {
    let outcome = load_config().and_then(|config| {
        block_on(async {
            let pool = connect_pool(&config).await?;
            migrations::run_pending(&pool)
                .await
                .map_err(|error| ("migration", error.to_string(), 5u8))?;
            pool.close().await;
            Ok(())
        })
    });

    match outcome {
        Ok(()) => CommandResult::success("migrate", "applied pending migrations"),
        Err(failure) => failure_result("migrate", failure),
    }
}
