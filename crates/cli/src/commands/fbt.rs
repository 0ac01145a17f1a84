use clap::Args;
use uuid::Uuid;

use platewise_core::domain::menu::MenuItemId;
use platewise_core::recommendations::{AssociationView, DEFAULT_LIMIT};

use crate::commands::{block_on, build_engine, failure_result, load_config, CommandResult};

#[derive(Debug, Args)]
pub struct FbtArgs {
    /// Menu item id to look up associations for.
    #[arg(long, value_name = "UUID")]
    pub item: String,

    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    pub limit: usize,
}

pub fn run(args: FbtArgs) -> CommandResult {
    let item_id = match Uuid::parse_str(args.item.trim()) {
        Ok(id) => MenuItemId(id),
        Err(error) => {
            return failure_result(
                "fbt",
                ("invalid_argument", format!("invalid item id `{}`: {error}", args.item), 2),
            );
        }
    };

    let outcome = load_config().and_then(|config| {
        block_on(async {
            let (pool, engine) = build_engine(&config).await?;
            let associations = engine
                .get_frequently_bought_together(item_id, args.limit)
                .await
                .map_err(|error| ("recommendation", error.to_string(), 5u8))?;
            pool.close().await;
            Ok(associations)
        })
    });

    match outcome {
        Ok(associations) => {
            let views: Vec<AssociationView> =
                associations.iter().map(AssociationView::from).collect();
            match serde_json::to_value(&views) {
                Ok(data) => CommandResult::success_with_data(
                    "fbt",
                    format!("{} associated items", views.len()),
                    data,
                ),
                Err(error) => CommandResult::failure("fbt", "serialization", error.to_string(), 6),
            }
        }
        Err(failure) => failure_result("fbt", failure),
    }
}
