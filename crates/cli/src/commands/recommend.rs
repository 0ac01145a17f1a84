use clap::Args;
use uuid::Uuid;

use platewise_core::domain::menu::{MenuItemId, SectionId};
use platewise_core::recommendations::{
    RecommendationRequest, RecommendationView, Strategy, DEFAULT_LIMIT,
};

use crate::commands::{
    block_on, build_engine, failure_result, load_config, CommandFailure, CommandResult,
};

#[derive(Debug, Args)]
pub struct RecommendArgs {
    /// Menu item id already in the cart (repeatable).
    #[arg(long = "cart", value_name = "UUID")]
    pub cart: Vec<String>,

    /// Restrict candidates to one menu section.
    #[arg(long, value_name = "UUID")]
    pub section: Option<String>,

    /// Menu item id to exclude from the results (repeatable).
    #[arg(long = "exclude", value_name = "UUID")]
    pub exclude: Vec<String>,

    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    pub limit: usize,

    /// Scoring strategy: balanced, upsell, or cross_sell.
    #[arg(long, default_value = "balanced")]
    pub strategy: String,
}

#[derive(Debug, Args)]
pub struct CartArgs {
    /// Menu item id already in the cart (repeatable).
    #[arg(long = "cart", value_name = "UUID")]
    pub cart: Vec<String>,

    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    pub limit: usize,
}

enum Mode {
    General { section: Option<SectionId>, exclude: Vec<MenuItemId>, strategy: Strategy },
    Upsell,
    CrossSell,
}

pub fn run(args: RecommendArgs) -> CommandResult {
    let cart = match parse_item_ids(&args.cart) {
        Ok(cart) => cart,
        Err(failure) => return failure_result("recommend", failure),
    };
    let exclude = match parse_item_ids(&args.exclude) {
        Ok(exclude) => exclude,
        Err(failure) => return failure_result("recommend", failure),
    };
    let section = match args.section.as_deref().map(parse_uuid).transpose() {
        Ok(section) => section.map(SectionId),
        Err(failure) => return failure_result("recommend", failure),
    };

    run_mode(
        "recommend",
        cart,
        args.limit,
        Mode::General { section, exclude, strategy: Strategy::from_name(&args.strategy) },
    )
}

pub fn run_upsell(args: CartArgs) -> CommandResult {
    match parse_item_ids(&args.cart) {
        Ok(cart) => run_mode("upsell", cart, args.limit, Mode::Upsell),
        Err(failure) => failure_result("upsell", failure),
    }
}

pub fn run_cross_sell(args: CartArgs) -> CommandResult {
    match parse_item_ids(&args.cart) {
        Ok(cart) => run_mode("cross-sell", cart, args.limit, Mode::CrossSell),
        Err(failure) => failure_result("cross-sell", failure),
    }
}

fn run_mode(command: &'static str, cart: Vec<MenuItemId>, limit: usize, mode: Mode) -> CommandResult {
    let outcome = load_config().and_then(|config| {
        block_on(async {
            let (pool, engine) = build_engine(&config).await?;

            let results = match mode {
                Mode::General { section, exclude, strategy } => {
                    let mut request = RecommendationRequest::new()
                        .with_current_items(cart)
                        .with_exclusions(exclude)
                        .with_limit(limit)
                        .with_strategy(strategy);
                    if let Some(section) = section {
                        request = request.with_section(section);
                    }
                    engine.get_recommendations(request).await
                }
                Mode::Upsell => engine.get_upsell_suggestions(cart, limit).await,
                Mode::CrossSell => engine.get_cross_sell_suggestions(cart, limit).await,
            }
            .map_err(|error| ("recommendation", error.to_string(), 5u8))?;

            pool.close().await;
            Ok(results)
        })
    });

    match outcome {
        Ok(results) => {
            let views: Vec<RecommendationView> = results.iter().map(RecommendationView::from).collect();
            match serde_json::to_value(&views) {
                Ok(data) => CommandResult::success_with_data(
                    command,
                    format!("{} recommendations", views.len()),
                    data,
                ),
                Err(error) => {
                    CommandResult::failure(command, "serialization", error.to_string(), 6)
                }
            }
        }
        Err(failure) => failure_result(command, failure),
    }
}

fn parse_item_ids(raw_ids: &[String]) -> Result<Vec<MenuItemId>, CommandFailure> {
    raw_ids.iter().map(|raw| parse_uuid(raw).map(MenuItemId)).collect()
}

fn parse_uuid(raw: &str) -> Result<Uuid, CommandFailure> {
    Uuid::parse_str(raw.trim())
        .map_err(|error| ("invalid_argument", format!("invalid id `{raw}`: {error}"), 2u8))
}
