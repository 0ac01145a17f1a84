//! Profit-aware menu recommendations.
//!
//! Combines market basket analysis over realized orders (support,
//! confidence, lift) with a multi-factor scorer that blends menu
//! engineering category, margin, co-purchase strength, popularity, and a
//! context placeholder into a ranked candidate list.

mod analyzer;
mod engine;
mod scoring;
pub mod sources;
mod types;

use thiserror::Error;

pub use analyzer::CoPurchaseAnalyzer;
pub use engine::RecommendationEngine;
pub use scoring::RecommendationScorer;
pub use sources::{ItemCatalog, OrderHistory, SourceError};
pub use types::{
    AffinityEntry, AffinityMatrix, AssociationView, CatalogStats, ComponentScores,
    ItemAssociation, RecommendationRequest, RecommendationResult, RecommendationView, Strategy,
    StrategyProfile,
};

/// Prioritize the menu engineering quadrants evenly with profitability.
pub const BALANCED_WEIGHTS: StrategyProfile = StrategyProfile {
    category: 0.35,
    margin: 0.30,
    copurchase: 0.20,
    popularity: 0.10,
    context: 0.05,
};

/// Margin-heavy blend for upsell prompts.
pub const UPSELL_WEIGHTS: StrategyProfile = StrategyProfile {
    category: 0.30,
    margin: 0.45,
    copurchase: 0.15,
    popularity: 0.05,
    context: 0.05,
};

/// Co-purchase-heavy blend for cross-sell variety.
pub const CROSS_SELL_WEIGHTS: StrategyProfile = StrategyProfile {
    category: 0.25,
    margin: 0.20,
    copurchase: 0.35,
    popularity: 0.10,
    context: 0.10,
};

/// Minimum share of realized orders a pair must appear in.
pub const DEFAULT_MIN_SUPPORT: f64 = 0.01;

/// Minimum P(B|A) for an association to survive.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.10;

/// Default number of recommendations to return.
pub const DEFAULT_LIMIT: usize = 5;

/// Associations fetched per cart item when aggregating co-purchase context.
pub const CART_ASSOCIATION_FANOUT: usize = 10;

pub const CACHE_KEY_AFFINITY: &str = "recommendation:affinity_matrix";
pub const CACHE_KEY_FBT_PREFIX: &str = "recommendation:fbt:";
pub const CACHE_KEY_MENU_STATS: &str = "recommendation:menu_stats";

pub const CACHE_TTL_AFFINITY_SECS: u64 = 900;
pub const CACHE_TTL_FBT_SECS: u64 = 1800;
pub const CACHE_TTL_MENU_STATS_SECS: u64 = 300;

#[derive(Debug, Error)]
pub enum RecommendationError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("invalid recommendation request: {0}")]
    InvalidRequest(String),
}
