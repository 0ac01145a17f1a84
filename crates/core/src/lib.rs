pub mod cache;
pub mod config;
pub mod domain;
pub mod errors;
pub mod recommendations;

pub use cache::{InMemoryTtlCache, RecommendationCache};
pub use domain::menu::{MenuCategory, MenuItem, MenuItemId, SectionId};
pub use domain::order::{Order, OrderId, OrderLine, OrderStatus};
pub use errors::DomainError;
pub use recommendations::{
    AffinityEntry, AffinityMatrix, CoPurchaseAnalyzer, ItemAssociation, RecommendationEngine,
    RecommendationError, RecommendationRequest, RecommendationResult, RecommendationScorer,
    Strategy, StrategyProfile,
};

pub use chrono;
pub use rust_decimal;
pub use uuid;
