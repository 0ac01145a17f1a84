//! Types for the recommendation subsystem.

use std::collections::HashMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::menu::{MenuItem, MenuItemId, SectionId};

/// A directed co-purchase association, joined with the associated item's
/// current catalog record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemAssociation {
    pub item_id: MenuItemId,
    pub item: MenuItem,
    /// How often both items appear together, over all realized orders.
    pub support: f64,
    /// P(associated | source).
    pub confidence: f64,
    /// Confidence over the associated item's baseline purchase rate.
    pub lift: f64,
    pub order_count: u64,
}

impl ItemAssociation {
    pub fn message(&self) -> String {
        let pct = (self.confidence * 100.0).round() as i64;
        format!("{pct}% of customers order this together")
    }
}

/// One directed entry inside the affinity matrix. Not persisted on its own;
/// the whole matrix is rebuilt and swapped as a unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AffinityEntry {
    pub item_id: MenuItemId,
    pub support: f64,
    pub confidence: f64,
    pub lift: f64,
    pub order_count: u64,
}

/// Pre-computed co-purchase snapshot. All entries are derived from the same
/// `total_orders` count, so the structure is internally consistent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AffinityMatrix {
    pub total_orders: u64,
    pub item_frequencies: HashMap<MenuItemId, u64>,
    /// Outgoing associations per source item, sorted by descending lift.
    pub associations: HashMap<MenuItemId, Vec<AffinityEntry>>,
}

/// Named blend of the five scoring factors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Balanced,
    Upsell,
    CrossSell,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Balanced => "balanced",
            Self::Upsell => "upsell",
            Self::CrossSell => "cross_sell",
        }
    }

    /// Unrecognized names fall back to the balanced blend.
    pub fn from_name(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "upsell" => Self::Upsell,
            "cross_sell" => Self::CrossSell,
            _ => Self::Balanced,
        }
    }

    pub fn profile(&self) -> StrategyProfile {
        match self {
            Self::Balanced => super::BALANCED_WEIGHTS,
            Self::Upsell => super::UPSELL_WEIGHTS,
            Self::CrossSell => super::CROSS_SELL_WEIGHTS,
        }
    }
}

/// Weights for the five scoring components. Each profile sums to 1.0 so the
/// overall score stays a convex combination of sub-scores in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrategyProfile {
    pub category: f64,
    pub margin: f64,
    pub copurchase: f64,
    pub popularity: f64,
    pub context: f64,
}

impl StrategyProfile {
    pub fn weight_sum(&self) -> f64 {
        self.category + self.margin + self.copurchase + self.popularity + self.context
    }

    pub fn is_normalized(&self) -> bool {
        (self.weight_sum() - 1.0).abs() <= 1e-9
    }
}

/// Individual component scores that produced an overall score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub category: f64,
    pub margin: f64,
    pub copurchase: f64,
    pub popularity: f64,
    pub context: f64,
}

/// A scored recommendation candidate. Ephemeral, produced per request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub item: MenuItem,
    /// Overall score in [0, 1], rounded to 3 decimal places.
    pub score: f64,
    pub reason: String,
    pub components: ComponentScores,
    /// The item's contribution margin, surfaced for owner-facing views.
    pub profit_impact: Option<Decimal>,
}

/// Catalog-wide maxima used to normalize margin and popularity scores.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub max_margin: f64,
    pub max_purchases: f64,
}

impl CatalogStats {
    /// Maxima over the active item set. Empty sets and all-non-positive
    /// margins fall back to 1 so normalization never divides by zero.
    pub fn from_items(items: &[MenuItem]) -> Self {
        let max_margin = items
            .iter()
            .map(|item| item.margin().to_f64().unwrap_or(0.0))
            .fold(0.0_f64, f64::max);
        let max_purchases =
            items.iter().map(|item| item.total_purchases as f64).fold(0.0_f64, f64::max);

        Self {
            max_margin: if max_margin > 0.0 { max_margin } else { 1.0 },
            max_purchases: if max_purchases > 0.0 { max_purchases } else { 1.0 },
        }
    }
}

/// Request for ranked recommendations.
#[derive(Clone, Debug)]
pub struct RecommendationRequest {
    /// Items already in the cart; used for co-purchase context and excluded
    /// from the results.
    pub current_items: Vec<MenuItemId>,
    /// Restrict candidates to one menu section.
    pub section: Option<SectionId>,
    /// Additional items to never recommend.
    pub exclude: Vec<MenuItemId>,
    pub limit: usize,
    pub strategy: Strategy,
}

impl RecommendationRequest {
    pub fn new() -> Self {
        Self {
            current_items: Vec::new(),
            section: None,
            exclude: Vec::new(),
            limit: super::DEFAULT_LIMIT,
            strategy: Strategy::Balanced,
        }
    }

    pub fn with_current_items(mut self, items: Vec<MenuItemId>) -> Self {
        self.current_items = items;
        self
    }

    pub fn with_section(mut self, section: SectionId) -> Self {
        self.section = Some(section);
        self
    }

    pub fn with_exclusions(mut self, exclude: Vec<MenuItemId>) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }
}

impl Default for RecommendationRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// Flat, serialization-friendly view of a recommendation for callers that
/// want plain strings (operator tooling, transports).
#[derive(Clone, Debug, Serialize)]
pub struct RecommendationView {
    pub item_id: String,
    pub title: String,
    pub price: String,
    pub category: Option<&'static str>,
    pub score: f64,
    pub reason: String,
    pub profit_impact: Option<String>,
}

impl From<&RecommendationResult> for RecommendationView {
    fn from(result: &RecommendationResult) -> Self {
        Self {
            item_id: result.item.id.0.to_string(),
            title: result.item.title.clone(),
            price: result.item.price.to_string(),
            category: result.item.category.map(|category| category.as_str()),
            score: result.score,
            reason: result.reason.clone(),
            profit_impact: result.profit_impact.map(|margin| margin.to_string()),
        }
    }
}

/// Flat view of a frequently-bought-together association.
#[derive(Clone, Debug, Serialize)]
pub struct AssociationView {
    pub item_id: String,
    pub title: String,
    pub price: String,
    pub category: Option<&'static str>,
    pub confidence: f64,
    pub lift: f64,
    pub message: String,
}

impl From<&ItemAssociation> for AssociationView {
    fn from(association: &ItemAssociation) -> Self {
        Self {
            item_id: association.item_id.0.to_string(),
            title: association.item.title.clone(),
            price: association.item.price.to_string(),
            category: association.item.category.map(|category| category.as_str()),
            confidence: (association.confidence * 1000.0).round() / 1000.0,
            lift: (association.lift * 100.0).round() / 100.0,
            message: association.message(),
        }
    }
}
