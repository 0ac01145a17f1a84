//! Multi-factor scoring for recommendation candidates.

use super::types::{CatalogStats, ComponentScores, RecommendationResult, Strategy, StrategyProfile};
use crate::domain::menu::{MenuCategory, MenuItem};
use rust_decimal::prelude::ToPrimitive;

/// Neutral placeholder for the context component. Reserved as an extension
/// point for session/preference signals; not derived from any input yet.
const CONTEXT_PLACEHOLDER: f64 = 0.5;

/// Blends five sub-scores, each clamped to [0, 1], using the weights of one
/// strategy profile.
#[derive(Clone, Copy, Debug)]
pub struct RecommendationScorer {
    profile: StrategyProfile,
}

impl RecommendationScorer {
    pub fn new(strategy: Strategy) -> Self {
        Self { profile: strategy.profile() }
    }

    pub fn with_profile(profile: StrategyProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> StrategyProfile {
        self.profile
    }

    /// Score one candidate. `copurchase_score` is supplied by the engine,
    /// already normalized to [0, 1]; it is 0 without cart context.
    pub fn score(
        &self,
        item: &MenuItem,
        copurchase_score: f64,
        stats: &CatalogStats,
    ) -> RecommendationResult {
        let category = category_score(item.category);
        let margin = margin_score(item, stats);
        let copurchase = copurchase_score.clamp(0.0, 1.0);
        let popularity = popularity_score(item, stats);
        let context = CONTEXT_PLACEHOLDER;

        let overall = category * self.profile.category
            + margin * self.profile.margin
            + copurchase * self.profile.copurchase
            + popularity * self.profile.popularity
            + context * self.profile.context;

        let components = ComponentScores {
            category: round3(category),
            margin: round3(margin),
            copurchase: round3(copurchase),
            popularity: round3(popularity),
            context: round3(context),
        };

        RecommendationResult {
            item: item.clone(),
            score: round3(overall),
            reason: generate_reason(item, copurchase, popularity, margin),
            components,
            profit_impact: Some(item.margin()),
        }
    }
}

/// Menu engineering quadrant priority: push high-profit items regardless of
/// current popularity. Unset and unrecognized categories are neutral.
fn category_score(category: Option<MenuCategory>) -> f64 {
    match category {
        Some(MenuCategory::Star) => 1.0,
        Some(MenuCategory::Puzzle) => 0.85,
        Some(MenuCategory::Plowhorse) => 0.6,
        Some(MenuCategory::Dog) => 0.1,
        None => 0.5,
    }
}

fn margin_score(item: &MenuItem, stats: &CatalogStats) -> f64 {
    let margin = item.margin().to_f64().unwrap_or(0.0);
    (margin / stats.max_margin).clamp(0.0, 1.0)
}

fn popularity_score(item: &MenuItem, stats: &CatalogStats) -> f64 {
    (item.total_purchases as f64 / stats.max_purchases).clamp(0.0, 1.0)
}

/// Up to two short phrases, chosen by priority. Advisory text only.
fn generate_reason(item: &MenuItem, copurchase: f64, popularity: f64, margin: f64) -> String {
    let mut reasons: Vec<&'static str> = Vec::new();

    match item.category {
        Some(MenuCategory::Star) => reasons.push("Popular favorite"),
        Some(MenuCategory::Puzzle) => reasons.push("Hidden gem"),
        _ => {}
    }

    if copurchase > 0.5 {
        reasons.push("Pairs perfectly with your order");
    } else if copurchase > 0.2 {
        reasons.push("Often ordered together");
    }

    if popularity > 0.7 {
        reasons.push("Customer favorite");
    }

    if margin > 0.8 {
        reasons.push("Great value");
    }

    if reasons.is_empty() {
        reasons.push("Recommended for you");
    }

    reasons.truncate(2);
    reasons.join(" • ")
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
