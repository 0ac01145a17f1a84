//! Recommendation engine facade.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::analyzer::CoPurchaseAnalyzer;
use super::scoring::RecommendationScorer;
use super::sources::{ItemCatalog, OrderHistory};
use super::types::{
    CatalogStats, ItemAssociation, RecommendationRequest, RecommendationResult, Strategy,
};
use super::RecommendationError;
use crate::cache::RecommendationCache;
use crate::config::RecommendationConfig;
use crate::domain::menu::MenuItemId;

/// Orchestrates the analyzer and scorer: builds candidate sets, aggregates
/// cart co-purchase context, and exposes the caller-facing operations.
pub struct RecommendationEngine {
    analyzer: CoPurchaseAnalyzer,
    catalog: Arc<dyn ItemCatalog>,
    cache: Arc<dyn RecommendationCache>,
    stats_ttl: Duration,
}

impl RecommendationEngine {
    pub fn new(
        orders: Arc<dyn OrderHistory>,
        catalog: Arc<dyn ItemCatalog>,
        cache: Arc<dyn RecommendationCache>,
    ) -> Self {
        Self {
            analyzer: CoPurchaseAnalyzer::new(orders, Arc::clone(&catalog), Arc::clone(&cache)),
            catalog,
            cache,
            stats_ttl: Duration::from_secs(super::CACHE_TTL_MENU_STATS_SECS),
        }
    }

    pub fn with_config(
        orders: Arc<dyn OrderHistory>,
        catalog: Arc<dyn ItemCatalog>,
        cache: Arc<dyn RecommendationCache>,
        config: &RecommendationConfig,
    ) -> Self {
        Self {
            analyzer: CoPurchaseAnalyzer::with_config(
                orders,
                Arc::clone(&catalog),
                Arc::clone(&cache),
                config,
            ),
            catalog,
            cache,
            stats_ttl: Duration::from_secs(config.stats_ttl_secs),
        }
    }

    pub fn analyzer(&self) -> &CoPurchaseAnalyzer {
        &self.analyzer
    }

    /// Ranked recommendations for the given request. Items in the cart or
    /// the exclusion list are never returned.
    pub async fn get_recommendations(
        &self,
        request: RecommendationRequest,
    ) -> Result<Vec<RecommendationResult>, RecommendationError> {
        if request.limit == 0 {
            return Err(RecommendationError::InvalidRequest(
                "limit must be at least 1".to_owned(),
            ));
        }

        let mut excluded: HashSet<MenuItemId> = request.exclude.iter().copied().collect();
        excluded.extend(request.current_items.iter().copied());

        let mut candidates = self.catalog.active_items().await?;
        candidates.retain(|item| {
            !excluded.contains(&item.id)
                && request.section.map_or(true, |section| item.section_id == section)
        });

        let copurchase_scores = if request.current_items.is_empty() {
            HashMap::new()
        } else {
            self.copurchase_scores(&request.current_items).await?
        };

        let stats = self.catalog_stats().await?;
        let scorer = RecommendationScorer::new(request.strategy);

        let mut results: Vec<RecommendationResult> = candidates
            .iter()
            .map(|item| {
                let copurchase = copurchase_scores.get(&item.id).copied().unwrap_or(0.0);
                scorer.score(item, copurchase, &stats)
            })
            .collect();

        // Highest score first; item id breaks ties deterministically.
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.item.id.cmp(&b.item.id))
        });
        results.truncate(request.limit);

        debug!(
            event_name = "recommendation.request.served",
            strategy = request.strategy.as_str(),
            cart_items = request.current_items.len(),
            returned = results.len(),
            "recommendation request served"
        );

        Ok(results)
    }

    /// Items frequently purchased with the given item, strongest first.
    /// An item with no co-purchase history yields an empty list.
    pub async fn get_frequently_bought_together(
        &self,
        item_id: MenuItemId,
        limit: usize,
    ) -> Result<Vec<ItemAssociation>, RecommendationError> {
        self.analyzer.get_item_associations(item_id, limit, true).await
    }

    /// Margin-weighted suggestions for the current cart.
    pub async fn get_upsell_suggestions(
        &self,
        cart_items: Vec<MenuItemId>,
        limit: usize,
    ) -> Result<Vec<RecommendationResult>, RecommendationError> {
        self.get_recommendations(
            RecommendationRequest::new()
                .with_current_items(cart_items)
                .with_limit(limit)
                .with_strategy(Strategy::Upsell),
        )
        .await
    }

    /// Variety-weighted suggestions, biased toward sections not yet in the
    /// cart. Same-section candidates still fill remaining slots when too few
    /// different-section candidates exist.
    pub async fn get_cross_sell_suggestions(
        &self,
        cart_items: Vec<MenuItemId>,
        limit: usize,
    ) -> Result<Vec<RecommendationResult>, RecommendationError> {
        let mut cart_sections = HashSet::new();
        for item_id in &cart_items {
            if let Some(item) = self.catalog.find_by_id(item_id).await? {
                cart_sections.insert(item.section_id);
            }
        }

        // Over-fetch so the partition has material to reorder.
        let recommendations = self
            .get_recommendations(
                RecommendationRequest::new()
                    .with_current_items(cart_items)
                    .with_limit(limit.saturating_mul(2))
                    .with_strategy(Strategy::CrossSell),
            )
            .await?;

        let (cross_section, same_section): (Vec<_>, Vec<_>) = recommendations
            .into_iter()
            .partition(|result| !cart_sections.contains(&result.item.section_id));

        let mut ordered = cross_section;
        ordered.extend(same_section);
        ordered.truncate(limit);

        Ok(ordered)
    }

    /// Co-purchase context for the cart: each associated item takes its best
    /// lift across all cart items, scaled and renormalized into [0, 1].
    async fn copurchase_scores(
        &self,
        cart_items: &[MenuItemId],
    ) -> Result<HashMap<MenuItemId, f64>, RecommendationError> {
        let mut scores: HashMap<MenuItemId, f64> = HashMap::new();

        for item_id in cart_items {
            let associations = self
                .analyzer
                .get_item_associations(*item_id, super::CART_ASSOCIATION_FANOUT, true)
                .await?;

            for association in associations {
                let candidate = association.lift / 5.0;
                let entry = scores.entry(association.item_id).or_insert(0.0);
                if candidate > *entry {
                    *entry = candidate;
                }
            }
        }

        let max_score = scores.values().copied().fold(0.0_f64, f64::max);
        if max_score > 1.0 {
            for value in scores.values_mut() {
                *value /= max_score;
            }
        }

        Ok(scores)
    }

    /// Catalog maxima for normalization; cached briefly since they change
    /// slowly relative to request volume.
    async fn catalog_stats(&self) -> Result<CatalogStats, RecommendationError> {
        if let Some(value) = self.cache.get(super::CACHE_KEY_MENU_STATS).await {
            if let Ok(stats) = serde_json::from_value::<CatalogStats>(value) {
                return Ok(stats);
            }
        }

        let items = self.catalog.active_items().await?;
        let stats = CatalogStats::from_items(&items);

        if let Ok(value) = serde_json::to_value(stats) {
            self.cache.set(super::CACHE_KEY_MENU_STATS, value, self.stats_ttl).await;
        }

        Ok(stats)
    }
}
