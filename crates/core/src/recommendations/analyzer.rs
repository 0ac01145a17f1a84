//! Market basket analysis over realized order history.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::sources::{ItemCatalog, OrderHistory};
use super::types::{AffinityEntry, AffinityMatrix, ItemAssociation};
use super::RecommendationError;
use crate::cache::RecommendationCache;
use crate::config::RecommendationConfig;
use crate::domain::menu::MenuItemId;

/// Discovers co-purchase patterns using association rule mining: support,
/// confidence, and lift over the distinct-item baskets of realized orders.
pub struct CoPurchaseAnalyzer {
    orders: Arc<dyn OrderHistory>,
    catalog: Arc<dyn ItemCatalog>,
    cache: Arc<dyn RecommendationCache>,
    min_support: f64,
    min_confidence: f64,
    affinity_ttl: Duration,
    fbt_ttl: Duration,
}

impl CoPurchaseAnalyzer {
    pub fn new(
        orders: Arc<dyn OrderHistory>,
        catalog: Arc<dyn ItemCatalog>,
        cache: Arc<dyn RecommendationCache>,
    ) -> Self {
        Self {
            orders,
            catalog,
            cache,
            min_support: super::DEFAULT_MIN_SUPPORT,
            min_confidence: super::DEFAULT_MIN_CONFIDENCE,
            affinity_ttl: Duration::from_secs(super::CACHE_TTL_AFFINITY_SECS),
            fbt_ttl: Duration::from_secs(super::CACHE_TTL_FBT_SECS),
        }
    }

    pub fn with_config(
        orders: Arc<dyn OrderHistory>,
        catalog: Arc<dyn ItemCatalog>,
        cache: Arc<dyn RecommendationCache>,
        config: &RecommendationConfig,
    ) -> Self {
        Self {
            orders,
            catalog,
            cache,
            min_support: config.min_support,
            min_confidence: config.min_confidence,
            affinity_ttl: Duration::from_secs(config.affinity_ttl_secs),
            fbt_ttl: Duration::from_secs(config.fbt_ttl_secs),
        }
    }

    /// Build the full affinity matrix from order history, or serve the
    /// cached snapshot when `use_cache` is set and one is still live.
    ///
    /// Cost is O(orders x basket^2); callers on the request path should
    /// prefer the cached snapshot and leave rebuilds to a periodic job.
    pub async fn build_affinity_matrix(
        &self,
        use_cache: bool,
    ) -> Result<AffinityMatrix, RecommendationError> {
        if use_cache {
            if let Some(value) = self.cache.get(super::CACHE_KEY_AFFINITY).await {
                match serde_json::from_value::<AffinityMatrix>(value) {
                    Ok(matrix) => {
                        debug!(
                            event_name = "recommendation.affinity.cache_hit",
                            total_orders = matrix.total_orders,
                            "serving cached affinity matrix"
                        );
                        return Ok(matrix);
                    }
                    // A snapshot written by an older build is a miss, not
                    // an error.
                    Err(error) => {
                        warn!(
                            event_name = "recommendation.affinity.cache_decode_failed",
                            error = %error,
                            "discarding undecodable cached affinity matrix"
                        );
                    }
                }
            }
        }

        let orders = self.orders.realized_orders().await?;
        let total_orders = orders.len() as u64;
        if total_orders == 0 {
            debug!(
                event_name = "recommendation.affinity.empty_history",
                "no realized orders; returning empty matrix"
            );
            return Ok(AffinityMatrix::default());
        }

        let mut item_counts: HashMap<MenuItemId, u64> = HashMap::new();
        let mut pair_counts: HashMap<(MenuItemId, MenuItemId), u64> = HashMap::new();

        for order in &orders {
            let basket: Vec<MenuItemId> = order.basket().into_iter().collect();

            for item_id in &basket {
                *item_counts.entry(*item_id).or_default() += 1;
            }

            // Co-occurrence is symmetric; track both directions so lookups
            // by either endpoint are direct.
            for (index, item_a) in basket.iter().enumerate() {
                for item_b in &basket[index + 1..] {
                    *pair_counts.entry((*item_a, *item_b)).or_default() += 1;
                    *pair_counts.entry((*item_b, *item_a)).or_default() += 1;
                }
            }
        }

        let mut associations: HashMap<MenuItemId, Vec<AffinityEntry>> = HashMap::new();

        for ((item_a, item_b), pair_count) in pair_counts {
            let support = pair_count as f64 / total_orders as f64;
            if support < self.min_support {
                continue;
            }

            let occurrence_a = item_counts.get(&item_a).copied().unwrap_or(0);
            if occurrence_a == 0 {
                continue;
            }
            let confidence = pair_count as f64 / occurrence_a as f64;
            if confidence < self.min_confidence {
                continue;
            }

            let baseline_b =
                item_counts.get(&item_b).copied().unwrap_or(0) as f64 / total_orders as f64;
            let lift = if baseline_b > 0.0 { confidence / baseline_b } else { 0.0 };

            associations.entry(item_a).or_default().push(AffinityEntry {
                item_id: item_b,
                support,
                confidence,
                lift,
                order_count: pair_count,
            });
        }

        // Strongest associations first; item id breaks lift ties so rebuild
        // output is deterministic.
        for entries in associations.values_mut() {
            entries.sort_by(|a, b| {
                b.lift
                    .partial_cmp(&a.lift)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.item_id.cmp(&b.item_id))
            });
        }

        let matrix = AffinityMatrix { total_orders, item_frequencies: item_counts, associations };

        debug!(
            event_name = "recommendation.affinity.rebuilt",
            total_orders,
            source_items = matrix.associations.len(),
            "affinity matrix rebuilt from order history"
        );

        if use_cache {
            self.store_matrix(&matrix).await;
        }

        Ok(matrix)
    }

    /// Items frequently bought together with `item_id`, strongest first,
    /// joined with their current catalog records. Associations whose item is
    /// inactive or gone are silently dropped.
    pub async fn get_item_associations(
        &self,
        item_id: MenuItemId,
        limit: usize,
        use_cache: bool,
    ) -> Result<Vec<ItemAssociation>, RecommendationError> {
        let cache_key = Self::fbt_cache_key(&item_id);

        if use_cache {
            if let Some(value) = self.cache.get(&cache_key).await {
                if let Ok(mut cached) = serde_json::from_value::<Vec<ItemAssociation>>(value) {
                    cached.truncate(limit);
                    return Ok(cached);
                }
            }
        }

        let mut matrix = self.build_affinity_matrix(use_cache).await?;

        // A cached matrix may predate this item; rebuild once before
        // concluding there is truly no association data.
        if use_cache && !matrix.associations.contains_key(&item_id) {
            matrix = self.build_affinity_matrix(false).await?;
        }

        let Some(entries) = matrix.associations.get(&item_id) else {
            return Ok(Vec::new());
        };

        let mut associations = Vec::new();
        for entry in entries.iter().take(limit) {
            let Some(item) = self.catalog.find_active(&entry.item_id).await? else {
                continue;
            };
            associations.push(ItemAssociation {
                item_id: entry.item_id,
                item,
                support: entry.support,
                confidence: entry.confidence,
                lift: entry.lift,
                order_count: entry.order_count,
            });
        }

        if use_cache {
            match serde_json::to_value(&associations) {
                Ok(value) => self.cache.set(&cache_key, value, self.fbt_ttl).await,
                Err(error) => warn!(
                    event_name = "recommendation.fbt.cache_encode_failed",
                    error = %error,
                    "skipping per-item association cache write"
                ),
            }
        }

        Ok(associations)
    }

    /// Lift of the directed pair `item_a -> item_b`; 0.0 when no surviving
    /// association exists.
    pub async fn calculate_lift(
        &self,
        item_a: MenuItemId,
        item_b: MenuItemId,
    ) -> Result<f64, RecommendationError> {
        let matrix = self.build_affinity_matrix(true).await?;

        Ok(matrix
            .associations
            .get(&item_a)
            .and_then(|entries| entries.iter().find(|entry| entry.item_id == item_b))
            .map(|entry| entry.lift)
            .unwrap_or(0.0))
    }

    /// Drop the per-item association cache entry, e.g. after an item update
    /// changes its active flag or section.
    pub async fn invalidate_item(&self, item_id: &MenuItemId) {
        self.cache.delete(&Self::fbt_cache_key(item_id)).await;
    }

    async fn store_matrix(&self, matrix: &AffinityMatrix) {
        match serde_json::to_value(matrix) {
            Ok(value) => self.cache.set(super::CACHE_KEY_AFFINITY, value, self.affinity_ttl).await,
            Err(error) => warn!(
                event_name = "recommendation.affinity.cache_encode_failed",
                error = %error,
                "skipping affinity matrix cache write"
            ),
        }
    }

    fn fbt_cache_key(item_id: &MenuItemId) -> String {
        format!("{}{}", super::CACHE_KEY_FBT_PREFIX, item_id.0)
    }
}
