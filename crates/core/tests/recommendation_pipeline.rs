//! End-to-end coverage of the analyzer/scorer/engine pipeline against
//! in-memory sources.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use platewise_core::cache::InMemoryTtlCache;
use platewise_core::domain::menu::{MenuCategory, MenuItem, MenuItemId, SectionId};
use platewise_core::domain::order::{Order, OrderId, OrderLine, OrderStatus};
use platewise_core::recommendations::sources::{
    InMemoryItemCatalog, InMemoryOrderHistory, OrderHistory, SourceError,
};
use platewise_core::recommendations::{
    CoPurchaseAnalyzer, RecommendationEngine, RecommendationError, RecommendationRequest,
};

fn menu_item(
    title: &str,
    section: SectionId,
    category: Option<MenuCategory>,
    price: &str,
    cost: &str,
    purchases: u64,
) -> MenuItem {
    MenuItem {
        id: MenuItemId(Uuid::new_v4()),
        title: title.to_owned(),
        price: price.parse().unwrap(),
        cost: cost.parse().unwrap(),
        section_id: section,
        category,
        total_purchases: purchases,
        active: true,
    }
}

fn order(status: OrderStatus, items: &[MenuItemId]) -> Order {
    Order {
        id: OrderId(Uuid::new_v4()),
        status,
        lines: items.iter().map(|id| OrderLine { item_id: *id, quantity: 1 }).collect(),
        created_at: Utc::now(),
    }
}

fn realized(items: &[MenuItemId]) -> Order {
    order(OrderStatus::Completed, items)
}

fn analyzer(orders: Vec<Order>, items: Vec<MenuItem>) -> CoPurchaseAnalyzer {
    CoPurchaseAnalyzer::new(
        Arc::new(InMemoryOrderHistory::new(orders)),
        Arc::new(InMemoryItemCatalog::new(items)),
        Arc::new(InMemoryTtlCache::new()),
    )
}

fn engine(orders: Vec<Order>, items: Vec<MenuItem>) -> RecommendationEngine {
    RecommendationEngine::new(
        Arc::new(InMemoryOrderHistory::new(orders)),
        Arc::new(InMemoryItemCatalog::new(items)),
        Arc::new(InMemoryTtlCache::new()),
    )
}

#[tokio::test]
async fn empty_order_history_yields_empty_matrix() {
    let analyzer = analyzer(Vec::new(), Vec::new());
    let matrix = analyzer.build_affinity_matrix(false).await.unwrap();

    assert_eq!(matrix.total_orders, 0);
    assert!(matrix.associations.is_empty());
    assert!(matrix.item_frequencies.is_empty());
}

#[tokio::test]
async fn unrealized_orders_do_not_count_as_purchases() {
    let section = SectionId(Uuid::new_v4());
    let burger = menu_item("Burger", section, None, "15.00", "5.00", 0);
    let fries = menu_item("Fries", section, None, "6.00", "1.50", 0);

    let orders = vec![
        order(OrderStatus::Pending, &[burger.id, fries.id]),
        order(OrderStatus::Cancelled, &[burger.id, fries.id]),
    ];

    let analyzer = analyzer(orders, vec![burger, fries]);
    let matrix = analyzer.build_affinity_matrix(false).await.unwrap();

    assert_eq!(matrix.total_orders, 0);
    assert!(matrix.associations.is_empty());
}

#[tokio::test]
async fn burger_fries_support_confidence_and_lift() {
    let section = SectionId(Uuid::new_v4());
    let burger = menu_item("Burger", section, None, "15.00", "5.00", 15);
    let fries = menu_item("Fries", section, None, "6.00", "1.50", 10);

    let mut orders: Vec<Order> = (0..10).map(|_| realized(&[burger.id, fries.id])).collect();
    orders.extend((0..5).map(|_| realized(&[burger.id])));

    let analyzer = analyzer(orders, vec![burger.clone(), fries.clone()]);
    let matrix = analyzer.build_affinity_matrix(false).await.unwrap();

    assert_eq!(matrix.total_orders, 15);
    assert_eq!(matrix.item_frequencies[&burger.id], 15);
    assert_eq!(matrix.item_frequencies[&fries.id], 10);

    let entry = matrix.associations[&burger.id]
        .iter()
        .find(|entry| entry.item_id == fries.id)
        .expect("burger -> fries association");

    assert!((entry.support - 10.0 / 15.0).abs() < 1e-12);
    assert!((entry.confidence - 10.0 / 15.0).abs() < 1e-12);
    // lift = confidence / (occurrence(fries) / total) = (10/15) / (10/15)
    assert!((entry.lift - 1.0).abs() < 1e-12);
    assert_eq!(entry.order_count, 10);
}

#[tokio::test]
async fn surviving_entries_respect_thresholds_and_exact_support() {
    let section = SectionId(Uuid::new_v4());
    let items: Vec<MenuItem> = (0..4)
        .map(|index| {
            menu_item(&format!("Item {index}"), section, None, "10.00", "4.00", 10)
        })
        .collect();
    let ids: Vec<MenuItemId> = items.iter().map(|item| item.id).collect();

    let mut orders = Vec::new();
    for _ in 0..6 {
        orders.push(realized(&[ids[0], ids[1], ids[2]]));
    }
    for _ in 0..3 {
        orders.push(realized(&[ids[1], ids[3]]));
    }
    for _ in 0..11 {
        orders.push(realized(&[ids[0]]));
    }

    let total = orders.len() as u64;
    let analyzer = analyzer(orders, items);
    let matrix = analyzer.build_affinity_matrix(false).await.unwrap();

    assert_eq!(matrix.total_orders, total);
    for entries in matrix.associations.values() {
        for entry in entries {
            assert!(entry.support >= 0.01);
            assert!(entry.confidence >= 0.10);
            let exact = entry.order_count as f64 / total as f64;
            assert_eq!(entry.support, exact, "support must be count/total exactly");
        }
    }
}

#[tokio::test]
async fn confidence_is_directional_while_support_and_lift_are_symmetric() {
    let section = SectionId(Uuid::new_v4());
    let wings = menu_item("Wings", section, None, "11.00", "4.00", 15);
    let beer = menu_item("Beer", section, None, "7.00", "2.00", 12);

    let mut orders: Vec<Order> = (0..10).map(|_| realized(&[wings.id, beer.id])).collect();
    orders.extend((0..5).map(|_| realized(&[wings.id])));
    orders.extend((0..2).map(|_| realized(&[beer.id])));

    let analyzer = analyzer(orders, vec![wings.clone(), beer.clone()]);
    let matrix = analyzer.build_affinity_matrix(false).await.unwrap();

    let forward = matrix.associations[&wings.id]
        .iter()
        .find(|entry| entry.item_id == beer.id)
        .unwrap();
    let backward = matrix.associations[&beer.id]
        .iter()
        .find(|entry| entry.item_id == wings.id)
        .unwrap();

    assert_eq!(forward.support, backward.support);
    assert_eq!(forward.order_count, backward.order_count);
    assert!(
        (forward.confidence - backward.confidence).abs() > 1e-9,
        "confidence must differ when occurrence counts differ"
    );
    // lift = count * total / (occurrence(a) * occurrence(b)), which is
    // symmetric even though confidence is not.
    assert!((forward.lift - backward.lift).abs() < 1e-9);
}

#[tokio::test]
async fn threshold_filtering_makes_observed_lift_directional() {
    let section = SectionId(Uuid::new_v4());
    let staple = menu_item("Staple", section, None, "10.00", "3.00", 100);
    let rarity = menu_item("Rarity", section, None, "14.00", "5.00", 5);

    // staple -> rarity confidence is 5/100 and falls below the 0.10 floor;
    // rarity -> staple confidence is 5/5 and survives.
    let mut orders: Vec<Order> = (0..5).map(|_| realized(&[staple.id, rarity.id])).collect();
    orders.extend((0..95).map(|_| realized(&[staple.id])));

    let analyzer = analyzer(orders, vec![staple.clone(), rarity.clone()]);

    let forward = analyzer.calculate_lift(staple.id, rarity.id).await.unwrap();
    let backward = analyzer.calculate_lift(rarity.id, staple.id).await.unwrap();

    assert_eq!(forward, 0.0, "filtered direction reads as no association");
    assert!(backward > 0.0);
}

#[tokio::test]
async fn uncached_rebuilds_are_idempotent() {
    let section = SectionId(Uuid::new_v4());
    let a = menu_item("A", section, None, "10.00", "3.00", 20);
    let b = menu_item("B", section, None, "8.00", "2.00", 14);
    let c = menu_item("C", section, None, "5.00", "1.00", 9);

    let mut orders: Vec<Order> = (0..7).map(|_| realized(&[a.id, b.id])).collect();
    orders.extend((0..4).map(|_| realized(&[a.id, c.id])));
    orders.extend((0..3).map(|_| realized(&[b.id, c.id])));

    let analyzer = analyzer(orders, vec![a, b, c]);
    let first = analyzer.build_affinity_matrix(false).await.unwrap();
    let second = analyzer.build_affinity_matrix(false).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn cached_matrix_is_served_until_bypassed() {
    let section = SectionId(Uuid::new_v4());
    let a = menu_item("A", section, None, "10.00", "3.00", 20);
    let b = menu_item("B", section, None, "8.00", "2.00", 14);

    let orders: Vec<Order> = (0..5).map(|_| realized(&[a.id, b.id])).collect();
    let analyzer = analyzer(orders, vec![a.clone(), b]);

    let built = analyzer.build_affinity_matrix(true).await.unwrap();
    let cached = analyzer.build_affinity_matrix(true).await.unwrap();
    assert_eq!(built, cached);
}

#[tokio::test]
async fn item_missing_from_cached_matrix_triggers_one_uncached_rebuild() {
    // Prime the shared cache with a matrix that predates the new item.
    let cache = Arc::new(InMemoryTtlCache::new());
    let section = SectionId(Uuid::new_v4());
    let old = menu_item("Old", section, None, "10.00", "3.00", 20);
    let other = menu_item("Other", section, None, "8.00", "2.00", 10);
    let newcomer = menu_item("Newcomer", section, None, "9.00", "2.50", 2);

    let stale = CoPurchaseAnalyzer::new(
        Arc::new(InMemoryOrderHistory::new(
            (0..5).map(|_| realized(&[old.id, other.id])).collect(),
        )),
        Arc::new(InMemoryItemCatalog::new(vec![old.clone(), other.clone()])),
        Arc::clone(&cache) as Arc<dyn platewise_core::cache::RecommendationCache>,
    );
    stale.build_affinity_matrix(true).await.unwrap();

    // Fresh history now includes the newcomer, but the cache still holds
    // the stale snapshot.
    let mut orders: Vec<Order> = (0..5).map(|_| realized(&[old.id, other.id])).collect();
    orders.extend((0..4).map(|_| realized(&[newcomer.id, other.id])));

    let current = CoPurchaseAnalyzer::new(
        Arc::new(InMemoryOrderHistory::new(orders)),
        Arc::new(InMemoryItemCatalog::new(vec![old, other.clone(), newcomer.clone()])),
        cache,
    );

    let associations = current.get_item_associations(newcomer.id, 5, true).await.unwrap();
    assert!(!associations.is_empty(), "stale cache should fall back to an uncached rebuild");
    assert_eq!(associations[0].item_id, other.id);
}

#[tokio::test]
async fn associations_drop_inactive_and_unknown_items() {
    let section = SectionId(Uuid::new_v4());
    let source = menu_item("Source", section, None, "10.00", "3.00", 20);
    let mut retired = menu_item("Retired", section, None, "8.00", "2.00", 10);
    retired.active = false;
    let deleted = menu_item("Deleted", section, None, "7.00", "2.00", 8);

    let mut orders: Vec<Order> = (0..6).map(|_| realized(&[source.id, retired.id])).collect();
    orders.extend((0..6).map(|_| realized(&[source.id, deleted.id])));

    // `deleted` exists in history but not in the catalog any more.
    let analyzer = analyzer(orders, vec![source.clone(), retired]);
    let associations = analyzer.get_item_associations(source.id, 5, false).await.unwrap();

    assert!(associations.is_empty(), "inactive and deleted items must be silently excluded");
}

#[tokio::test]
async fn fbt_for_item_without_history_is_empty_not_an_error() {
    let section = SectionId(Uuid::new_v4());
    let loner = menu_item("Loner", section, None, "10.00", "3.00", 1);

    let engine = engine(vec![realized(&[loner.id])], vec![loner.clone()]);
    let associations = engine.get_frequently_bought_together(loner.id, 3).await.unwrap();

    assert!(associations.is_empty());
}

#[tokio::test]
async fn calculate_lift_returns_zero_for_absent_pair() {
    let section = SectionId(Uuid::new_v4());
    let a = menu_item("A", section, None, "10.00", "3.00", 5);
    let b = menu_item("B", section, None, "8.00", "2.00", 5);

    let analyzer = analyzer(vec![realized(&[a.id]), realized(&[b.id])], vec![a.clone(), b.clone()]);
    let lift = analyzer.calculate_lift(a.id, b.id).await.unwrap();

    assert_eq!(lift, 0.0);
}

#[tokio::test]
async fn star_outranks_dog_under_balanced_strategy() {
    let section = SectionId(Uuid::new_v4());
    let star = menu_item("Ribeye", section, Some(MenuCategory::Star), "32.00", "12.00", 200);
    let dog = menu_item("Fruit Cup", section, Some(MenuCategory::Dog), "6.00", "5.00", 4);

    let engine = engine(Vec::new(), vec![star.clone(), dog.clone()]);
    let results = engine
        .get_recommendations(RecommendationRequest::new().with_limit(5))
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].item.id, star.id);
    assert_eq!(results[1].item.id, dog.id);
    assert!(results[0].score > results[1].score);
}

#[tokio::test]
async fn cart_and_exclusion_items_are_never_recommended() {
    let section = SectionId(Uuid::new_v4());
    let items: Vec<MenuItem> = (0..6)
        .map(|index| {
            menu_item(&format!("Item {index}"), section, None, "10.00", "4.00", 10)
        })
        .collect();

    let cart = vec![items[0].id, items[1].id];
    let excluded = vec![items[2].id];

    let engine = engine(Vec::new(), items.clone());
    let results = engine
        .get_recommendations(
            RecommendationRequest::new()
                .with_current_items(cart.clone())
                .with_exclusions(excluded.clone())
                .with_limit(10),
        )
        .await
        .unwrap();

    for result in &results {
        assert!(!cart.contains(&result.item.id));
        assert!(!excluded.contains(&result.item.id));
    }
    assert_eq!(results.len(), 3);
}

#[tokio::test]
async fn section_filter_restricts_candidates() {
    let mains = SectionId(Uuid::new_v4());
    let desserts = SectionId(Uuid::new_v4());
    let steak = menu_item("Steak", mains, None, "28.00", "11.00", 50);
    let cake = menu_item("Cake", desserts, None, "9.00", "2.00", 30);

    let engine = engine(Vec::new(), vec![steak, cake.clone()]);
    let results = engine
        .get_recommendations(RecommendationRequest::new().with_section(desserts).with_limit(5))
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].item.id, cake.id);
}

#[tokio::test]
async fn zero_limit_is_rejected_as_invalid_input() {
    let engine = engine(Vec::new(), Vec::new());
    let result = engine.get_recommendations(RecommendationRequest::new().with_limit(0)).await;

    assert!(matches!(result, Err(RecommendationError::InvalidRequest(_))));
}

#[tokio::test]
async fn copurchase_scores_rescale_into_unit_interval() {
    let section = SectionId(Uuid::new_v4());
    let anchor = menu_item("Anchor", section, None, "10.00", "4.00", 2);
    let rare = menu_item("Rare Pairing", section, None, "12.00", "5.00", 1);
    let filler = menu_item("Filler", section, None, "5.00", "2.00", 18);

    // occurrence(anchor)=2, occurrence(rare)=1, total=20:
    // lift(anchor -> rare) = (1/2) / (1/20) = 10, so lift/5 = 2 and the
    // whole map must be rescaled by its maximum.
    let mut orders = vec![realized(&[anchor.id, rare.id]), realized(&[anchor.id])];
    orders.extend((0..18).map(|_| realized(&[filler.id])));

    let engine = engine(orders, vec![anchor.clone(), rare.clone(), filler]);
    let results = engine
        .get_recommendations(
            RecommendationRequest::new().with_current_items(vec![anchor.id]).with_limit(5),
        )
        .await
        .unwrap();

    let rare_result = results.iter().find(|result| result.item.id == rare.id).unwrap();
    assert_eq!(rare_result.components.copurchase, 1.0);
    for result in &results {
        assert!(result.components.copurchase >= 0.0);
        assert!(result.components.copurchase <= 1.0);
    }
}

#[tokio::test]
async fn cross_sell_puts_other_sections_first_despite_lower_scores() {
    let mains = SectionId(Uuid::new_v4());
    let desserts = SectionId(Uuid::new_v4());

    let burger = menu_item("Burger", mains, Some(MenuCategory::Star), "15.00", "5.00", 100);
    let steak = menu_item("Steak", mains, Some(MenuCategory::Star), "30.00", "10.00", 90);
    let cake = menu_item("Cake", desserts, Some(MenuCategory::Dog), "8.00", "6.00", 5);

    let engine =
        engine(Vec::new(), vec![burger.clone(), steak.clone(), cake.clone()]);
    let results = engine.get_cross_sell_suggestions(vec![burger.id], 2).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(
        results[0].item.id, cake.id,
        "different-section candidate must lead even with a lower raw score"
    );
    assert_eq!(results[1].item.id, steak.id);
    assert!(results[0].score < results[1].score);
}

#[tokio::test]
async fn cross_sell_fills_remaining_slots_with_same_section_items() {
    let mains = SectionId(Uuid::new_v4());
    let burger = menu_item("Burger", mains, Some(MenuCategory::Star), "15.00", "5.00", 100);
    let steak = menu_item("Steak", mains, Some(MenuCategory::Star), "30.00", "10.00", 90);

    let engine = engine(Vec::new(), vec![burger.clone(), steak.clone()]);
    let results = engine.get_cross_sell_suggestions(vec![burger.id], 2).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].item.id, steak.id);
}

#[tokio::test]
async fn upsell_strategy_weighs_margin_heavier_than_balanced() {
    let section = SectionId(Uuid::new_v4());
    // High-margin puzzle versus high-popularity plowhorse.
    let truffle = menu_item("Truffle Pasta", section, Some(MenuCategory::Puzzle), "26.00", "6.00", 10);
    let fries = menu_item("Fries", section, Some(MenuCategory::Plowhorse), "6.00", "4.50", 300);

    let engine = engine(Vec::new(), vec![truffle.clone(), fries]);
    let results = engine.get_upsell_suggestions(Vec::new(), 2).await.unwrap();

    assert_eq!(results[0].item.id, truffle.id, "upsell should lead with the high-margin item");
}

struct FailingOrderHistory;

#[async_trait]
impl OrderHistory for FailingOrderHistory {
    async fn realized_orders(&self) -> Result<Vec<Order>, SourceError> {
        Err(SourceError::OrderHistoryUnavailable("connection refused".to_owned()))
    }
}

#[tokio::test]
async fn order_history_outage_surfaces_as_source_error() {
    let analyzer = CoPurchaseAnalyzer::new(
        Arc::new(FailingOrderHistory),
        Arc::new(InMemoryItemCatalog::new(Vec::new())),
        Arc::new(InMemoryTtlCache::new()),
    );

    let result = analyzer.build_affinity_matrix(false).await;
    assert!(matches!(
        result,
        Err(RecommendationError::Source(SourceError::OrderHistoryUnavailable(_)))
    ));
}
