//! Deterministic demo dataset for local development and end-to-end tests.
//!
//! Item and order ids are fixed so repeated seeds are idempotent and CLI
//! walkthroughs can reference stable identifiers.

use chrono::{Duration, Utc};
use serde::Serialize;
use sqlx::Executor;
use uuid::Uuid;

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

#[derive(Clone, Copy, Debug, Serialize)]
pub struct SeedSummary {
    pub sections: usize,
    pub items: usize,
    pub orders: usize,
}

struct SectionSeed {
    key: u128,
    name: &'static str,
}

struct ItemSeed {
    key: u128,
    section: u128,
    title: &'static str,
    category: Option<&'static str>,
    price: &'static str,
    cost: &'static str,
    total_purchases: i64,
    active: bool,
}

/// One co-purchase pattern repeated `count` times at the given order status.
struct OrderPattern {
    count: u32,
    status: &'static str,
    items: &'static [u128],
}

const SECTIONS: &[SectionSeed] = &[
    SectionSeed { key: 0x101, name: "Mains" },
    SectionSeed { key: 0x102, name: "Sides" },
    SectionSeed { key: 0x103, name: "Drinks" },
    SectionSeed { key: 0x104, name: "Desserts" },
];

const BURGER: u128 = 0x1001;
const SALMON: u128 = 0x1002;
const CHICKEN: u128 = 0x1003;
const VEGGIE_WRAP: u128 = 0x1004;
const FRIES: u128 = 0x1005;
const ONION_RINGS: u128 = 0x1006;
const SIDE_SALAD: u128 = 0x1007;
const LEMONADE: u128 = 0x1008;
const ICED_TEA: u128 = 0x1009;
const LAVA_CAKE: u128 = 0x100a;
const FRUIT_CUP: u128 = 0x100b;
const RETIRED_SPECIAL: u128 = 0x100c;

const ITEMS: &[ItemSeed] = &[
    ItemSeed {
        key: BURGER,
        section: 0x101,
        title: "Classic Burger",
        category: Some("star"),
        price: "15.00",
        cost: "5.00",
        total_purchases: 220,
        active: true,
    },
    ItemSeed {
        key: SALMON,
        section: 0x101,
        title: "Grilled Salmon",
        category: Some("puzzle"),
        price: "26.00",
        cost: "9.00",
        total_purchases: 60,
        active: true,
    },
    ItemSeed {
        key: CHICKEN,
        section: 0x101,
        title: "Fried Chicken",
        category: Some("plowhorse"),
        price: "13.00",
        cost: "8.50",
        total_purchases: 180,
        active: true,
    },
    ItemSeed {
        key: VEGGIE_WRAP,
        section: 0x101,
        title: "Garden Veggie Wrap",
        category: Some("dog"),
        price: "9.00",
        cost: "7.00",
        total_purchases: 25,
        active: true,
    },
    ItemSeed {
        key: FRIES,
        section: 0x102,
        title: "Crispy Fries",
        category: Some("plowhorse"),
        price: "6.00",
        cost: "1.50",
        total_purchases: 260,
        active: true,
    },
    ItemSeed {
        key: ONION_RINGS,
        section: 0x102,
        title: "Onion Rings",
        category: Some("puzzle"),
        price: "7.00",
        cost: "2.00",
        total_purchases: 70,
        active: true,
    },
    ItemSeed {
        key: SIDE_SALAD,
        section: 0x102,
        title: "Side Salad",
        category: Some("dog"),
        price: "5.00",
        cost: "4.00",
        total_purchases: 30,
        active: true,
    },
    ItemSeed {
        key: LEMONADE,
        section: 0x103,
        title: "Craft Lemonade",
        category: Some("puzzle"),
        price: "6.00",
        cost: "1.00",
        total_purchases: 90,
        active: true,
    },
    ItemSeed {
        key: ICED_TEA,
        section: 0x103,
        title: "Iced Tea",
        category: Some("plowhorse"),
        price: "4.00",
        cost: "1.00",
        total_purchases: 150,
        active: true,
    },
    ItemSeed {
        key: LAVA_CAKE,
        section: 0x104,
        title: "Chocolate Lava Cake",
        category: Some("star"),
        price: "9.00",
        cost: "2.00",
        total_purchases: 110,
        active: true,
    },
    ItemSeed {
        key: FRUIT_CUP,
        section: 0x104,
        title: "Seasonal Fruit Cup",
        category: Some("dog"),
        price: "6.00",
        cost: "5.00",
        total_purchases: 15,
        active: true,
    },
    ItemSeed {
        key: RETIRED_SPECIAL,
        section: 0x101,
        title: "Retired Special",
        category: None,
        price: "18.00",
        cost: "6.00",
        total_purchases: 40,
        active: false,
    },
];

const ORDER_PATTERNS: &[OrderPattern] = &[
    OrderPattern { count: 30, status: "completed", items: &[BURGER, FRIES] },
    OrderPattern { count: 12, status: "completed", items: &[BURGER, FRIES, LEMONADE] },
    OrderPattern { count: 10, status: "completed", items: &[SALMON, LEMONADE] },
    OrderPattern { count: 9, status: "ready", items: &[CHICKEN, FRIES] },
    OrderPattern { count: 8, status: "completed", items: &[CHICKEN, ICED_TEA] },
    OrderPattern { count: 7, status: "completed", items: &[LAVA_CAKE, ICED_TEA] },
    OrderPattern { count: 6, status: "completed", items: &[SALMON, SIDE_SALAD] },
    OrderPattern { count: 10, status: "completed", items: &[BURGER] },
    OrderPattern { count: 5, status: "completed", items: &[FRIES] },
    // Unrealized orders; these must never influence affinity output.
    OrderPattern { count: 4, status: "pending", items: &[BURGER, FRIES] },
    OrderPattern { count: 3, status: "cancelled", items: &[SALMON, LEMONADE] },
];

pub fn seed_item_id(key: u128) -> Uuid {
    Uuid::from_u128(key)
}

/// Load the demo dataset, replacing any previous seed rows.
pub async fn seed_demo_data(pool: &DbPool) -> Result<SeedSummary, RepositoryError> {
    let mut tx = pool.begin().await?;

    tx.execute(sqlx::query("DELETE FROM order_items")).await?;
    tx.execute(sqlx::query("DELETE FROM orders")).await?;
    tx.execute(sqlx::query("DELETE FROM menu_items")).await?;
    tx.execute(sqlx::query("DELETE FROM menu_sections")).await?;

    let now = Utc::now();

    for (position, section) in SECTIONS.iter().enumerate() {
        sqlx::query("INSERT INTO menu_sections (id, name, display_order) VALUES (?, ?, ?)")
            .bind(Uuid::from_u128(section.key).to_string())
            .bind(section.name)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
    }

    for item in ITEMS {
        sqlx::query(
            "INSERT INTO menu_items (
                id, section_id, title, price, cost, category,
                total_purchases, is_active, created_at, updated_at
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(Uuid::from_u128(item.key).to_string())
        .bind(Uuid::from_u128(item.section).to_string())
        .bind(item.title)
        .bind(item.price)
        .bind(item.cost)
        .bind(item.category)
        .bind(item.total_purchases)
        .bind(i64::from(item.active))
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&mut *tx)
        .await?;
    }

    let mut order_sequence: u128 = 0x9000;
    let mut order_count: usize = 0;

    for pattern in ORDER_PATTERNS {
        for repeat in 0..pattern.count {
            order_sequence += 1;
            order_count += 1;
            let order_id = Uuid::from_u128(order_sequence).to_string();
            let created_at = now - Duration::minutes(i64::from(repeat) + order_sequence as i64);

            sqlx::query("INSERT INTO orders (id, status, created_at) VALUES (?, ?, ?)")
                .bind(&order_id)
                .bind(pattern.status)
                .bind(created_at.to_rfc3339())
                .execute(&mut *tx)
                .await?;

            for item_key in pattern.items {
                let price = ITEMS
                    .iter()
                    .find(|item| item.key == *item_key)
                    .map(|item| item.price)
                    .unwrap_or("0.00");

                sqlx::query(
                    "INSERT INTO order_items (order_id, menu_item_id, quantity, price_at_order)
                     VALUES (?, ?, ?, ?)",
                )
                .bind(&order_id)
                .bind(Uuid::from_u128(*item_key).to_string())
                .bind(1_i64)
                .bind(price)
                .execute(&mut *tx)
                .await?;
            }
        }
    }

    tx.commit().await?;

    Ok(SeedSummary { sections: SECTIONS.len(), items: ITEMS.len(), orders: order_count })
}
