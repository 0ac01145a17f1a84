use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MenuItemId(pub Uuid);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SectionId(pub Uuid);

/// Menu engineering quadrant assigned by the classifier. Items that have not
/// been analyzed yet carry no category (`Option::None`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuCategory {
    Star,
    Puzzle,
    Plowhorse,
    Dog,
}

impl MenuCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Star => "star",
            Self::Puzzle => "puzzle",
            Self::Plowhorse => "plowhorse",
            Self::Dog => "dog",
        }
    }

    /// Lenient parse: unknown labels are treated the same as "unset".
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "star" => Some(Self::Star),
            "puzzle" => Some(Self::Puzzle),
            "plowhorse" => Some(Self::Plowhorse),
            "dog" => Some(Self::Dog),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub title: String,
    pub price: Decimal,
    pub cost: Decimal,
    pub section_id: SectionId,
    pub category: Option<MenuCategory>,
    pub total_purchases: u64,
    pub active: bool,
}

impl MenuItem {
    /// Contribution margin per unit sold. A loss-making item yields a
    /// negative margin; callers decide how to treat it.
    pub fn margin(&self) -> Decimal {
        self.price - self.cost
    }

    pub fn margin_percentage(&self) -> Decimal {
        if self.price.is_zero() {
            return Decimal::ZERO;
        }
        (self.price - self.cost) / self.price * Decimal::from(100)
    }
}
