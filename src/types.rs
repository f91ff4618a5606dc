use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Side of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// One parsed line of the order log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub symbol: String,
    pub side: Side,
    pub price: Decimal,
    pub volume: i64,
    pub timestamp: String, // HH:MM:SS, matched verbatim
}

impl Order {
    pub fn is_buy(&self) -> bool {
        self.side == Side::Buy
    }

    pub fn is_sell(&self) -> bool {
        self.side == Side::Sell
    }
}

/// Row of the biggest-buys query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdVolume {
    pub id: i64,
    pub volume: i64,
}

/// Result of the best-sell query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceVolume {
    pub price: Decimal,
    pub volume: i64,
}

impl From<&Order> for IdVolume {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            volume: order.volume,
        }
    }
}

impl From<&Order> for PriceVolume {
    fn from(order: &Order) -> Self {
        Self {
            price: order.price,
            volume: order.volume,
        }
    }
}
