use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::services::parse::to_f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// Taker on the ask side sold into the book.
    pub fn from_taker_ask(is_taker_ask: bool) -> Self {
        if is_taker_ask { Side::Short } else { Side::Long }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "LONG"),
            Side::Short => write!(f, "SHORT"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub market_id: Option<u32>,
    pub symbol: String,
    pub side: Option<Side>,
    /// Always non-negative; direction lives in `side`.
    pub size: BigDecimal,
    pub entry_price: BigDecimal,
    pub unrealized_pnl: BigDecimal,
}

impl Position {
    /// `pnl / (entry * size) * 100`, or 0 when the notional is not positive.
    pub fn pnl_percent(&self) -> f64 {
        let notional = to_f64(&(&self.entry_price * &self.size));
        if notional > 0.0 {
            to_f64(&self.unrealized_pnl) / notional * 100.0
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeLogEntry {
    pub market_id: Option<u32>,
    pub price: BigDecimal,
    /// Signed as reported upstream.
    pub size: BigDecimal,
    pub is_taker_ask: bool,
    pub time: Option<DateTime<Utc>>,
}

impl TradeLogEntry {
    pub fn side(&self) -> Side {
        Side::from_taker_ask(self.is_taker_ask)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentTradePnl {
    pub symbol: String,
    pub entry_price: BigDecimal,
    pub close_price: BigDecimal,
    pub close_side: Side,
    pub close_size: BigDecimal,
    pub pnl: BigDecimal,
    pub closed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub address: String,
    pub positions: Vec<Position>,
    pub recent_trade: Option<RecentTradePnl>,
    pub available_balance: BigDecimal,
    pub total_balance: BigDecimal,
    pub total_unrealized_pnl: BigDecimal,
    pub fetched_at: DateTime<Utc>,
}
