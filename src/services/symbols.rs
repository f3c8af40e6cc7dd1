use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::datasource::DataSource;
use crate::error::AppResult;
use crate::services::parse::parse_market_id;

/// Process-wide fallback used when the live market listing is unavailable.
pub const FALLBACK_SYMBOLS: [(u32, &str); 23] = [
    (0, "ETH"),
    (1, "BTC"),
    (2, "SOL"),
    (3, "DOGE"),
    (4, "1000PEPE"),
    (5, "WIF"),
    (6, "WLD"),
    (7, "XRP"),
    (8, "LINK"),
    (9, "AVAX"),
    (10, "NEAR"),
    (11, "DOT"),
    (12, "TON"),
    (13, "TAO"),
    (14, "POL"),
    (15, "TRUMP"),
    (16, "SUI"),
    (17, "1000SHIB"),
    (18, "1000BONK"),
    (19, "1000FLOKI"),
    (20, "BERA"),
    (21, "FARTCOIN"),
    (22, "AI16Z"),
];

/// Static fallback lookup for a single market.
pub fn fallback_symbol(market_id: u32) -> Option<&'static str> {
    FALLBACK_SYMBOLS
        .iter()
        .find(|(id, _)| *id == market_id)
        .map(|(_, symbol)| *symbol)
}

/// Market id to ticker mapping. Built once, then shared read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MarketSymbolMap(BTreeMap<u32, String>);

impl MarketSymbolMap {
    pub fn fallback() -> Self {
        Self(
            FALLBACK_SYMBOLS
                .iter()
                .map(|(id, symbol)| (*id, symbol.to_string()))
                .collect(),
        )
    }

    pub fn get(&self, market_id: u32) -> Option<&str> {
        self.0.get(&market_id).map(String::as_str)
    }

    /// Ticker for `market_id`: live map, then static table, then `#<id>`.
    pub fn display(&self, market_id: u32) -> String {
        self.get(market_id)
            .or_else(|| fallback_symbol(market_id))
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{}", market_id))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Builds a map from a `/api/v1/markets` body. `None` when the body has
    /// no usable `markets` array.
    pub fn from_listing(listing: &Value) -> Option<Self> {
        let markets = listing.get("markets")?.as_array()?;

        let map: BTreeMap<u32, String> = markets
            .iter()
            .filter_map(|m| {
                let id = parse_market_id(m.get("market_id"))?;
                let symbol = m.get("symbol")?.as_str()?.trim();
                (!symbol.is_empty()).then(|| (id, symbol.to_string()))
            })
            .collect();

        (!map.is_empty()).then_some(Self(map))
    }
}

impl FromIterator<(u32, String)> for MarketSymbolMap {
    fn from_iter<I: IntoIterator<Item = (u32, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

pub struct SymbolResolver {
    datasource: Arc<dyn DataSource>,
}

impl SymbolResolver {
    pub fn new(datasource: Arc<dyn DataSource>) -> Self {
        Self { datasource }
    }

    /// Fetches the live market listing. Never fails outwardly: any error
    /// yields the static fallback table.
    pub async fn resolve(&self) -> MarketSymbolMap {
        match self.fetch_live().await {
            Ok(Some(map)) => {
                tracing::info!("Resolved {} market symbols", map.len());
                map
            }
            Ok(None) => {
                tracing::warn!("Market listing had no usable entries, using fallback symbols");
                MarketSymbolMap::fallback()
            }
            Err(e) => {
                tracing::warn!("Market listing unavailable ({}), using fallback symbols", e);
                MarketSymbolMap::fallback()
            }
        }
    }

    async fn fetch_live(&self) -> AppResult<Option<MarketSymbolMap>> {
        let listing = self.datasource.get_markets().await?;
        Ok(MarketSymbolMap::from_listing(&listing))
    }
}
