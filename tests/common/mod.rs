//! Shared test helpers.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lighter_stats::datasource::DataSource;
use lighter_stats::error::{AppError, AppResult};
use lighter_stats::{router, AppState};

pub const ALICE: &str = "0x1111111111111111111111111111111111111111";
pub const BOB: &str = "0x2222222222222222222222222222222222222222";

/// In-memory upstream. Missing entries answer with a non-success status.
#[derive(Default)]
pub struct FakeSource {
    pub searches: HashMap<String, Value>,
    pub markets: Option<Value>,
    pub balances: HashMap<String, Value>,
    pub search_calls: AtomicUsize,
}

impl FakeSource {
    pub fn with_search(mut self, address: &str, body: Value) -> Self {
        self.searches.insert(address.to_string(), body);
        self
    }

    pub fn with_balance(mut self, address: &str, body: Value) -> Self {
        self.balances.insert(address.to_string(), body);
        self
    }

    pub fn with_markets(mut self, body: Value) -> Self {
        self.markets = Some(body);
        self
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataSource for FakeSource {
    async fn search_account(&self, address: &str) -> AppResult<Value> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.searches
            .get(address)
            .cloned()
            .ok_or(AppError::ApiStatus(404))
    }

    async fn get_markets(&self) -> AppResult<Value> {
        self.markets.clone().ok_or(AppError::ApiStatus(503))
    }

    async fn get_account_balance(&self, address: &str) -> AppResult<Value> {
        self.balances
            .get(address)
            .cloned()
            .ok_or(AppError::ApiStatus(500))
    }
}

/// Explorer search body holding one account record.
pub fn account_search(positions: Value, logs: Value) -> Value {
    json!([
        {"type": "tx", "hash": "0xfeed"},
        {
            "type": "account",
            "account_positions": {"positions": positions},
            "account_logs": logs
        }
    ])
}

pub fn executed_trade(price: &str, size: &str, market_index: u32, is_taker_ask: bool, time: &str) -> Value {
    json!({
        "status": "executed",
        "time": time,
        "pubdata": {
            "trade_pubdata_with_funding": {
                "price": price,
                "size": size,
                "market_index": market_index,
                "is_taker_ask": is_taker_ask
            }
        }
    })
}

pub async fn setup(source: FakeSource) -> (axum::Router, AppState, Arc<FakeSource>) {
    let source = Arc::new(source);
    let state = AppState::bootstrap(source.clone()).await;
    (router(state.clone()), state, source)
}
