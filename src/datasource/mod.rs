pub mod lighter;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AppResult;

/// Trait for read-only sources of Lighter account data
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Explorer search for an address; a JSON array of typed records
    async fn search_account(&self, address: &str) -> AppResult<Value>;

    /// Exchange market listing; a JSON object with a `markets` array
    async fn get_markets(&self) -> AppResult<Value>;

    /// Exchange account lookup by L1 address (balances)
    async fn get_account_balance(&self, address: &str) -> AppResult<Value>;
}
