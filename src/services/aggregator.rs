use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use futures_util::future::join;
use serde_json::Value;
use std::sync::Arc;

use crate::datasource::DataSource;
use crate::error::{AppError, AppResult};
use crate::services::parse::{
    field_or_zero, first_field, parse_market_id, parse_or_zero, parse_timestamp,
};
use crate::services::snapshot::{
    AccountSnapshot, Position, RecentTradePnl, Side, TradeLogEntry,
};
use crate::services::symbols::{fallback_symbol, MarketSymbolMap};

/// Builds one [`AccountSnapshot`] per address from the explorer search and
/// the exchange balance lookup.
pub struct AccountAggregator {
    datasource: Arc<dyn DataSource>,
}

impl AccountAggregator {
    pub fn new(datasource: Arc<dyn DataSource>) -> Self {
        Self { datasource }
    }

    /// Fetches both upstreams concurrently and assembles a fresh snapshot.
    ///
    /// Search failures abort with the card's error text. Balance failures are
    /// absorbed and the balances default to zero.
    pub async fn aggregate(
        &self,
        address: &str,
        symbols: &MarketSymbolMap,
    ) -> AppResult<AccountSnapshot> {
        tracing::info!("Aggregating account data for {}", address);

        let (search, balance) = join(
            self.datasource.search_account(address),
            self.datasource.get_account_balance(address),
        )
        .await;

        let balance = match balance {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::warn!("Balance lookup failed for {}: {}", address, e);
                None
            }
        };

        let snapshot = build_snapshot(address, &search?, balance.as_ref(), symbols, Utc::now())?;
        tracing::info!(
            "Built snapshot for {}: {} positions, recent trade {}",
            address,
            snapshot.positions.len(),
            if snapshot.recent_trade.is_some() { "present" } else { "absent" }
        );
        Ok(snapshot)
    }
}

/// Pure assembly of a snapshot from already-fetched bodies.
pub fn build_snapshot(
    address: &str,
    search: &Value,
    balance: Option<&Value>,
    symbols: &MarketSymbolMap,
    fetched_at: DateTime<Utc>,
) -> AppResult<AccountSnapshot> {
    let account = find_account_record(search)?;

    let positions = extract_positions(account, symbols);
    let total_unrealized_pnl = positions
        .iter()
        .fold(BigDecimal::from(0), |acc, p| &acc + &p.unrealized_pnl);

    let trades = recent_executed_trades(account);
    let recent_trade = compute_recent_trade(&trades, symbols);

    let (available_balance, total_balance) = balance.map(extract_balances).unwrap_or_default();

    Ok(AccountSnapshot {
        address: address.to_string(),
        positions,
        recent_trade,
        available_balance,
        total_balance,
        total_unrealized_pnl,
        fetched_at,
    })
}

fn find_account_record(search: &Value) -> AppResult<&Value> {
    let records = search
        .as_array()
        .filter(|records| !records.is_empty())
        .ok_or(AppError::NoData)?;

    records
        .iter()
        .find(|r| r.get("type").and_then(Value::as_str) == Some("account"))
        .ok_or(AppError::NoAccount)
}

/// `account_positions.positions` is keyed by market; only the values matter.
fn extract_positions(account: &Value, symbols: &MarketSymbolMap) -> Vec<Position> {
    let raw: Vec<&Value> = match account.pointer("/account_positions/positions") {
        Some(Value::Object(map)) => map.values().collect(),
        Some(Value::Array(items)) => items.iter().collect(),
        _ => Vec::new(),
    };

    raw.into_iter()
        .filter(|p| p.is_object())
        .map(|p| parse_position(p, symbols))
        .collect()
}

fn parse_position(raw: &Value, symbols: &MarketSymbolMap) -> Position {
    let market_id = parse_market_id(first_field(raw, &["market_index", "market_id"]));
    let embedded = raw
        .get("symbol")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let symbol = match market_id {
        Some(id) => symbols
            .get(id)
            .or_else(|| fallback_symbol(id))
            .or(embedded)
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{}", id)),
        None => embedded.unwrap_or("—").to_string(),
    };

    Position {
        market_id,
        symbol,
        side: parse_side(raw),
        size: field_or_zero(raw, &["size", "position"]).abs(),
        entry_price: field_or_zero(raw, &["entry_price", "avg_entry_price"]),
        unrealized_pnl: field_or_zero(raw, &["pnl", "unrealized_pnl"]),
    }
}

/// Explicit `side` text wins; otherwise the sign of the numeric `sign` field.
fn parse_side(raw: &Value) -> Option<Side> {
    if let Some(side) = raw.get("side").and_then(Value::as_str) {
        match side.trim().to_ascii_lowercase().as_str() {
            "long" => return Some(Side::Long),
            "short" => return Some(Side::Short),
            _ => {}
        }
    }

    let sign = parse_or_zero(raw.get("sign"));
    let zero = BigDecimal::from(0);
    if sign > zero {
        Some(Side::Long)
    } else if sign < zero {
        Some(Side::Short)
    } else {
        None
    }
}

/// Last two executed funding trades from the log, most recent first.
fn recent_executed_trades(account: &Value) -> Vec<TradeLogEntry> {
    let logs = account
        .get("account_logs")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let executed: Vec<TradeLogEntry> = logs
        .iter()
        .filter(|log| log.get("status").and_then(Value::as_str) == Some("executed"))
        .filter_map(|log| {
            let trade = log.pointer("/pubdata/trade_pubdata_with_funding")?;
            if trade.is_null() {
                return None;
            }
            Some(TradeLogEntry {
                market_id: parse_market_id(trade.get("market_index")),
                price: parse_or_zero(trade.get("price")),
                size: parse_or_zero(trade.get("size")),
                is_taker_ask: trade.get("is_taker_ask").is_some_and(is_truthy),
                time: parse_timestamp(log.get("time")),
            })
        })
        .collect();

    executed.into_iter().rev().take(2).collect()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => matches!(s.trim(), "true" | "1"),
        _ => false,
    }
}

/// Realized PnL from the two most recent trades (most recent first). The
/// most recent trade closes the earlier one; its side picks the sign.
pub fn compute_recent_trade(
    trades: &[TradeLogEntry],
    symbols: &MarketSymbolMap,
) -> Option<RecentTradePnl> {
    let [close, earlier] = trades else {
        return None;
    };

    let close_side = close.side();
    let close_size = close.size.abs();
    let pnl = match close_side {
        Side::Long => (&close.price - &earlier.price) * &close_size,
        Side::Short => (&earlier.price - &close.price) * &close_size,
    };

    let symbol = close
        .market_id
        .or(earlier.market_id)
        .map(|id| symbols.display(id))
        .unwrap_or_else(|| "—".to_string());

    Some(RecentTradePnl {
        symbol,
        entry_price: earlier.price.clone(),
        close_price: close.price.clone(),
        close_side,
        close_size,
        pnl,
        closed_at: close.time,
    })
}

/// `(available, total)` from a balance body exposing `account` or `accounts[0]`.
fn extract_balances(body: &Value) -> (BigDecimal, BigDecimal) {
    let account = body
        .get("account")
        .filter(|a| a.is_object())
        .or_else(|| {
            body.get("accounts")
                .and_then(Value::as_array)
                .and_then(|accounts| accounts.first())
        });

    let Some(account) = account else {
        return Default::default();
    };

    let available = parse_or_zero(account.get("available_balance"));
    let total = first_field(account, &["total_asset_value", "cross_asset_value"])
        .map(|v| parse_or_zero(Some(v)))
        .unwrap_or_else(|| available.clone());

    (available, total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn trade(price: &str, size: &str, is_taker_ask: bool, market: u32) -> TradeLogEntry {
        TradeLogEntry {
            market_id: Some(market),
            price: dec(price),
            size: dec(size),
            is_taker_ask,
            time: None,
        }
    }

    fn trade_log(price: f64, size: f64, is_taker_ask: bool, market: u32) -> Value {
        json!({
            "status": "executed",
            "time": "2025-10-10T12:00:00Z",
            "pubdata": {
                "trade_pubdata_with_funding": {
                    "price": price.to_string(),
                    "size": size.to_string(),
                    "market_index": market,
                    "is_taker_ask": is_taker_ask
                }
            }
        })
    }

    fn search_with(account: Value) -> Value {
        let mut account = account;
        account["type"] = json!("account");
        json!([{"type": "tx", "hash": "0xdead"}, account])
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_760_097_600, 0).unwrap()
    }

    #[test]
    fn empty_search_is_no_data() {
        let symbols = MarketSymbolMap::fallback();
        let err = build_snapshot("0x1", &json!([]), None, &symbols, now()).unwrap_err();
        assert!(matches!(err, AppError::NoData));
        let err = build_snapshot("0x1", &json!({"type": "account"}), None, &symbols, now())
            .unwrap_err();
        assert!(matches!(err, AppError::NoData));
    }

    #[test]
    fn missing_account_record_is_no_account() {
        let symbols = MarketSymbolMap::fallback();
        let search = json!([{"type": "tx"}, {"type": "block"}]);
        let err = build_snapshot("0x1", &search, None, &symbols, now()).unwrap_err();
        assert!(matches!(err, AppError::NoAccount));
    }

    #[test]
    fn zero_positions_gives_empty_list() {
        let symbols = MarketSymbolMap::fallback();
        let search = search_with(json!({"account_positions": {"positions": {}}}));
        let snapshot = build_snapshot("0x1", &search, None, &symbols, now()).unwrap();
        assert!(snapshot.positions.is_empty());
        assert_eq!(snapshot.total_unrealized_pnl, BigDecimal::from(0));
        assert!(snapshot.recent_trade.is_none());
    }

    #[test]
    fn positions_resolve_symbols_and_normalize_size() {
        let symbols: MarketSymbolMap = [(42, "HYPE".to_string())].into_iter().collect();
        let search = search_with(json!({
            "account_positions": {"positions": {
                "42": {"market_index": 42, "side": "long", "size": "1.5", "entry_price": "30", "pnl": "4.5"},
                "1": {"market_id": 1, "sign": -1, "position": "-0.2", "avg_entry_price": 60000, "unrealized_pnl": "-12"},
                "500": {"market_index": 500, "size": "3", "entry_price": "bad", "pnl": null}
            }}
        }));
        let snapshot = build_snapshot("0x1", &search, None, &symbols, now()).unwrap();

        let by_symbol = |s: &str| snapshot.positions.iter().find(|p| p.symbol == s).unwrap();
        let hype = by_symbol("HYPE");
        assert_eq!(hype.side, Some(Side::Long));
        assert_eq!(hype.size, dec("1.5"));

        let btc = by_symbol("BTC");
        assert_eq!(btc.side, Some(Side::Short));
        assert_eq!(btc.size, dec("0.2"));
        assert_eq!(btc.entry_price, dec("60000"));

        let unknown = by_symbol("#500");
        assert_eq!(unknown.side, None);
        assert_eq!(unknown.entry_price, BigDecimal::from(0));
        assert_eq!(unknown.unrealized_pnl, BigDecimal::from(0));

        assert_eq!(snapshot.total_unrealized_pnl, dec("-7.5"));
    }

    #[test]
    fn aggregate_pnl_sums_exactly() {
        let symbols = MarketSymbolMap::fallback();
        let search = search_with(json!({
            "account_positions": {"positions": {
                "0": {"market_index": 0, "size": "1", "entry_price": "10", "pnl": "0.1"},
                "1": {"market_index": 1, "size": "1", "entry_price": "10", "pnl": "0.2"}
            }}
        }));
        let snapshot = build_snapshot("0x1", &search, None, &symbols, now()).unwrap();
        assert_eq!(snapshot.total_unrealized_pnl.to_string(), "0.3");

        let body = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(body["total_unrealized_pnl"], json!("0.3"));
    }

    #[test]
    fn recent_trade_pnl_uses_close_side() {
        let symbols = MarketSymbolMap::fallback();
        let trades = vec![trade("100", "5", false, 0), trade("90", "-5", true, 0)];
        let recent = compute_recent_trade(&trades, &symbols).unwrap();
        assert_eq!(recent.pnl, dec("50"));
        assert_eq!(recent.close_side, Side::Long);
        assert_eq!(recent.close_price, dec("100"));
        assert_eq!(recent.entry_price, dec("90"));
        assert_eq!(recent.symbol, "ETH");
    }

    #[test]
    fn short_close_flips_sign() {
        let symbols = MarketSymbolMap::fallback();
        let trades = vec![trade("110", "-2", true, 1), trade("100", "2", false, 1)];
        let recent = compute_recent_trade(&trades, &symbols).unwrap();
        assert_eq!(recent.pnl, dec("-20"));
        assert_eq!(recent.close_size, dec("2"));
    }

    #[test]
    fn same_side_trades_follow_most_recent_leg() {
        let symbols = MarketSymbolMap::fallback();

        // Two buys: the later one at 105 closes against the earlier one at 100.
        let longs = vec![trade("105", "3", false, 0), trade("100", "3", false, 0)];
        let recent = compute_recent_trade(&longs, &symbols).unwrap();
        assert_eq!(recent.close_side, Side::Long);
        assert_eq!(recent.close_price, dec("105"));
        assert_eq!(recent.entry_price, dec("100"));
        assert_eq!(recent.pnl, dec("15"));

        let shorts = vec![trade("105", "-3", true, 0), trade("100", "-3", true, 0)];
        let recent = compute_recent_trade(&shorts, &symbols).unwrap();
        assert_eq!(recent.close_side, Side::Short);
        assert_eq!(recent.pnl, dec("-15"));
    }

    #[test]
    fn log_filter_keeps_last_two_executed_funding_trades() {
        let symbols = MarketSymbolMap::fallback();
        let search = search_with(json!({
            "account_logs": [
                trade_log(1.0, 1.0, false, 0),
                trade_log(90.0, 5.0, true, 2),
                {"status": "pending", "pubdata": {"trade_pubdata_with_funding": {"price": "7"}}},
                {"status": "executed", "pubdata": {"deposit": {}}},
                trade_log(100.0, 5.0, false, 2)
            ]
        }));
        let snapshot = build_snapshot("0x1", &search, None, &symbols, now()).unwrap();
        let recent = snapshot.recent_trade.unwrap();
        assert_eq!(recent.symbol, "SOL");
        assert_eq!(recent.close_price, dec("100"));
        assert_eq!(recent.entry_price, dec("90"));
        assert_eq!(recent.pnl, dec("50"));
        assert_eq!(recent.closed_at, Some(now()));
    }

    #[test]
    fn single_trade_leaves_recent_absent() {
        let symbols = MarketSymbolMap::fallback();
        let search = search_with(json!({"account_logs": [trade_log(100.0, 1.0, false, 0)]}));
        let snapshot = build_snapshot("0x1", &search, None, &symbols, now()).unwrap();
        assert!(snapshot.recent_trade.is_none());
    }

    #[test]
    fn total_balance_prefers_total_asset_value() {
        let body = json!({"account": {"available_balance": "10", "total_asset_value": "25", "cross_asset_value": "20"}});
        assert_eq!(extract_balances(&body), (dec("10"), dec("25")));

        let body = json!({"accounts": [{"available_balance": "10", "cross_asset_value": "20"}]});
        assert_eq!(extract_balances(&body), (dec("10"), dec("20")));

        let body = json!({"accounts": [{"available_balance": "10"}]});
        assert_eq!(extract_balances(&body), (dec("10"), dec("10")));

        let zeros = (BigDecimal::from(0), BigDecimal::from(0));
        assert_eq!(extract_balances(&json!({"accounts": []})), zeros);
        assert_eq!(extract_balances(&json!({"code": 21100})), zeros);
    }

    #[test]
    fn missing_balance_defaults_to_zero() {
        let symbols = MarketSymbolMap::fallback();
        let search = search_with(json!({}));
        let snapshot = build_snapshot("0x1", &search, None, &symbols, now()).unwrap();
        assert_eq!(snapshot.available_balance, BigDecimal::from(0));
        assert_eq!(snapshot.total_balance, BigDecimal::from(0));
    }
}
