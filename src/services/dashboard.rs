use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::aggregator::AccountAggregator;
use crate::services::controller::{Address, AddressList};
use crate::services::snapshot::AccountSnapshot;
use crate::services::symbols::MarketSymbolMap;

/// Identifies one browser's dashboard. Carried in the page URL.
pub type SessionId = Uuid;

/// What one card currently shows.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CardState {
    Loading,
    Failed { error: String },
    Ready { snapshot: AccountSnapshot },
}

impl CardState {
    pub fn is_loading(&self) -> bool {
        matches!(self, CardState::Loading)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Card {
    pub address: Address,
    /// Refresh counter value this card was (re)started under.
    pub generation: u64,
    pub state: CardState,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub session: Option<SessionId>,
    pub input: String,
    pub refresh: u64,
    pub cards: Vec<Card>,
}

impl DashboardView {
    pub fn empty() -> Self {
        Self {
            session: None,
            input: String::new(),
            refresh: 0,
            cards: Vec::new(),
        }
    }

    pub fn is_settled(&self) -> bool {
        !self.cards.iter().any(|c| c.state.is_loading())
    }
}

#[derive(Default)]
struct SessionState {
    list: AddressList,
    cards: Vec<Card>,
}

impl SessionState {
    /// Restarts every card under the list's current refresh counter.
    fn restart(&mut self) -> (u64, Vec<Address>) {
        let generation = self.list.refresh();
        let addresses = self.list.addresses().to_vec();
        self.cards = addresses
            .iter()
            .map(|address| Card {
                address: address.clone(),
                generation,
                state: CardState::Loading,
            })
            .collect();
        (generation, addresses)
    }
}

/// Card registry, one address list per session. Each card is fetched by its
/// own task; a task only commits if its session still exists and its
/// generation still matches the card's, so late responses from an older
/// submit never overwrite newer state.
pub struct Dashboard {
    aggregator: Arc<AccountAggregator>,
    symbols: Arc<MarketSymbolMap>,
    sessions: RwLock<HashMap<SessionId, SessionState>>,
}

impl Dashboard {
    pub fn new(aggregator: Arc<AccountAggregator>, symbols: Arc<MarketSymbolMap>) -> Self {
        Self {
            aggregator,
            symbols,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn symbols(&self) -> &MarketSymbolMap {
        &self.symbols
    }

    pub fn new_session() -> SessionId {
        Uuid::new_v4()
    }

    /// Replaces the session's address list from raw text and re-fetches
    /// every card. Unknown sessions start empty.
    pub async fn submit(self: &Arc<Self>, session: SessionId, raw: &str) -> Vec<JoinHandle<()>> {
        let (generation, addresses) = {
            let mut sessions = self.sessions.write().await;
            let state = sessions.entry(session).or_default();
            state.list.submit(raw);
            state.restart()
        };
        tracing::info!(
            "Session {} submitted {} addresses (refresh {})",
            session,
            addresses.len(),
            generation
        );
        self.spawn_fetches(session, generation, addresses)
    }

    /// Re-fetches every card for the session's current list. No-op for an
    /// unknown session.
    pub async fn refresh(self: &Arc<Self>, session: SessionId) -> Vec<JoinHandle<()>> {
        let (generation, addresses) = {
            let mut sessions = self.sessions.write().await;
            let Some(state) = sessions.get_mut(&session) else {
                return Vec::new();
            };
            state.list.resubmit();
            state.restart()
        };
        tracing::info!(
            "Session {} refreshing {} cards (refresh {})",
            session,
            addresses.len(),
            generation
        );
        self.spawn_fetches(session, generation, addresses)
    }

    pub async fn view(&self, session: Option<SessionId>) -> DashboardView {
        let sessions = self.sessions.read().await;
        match session.and_then(|id| sessions.get(&id).map(|state| (id, state))) {
            Some((id, state)) => DashboardView {
                session: Some(id),
                input: state.list.input().to_string(),
                refresh: state.list.refresh(),
                cards: state.cards.clone(),
            },
            None => DashboardView::empty(),
        }
    }

    fn spawn_fetches(
        self: &Arc<Self>,
        session: SessionId,
        generation: u64,
        addresses: Vec<Address>,
    ) -> Vec<JoinHandle<()>> {
        addresses
            .into_iter()
            .enumerate()
            .map(|(slot, address)| {
                let dashboard = Arc::clone(self);
                tokio::spawn(async move {
                    let result = dashboard
                        .aggregator
                        .aggregate(address.as_str(), &dashboard.symbols)
                        .await;
                    dashboard.commit(session, slot, generation, result).await;
                })
            })
            .collect()
    }

    /// Writes a fetch result into its card. Returns `false` when the result
    /// is stale and was dropped.
    pub(crate) async fn commit(
        &self,
        session: SessionId,
        slot: usize,
        generation: u64,
        result: AppResult<AccountSnapshot>,
    ) -> bool {
        let mut sessions = self.sessions.write().await;
        let Some(card) = sessions
            .get_mut(&session)
            .and_then(|state| state.cards.get_mut(slot))
            .filter(|c| c.generation == generation)
        else {
            tracing::debug!(
                "Dropping stale result for session {} slot {} (generation {})",
                session,
                slot,
                generation
            );
            return false;
        };

        card.state = match result {
            Ok(snapshot) => CardState::Ready { snapshot },
            Err(e) => {
                tracing::warn!("Card for {} failed: {}", card.address, e);
                CardState::Failed {
                    error: e.to_string(),
                }
            }
        };
        true
    }
}
