use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
    Form,
};
use serde::Deserialize;

use crate::services::dashboard::{Dashboard, SessionId};
use crate::views::render_page;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub session: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ShowForm {
    #[serde(default)]
    pub addresses: String,
    pub session: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshForm {
    pub session: Option<String>,
}

/// Malformed or absent ids are treated as no session.
fn parse_session(raw: Option<&str>) -> Option<SessionId> {
    raw.and_then(|s| SessionId::parse_str(s.trim()).ok())
}

fn session_location(session: SessionId) -> String {
    format!("/?session={}", session)
}

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Html<String> {
    let view = state
        .dashboard
        .view(parse_session(query.session.as_deref()))
        .await;
    Html(render_page(&view))
}

pub async fn show(State(state): State<AppState>, Form(form): Form<ShowForm>) -> Redirect {
    let session = parse_session(form.session.as_deref()).unwrap_or_else(Dashboard::new_session);
    state.dashboard.submit(session, &form.addresses).await;
    Redirect::to(&session_location(session))
}

pub async fn refresh(State(state): State<AppState>, Form(form): Form<RefreshForm>) -> Redirect {
    match parse_session(form.session.as_deref()) {
        Some(session) => {
            state.dashboard.refresh(session).await;
            Redirect::to(&session_location(session))
        }
        None => Redirect::to("/"),
    }
}
