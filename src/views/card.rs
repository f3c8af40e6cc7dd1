use std::fmt::Write;

use bigdecimal::BigDecimal;

use crate::services::dashboard::CardState;
use crate::services::parse::to_f64;
use crate::services::snapshot::{AccountSnapshot, Position, RecentTradePnl, Side};
use crate::views::escape;

pub const EMPTY_POSITIONS: &str = "No active positions.";

/// Colour class for a signed figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Negative,
    Neutral,
}

impl Tone {
    pub fn of(value: &BigDecimal) -> Self {
        let zero = BigDecimal::from(0);
        if *value > zero {
            Tone::Positive
        } else if *value < zero {
            Tone::Negative
        } else {
            Tone::Neutral
        }
    }

    /// Gains and flat PnL both read green in tables.
    fn of_pnl(value: &BigDecimal) -> Self {
        if *value >= BigDecimal::from(0) { Tone::Positive } else { Tone::Negative }
    }

    pub fn class(self) -> &'static str {
        match self {
            Tone::Positive => "pos",
            Tone::Negative => "neg",
            Tone::Neutral => "flat",
        }
    }
}

/// Renders one card for `state`. Pure: same input, same markup.
pub fn render_card(address: &str, state: &CardState) -> String {
    match state {
        CardState::Loading => format!(
            r#"<div class="card loading">Loading data for {}...</div>"#,
            escape(address)
        ),
        CardState::Failed { error } => format!(
            r#"<div class="card error"><h2>{}</h2><p class="neg">{}</p></div>"#,
            escape(address),
            escape(error)
        ),
        CardState::Ready { snapshot } => render_snapshot(snapshot),
    }
}

fn render_snapshot(snapshot: &AccountSnapshot) -> String {
    let mut html = String::new();
    html.push_str(r#"<div class="card">"#);
    let _ = write!(html, "<h2>{}</h2>", escape(&snapshot.address));

    let _ = write!(
        html,
        r#"<section class="balances"><p>Tradeable balance: <span>${:.2}</span></p><p>Total balance: <span class="{}">${:.2}</span></p></section>"#,
        to_f64(&snapshot.available_balance),
        Tone::of(&snapshot.total_unrealized_pnl).class(),
        to_f64(&snapshot.total_balance)
    );

    html.push_str("<section><h3>Open Positions</h3>");
    if snapshot.positions.is_empty() {
        let _ = write!(html, r#"<p class="muted">{}</p>"#, EMPTY_POSITIONS);
    } else {
        html.push_str(
            r#"<table><thead><tr><th>Token</th><th class="num">Size</th><th class="num">Entry Price</th><th class="num">PnL</th></tr></thead><tbody>"#,
        );
        for position in &snapshot.positions {
            render_position_row(&mut html, position);
        }
        html.push_str("</tbody></table>");
    }
    html.push_str("</section>");

    if let Some(recent) = &snapshot.recent_trade {
        render_recent_trade(&mut html, recent);
    }

    html.push_str("</div>");
    html
}

fn render_position_row(html: &mut String, position: &Position) {
    let (side_label, side_class) = match position.side {
        Some(Side::Long) => ("LONG", "pos"),
        Some(Side::Short) => ("SHORT", "neg"),
        None => ("—", "muted"),
    };
    let _ = write!(
        html,
        r#"<tr><td>{} <span class="{}">{}</span></td><td class="num">{:.4}</td><td class="num">${:.2}</td><td class="num {}">${:.3} ({:.2}%)</td></tr>"#,
        escape(&position.symbol),
        side_class,
        side_label,
        to_f64(&position.size),
        to_f64(&position.entry_price),
        Tone::of_pnl(&position.unrealized_pnl).class(),
        to_f64(&position.unrealized_pnl),
        position.pnl_percent()
    );
}

fn render_recent_trade(html: &mut String, recent: &RecentTradePnl) {
    html.push_str(r#"<section class="recent"><h3>Recent Trade Summary</h3>"#);
    let _ = write!(
        html,
        "<p>Market: <span>{}</span> ({})</p><p>Entry Price: <span>${:.2}</span></p><p>Close Price: <span>${:.2}</span></p>",
        escape(&recent.symbol),
        recent.close_side,
        to_f64(&recent.entry_price),
        to_f64(&recent.close_price)
    );
    if let Some(closed_at) = recent.closed_at {
        let _ = write!(
            html,
            "<p>Closed: <span>{}</span></p>",
            closed_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    let _ = write!(
        html,
        r#"<p class="{}"><strong>PnL: ${:.3}</strong></p></section>"#,
        Tone::of_pnl(&recent.pnl).class(),
        to_f64(&recent.pnl)
    );
}
