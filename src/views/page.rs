use crate::services::dashboard::DashboardView;
use crate::views::{escape, render_card};

/// Seconds between browser polls while any card is still loading.
const POLL_SECS: u32 = 2;

const STYLE: &str = r#"
body { background: #020617; color: #e2e8f0; font-family: system-ui, sans-serif; margin: 0; padding: 24px; }
h1 { text-align: center; }
form { max-width: 640px; margin: 0 auto 24px; }
textarea { width: 100%; box-sizing: border-box; padding: 12px; border-radius: 8px; background: #1e293b; color: #e2e8f0; border: 1px solid #334155; }
button { margin-top: 12px; width: 100%; padding: 8px; border: 0; border-radius: 8px; background: #059669; color: white; font-weight: 600; cursor: pointer; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(420px, 1fr)); gap: 24px; max-width: 1100px; margin: 0 auto; }
.card { background: #0f172a; border-radius: 16px; padding: 24px; }
.card h2 { color: #34d399; word-break: break-all; font-size: 1.05rem; }
.card.loading, .card.error { text-align: center; font-size: 0.9rem; }
table { width: 100%; border-collapse: collapse; font-size: 0.9rem; }
th { background: #1e293b; text-align: left; padding: 8px; }
td { border-top: 1px solid #1e293b; padding: 8px; }
.num { text-align: right; }
.pos { color: #4ade80; }
.neg { color: #f87171; }
.flat, .muted { color: #94a3b8; }
.recent { background: #1e293b; border-radius: 8px; padding: 12px; margin-top: 24px; }
"#;

/// Full dashboard page: input form plus one card per active address.
pub fn render_page(view: &DashboardView) -> String {
    let mut html = String::from("<!DOCTYPE html><html><head><meta charset=\"utf-8\">");
    html.push_str("<title>Lighter Stats</title>");
    if !view.is_settled() {
        html.push_str(&format!(
            r#"<meta http-equiv="refresh" content="{}">"#,
            POLL_SECS
        ));
    }
    html.push_str("<style>");
    html.push_str(STYLE);
    html.push_str("</style></head><body><h1>Lighter Stats</h1>");

    let session_field = view
        .session
        .map(|id| format!(r#"<input type="hidden" name="session" value="{}">"#, id))
        .unwrap_or_default();

    html.push_str(&format!(
        r#"<form method="post" action="/show">{}<textarea name="addresses" rows="4" placeholder="Enter one or more addresses (0x...) each on a new line">{}</textarea><button type="submit">Show</button></form>"#,
        session_field,
        escape(&view.input)
    ));
    if !view.cards.is_empty() {
        html.push_str(&format!(
            r#"<form method="post" action="/refresh">{}<button type="submit">Refresh</button></form>"#,
            session_field
        ));
    }

    html.push_str(r#"<div class="grid">"#);
    for card in &view.cards {
        html.push_str(&render_card(card.address.as_str(), &card.state));
    }
    html.push_str("</div></body></html>");
    html
}
