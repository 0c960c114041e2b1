//! Minimal HTML pages behind the session.

use axum::extract::State;
use axum::response::{Html, Redirect};

use crate::api::error::ApiResult;
use crate::api::session::HOME_PATH;
use crate::api::state::AppState;
use crate::core::event::{EventView, list_events};
use crate::core::status::today;

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// GET /
pub async fn root() -> Redirect {
    Redirect::to(HOME_PATH)
}

/// GET /events
pub async fn events(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let today = today();
    let mut rows = String::new();
    for event in list_events(&state.db).await? {
        let view = EventView::new(event, today);
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            view.event.date.format("%d/%m/%Y"),
            escape(&view.event.title),
            view.effective_status.label(),
        ));
    }

    Ok(Html(format!(
        r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Events</title></head>
<body>
<h1>Events</h1>
<table>
<tr><th>Date</th><th>Title</th><th>Status</th></tr>
{rows}</table>
<form method="post" action="/logout"><button type="submit">Sign out</button></form>
</body>
</html>"#
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<b>"A&B"</b>"#), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
    }
}
