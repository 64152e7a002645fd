//! The incident form page

use axum::response::Html;

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// GET / - Single-page form that talks to /api/resolve
pub async fn index() -> Html<&'static str> {
  Html(INDEX_HTML)
}
