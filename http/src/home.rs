use crate::{
    error::AppError,
    router::AppState,
};
use axum::{
    extract::State,
    response::Html,
};
use eyre::{
    Context as _,
    Result,
};
use std::path::Path;

pub const TITLE: &str = "HomePage";
pub const LAYOUT_TEMPLATE: &str = "layout.html";
pub const INDEX_TEMPLATE: &str = "index.html";

/// `GET /`
///
/// Templates are read on every request, so edits show up without a restart.
pub async fn handler(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let page = render_home(&state.template_dir, TITLE, &state.address)
        .await
        .map_err(AppError::Template)?;
    Ok(Html(page))
}

/// Renders `index.html` into the `{{ content }}` slot of `layout.html`.
pub async fn render_home(template_dir: &Path, title: &str, address: &str) -> Result<String> {
    let layout = read_template(template_dir, LAYOUT_TEMPLATE).await?;
    let index = read_template(template_dir, INDEX_TEMPLATE).await?;

    let title = escape_html(title);
    let address = escape_html(address);
    let content = render(&index, &[("title", &title), ("address", &address)]);

    Ok(render(
        &layout,
        &[("title", &title), ("address", &address), ("content", &content)],
    ))
}

async fn read_template(template_dir: &Path, name: &str) -> Result<String> {
    let path = template_dir.join(name);
    tokio::fs::read_to_string(&path)
        .await
        .wrap_err_with(|| format!("Failed to read template {}", path.display()))
}

/// Substitutes `{{ name }}` placeholders. Values are inserted verbatim, unknown names render as nothing.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start + 2..].find("}}") else {
            break;
        };
        out.push_str(&rest[..start]);

        let name = rest[start + 2..start + 2 + len].trim();
        match vars.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => out.push_str(value),
            None => debug!(name, "Unknown template placeholder"),
        }
        rest = &rest[start + 2 + len + 2..];
    }

    out.push_str(rest);
    out
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
