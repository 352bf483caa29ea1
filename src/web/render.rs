//! HTML for public pages and the admin view.

use crate::db::PostSummary;
use crate::model::Document;
use crate::reconcile::Reconciliation;
use std::collections::HashMap;

/// Display title for a post name: extension dropped, hyphens become spaces,
/// each word capitalised. `index` is shown as `Home`.
pub fn post_title(post_name: &str) -> String {
    let stem = strip_extension(post_name);
    if stem.eq_ignore_ascii_case("index") {
        return "Home".to_string();
    }
    stem.replace('-', " ")
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Drop the final `.ext`; leading dots (dotfiles) are not an extension.
fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(i) if !name[..i].trim_start_matches('.').is_empty() => &name[..i],
        _ => name,
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn html_attr(s: &str) -> String {
    html_escape(s).replace('"', "&quot;")
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{}</title>
  </head>
  <body>
    {}
  </body>
</html>"#,
        html_escape(title),
        body
    )
}

/// A published post. `content` is trusted HTML from the store.
pub fn render_post(folder_name: &str, post_name: &str, content: &str) -> String {
    let title = format!("{} - {}", folder_name, post_title(post_name));
    layout(&title, &format!("<main>\n{}\n</main>", content))
}

pub fn render_not_found(folder_name: &str) -> String {
    layout(
        &format!("{} - Not Found", folder_name),
        "<main><h1>404</h1><p>This page does not exist.</p></main>",
    )
}

fn action_form(name: &str, actions: &[(&str, &str)]) -> String {
    let mut buttons = String::new();
    for (value, label) in actions {
        buttons.push_str(&format!(
            r#"<button type="submit" name="action" value="{}">{}</button>"#,
            value, label
        ));
    }
    format!(
        r#"<form method="post" action="/admin"><input type="hidden" name="name" value="{}">{}</form>"#,
        html_attr(name),
        buttons
    )
}

fn modified(doc: &Document) -> String {
    doc.modified_time
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

/// The admin dashboard: one table per reconciliation bucket.
pub fn render_admin(folder_name: &str, state: &Reconciliation, posts: &[PostSummary]) -> String {
    let synced: HashMap<&str, String> = posts
        .iter()
        .map(|p| {
            (
                p.post_name.as_str(),
                p.updated_at.format("%Y-%m-%d %H:%M").to_string(),
            )
        })
        .collect();

    let mut body = format!("<h1>{} - Admin</h1>\n", html_escape(folder_name));

    body.push_str("<h2>Published</h2>\n<table>\n<tr><th>Name</th><th>Modified</th><th>Synced</th><th></th></tr>\n");
    for doc in &state.active {
        body.push_str(&format!(
            "<tr><td><a href=\"/{}\">{}</a></td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            html_attr(&doc.name),
            html_escape(&doc.name),
            modified(doc),
            synced.get(doc.name.as_str()).map(String::as_str).unwrap_or(""),
            action_form(&doc.name, &[("refresh", "Refresh"), ("deactivate", "Unpublish")]),
        ));
    }
    body.push_str("</table>\n");

    body.push_str("<h2>Available</h2>\n<table>\n<tr><th>Name</th><th>Modified</th><th></th></tr>\n");
    for doc in &state.available {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            html_escape(&doc.name),
            modified(doc),
            action_form(&doc.name, &[("activate", "Publish")]),
        ));
    }
    body.push_str("</table>\n");

    body.push_str("<h2>Orphaned</h2>\n<table>\n<tr><th>Name</th><th>Synced</th><th></th></tr>\n");
    for name in &state.orphaned {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            html_escape(name),
            synced.get(name.as_str()).map(String::as_str).unwrap_or(""),
            action_form(name, &[("delete", "Delete")]),
        ));
    }
    body.push_str("</table>\n");
    if !state.orphaned.is_empty() {
        body.push_str(
            r#"<form method="post" action="/admin"><button type="submit" name="action" value="delete_all_orphaned">Delete all orphaned</button></form>
"#,
        );
    }

    body.push_str(
        r#"<h2>Sync by name</h2>
<form method="post" action="/admin/update">
<textarea name="csv_post_names" placeholder="comma-separated names"></textarea>
<button type="submit">Sync</button>
</form>
"#,
    );

    layout(&format!("{} - Admin", folder_name), &body)
}
