//! Dinners page rendering
//!
//! Turns the loaded `{ dinners }` value into a self-contained HTML document.
//! No shape is assumed: lists become list items, anything else is shown as
//! formatted JSON.

use serde_json::Value;
use std::fmt::Write;

use crate::loader::PageData;

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Dinners</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
            line-height: 1.6;
            max-width: 640px;
            margin: 40px auto;
            padding: 0 20px;
            color: #1f2937;
        }
        h1 {
            font-size: 2em;
            margin-bottom: 20px;
        }
        ul.dinners {
            list-style: none;
            padding: 0;
        }
        ul.dinners li {
            padding: 12px 16px;
            margin: 8px 0;
            border-radius: 8px;
            background: #f3f4f6;
        }
        .date {
            float: right;
            color: #6b7280;
        }
        pre {
            background: #f3f4f6;
            padding: 16px;
            border-radius: 8px;
            overflow-x: auto;
        }
        .empty {
            color: #6b7280;
        }
    </style>
</head>
<body>
    <h1>Dinners</h1>
"#;

const PAGE_TAIL: &str = "</body>\n</html>\n";

/// Render the dinners page
pub fn render_dinners_page(data: &PageData) -> String {
    let mut html = String::from(PAGE_HEAD);

    match &data.dinners {
        Value::Array(items) if items.is_empty() => {
            html.push_str("    <p class=\"empty\">No dinners planned yet.</p>\n");
        }
        Value::Array(items) => {
            html.push_str("    <ul class=\"dinners\">\n");
            for item in items {
                let _ = writeln!(html, "        <li>{}</li>", render_item(item));
            }
            html.push_str("    </ul>\n");
        }
        other => {
            let pretty = serde_json::to_string_pretty(other).unwrap_or_default();
            let _ = writeln!(html, "    <pre>{}</pre>", escape_html(&pretty));
        }
    }

    html.push_str(PAGE_TAIL);
    html
}

fn render_item(item: &Value) -> String {
    let name = item.get("name").and_then(Value::as_str);
    let date = item.get("date").and_then(Value::as_str);

    match (name, date) {
        (Some(name), Some(date)) => format!(
            "<span class=\"name\">{}</span> <span class=\"date\">{}</span>",
            escape_html(name),
            escape_html(date)
        ),
        (Some(name), None) => format!("<span class=\"name\">{}</span>", escape_html(name)),
        _ => format!("<code>{}</code>", escape_html(&item.to_string())),
    }
}

/// Escape text for HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(dinners: Value) -> String {
        render_dinners_page(&PageData { dinners })
    }

    #[test]
    fn test_renders_name_and_date() {
        let html = page(json!([{"name": "Tacos", "date": "2024-01-01"}]));
        assert!(html.contains("<span class=\"name\">Tacos</span>"));
        assert!(html.contains("<span class=\"date\">2024-01-01</span>"));
        assert!(html.ends_with("</html>\n"));
    }

    #[test]
    fn test_empty_list() {
        let html = page(json!([]));
        assert!(html.contains("No dinners planned yet."));
        assert!(!html.contains("<ul"));
    }

    #[test]
    fn test_non_object_items_shown_as_json() {
        let html = page(json!([42, {"title": "x"}]));
        assert!(html.contains("<code>42</code>"));
        assert!(html.contains("<code>{&quot;title&quot;:&quot;x&quot;}</code>"));
    }

    #[test]
    fn test_object_shown_as_pre() {
        let html = page(json!({}));
        assert!(html.contains("<pre>{}</pre>"));
    }

    #[test]
    fn test_escaping() {
        let html = page(json!([{"name": "<script>alert('x')</script>", "date": "a & b"}]));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(html.contains("a &amp; b"));
    }
}
