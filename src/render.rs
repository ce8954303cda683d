//! Text, JSON and HTML views of a result set.

use crate::error::Result;
use crate::image::{VariationCount, VariationSize};
use crate::result::{FailureKind, ResultSet, VariationResult};
use std::fmt::Write;

/// Renders a plain-text report: a heading per emote, then its variations or
/// a warning line.
pub fn render_text(results: &ResultSet) -> String {
    let mut out = String::new();
    for entry in results {
        let _ = writeln!(out, "From: {}", entry.name);
        match &entry.result {
            VariationResult::Success { images } => {
                for (i, image) in images.iter().enumerate() {
                    let _ = writeln!(out, "  {}. {}", i + 1, image);
                }
            }
            VariationResult::Failure { kind, message } => {
                let _ = writeln!(out, "  ! {}: {}", failure_label(*kind), message);
            }
        }
    }
    let _ = write!(
        out,
        "\n{} of {} emotes succeeded, {} variations generated",
        results.succeeded(),
        results.len(),
        results.image_count()
    );
    out
}

/// Renders the result set as pretty-printed JSON.
pub fn render_json(
    results: &ResultSet,
    count: VariationCount,
    size: VariationSize,
) -> Result<String> {
    let doc = serde_json::json!({
        "count": count,
        "size": size,
        "succeeded": results.succeeded(),
        "failed": results.failed(),
        "results": results,
    });
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Renders a standalone HTML page with one grid row per source emote.
pub fn render_html(results: &ResultSet, count: VariationCount, size: VariationSize) -> String {
    let cell = size.pixels().min(256);
    let mut out = String::new();
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Emote variations</title>\n<style>\n\
         body {{ font-family: sans-serif; margin: 2rem; }}\n\
         .grid {{ display: grid; grid-template-columns: repeat({count}, {cell}px); gap: 0.5rem; }}\n\
         .grid img {{ width: {cell}px; height: {cell}px; object-fit: contain; }}\n\
         .failure {{ color: #a33; }}\n\
         </style>\n</head>\n<body>\n<h1>Emote variations ({size})</h1>\n",
    );

    for entry in results {
        let _ = writeln!(out, "<section>\n<h2>From: {}</h2>", escape_html(&entry.name));
        match &entry.result {
            VariationResult::Success { images } => {
                out.push_str("<div class=\"grid\">\n");
                for (i, image) in images.iter().enumerate() {
                    let _ = writeln!(
                        out,
                        "<img src=\"{}\" alt=\"{} variation {}\">",
                        escape_html(image.as_str()),
                        escape_html(&entry.name),
                        i + 1
                    );
                }
                out.push_str("</div>\n");
            }
            VariationResult::Failure { kind, message } => {
                let _ = writeln!(
                    out,
                    "<p class=\"failure\">{}: {}</p>",
                    failure_label(*kind),
                    escape_html(message)
                );
            }
        }
        out.push_str("</section>\n");
    }

    out.push_str("</body>\n</html>\n");
    out
}

fn failure_label(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::BillingLimitReached => "Billing limit reached",
        FailureKind::InvalidRequest => "Request rejected",
        FailureKind::Unexpected => "Unexpected error",
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
