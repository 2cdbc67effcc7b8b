//! Visible text, title and publication date from raw HTML.
//!
//! Parsing goes through `scraper` (html5ever), so entities are decoded and
//! broken markup is repaired the way a browser would.

use chrono::{DateTime, NaiveDate, Utc};
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

/// Elements whose text is never visible.
const HIDDEN: &[&str] = &["script", "style", "noscript", "template"];

/// Elements that start a new line of text.
const BLOCKS: &[&str] = &[
    "p", "div", "br", "li", "tr", "td", "th", "h1", "h2", "h3", "h4", "h5", "h6", "section",
    "article", "header", "footer", "blockquote", "pre", "ul", "ol", "table",
];

/// Publication meta tags, checked in this order.
const PUBLISHED_META: &str = "meta[property='article:published_time'], \
     meta[name='article:published_time'], \
     meta[itemprop='datePublished'], \
     meta[name='pubdate'], \
     meta[name='publish-date'], \
     meta[name='date']";

/// Readable content of an HTML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub title: Option<String>,
    pub text: String,
}

/// Strip markup down to the visible body text.
pub fn page_text(html: &str) -> PageText {
    let document = Html::parse_document(html);

    PageText {
        title: extract_title(&document),
        text: collapse(&visible_text(&document)),
    }
}

fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| collapse(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
}

fn visible_text(document: &Html) -> String {
    let root = Selector::parse("body")
        .ok()
        .and_then(|s| document.select(&s).next())
        .unwrap_or_else(|| document.root_element());

    let mut out = String::new();
    for node in root.descendants() {
        if let Some(element) = node.value().as_element() {
            if BLOCKS.contains(&element.name()) {
                out.push(' ');
            }
            continue;
        }
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| HIDDEN.contains(&e.name()))
        });
        if !hidden {
            out.push_str(text);
        }
    }
    out
}

/// Publication date advertised by the document, if any.
///
/// Looks at publication meta tags, JSON-LD `datePublished` and `<time
/// datetime>` in that order.
pub fn published_date(html: &str) -> Option<DateTime<Utc>> {
    let document = Html::parse_document(html);

    meta_date(&document)
        .or_else(|| json_ld_date(&document))
        .or_else(|| time_date(&document))
}

fn meta_date(document: &Html) -> Option<DateTime<Utc>> {
    let selector = Selector::parse(PUBLISHED_META).ok()?;
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("content"))
        .find_map(parse_date)
}

fn json_ld_date(document: &Html) -> Option<DateTime<Utc>> {
    let selector = Selector::parse("script[type='application/ld+json']").ok()?;
    document
        .select(&selector)
        .filter_map(|el| serde_json::from_str::<Value>(&inner_text(el)).ok())
        .find_map(|value| find_date_published(&value))
}

/// `datePublished` anywhere in a JSON-LD value (`@graph` arrays included).
fn find_date_published(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Object(map) => map
            .get("datePublished")
            .and_then(Value::as_str)
            .and_then(parse_date)
            .or_else(|| map.values().find_map(find_date_published)),
        Value::Array(items) => items.iter().find_map(find_date_published),
        _ => None,
    }
}

fn time_date(document: &Html) -> Option<DateTime<Utc>> {
    let selector = Selector::parse("time[datetime]").ok()?;
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("datetime"))
        .find_map(parse_date)
}

fn inner_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

/// RFC 3339 timestamps or bare `YYYY-MM-DD` dates (taken as midnight UTC).
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    let date_part = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
