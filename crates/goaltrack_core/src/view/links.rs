//! Splits activity titles into plain text and hyperlinks.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Label shown in place of a raw URL.
pub const LINK_LABEL: &str = "view";

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").expect("valid url regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TitleSegment {
    Text { text: String },
    Link { url: String, label: String },
}

/// Splits `title` on `http(s)://` URLs, keeping order.
///
/// Empty text runs between adjacent links are dropped.
pub fn split_title_links(title: &str) -> Vec<TitleSegment> {
    let mut segments = Vec::new();
    let mut cursor = 0;
    for found in URL_RE.find_iter(title) {
        if found.start() > cursor {
            segments.push(TitleSegment::Text {
                text: title[cursor..found.start()].to_string(),
            });
        }
        segments.push(TitleSegment::Link {
            url: found.as_str().to_string(),
            label: LINK_LABEL.to_string(),
        });
        cursor = found.end();
    }
    if cursor < title.len() {
        segments.push(TitleSegment::Text {
            text: title[cursor..].to_string(),
        });
    }
    segments
}
