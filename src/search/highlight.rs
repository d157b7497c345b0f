//! Match highlighting / 匹配高亮

use regex::{Regex, RegexBuilder};
use serde::Serialize;

/// Contiguous slice of a verse / 文本片段
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub text: String,
    pub matched: bool,
}

impl Span {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            matched: false,
        }
    }

    fn hit(text: &str) -> Self {
        Self {
            text: text.to_string(),
            matched: true,
        }
    }
}

/// Compiled literal matcher for one query, reusable across verses / 高亮器
#[derive(Debug, Clone)]
pub struct Highlighter {
    pattern: Option<Regex>,
}

impl Highlighter {
    pub fn new(query: &str) -> Self {
        if query.is_empty() {
            return Self { pattern: None };
        }
        let pattern = RegexBuilder::new(&regex::escape(query))
            .case_insensitive(true)
            .build()
            .map_err(|e| tracing::warn!("Highlight pattern rejected: {}", e))
            .ok();
        Self { pattern }
    }

    /// Spans covering `text` end to end, all non-overlapping hits left to right
    pub fn spans(&self, text: &str) -> Vec<Span> {
        let Some(pattern) = &self.pattern else {
            return vec![Span::plain(text)];
        };

        let mut spans = Vec::new();
        let mut last = 0;
        for m in pattern.find_iter(text) {
            if m.start() > last {
                spans.push(Span::plain(&text[last..m.start()]));
            }
            spans.push(Span::hit(m.as_str()));
            last = m.end();
        }
        if last < text.len() || spans.is_empty() {
            spans.push(Span::plain(&text[last..]));
        }
        spans
    }
}

/// One-shot helper / 直接生成高亮片段
pub fn highlight_spans(text: &str, query: &str) -> Vec<Span> {
    Highlighter::new(query).spans(text)
}
