//! Live search / 实时搜索
//!
//! - `session`: debounced, generation-tagged, paginated search state machine
//! - `highlight`: splits a verse into matched / unmatched spans
//!
//! Matching itself is a literal substring test done by the store, there is
//! no ranking, tokenizing or fuzzy matching here.

pub mod highlight;
pub mod session;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::config::SearchConfig;
use crate::error::StoreError;
use crate::models::Verse;

pub use highlight::{highlight_spans, Highlighter, Span};
pub use session::SearchSession;

/// Search tuning / 搜索参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    /// Rows per page / 每页条数
    pub page_size: usize,
    /// Queries shorter than this (in chars, after trimming) never hit the store / 最小查询长度
    pub min_query_len: usize,
    /// Quiet interval before typed text becomes the effective query / 防抖间隔
    pub debounce: Duration,
    /// Guard after a page load against layout-driven duplicate triggers / 加载更多冷却
    pub load_more_cooldown: Duration,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for SearchSettings {
    fn from(config: &SearchConfig) -> Self {
        Self {
            page_size: config.page_size.max(1),
            min_query_len: config.min_query_len,
            debounce: config.debounce(),
            load_more_cooldown: config.load_more_cooldown(),
        }
    }
}

impl SearchSettings {
    /// Whether a trimmed query is long enough to search / 查询是否足够长
    pub fn accepts(&self, query: &str) -> bool {
        query.chars().count() >= self.min_query_len
    }
}

/// Observable session state / 会话阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    /// Effective query below the minimum length
    Idle,
    /// Typed text not yet applied
    Debouncing,
    /// First page in flight
    Loading,
    /// Page loaded, more may exist
    Ready,
    /// Next page in flight, loaded results still shown
    LoadingMore,
    /// No further pages
    Exhausted,
}

/// Point-in-time copy of a session / 会话快照
#[derive(Debug, Clone)]
pub struct SearchSnapshot {
    /// Effective (debounced, trimmed) query / 当前生效的查询
    pub query: String,
    pub generation: u64,
    pub results: Vec<Verse>,
    pub has_more: bool,
    pub loading_initial: bool,
    pub loading_more: bool,
    pub error: Option<Arc<StoreError>>,
    pub phase: SearchPhase,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_length_counts_chars() {
        let settings = SearchSettings::default();
        assert!(!settings.accepts(""));
        assert!(!settings.accepts("a"));
        assert!(settings.accepts("ab"));
        assert!(settings.accepts("αβ"));
        assert!(!settings.accepts("é"));
    }

    #[test]
    fn test_settings_from_config() {
        let config = SearchConfig {
            page_size: 0,
            min_query_len: 3,
            debounce_ms: 50,
            load_more_cooldown_ms: 10,
        };
        let settings = SearchSettings::from(&config);
        assert_eq!(settings.page_size, 1);
        assert_eq!(settings.min_query_len, 3);
        assert_eq!(settings.debounce, Duration::from_millis(50));
        assert_eq!(settings.load_more_cooldown, Duration::from_millis(10));
    }
}
