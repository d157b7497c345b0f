//! Reader facade / 阅读器门面
//!
//! Bundles the query layer, the chapter sequencer and the search settings
//! behind one handle for a presentation layer.

use std::sync::Arc;

use serde::Serialize;

use crate::catalog;
use crate::config::AppConfig;
use crate::corpus::{CorpusReader, SqliteCorpus};
use crate::error::Result;
use crate::models::{BookEntry, NavPosition, Verse};
use crate::navigation::{ChapterSequencer, PrevNext};
use crate::search::{Highlighter, SearchSession, SearchSettings, Span};
use crate::store::Store;

/// One search hit with display data / 搜索结果条目
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub key: String,
    pub book_name: Option<&'static str>,
    pub position: NavPosition,
    pub verse: Verse,
    pub spans: Vec<Span>,
}

/// One stateless page of search results / 单页搜索结果
#[derive(Debug, Clone, Serialize)]
pub struct SearchPage {
    pub query: String,
    pub page: i64,
    pub page_size: usize,
    pub hits: Vec<SearchHit>,
    pub has_more: bool,
}

pub struct Library {
    reader: Arc<dyn CorpusReader>,
    sequencer: ChapterSequencer,
    settings: SearchSettings,
}

impl Library {
    pub fn new(reader: Arc<dyn CorpusReader>, settings: SearchSettings) -> Self {
        Self {
            sequencer: ChapterSequencer::new(reader.clone()),
            reader,
            settings,
        }
    }

    /// Build over an opened store / 基于已打开的数据库创建
    pub fn from_store(store: Store, config: &AppConfig) -> Self {
        let reader = Arc::new(SqliteCorpus::new(store, config.corpus.fallback_book_count));
        Self::new(reader, SearchSettings::from(&config.search))
    }

    pub fn settings(&self) -> SearchSettings {
        self.settings
    }

    /// 某章全部经文
    pub async fn list_verses(&self, book: i64, chapter: i64) -> Result<Vec<Verse>> {
        self.reader.verses_of(book, chapter).await
    }

    /// Chapter numbers `1..=max`, empty for a book without records / 章节列表
    pub async fn chapters_of(&self, book: i64) -> Result<Vec<i64>> {
        let max = self.sequencer.max_chapter(book).await?;
        Ok((1..=max).collect())
    }

    /// 书卷列表
    pub async fn books(&self) -> Result<Vec<BookEntry>> {
        let count = self.sequencer.total_books().await?;
        Ok(catalog::book_entries(count))
    }

    /// New live search session over this library's reader / 创建搜索会话
    pub fn search_session(&self) -> SearchSession {
        SearchSession::new(self.reader.clone(), self.settings)
    }

    /// One page of matches without session state, for request/response callers / 无状态分页搜索
    pub async fn search_page(&self, query: &str, page: i64) -> Result<SearchPage> {
        let query = query.trim().to_string();
        let page = page.max(0);
        let page_size = self.settings.page_size;

        let limit = page_size as i64;
        // Pages past the addressable offset are empty rather than wrapped
        let Some(offset) = page
            .checked_mul(limit)
            .filter(|_| self.settings.accepts(&query))
        else {
            return Ok(SearchPage {
                query,
                page,
                page_size,
                hits: Vec::new(),
                has_more: false,
            });
        };

        let rows = self.reader.search(&query, limit, offset).await?;
        let has_more = rows.len() == page_size;
        let highlighter = Highlighter::new(&query);
        let hits = rows
            .into_iter()
            .map(|verse| SearchHit {
                key: verse.key(),
                book_name: catalog::book_name(verse.book),
                position: NavPosition::from(&verse),
                spans: highlighter.spans(&verse.text),
                verse,
            })
            .collect();

        Ok(SearchPage {
            query,
            page,
            page_size,
            hits,
            has_more,
        })
    }

    /// 计算前后章节
    pub async fn prev_next_for(&self, book: i64, chapter: i64) -> Result<PrevNext> {
        self.sequencer.prev_next_for(book, chapter).await
    }

    /// Targets from cached bounds only / 仅使用缓存的前后章节
    pub fn cached_prev_next(&self, book: i64, chapter: i64) -> PrevNext {
        self.sequencer.cached_prev_next(book, chapter)
    }

    pub fn highlight_spans(&self, text: &str, query: &str) -> Vec<Span> {
        crate::search::highlight_spans(text, query)
    }

    pub fn book_name(&self, index: i64) -> Option<&'static str> {
        catalog::book_name(index)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::models::ChapterRef;
    use crate::navigation::NavTarget;
    use crate::search::SearchPhase;
    use crate::store::testing::{open_fixture, sample_rows};

    async fn sample_library(dir: &std::path::Path, page_size: usize) -> Library {
        let mut config = AppConfig::default();
        config.search.page_size = page_size;
        config.search.debounce_ms = 20;
        config.search.load_more_cooldown_ms = 0;
        Library::from_store(open_fixture(dir, &sample_rows()).await, &config)
    }

    #[tokio::test]
    async fn test_list_verses_and_chapters() {
        let dir = tempfile::tempdir().unwrap();
        let library = sample_library(dir.path(), 100).await;

        let verses = library.list_verses(0, 2).await.unwrap();
        assert_eq!(verses.len(), 3);
        assert!(verses.iter().all(|v| v.book == 0 && v.chapter == 2));

        assert_eq!(library.chapters_of(0).await.unwrap(), vec![1, 2, 3]);
        assert!(library.chapters_of(40).await.unwrap().is_empty());
        assert!(library.list_verses(40, 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_books_use_catalog_names() {
        let dir = tempfile::tempdir().unwrap();
        let library = sample_library(dir.path(), 100).await;

        let books = library.books().await.unwrap();
        assert_eq!(
            books,
            vec![
                BookEntry { index: 0, name: "Genesis" },
                BookEntry { index: 1, name: "Exodus" },
            ]
        );
        assert_eq!(library.book_name(65), Some("Revelation"));
        assert_eq!(library.book_name(66), None);
    }

    #[tokio::test]
    async fn test_prev_next_over_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let library = sample_library(dir.path(), 100).await;

        assert_eq!(library.cached_prev_next(0, 3).prev, NavTarget::Unknown);
        let targets = library.prev_next_for(0, 3).await.unwrap();
        assert_eq!(targets.prev.chapter(), Some(ChapterRef::new(0, 2)));
        assert_eq!(targets.next.chapter(), Some(ChapterRef::new(1, 1)));
        assert_eq!(library.cached_prev_next(0, 3), targets);
    }

    #[tokio::test]
    async fn test_search_page_paginates_with_spans() {
        let dir = tempfile::tempdir().unwrap();
        let library = sample_library(dir.path(), 4).await;

        let first = library.search_page("  in the BEGINNING ", 0).await.unwrap();
        assert_eq!(first.query, "in the BEGINNING");
        assert_eq!(first.hits.len(), 4);
        assert!(first.has_more);
        let hit = &first.hits[0];
        assert_eq!(hit.book_name, Some("Genesis"));
        assert_eq!(hit.position.verse, Some(hit.verse.verse_number));
        assert_eq!(hit.spans[0].text, "In the beginning");
        assert!(hit.spans[0].matched);

        let last = library.search_page("in the beginning", 2).await.unwrap();
        assert_eq!(last.hits.len(), 1);
        assert!(!last.has_more);

        let short = library.search_page(" a ", 0).await.unwrap();
        assert!(short.hits.is_empty());
        assert!(!short.has_more);
    }

    #[tokio::test]
    async fn test_search_page_beyond_addressable_offset_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let library = sample_library(dir.path(), 4).await;

        let page = library.search_page("in the beginning", i64::MAX / 2).await.unwrap();
        assert_eq!(page.page, i64::MAX / 2);
        assert!(page.hits.is_empty());
        assert!(!page.has_more);

        let page = library.search_page("in the beginning", i64::MAX).await.unwrap();
        assert!(page.hits.is_empty());
    }

    #[tokio::test]
    async fn test_search_session_over_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let library = sample_library(dir.path(), 4).await;
        let session = library.search_session();
        let mut revisions = session.subscribe();

        session.update_query("beginning");
        tokio::time::timeout(Duration::from_secs(5), async {
            while session.phase() != SearchPhase::Ready {
                revisions.changed().await.unwrap();
            }
        })
        .await
        .unwrap();
        assert_eq!(session.snapshot().results.len(), 4);

        assert!(session.load_more());
        tokio::time::timeout(Duration::from_secs(5), async {
            while session.snapshot().results.len() < 8 {
                revisions.changed().await.unwrap();
            }
        })
        .await
        .unwrap();

        let snapshot = session.snapshot();
        let keys: std::collections::HashSet<String> =
            snapshot.results.iter().map(Verse::key).collect();
        assert_eq!(keys.len(), 8);
        session.dispose();
    }
}
