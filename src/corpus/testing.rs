//! In-memory reader with call log, gates and injected failures / 测试用内存语料

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use super::CorpusReader;
use crate::error::{Result, StoreError};
use crate::models::Verse;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    CountBooks,
    MaxChapter(i64),
    Verses(i64, i64),
    Search(String, i64, i64),
}

pub(crate) struct FakeReader {
    rows: Vec<Verse>,
    calls: Mutex<Vec<Call>>,
    gate: Option<Arc<Semaphore>>,
    failing_offsets: Mutex<HashSet<i64>>,
    fallback_book_count: i64,
}

impl FakeReader {
    pub(crate) fn new(rows: Vec<Verse>) -> Self {
        Self {
            rows,
            calls: Mutex::new(Vec::new()),
            gate: None,
            failing_offsets: Mutex::new(HashSet::new()),
            fallback_book_count: 66,
        }
    }

    /// Every search blocks until the returned semaphore hands out a permit.
    pub(crate) fn gated(rows: Vec<Verse>) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let mut reader = Self::new(rows);
        reader.gate = Some(gate.clone());
        (reader, gate)
    }

    pub(crate) fn fail_at_offset(&self, offset: i64) {
        self.failing_offsets.lock().insert(offset);
    }

    pub(crate) fn heal(&self) {
        self.failing_offsets.lock().clear();
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub(crate) fn search_calls(&self) -> Vec<(String, i64, i64)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                Call::Search(q, limit, offset) => Some((q.clone(), *limit, *offset)),
                _ => None,
            })
            .collect()
    }
}

/// `count` verses in book 0, chapter 1, each containing `word` / 生成经文
pub(crate) fn verses_with(word: &str, count: usize) -> Vec<Verse> {
    (1..=count)
        .map(|n| Verse {
            book: 0,
            chapter: 1,
            verse_number: n as i64,
            text: format!("verse {} speaks of the {}", n, word),
        })
        .collect()
}

/// Verses for the given `(book, chapter)` layout, one verse per chapter / 按章节布局生成
pub(crate) fn layout(chapters_per_book: &[i64]) -> Vec<Verse> {
    let mut rows = Vec::new();
    for (book, &chapters) in chapters_per_book.iter().enumerate() {
        for chapter in 1..=chapters {
            rows.push(Verse {
                book: book as i64,
                chapter,
                verse_number: 1,
                text: format!("book {} chapter {}", book, chapter),
            });
        }
    }
    rows
}

#[async_trait]
impl CorpusReader for FakeReader {
    async fn count_books(&self) -> Result<i64> {
        self.calls.lock().push(Call::CountBooks);
        Ok(self
            .rows
            .iter()
            .map(|v| v.book)
            .max()
            .map(|m| m + 1)
            .unwrap_or(self.fallback_book_count))
    }

    async fn max_chapter(&self, book: i64) -> Result<i64> {
        self.calls.lock().push(Call::MaxChapter(book));
        Ok(self
            .rows
            .iter()
            .filter(|v| v.book == book)
            .map(|v| v.chapter)
            .max()
            .unwrap_or(0))
    }

    async fn verses_of(&self, book: i64, chapter: i64) -> Result<Vec<Verse>> {
        self.calls.lock().push(Call::Verses(book, chapter));
        let mut rows: Vec<Verse> = self
            .rows
            .iter()
            .filter(|v| v.book == book && v.chapter == chapter)
            .cloned()
            .collect();
        rows.sort_by_key(|v| v.verse_number);
        Ok(rows)
    }

    async fn search(&self, needle: &str, limit: i64, offset: i64) -> Result<Vec<Verse>> {
        self.calls
            .lock()
            .push(Call::Search(needle.to_string(), limit, offset));

        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        if self.failing_offsets.lock().contains(&offset) {
            return Err(StoreError::Query(sqlx::Error::PoolTimedOut));
        }

        let needle = needle.to_lowercase();
        Ok(self
            .rows
            .iter()
            .filter(|v| v.text.to_lowercase().contains(&needle))
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
