//! Corpus queries / 语料查询
//!
//! Parameterized reads against the provisioned store. Controllers depend on
//! the [`CorpusReader`] trait, never on SQL directly.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Verse;
use crate::store::{Store, CORPUS_TABLE};

#[cfg(test)]
pub(crate) mod testing;

/// Read operations over the corpus / 语料读取操作
#[async_trait]
pub trait CorpusReader: Send + Sync {
    /// Max book index + 1, fallback constant on an empty corpus / 书卷数
    async fn count_books(&self) -> Result<i64>;

    /// Highest chapter of a book, 0 when the book has no records / 最大章号
    async fn max_chapter(&self, book: i64) -> Result<i64>;

    /// Verses of one chapter ordered by verse number / 某章全部经文
    async fn verses_of(&self, book: i64, chapter: i64) -> Result<Vec<Verse>>;

    /// Case-insensitive literal substring match, `limit` rows from `offset` / 子串搜索
    async fn search(&self, needle: &str, limit: i64, offset: i64) -> Result<Vec<Verse>>;
}

/// Escape `%`, `_` and `\` for `LIKE ... ESCAPE '\'` / 转义 LIKE 通配符
pub fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// SQLite-backed reader / SQLite 语料读取
#[derive(Clone, Debug)]
pub struct SqliteCorpus {
    store: Store,
    fallback_book_count: i64,
}

impl SqliteCorpus {
    pub fn new(store: Store, fallback_book_count: i64) -> Self {
        Self {
            store,
            fallback_book_count,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }
}

#[async_trait]
impl CorpusReader for SqliteCorpus {
    async fn count_books(&self) -> Result<i64> {
        let (count,): (Option<i64>,) =
            sqlx::query_as(&format!("SELECT MAX(Book) + 1 FROM {}", CORPUS_TABLE))
                .fetch_one(self.store.pool())
                .await?;
        Ok(count.unwrap_or(self.fallback_book_count))
    }

    async fn max_chapter(&self, book: i64) -> Result<i64> {
        let (max,): (Option<i64>,) =
            sqlx::query_as(&format!("SELECT MAX(Chapter) FROM {} WHERE Book = ?", CORPUS_TABLE))
                .bind(book)
                .fetch_one(self.store.pool())
                .await?;
        Ok(max.unwrap_or(0))
    }

    async fn verses_of(&self, book: i64, chapter: i64) -> Result<Vec<Verse>> {
        let rows = sqlx::query_as::<_, Verse>(&format!(
            "SELECT Book, Chapter, Versecount, verse FROM {} WHERE Book = ? AND Chapter = ? ORDER BY Versecount",
            CORPUS_TABLE
        ))
        .bind(book)
        .bind(chapter)
        .fetch_all(self.store.pool())
        .await?;
        Ok(rows)
    }

    async fn search(&self, needle: &str, limit: i64, offset: i64) -> Result<Vec<Verse>> {
        let pattern = format!("%{}%", escape_like(needle));
        // No ORDER BY: a full scan of an unchanged file yields the same order every time
        let rows = sqlx::query_as::<_, Verse>(&format!(
            r"SELECT Book, Chapter, Versecount, verse FROM {} WHERE verse LIKE ? ESCAPE '\' LIMIT ? OFFSET ?",
            CORPUS_TABLE
        ))
        .bind(pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.store.pool())
        .await?;
        Ok(rows)
    }
}
