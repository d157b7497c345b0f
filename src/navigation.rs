//! Chapter sequencing / 章节前后导航
//!
//! Previous/next targets are computed from aggregate counts only: total book
//! count and per-book max chapter, both cached for the process lifetime
//! since the corpus never changes.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::OnceCell;

use crate::corpus::CorpusReader;
use crate::error::Result;
use crate::models::ChapterRef;

/// Navigation target / 导航目标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "target", rename_all = "snake_case")]
pub enum NavTarget {
    /// Bounds not resolved yet, do not render as disabled / 尚未确定
    Unknown,
    /// No target in this direction / 无目标
    Unavailable,
    Chapter(ChapterRef),
}

impl NavTarget {
    pub fn chapter(&self) -> Option<ChapterRef> {
        match self {
            NavTarget::Chapter(target) => Some(*target),
            _ => None,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, NavTarget::Unknown)
    }
}

/// Non-fatal inconsistencies between a position and the reported bounds / 边界数据异常
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundsWarning {
    /// Current book reports no chapters
    EmptyBook { book: i64 },
    /// Preceding book reports no chapters, prev stops there
    EmptyPreviousBook { book: i64 },
    BookOutOfRange { book: i64, total_books: i64 },
    ChapterOutOfRange { book: i64, chapter: i64, max_chapter: i64 },
}

/// Resolved counts for one position / 已解析的边界
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChapterBounds {
    pub total_books: i64,
    /// Max chapter of the current book, 0 = empty/unknown
    pub max_chapter: i64,
    /// Max chapter of `book - 1`, only needed when leaving chapter 1
    pub prev_book_max_chapter: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrevNext {
    pub prev: NavTarget,
    pub next: NavTarget,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<BoundsWarning>,
}

impl PrevNext {
    pub fn unknown() -> Self {
        Self {
            prev: NavTarget::Unknown,
            next: NavTarget::Unknown,
            warnings: Vec::new(),
        }
    }
}

/// Pure prev/next computation / 计算前后章节
///
/// A previous book with zero chapters yields no prev target; earlier books are
/// not searched.
pub fn compute_prev_next(book: i64, chapter: i64, bounds: &ChapterBounds) -> PrevNext {
    let mut warnings = Vec::new();

    if bounds.max_chapter <= 0 {
        warnings.push(BoundsWarning::EmptyBook { book });
    } else if chapter > bounds.max_chapter || chapter < 1 {
        warnings.push(BoundsWarning::ChapterOutOfRange {
            book,
            chapter,
            max_chapter: bounds.max_chapter,
        });
    }
    if book < 0 || book >= bounds.total_books {
        warnings.push(BoundsWarning::BookOutOfRange {
            book,
            total_books: bounds.total_books,
        });
    }

    let prev = if chapter > 1 {
        NavTarget::Chapter(ChapterRef::new(book, chapter - 1))
    } else if book > 0 {
        match bounds.prev_book_max_chapter {
            Some(last) if last > 0 => NavTarget::Chapter(ChapterRef::new(book - 1, last)),
            Some(_) => {
                warnings.push(BoundsWarning::EmptyPreviousBook { book: book - 1 });
                NavTarget::Unavailable
            }
            None => NavTarget::Unknown,
        }
    } else {
        NavTarget::Unavailable
    };

    let next = if chapter < bounds.max_chapter {
        NavTarget::Chapter(ChapterRef::new(book, chapter + 1))
    } else if book < bounds.total_books - 1 {
        NavTarget::Chapter(ChapterRef::new(book + 1, 1))
    } else {
        NavTarget::Unavailable
    };

    PrevNext {
        prev,
        next,
        warnings,
    }
}

/// Sequencer with the process-lifetime bounds cache / 章节导航器（含边界缓存）
pub struct ChapterSequencer {
    reader: Arc<dyn CorpusReader>,
    total_books: OnceCell<i64>,
    max_chapters: Mutex<HashMap<i64, i64>>,
}

impl ChapterSequencer {
    pub fn new(reader: Arc<dyn CorpusReader>) -> Self {
        Self {
            reader,
            total_books: OnceCell::new(),
            max_chapters: Mutex::new(HashMap::new()),
        }
    }

    /// Cached book count / 书卷数（缓存）
    pub async fn total_books(&self) -> Result<i64> {
        self.total_books
            .get_or_try_init(|| self.reader.count_books())
            .await
            .copied()
    }

    /// Cached max chapter of a book / 最大章号（缓存）
    pub async fn max_chapter(&self, book: i64) -> Result<i64> {
        if let Some(max) = self.max_chapters.lock().get(&book) {
            return Ok(*max);
        }
        let max = self.reader.max_chapter(book).await?;
        self.max_chapters.lock().insert(book, max);
        Ok(max)
    }

    /// Targets from whatever is cached now; missing bounds read as `Unknown` / 基于缓存的结果
    pub fn cached_prev_next(&self, book: i64, chapter: i64) -> PrevNext {
        let cache = self.max_chapters.lock();
        let (Some(&total_books), Some(&max_chapter)) = (self.total_books.get(), cache.get(&book)) else {
            return PrevNext::unknown();
        };
        let prev_book_max_chapter = cache.get(&(book - 1)).copied();
        drop(cache);

        compute_prev_next(
            book,
            chapter,
            &ChapterBounds {
                total_books,
                max_chapter,
                prev_book_max_chapter,
            },
        )
    }

    /// Resolve all needed bounds, then compute targets / 解析边界并计算前后章节
    pub async fn prev_next_for(&self, book: i64, chapter: i64) -> Result<PrevNext> {
        let (total_books, max_chapter) =
            tokio::try_join!(self.total_books(), self.max_chapter(book))?;

        let prev_book_max_chapter = if chapter <= 1 && book > 0 {
            Some(self.max_chapter(book - 1).await?)
        } else {
            None
        };

        let result = compute_prev_next(
            book,
            chapter,
            &ChapterBounds {
                total_books,
                max_chapter,
                prev_book_max_chapter,
            },
        );
        for warning in &result.warnings {
            tracing::warn!("Chapter bounds look malformed at {}:{}: {:?}", book, chapter, warning);
        }
        Ok(result)
    }
}
