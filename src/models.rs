use serde::{Deserialize, Serialize};

/// One corpus record / 经文记录
///
/// `(book, chapter, verse_number)` is unique across the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Verse {
    /// 0-based book index / 书卷索引（从0开始）
    #[sqlx(rename = "Book")]
    pub book: i64,
    /// 1-based chapter / 章（从1开始）
    #[sqlx(rename = "Chapter")]
    pub chapter: i64,
    /// Ordering key inside the chapter, not guaranteed contiguous / 节号
    #[sqlx(rename = "Versecount")]
    pub verse_number: i64,
    #[sqlx(rename = "verse")]
    pub text: String,
}

impl Verse {
    /// Stable list key, `book-chapter-verse` / 列表键
    pub fn key(&self) -> String {
        format!("{}-{}-{}", self.book, self.chapter, self.verse_number)
    }
}

/// A navigable chapter / 章节定位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChapterRef {
    pub book: i64,
    pub chapter: i64,
}

impl ChapterRef {
    pub fn new(book: i64, chapter: i64) -> Self {
        Self { book, chapter }
    }
}

/// Navigation request passed to the presentation layer / 导航位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavPosition {
    pub book: i64,
    pub chapter: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verse: Option<i64>,
}

impl From<ChapterRef> for NavPosition {
    fn from(target: ChapterRef) -> Self {
        Self {
            book: target.book,
            chapter: target.chapter,
            verse: None,
        }
    }
}

impl From<&Verse> for NavPosition {
    fn from(verse: &Verse) -> Self {
        Self {
            book: verse.book,
            chapter: verse.chapter,
            verse: Some(verse.verse_number),
        }
    }
}

/// Book list entry / 书卷条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookEntry {
    pub index: i64,
    pub name: &'static str,
}
