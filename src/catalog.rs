//! Book catalog / 书卷目录
//!
//! Static configuration, never derived from the store.

use crate::models::BookEntry;

pub const BOOKS: [&str; 66] = [
    "Genesis",
    "Exodus",
    "Leviticus",
    "Numbers",
    "Deuteronomy",
    "Joshua",
    "Judges",
    "Ruth",
    "1 Samuel",
    "2 Samuel",
    "1 Kings",
    "2 Kings",
    "1 Chronicles",
    "2 Chronicles",
    "Ezra",
    "Nehemiah",
    "Esther",
    "Job",
    "Psalms",
    "Proverbs",
    "Ecclesiastes",
    "Song of Solomon",
    "Isaiah",
    "Jeremiah",
    "Lamentations",
    "Ezekiel",
    "Daniel",
    "Hosea",
    "Joel",
    "Amos",
    "Obadiah",
    "Jonah",
    "Micah",
    "Nahum",
    "Habakkuk",
    "Zephaniah",
    "Haggai",
    "Zechariah",
    "Malachi",
    "Matthew",
    "Mark",
    "Luke",
    "John",
    "Acts",
    "Romans",
    "1 Corinthians",
    "2 Corinthians",
    "Galatians",
    "Ephesians",
    "Philippians",
    "Colossians",
    "1 Thessalonians",
    "2 Thessalonians",
    "1 Timothy",
    "2 Timothy",
    "Titus",
    "Philemon",
    "Hebrews",
    "James",
    "1 Peter",
    "2 Peter",
    "1 John",
    "2 John",
    "3 John",
    "Jude",
    "Revelation",
];

/// Display name for a 0-based book index / 获取书卷名称
pub fn book_name(index: i64) -> Option<&'static str> {
    usize::try_from(index).ok().and_then(|i| BOOKS.get(i).copied())
}

/// Book entries for the first `count` books, capped at the catalog length / 书卷列表
pub fn book_entries(count: i64) -> Vec<BookEntry> {
    let count = usize::try_from(count).unwrap_or(0);
    if count > BOOKS.len() {
        tracing::warn!(
            "Store reports {} books but the catalog only names {}",
            count,
            BOOKS.len()
        );
    }
    BOOKS
        .iter()
        .copied()
        .take(count)
        .enumerate()
        .map(|(index, name)| BookEntry {
            index: index as i64,
            name,
        })
        .collect()
}
