//! Test fixtures: real SQLite corpus files / 测试用语料库

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use super::snapshot::{FileSnapshot, SnapshotSource};
use super::{Store, StoreProvisioner};
use crate::error::Result;

pub(crate) type Row = (i64, i64, i64, String);

/// Book 0 has chapters 1..=3 with 3 verses each, book 1 has chapters 1..=2.
pub(crate) fn sample_rows() -> Vec<Row> {
    let mut rows = Vec::new();
    for chapter in 1..=3 {
        for verse in 1..=3 {
            rows.push((0, chapter, verse, format!("In the beginning {} {}", chapter, verse)));
        }
    }
    rows.push((1, 1, 1, "Tithe 100% of the increase".to_string()));
    rows.push((1, 1, 2, "Give 1000 measures and 100 more".to_string()));
    rows.push((1, 1, 3, "the snake_case path".to_string()));
    rows.push((1, 2, 1, "a back\\slash stands here".to_string()));
    rows.push((1, 2, 2, "the snakeXcase path".to_string()));
    rows.push((1, 2, 3, "A BACKSLASH free line".to_string()));
    rows
}

pub(crate) async fn build_snapshot(path: &Path, rows: &[Row]) {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();

    sqlx::query(
        r#"
        CREATE TABLE bible (
            Book INTEGER NOT NULL,
            Chapter INTEGER NOT NULL,
            Versecount INTEGER NOT NULL,
            verse TEXT NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    for (book, chapter, verse, text) in rows {
        sqlx::query("INSERT INTO bible (Book, Chapter, Versecount, verse) VALUES (?, ?, ?, ?)")
            .bind(book)
            .bind(chapter)
            .bind(verse)
            .bind(text)
            .execute(&pool)
            .await
            .unwrap();
    }

    pool.close().await;
}

/// Provision a fresh store holding `rows` / 创建测试数据库
pub(crate) async fn open_fixture(dir: &Path, rows: &[Row]) -> Store {
    std::fs::create_dir_all(dir).unwrap();
    let snapshot = dir.join("fixture-snapshot.db");
    build_snapshot(&snapshot, rows).await;
    StoreProvisioner::new(dir.join("SQLite").join("holybible.db"), Arc::new(FileSnapshot::new(snapshot)))
        .acquire()
        .await
        .unwrap()
}

/// File snapshot that counts loads and widens the copy window / 计数快照
pub(crate) struct CountingSnapshot {
    inner: FileSnapshot,
    loads: AtomicUsize,
}

impl CountingSnapshot {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: FileSnapshot::new(path),
            loads: AtomicUsize::new(0),
        }
    }

    pub(crate) fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotSource for CountingSnapshot {
    fn name(&self) -> String {
        format!("counting:{}", self.inner.name())
    }

    async fn load(&self) -> Result<Cow<'static, [u8]>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(25)).await;
        self.inner.load().await
    }
}
