//! Search session / 搜索会话
//!
//! Every query change bumps `generation`; each request carries the generation
//! it was issued under and its response is dropped on arrival if the session
//! moved on or was disposed. In-flight requests are never aborted, only ignored.
//!
//! Must be driven from inside a Tokio runtime (debounce timers and requests
//! are spawned tasks).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::highlight::{Highlighter, Span};
use super::{SearchPhase, SearchSettings, SearchSnapshot};
use crate::corpus::CorpusReader;
use crate::error::StoreError;
use crate::models::Verse;

#[derive(Default)]
struct SessionState {
    /// Text as typed / 原始输入
    raw_query: String,
    /// Debounced, trimmed query / 生效查询
    query: String,
    generation: u64,
    /// Bumped per keystroke, a debounce timer only fires for the latest one
    input_seq: u64,
    debounce: Option<JoinHandle<()>>,
    results: Vec<Verse>,
    /// Index of the last loaded page / 已加载页码
    page: usize,
    has_more: bool,
    loading_initial: bool,
    loading_more: bool,
    cooldown_until: Option<Instant>,
    last_error: Option<Arc<StoreError>>,
}

impl SessionState {
    /// Clear everything tied to the previous effective query / 重置结果
    fn reset_results(&mut self) {
        self.generation += 1;
        self.results.clear();
        self.page = 0;
        self.has_more = false;
        self.loading_initial = false;
        self.loading_more = false;
        self.cooldown_until = None;
        self.last_error = None;
    }

    fn phase(&self, settings: &SearchSettings) -> SearchPhase {
        if self.debounce.is_some() {
            SearchPhase::Debouncing
        } else if !settings.accepts(&self.query) {
            SearchPhase::Idle
        } else if self.loading_initial {
            SearchPhase::Loading
        } else if self.loading_more {
            SearchPhase::LoadingMore
        } else if self.has_more {
            SearchPhase::Ready
        } else {
            SearchPhase::Exhausted
        }
    }
}

struct Shared {
    reader: Arc<dyn CorpusReader>,
    settings: SearchSettings,
    state: Mutex<SessionState>,
    disposed: AtomicBool,
    revision: watch::Sender<u64>,
}

/// Live search owned by one screen / 实时搜索会话
pub struct SearchSession {
    shared: Arc<Shared>,
}

impl SearchSession {
    pub fn new(reader: Arc<dyn CorpusReader>, settings: SearchSettings) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            shared: Arc::new(Shared {
                reader,
                settings,
                state: Mutex::new(SessionState::default()),
                disposed: AtomicBool::new(false),
                revision,
            }),
        }
    }

    pub fn settings(&self) -> SearchSettings {
        self.shared.settings
    }

    /// Feed the raw input text; applied after the debounce interval / 更新输入
    pub fn update_query(&self, text: &str) {
        let mut state = self.shared.state.lock();
        if self.shared.is_disposed() {
            return;
        }
        state.raw_query = text.to_string();
        state.input_seq += 1;
        if let Some(timer) = state.debounce.take() {
            timer.abort();
        }

        let seq = state.input_seq;
        let value = text.trim().to_string();
        let delay = self.shared.settings.debounce;
        let shared = self.shared.clone();
        state.debounce = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            shared.apply_query(seq, value);
        }));
        self.shared.notify();
    }

    /// Request the next page; returns whether a request was issued / 加载下一页
    pub fn load_more(&self) -> bool {
        self.shared.load_more(false)
    }

    /// Explicit retry after an error: reloads the first page when nothing is
    /// shown, otherwise re-requests the next page / 出错后重试
    pub fn retry(&self) -> bool {
        if self.shared.is_disposed() {
            return false;
        }

        let restart = {
            let state = self.shared.state.lock();
            if !self.shared.settings.accepts(&state.query) || state.loading_initial {
                return false;
            }
            state.results.is_empty()
        };

        if restart {
            self.shared.restart();
            true
        } else {
            self.shared.load_more(true)
        }
    }

    /// Hide the inline error notice, results stay untouched / 关闭错误提示
    pub fn dismiss_error(&self) {
        let mut state = self.shared.state.lock();
        if self.shared.is_disposed() {
            return;
        }
        if state.last_error.take().is_some() {
            self.shared.notify();
        }
    }

    /// Detach from the screen; late responses become no-ops / 释放会话
    ///
    /// The flag flips under the state lock, handlers check it under the same lock.
    pub fn dispose(&self) {
        let mut state = self.shared.state.lock();
        if self.shared.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(timer) = state.debounce.take() {
            timer.abort();
        }
        drop(state);
        tracing::debug!("Search session disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.is_disposed()
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        let state = self.shared.state.lock();
        SearchSnapshot {
            query: state.query.clone(),
            generation: state.generation,
            results: state.results.clone(),
            has_more: state.has_more,
            loading_initial: state.loading_initial,
            loading_more: state.loading_more,
            error: state.last_error.clone(),
            phase: state.phase(&self.shared.settings),
        }
    }

    pub fn phase(&self) -> SearchPhase {
        self.shared.state.lock().phase(&self.shared.settings)
    }

    pub fn raw_query(&self) -> String {
        self.shared.state.lock().raw_query.clone()
    }

    /// Revision counter bumped on every visible change / 变更通知
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }

    /// Highlighter for the effective query / 当前查询的高亮器
    pub fn highlighter(&self) -> Highlighter {
        Highlighter::new(&self.shared.state.lock().query)
    }

    pub fn highlight(&self, text: &str) -> Vec<Span> {
        self.highlighter().spans(text)
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl Shared {
    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    fn notify(&self) {
        self.revision.send_modify(|r| *r += 1);
    }

    fn apply_query(self: &Arc<Self>, seq: u64, value: String) {
        let mut state = self.state.lock();
        if self.is_disposed() || state.input_seq != seq {
            return;
        }
        state.debounce = None;

        if value == state.query {
            self.notify();
            return;
        }

        state.query = value;
        state.reset_results();
        tracing::debug!(
            generation = state.generation,
            "Debounced query applied: {:?}",
            state.query
        );

        if !self.settings.accepts(&state.query) {
            self.notify();
            return;
        }

        state.loading_initial = true;
        let generation = state.generation;
        let query = state.query.clone();
        self.notify();
        drop(state);

        self.fetch_first_page(generation, query);
    }

    /// Reload page 0 of the current query under a new generation / 重新加载首页
    fn restart(self: &Arc<Self>) {
        let mut state = self.state.lock();
        if self.is_disposed() {
            return;
        }
        state.reset_results();
        state.loading_initial = true;
        let generation = state.generation;
        let query = state.query.clone();
        self.notify();
        drop(state);

        self.fetch_first_page(generation, query);
    }

    fn fetch_first_page(self: &Arc<Self>, generation: u64, query: String) {
        let shared = self.clone();
        let limit = self.settings.page_size as i64;
        tokio::spawn(async move {
            let result = shared.reader.search(&query, limit, 0).await;
            shared.finish_first_page(generation, result);
        });
    }

    fn finish_first_page(&self, generation: u64, result: crate::error::Result<Vec<Verse>>) {
        let mut state = self.state.lock();
        if self.is_disposed() {
            tracing::debug!(generation, "Dropping response for disposed session");
            return;
        }
        if state.generation != generation {
            tracing::debug!(
                generation,
                current = state.generation,
                "Dropping stale first page"
            );
            return;
        }

        state.loading_initial = false;
        match result {
            Ok(rows) => {
                // A full page suggests more rows, a short one ends the list
                state.has_more = rows.len() == self.settings.page_size;
                state.results = rows;
            }
            Err(e) => {
                tracing::warn!("Search failed for {:?}: {}", state.query, e);
                state.last_error = Some(Arc::new(e));
            }
        }
        self.notify();
    }

    /// `retrying` skips the cool-down and clears the error notice once the request is issued
    fn load_more(self: &Arc<Self>, retrying: bool) -> bool {
        let mut state = self.state.lock();
        if self.is_disposed() {
            return false;
        }

        let page_size = self.settings.page_size;
        let cooling = !retrying
            && state
                .cooldown_until
                .map_or(false, |until| Instant::now() < until);

        let blocked = if state.loading_more {
            Some("page already in flight")
        } else if !state.has_more {
            Some("no more pages")
        } else if state.loading_initial {
            Some("first page still loading")
        } else if state.results.len() < page_size {
            Some("short result set")
        } else if cooling {
            Some("cooling down")
        } else {
            None
        };
        if let Some(reason) = blocked {
            tracing::debug!(generation = state.generation, "Load more ignored: {}", reason);
            return false;
        }

        state.loading_more = true;
        if retrying {
            state.last_error = None;
        }
        let generation = state.generation;
        let query = state.query.clone();
        let next_page = state.page + 1;
        self.notify();
        drop(state);

        let shared = self.clone();
        tokio::spawn(async move {
            let result = shared
                .reader
                .search(&query, page_size as i64, (next_page * page_size) as i64)
                .await;
            shared.finish_next_page(generation, next_page, result);
        });
        true
    }

    fn finish_next_page(
        &self,
        generation: u64,
        next_page: usize,
        result: crate::error::Result<Vec<Verse>>,
    ) {
        let mut state = self.state.lock();
        if self.is_disposed() {
            tracing::debug!(generation, "Dropping response for disposed session");
            return;
        }
        if state.generation != generation {
            tracing::debug!(
                generation,
                current = state.generation,
                "Dropping stale page {}",
                next_page
            );
            return;
        }

        state.loading_more = false;
        state.cooldown_until = Some(Instant::now() + self.settings.load_more_cooldown);
        match result {
            Ok(rows) if rows.is_empty() => state.has_more = false,
            Ok(rows) => {
                state.has_more = rows.len() == self.settings.page_size;
                state.results.extend(rows);
                state.page = next_page;
            }
            Err(e) => {
                tracing::warn!("Loading page {} failed for {:?}: {}", next_page, state.query, e);
                state.last_error = Some(Arc::new(e));
            }
        }
        self.notify();
    }
}
