pub mod config;
pub mod error;
pub mod models;
pub mod catalog;
pub mod store;
pub mod corpus;
pub mod search;
pub mod navigation;
pub mod library;

pub use error::{ErrorKind, StoreError};
pub use library::{Library, SearchHit, SearchPage};
pub use models::{BookEntry, ChapterRef, NavPosition, Verse};
pub use navigation::{compute_prev_next, BoundsWarning, ChapterSequencer, NavTarget, PrevNext};
pub use search::{highlight_spans, SearchPhase, SearchSession, SearchSettings, SearchSnapshot, Span};
pub use store::{acquire_store, Store, StoreProvisioner};
