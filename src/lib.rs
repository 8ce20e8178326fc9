//! Language preference and RTL/LTR layout direction management.
//!
//! Rendering frameworks latch their layout direction when the process
//! starts. `DirectionManager` persists the user's language, notices when it
//! needs a direction the process was not launched with, and performs the one
//! restart needed to reconcile the two without looping.
//!
//! ```rust,no_run
//! use direction_manager::{
//!     DirectionConfig, DirectionManager, ExecRestart, FileHost, FileStore, Language,
//! };
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let manager = DirectionManager::new(
//!     DirectionConfig::default(),
//!     Arc::new(FileStore::new("state/preferences.json")),
//!     Arc::new(FileHost::open("state/host.json")?),
//!     Arc::new(ExecRestart::current_exe(vec![])?),
//! );
//!
//! let outcome = manager.initialize().await;
//! if !outcome.mismatch_detected {
//!     manager.request_language_change(Language::ARABIC).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod direction;
pub mod error;
pub mod host;
pub mod i18n;
pub mod retry;
pub mod store;

pub use config::{Config, DirectionConfig};
pub use direction::{
    DirectionManager, DirectionState, DirectionStatus, InitOutcome, LanguageChange, LanguageState,
};
pub use error::{DirectionError, HostError, LanguageError, RestartError, StoreError};
pub use host::{
    ExecRestart, FallbackRestart, FileHost, HostDirection, MemoryHost, Restart, SpawnRestart,
};
pub use i18n::{Language, LayoutDirection};
pub use store::{FileStore, MemoryStore, PreferenceStore};
