//! Internationalization (i18n) module: supported languages and their layout
//! direction.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for supported languages and the RTL set
//! - `language`: Validated `Language` type and the derived `LayoutDirection`
//! - `strings`: Localized restart/relaunch prompts
//! - `metrics`: Direction reconciliation counters
//!
//! # Example
//!
//! ```rust
//! use direction_manager::i18n::{Language, LayoutDirection};
//!
//! let arabic = Language::from_code("ar").unwrap();
//! assert_eq!(arabic.direction(), LayoutDirection::Rtl);
//! assert_eq!(Language::normalize("en-GB"), Some(Language::ENGLISH));
//! ```

mod language;
mod metrics;
mod registry;
mod strings;

pub use language::{desired_direction, resolve_language, Language, LayoutDirection};
pub use metrics::{DirectionMetrics, MetricsReport};
pub use registry::{is_rtl_language, LanguageConfig, LanguageRegistry, RTL_LANGUAGES};
pub use strings::{toggle_label, LanguageStrings};
