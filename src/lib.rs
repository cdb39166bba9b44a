// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. convert::ConvertOptions)
    clippy::module_name_repetitions
)]

//! # mdv2ex
//!
//! Convert Markdown into the V2EX "Default" posting format.
//!
//! The target format is a small BBCode dialect: `[b]`, `[code]` and
//! `[blockquote]` tags plus plain text. Tables, images, footnotes, task
//! lists and HTML have no equivalent and are flattened or removed.
//!
//! ## Architecture
//!
//! Conversion is a fixed sequence of string-to-string stages:
//! - **Protect**: fenced code, later inline code, is swapped for tokens
//! - **Block stages**: quotes, headings, tables, lists, rules
//! - **Inline stages**: HTML, footnotes, images, links, emphasis
//! - **Restore and clean up**: tokens back, blank lines collapsed
//!
//! ## Modules
//!
//! - [`convert`]: The pipeline and its options
//! - [`diagnostics`]: Warnings for unsupported constructs
//! - [`app`]: Command-line run loop (input, output, watch mode)
//! - [`config`]: Persisted default flags
//! - [`watcher`]: File watching
//! - [`perf`]: Stage timing

pub mod app;
pub mod config;
pub mod convert;
pub mod diagnostics;
pub mod perf;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::convert::{
        Conversion, ConvertOptions, Converter, HeadingSeparator, LinkMode, TableMode, convert,
    };
    pub use crate::diagnostics::Warning;
}
