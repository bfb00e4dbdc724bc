//! # Folio
//!
//! Monthly activity reports as paginated PDF.
//!
//! The page is the fundamental unit of layout. Text, markdown, tables and
//! images flow *into* pages: every line break, row placement and section
//! start is decided with the page boundary in hand, and tables repeat their
//! header when they continue on the next page.
//!
//! ## Architecture
//!
//! ```text
//! DataSource / ContentStore / i18n      (report::data, report::store, i18n)
//!       ↓
//!   [report]  : composes cover, sections, tables, TOC
//!       ↓
//!   [layout]  : Document: cursor, style stack, pages, markdown, tables
//!       ↓
//!   [text]    : measuring and greedy wrapping (font metrics)
//!       ↓
//!   [pdf]     : serialize laid-out pages to PDF bytes
//! ```

pub mod config;
pub mod error;
pub mod font;
pub mod i18n;
pub mod image_loader;
pub mod layout;
pub mod markdown;
pub mod model;
pub mod pdf;
pub mod report;
pub mod style;
pub mod text;

pub use config::ReportConfig;
pub use error::{FolioError, Result};
pub use layout::Document;
pub use report::{build_monthly, build_monthly_document, MonthlyRequest};
