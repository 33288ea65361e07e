//! Terminal dashboard for the dashdeck data store.
//!
//! Pages of editable fields, segment charts and derived figures are drawn
//! with ratatui; every value is read from and written to a
//! [`dashdeck_core::DataStore`] by path.
//!
//! # Modules
//!
//! - [`app`]: application state machine and key routing
//! - [`dashboard`]: page rendering
//! - [`field`]: editable field widget bound to a data path
//! - [`format`]: currency, percentage and number display formats
//! - [`input`]: single-line editing buffer
//! - [`notification`]: timed outcome banners
//! - [`pages`]: per-variant page layouts
//! - [`tui`]: terminal setup and event loop

pub mod app;
pub mod dashboard;
pub mod field;
pub mod format;
pub mod input;
pub mod notification;
pub mod pages;
pub mod tui;

pub use app::App;
pub use tui::Tui;
