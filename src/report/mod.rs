//! Report output: Markdown rendering and the report-derived search cursor

pub mod cursor;
pub mod markdown;

pub use cursor::{WindowArgs, latest_report_date, resolve_window};
pub use markdown::{render_report, report_filename, write_report};
