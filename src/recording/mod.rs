//! Reporting of search results.
//!
//! # Components
//!
//! - `result_writer`: JSONL output of finished runs
//! - `tree_report`: human-readable tree dumps and one-line summaries

pub mod result_writer;
pub mod tree_report;

pub use result_writer::{load_results, ResultRecord, ResultWriter};
pub use tree_report::{render_tree, summarize};
