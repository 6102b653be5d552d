//! Output artifacts of a run.
//!
//! # Submodules
//!
//! - [`jsonl`]: writes each batch as gzip-compressed JSON Lines
//! - [`timing`]: appends per-region and overall durations to a text log
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── news/
//! │   ├── CA/
//! │   │   └── news_articles_CA.jsonl.gz
//! │   └── AK/
//! │       └── news_articles_AK.jsonl.gz
//! └── news_execution_times.txt
//! ```

pub mod jsonl;
pub mod timing;
