//! Output files.
//!
//! - [`json`]: merges fresh records with the previous run and writes the JSON
//!   data file plus its `window.NEWS_DATA` JavaScript twin

pub mod json;
