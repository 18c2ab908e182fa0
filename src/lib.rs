#![forbid(unsafe_code)]

pub mod chapter;
pub mod cli;
pub mod count;
pub mod dates;
pub mod error;
pub mod fetch;
pub mod formats;
pub mod logging;
pub mod metadata;
pub mod page;
pub mod scrape;
pub mod store;
