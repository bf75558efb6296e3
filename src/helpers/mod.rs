//! I/O helpers used by the recipe hooks
//!
//! - **fetch**: download a URL to a file (`Fetcher`, `HttpFetcher`)
//! - **extract**: unpack a `.tar.gz` release archive

pub mod extract;
pub mod fetch;
pub(crate) mod internal;
