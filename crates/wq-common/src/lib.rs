//! Common types shared across the water-quality storage crates.

pub mod backend;
pub mod error;
pub mod uri;

pub use backend::Backend;
pub use error::{WqError, WqResult};
pub use uri::{extension, file_name, join_url, parent, parse_bucket_key, strip_scheme};
