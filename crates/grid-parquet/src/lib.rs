//! Parquet round trip for labeled gridded datasets.
//!
//! A [`GridDataset`] is a small in-memory stand-in for a labeled
//! multi-dimensional array: named dimension coordinates, data variables laid
//! out over their cartesian product, a JSON attribute map, and an optional
//! spatial-reference coordinate. [`codec`] flattens it to a Parquet table
//! (one Float64 column per dimension and per variable) and carries the
//! attributes in the file's schema metadata, so the CRS survives storage
//! without a sidecar.
//!
//! This crate is synchronous: pure CPU plus local file I/O.

pub mod codec;
pub mod dataset;
pub mod error;

pub use codec::{decode, encode, read_from, write_to, DIMS_KEY, METADATA_KEY};
pub use dataset::{Attrs, CrsCoord, DataVar, DimCoord, GridDataset};
pub use error::{CodecError, Result};
