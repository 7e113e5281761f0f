//! In-memory labeled gridded dataset.

use serde_json::{Map, Value};

use crate::error::{CodecError, Result};

/// JSON attribute map carried by a dataset.
pub type Attrs = Map<String, Value>;

/// An ordered dimension coordinate with its values.
#[derive(Debug, Clone, PartialEq)]
pub struct DimCoord {
    pub name: String,
    pub values: Vec<f64>,
}

impl DimCoord {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// A data variable laid out row-major over the dimension product, last
/// dimension fastest. NaN marks missing samples.
#[derive(Debug, Clone, PartialEq)]
pub struct DataVar {
    pub name: String,
    pub values: Vec<f64>,
}

impl DataVar {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// The scalar spatial-reference coordinate attached by
/// [`GridDataset::assign_crs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrsCoord {
    /// Coordinate name, conventionally `spatial_ref`.
    pub name: String,
    /// CRS identifier, e.g. `EPSG:6933`.
    pub crs: String,
}

/// A labeled gridded dataset: dimension coordinates, data variables over
/// their product, JSON attributes, and an optional CRS coordinate.
#[derive(Debug, Clone)]
pub struct GridDataset {
    pub dims: Vec<DimCoord>,
    pub vars: Vec<DataVar>,
    pub attrs: Attrs,
    pub crs_coord: Option<CrsCoord>,
}

impl GridDataset {
    /// Build a dataset, validating every variable against the dimension
    /// product.
    pub fn new(dims: Vec<DimCoord>, vars: Vec<DataVar>, attrs: Attrs) -> Result<Self> {
        let expected: usize = dims.iter().map(|d| d.values.len()).product();
        for var in &vars {
            if var.values.len() != expected {
                return Err(CodecError::Shape {
                    name: var.name.clone(),
                    actual: var.values.len(),
                    expected,
                });
            }
        }
        Ok(Self {
            dims,
            vars,
            attrs,
            crs_coord: None,
        })
    }

    /// Number of rows in the flattened table (the dimension product).
    pub fn len(&self) -> usize {
        self.dims.iter().map(|d| d.values.len()).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Length of each dimension, in order.
    pub fn shape(&self) -> Vec<usize> {
        self.dims.iter().map(|d| d.values.len()).collect()
    }

    /// Attach the spatial-reference coordinate.
    pub fn assign_crs(&mut self, crs: &str, grid_mapping: &str) {
        self.crs_coord = Some(CrsCoord {
            name: grid_mapping.to_string(),
            crs: crs.to_string(),
        });
    }

    /// Exact data equality, NaN treated as equal to NaN.
    pub fn same_data(&self, other: &GridDataset) -> bool {
        fn same_values(a: &[f64], b: &[f64]) -> bool {
            a.len() == b.len()
                && a.iter()
                    .zip(b)
                    .all(|(x, y)| x == y || (x.is_nan() && y.is_nan()))
        }

        self.dims.len() == other.dims.len()
            && self.vars.len() == other.vars.len()
            && self
                .dims
                .iter()
                .zip(&other.dims)
                .all(|(a, b)| a.name == b.name && same_values(&a.values, &b.values))
            && self
                .vars
                .iter()
                .zip(&other.vars)
                .all(|(a, b)| a.name == b.name && same_values(&a.values, &b.values))
    }
}
