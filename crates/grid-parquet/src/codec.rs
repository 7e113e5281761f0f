//! Parquet encoding for gridded datasets.
//!
//! The dataset flattens to one Float64 column per dimension (cartesian
//! product, last dimension fastest) and one per variable. Attributes travel
//! as JSON in the file's schema metadata under [`METADATA_KEY`]; the
//! spatial-reference coordinate is dropped on write because the attributes
//! carry the same information, and decode rebuilds it from the attributes
//! alone.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array};
use arrow::compute::concat_batches;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel};
use parquet::file::properties::WriterProperties;
use serde_json::Value;
use tracing::debug;

use crate::dataset::{Attrs, DataVar, DimCoord, GridDataset};
use crate::error::{CodecError, Result};

/// Schema-metadata key carrying the dataset attributes as JSON. Frozen:
/// files written elsewhere in the platform use the same key.
pub const METADATA_KEY: &str = "xr_attrs";

/// Schema-metadata key recording the ordered dimension-column names.
pub const DIMS_KEY: &str = "grid_dims";

/// Encode a dataset to Parquet bytes (GZIP-compressed).
///
/// The attributes must be present and carry both `crs` and `grid_mapping`,
/// otherwise the file could not be decoded back into a georeferenced
/// dataset.
pub fn encode(ds: &GridDataset) -> Result<Bytes> {
    if ds.attrs.is_empty()
        || !ds.attrs.contains_key("crs")
        || !ds.attrs.contains_key("grid_mapping")
    {
        return Err(CodecError::MissingSpatialMetadata);
    }

    let rows = ds.len();
    let shape = ds.shape();
    let mut fields = Vec::with_capacity(ds.dims.len() + ds.vars.len());
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(ds.dims.len() + ds.vars.len());

    for (i, dim) in ds.dims.iter().enumerate() {
        let repeat_outer: usize = shape[..i].iter().product();
        let repeat_inner: usize = shape[i + 1..].iter().product();

        let mut values = Vec::with_capacity(rows);
        for _ in 0..repeat_outer {
            for v in &dim.values {
                for _ in 0..repeat_inner {
                    values.push(*v);
                }
            }
        }

        fields.push(Field::new(dim.name.as_str(), DataType::Float64, false));
        columns.push(Arc::new(Float64Array::from(values)) as ArrayRef);
    }

    for var in &ds.vars {
        fields.push(Field::new(var.name.as_str(), DataType::Float64, true));
        columns.push(Arc::new(Float64Array::from(var.values.clone())) as ArrayRef);
    }

    // Structural metadata first, the attribute blob second; on a key
    // collision the attributes win.
    let mut metadata = HashMap::new();
    let dim_names: Vec<&str> = ds.dims.iter().map(|d| d.name.as_str()).collect();
    metadata.insert(DIMS_KEY.to_string(), serde_json::to_string(&dim_names)?);
    metadata.insert(METADATA_KEY.to_string(), serde_json::to_string(&ds.attrs)?);

    let schema = Arc::new(Schema::new_with_metadata(fields, metadata));
    let batch = RecordBatch::try_new(Arc::clone(&schema), columns)?;

    let props = WriterProperties::builder()
        .set_compression(Compression::GZIP(GzipLevel::default()))
        .build();
    let mut buf = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buf, schema, Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    debug!(rows, bytes = buf.len(), "encoded dataset");
    Ok(Bytes::from(buf))
}

/// Decode Parquet bytes back into a dataset.
///
/// Dimensions are rebuilt from the recorded dimension columns (unique
/// values in first-appearance order, product checked against the row
/// count); attributes come from the schema metadata; the CRS coordinate is
/// re-derived from the `crs` and `grid_mapping` attributes.
pub fn decode(bytes: Bytes) -> Result<GridDataset> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(bytes)?;
    let schema = builder.schema().clone();
    let metadata = schema.metadata().clone();

    let reader = builder.build()?;
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    let table = concat_batches(&schema, &batches)?;
    let rows = table.num_rows();

    let attrs_json = metadata.get(METADATA_KEY).ok_or_else(|| {
        CodecError::MalformedStoredDataset(format!(
            "schema metadata key {:?} is missing",
            METADATA_KEY
        ))
    })?;
    let attrs: Attrs = serde_json::from_str(attrs_json)?;

    let dims_json = metadata.get(DIMS_KEY).ok_or_else(|| {
        CodecError::MalformedStoredDataset(format!("schema metadata key {:?} is missing", DIMS_KEY))
    })?;
    let dim_names: Vec<String> = serde_json::from_str(dims_json)?;

    let mut dims = Vec::with_capacity(dim_names.len());
    for name in &dim_names {
        let column = float_column(&table, name)?;
        dims.push(DimCoord::new(name.clone(), unique_in_order(column, name)?));
    }
    let expected: usize = dims.iter().map(|d| d.values.len()).product();
    if expected != rows {
        return Err(CodecError::MalformedStoredDataset(format!(
            "dimension product {} does not match row count {}",
            expected, rows
        )));
    }

    let mut vars = Vec::new();
    for field in schema.fields() {
        if dim_names.iter().any(|d| d == field.name()) {
            continue;
        }
        let column = float_column(&table, field.name())?;
        let values: Vec<f64> = column.iter().map(|v| v.unwrap_or(f64::NAN)).collect();
        vars.push(DataVar::new(field.name().clone(), values));
    }

    let crs = attrs
        .get("crs")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            CodecError::MalformedStoredDataset("attributes lack a string \"crs\"".to_string())
        })?;
    let grid_mapping = attrs
        .get("grid_mapping")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            CodecError::MalformedStoredDataset(
                "attributes lack a string \"grid_mapping\"".to_string(),
            )
        })?;

    let mut ds = GridDataset::new(dims, vars, attrs)?;
    ds.assign_crs(&crs, &grid_mapping);

    debug!(rows, dims = ds.dims.len(), vars = ds.vars.len(), "decoded dataset");
    Ok(ds)
}

/// Encode and write to a local file path.
pub fn write_to(ds: &GridDataset, path: impl AsRef<Path>) -> Result<()> {
    let bytes = encode(ds)?;
    fs::write(path, &bytes)?;
    Ok(())
}

/// Read and decode from a local file path.
pub fn read_from(path: impl AsRef<Path>) -> Result<GridDataset> {
    let bytes = fs::read(path)?;
    decode(Bytes::from(bytes))
}

fn float_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Float64Array> {
    let column = batch.column_by_name(name).ok_or_else(|| {
        CodecError::MalformedStoredDataset(format!("column {} is missing", name))
    })?;
    column
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| CodecError::MalformedStoredDataset(format!("column {} is not Float64", name)))
}

/// Unique values of a dimension column in first-appearance order.
fn unique_in_order(column: &Float64Array, name: &str) -> Result<Vec<f64>> {
    let mut ordered = Vec::new();
    let mut seen: Vec<f64> = Vec::new();
    for value in column.iter() {
        let value = value.ok_or_else(|| {
            CodecError::MalformedStoredDataset(format!("dimension column {} contains nulls", name))
        })?;
        if let Err(insert_at) = seen.binary_search_by(|probe| probe.total_cmp(&value)) {
            seen.insert(insert_at, value);
            ordered.push(value);
        }
    }
    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spatial_attrs() -> Attrs {
        let mut attrs = Attrs::new();
        attrs.insert("crs".to_string(), json!("EPSG:6933"));
        attrs.insert("grid_mapping".to_string(), json!("spatial_ref"));
        attrs.insert("product".to_string(), json!("water_quality"));
        attrs.insert("scale_factor".to_string(), json!(0.001));
        attrs
    }

    fn sample_dataset() -> GridDataset {
        GridDataset::new(
            vec![
                DimCoord::new("y", vec![30.0, 20.0, 10.0]),
                DimCoord::new("x", vec![100.0, 200.0]),
            ],
            vec![
                DataVar::new("turbidity", vec![1.0, 2.0, f64::NAN, 4.0, 5.0, 6.0]),
                DataVar::new("chl_a", vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6]),
            ],
            spatial_attrs(),
        )
        .unwrap()
    }

    #[test]
    fn test_round_trip_preserves_data_and_attrs() {
        let ds = sample_dataset();
        let decoded = decode(encode(&ds).unwrap()).unwrap();

        assert!(ds.same_data(&decoded));
        assert_eq!(ds.attrs, decoded.attrs);
    }

    #[test]
    fn test_round_trip_rebuilds_crs_from_attrs_alone() {
        // The input never had a CRS coordinate; decode derives one from the
        // stored attributes.
        let ds = sample_dataset();
        assert!(ds.crs_coord.is_none());

        let decoded = decode(encode(&ds).unwrap()).unwrap();
        let coord = decoded.crs_coord.unwrap();
        assert_eq!(coord.name, "spatial_ref");
        assert_eq!(coord.crs, "EPSG:6933");
    }

    #[test]
    fn test_dimension_order_and_values_survive() {
        // y values are descending on purpose; first-appearance order must
        // come back, not sorted order.
        let ds = sample_dataset();
        let decoded = decode(encode(&ds).unwrap()).unwrap();

        assert_eq!(decoded.dims.len(), 2);
        assert_eq!(decoded.dims[0].name, "y");
        assert_eq!(decoded.dims[0].values, vec![30.0, 20.0, 10.0]);
        assert_eq!(decoded.dims[1].name, "x");
        assert_eq!(decoded.dims[1].values, vec![100.0, 200.0]);
    }

    #[test]
    fn test_encode_requires_spatial_attrs() {
        let mut ds = sample_dataset();
        ds.attrs = Attrs::new();
        assert!(matches!(
            encode(&ds),
            Err(CodecError::MissingSpatialMetadata)
        ));

        let mut ds = sample_dataset();
        ds.attrs.remove("grid_mapping");
        assert!(matches!(
            encode(&ds),
            Err(CodecError::MissingSpatialMetadata)
        ));

        let mut ds = sample_dataset();
        ds.attrs.remove("crs");
        assert!(matches!(
            encode(&ds),
            Err(CodecError::MissingSpatialMetadata)
        ));
    }

    #[test]
    fn test_crs_coordinate_column_is_not_written() {
        let mut ds = sample_dataset();
        ds.assign_crs("EPSG:6933", "spatial_ref");

        let bytes = encode(&ds).unwrap();
        let builder = ParquetRecordBatchReaderBuilder::try_new(bytes).unwrap();
        let names: Vec<&str> = builder
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .collect();
        assert_eq!(names, vec!["y", "x", "turbidity", "chl_a"]);
    }

    #[test]
    fn test_schema_metadata_carries_the_frozen_keys() {
        let bytes = encode(&sample_dataset()).unwrap();
        let builder = ParquetRecordBatchReaderBuilder::try_new(bytes).unwrap();
        let metadata = builder.schema().metadata();

        let attrs: Attrs = serde_json::from_str(&metadata[METADATA_KEY]).unwrap();
        assert_eq!(attrs["crs"], json!("EPSG:6933"));

        let dims: Vec<String> = serde_json::from_str(&metadata[DIMS_KEY]).unwrap();
        assert_eq!(dims, vec!["y", "x"]);
    }

    #[test]
    fn test_decode_rejects_files_without_attrs() {
        // A plain Parquet table written without the attribute blob.
        let schema = Arc::new(Schema::new(vec![Field::new(
            "x",
            DataType::Float64,
            false,
        )]));
        let batch = RecordBatch::try_new(
            Arc::clone(&schema),
            vec![Arc::new(Float64Array::from(vec![1.0, 2.0])) as ArrayRef],
        )
        .unwrap();

        let mut buf = Vec::new();
        let mut writer = ArrowWriter::try_new(&mut buf, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        assert!(matches!(
            decode(Bytes::from(buf)),
            Err(CodecError::MalformedStoredDataset(_))
        ));
    }

    #[test]
    fn test_decode_rejects_non_string_crs() {
        let mut ds = sample_dataset();
        ds.attrs.insert("crs".to_string(), json!(6933));

        let err = decode(encode(&ds).unwrap()).unwrap_err();
        assert!(matches!(err, CodecError::MalformedStoredDataset(_)));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.parquet");

        let ds = sample_dataset();
        write_to(&ds, &path).unwrap();
        let loaded = read_from(&path).unwrap();

        assert!(ds.same_data(&loaded));
        assert_eq!(ds.attrs, loaded.attrs);
    }
}
