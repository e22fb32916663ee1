//! Tests for the record batch contract

use super::*;
use arrow::array::{Int64Array, TimestampSecondArray};
use pretty_assertions::assert_eq;

fn sample_batch() -> RecordBatch {
    from_columns(vec![
        (
            " Time ",
            Arc::new(StringArray::from(vec!["2024-01-01T00:00", "2024-01-01T01:00"])) as ArrayRef,
        ),
        ("TEMP", Arc::new(Float64Array::from(vec![10.0, 11.5])) as ArrayRef),
        ("Humidity", Arc::new(Int64Array::from(vec![80, 75])) as ArrayRef),
    ])
    .unwrap()
}

// ============================================================================
// Normalization Tests
// ============================================================================

#[test]
fn test_normalize_column_name() {
    assert_eq!(normalize_column_name("  Temp_F "), "temp_f");
    assert_eq!(normalize_column_name("humidity"), "humidity");
}

#[test]
fn test_normalize_columns() {
    let batch = normalize_columns(sample_batch()).unwrap();
    assert_eq!(column_names(&batch), vec!["time", "temp", "humidity"]);
    assert_eq!(batch.num_rows(), 2);
}

#[test]
fn test_normalize_columns_is_idempotent() {
    let once = normalize_columns(sample_batch()).unwrap();
    let twice = normalize_columns(once.clone()).unwrap();
    assert_eq!(column_names(&once), column_names(&twice));
    assert_eq!(once, twice);
}

#[test]
fn test_normalize_columns_preserves_row_order() {
    let batch = normalize_columns(sample_batch()).unwrap();
    let temps = float_column(&batch, "temp").unwrap();
    assert_eq!(temps.values().to_vec(), vec![10.0, 11.5]);
}

#[test]
fn test_normalize_columns_rejects_collision() {
    let batch = from_columns(vec![
        ("temp", Arc::new(Float64Array::from(vec![1.0])) as ArrayRef),
        (" TEMP", Arc::new(Float64Array::from(vec![2.0])) as ArrayRef),
    ])
    .unwrap();

    let err = normalize_columns(batch).unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));
    assert!(err.to_string().contains("temp"));
}

// ============================================================================
// Construction Tests
// ============================================================================

#[test]
fn test_from_columns_rejects_unequal_lengths() {
    let err = from_columns(vec![
        ("a", Arc::new(Float64Array::from(vec![1.0, 2.0])) as ArrayRef),
        ("b", Arc::new(Float64Array::from(vec![1.0])) as ArrayRef),
    ])
    .unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));
}

#[test]
fn test_from_columns_rejects_empty() {
    assert!(from_columns(vec![]).is_err());
}

#[test]
fn test_with_column_appends() {
    let batch = normalize_columns(sample_batch()).unwrap();
    let batch = with_column(
        batch,
        "Temp_F",
        Arc::new(Float64Array::from(vec![50.0, 52.7])),
    )
    .unwrap();

    assert_eq!(
        column_names(&batch),
        vec!["time", "temp", "humidity", "temp_f"]
    );
}

#[test]
fn test_with_column_replaces_in_place() {
    let batch = normalize_columns(sample_batch()).unwrap();
    let batch = with_column(
        batch,
        "time",
        Arc::new(TimestampSecondArray::from(vec![1_704_067_200, 1_704_070_800])),
    )
    .unwrap();

    assert_eq!(column_names(&batch), vec!["time", "temp", "humidity"]);
    let times = timestamp_column(&batch, "time").unwrap();
    assert_eq!(times.value(1), 1_704_070_800);
}

#[test]
fn test_with_column_rejects_wrong_length() {
    let batch = normalize_columns(sample_batch()).unwrap();
    let result = with_column(batch, "extra", Arc::new(Float64Array::from(vec![1.0])));
    assert!(matches!(result, Err(Error::Validation { .. })));
}

// ============================================================================
// Accessor Tests
// ============================================================================

#[test]
fn test_float_column_casts_integers() {
    let batch = normalize_columns(sample_batch()).unwrap();
    let humidity = float_column(&batch, "humidity").unwrap();
    assert_eq!(humidity.values().to_vec(), vec![80.0, 75.0]);
}

#[test]
fn test_float_column_missing() {
    let batch = normalize_columns(sample_batch()).unwrap();
    let err = float_column(&batch, "pressure").unwrap_err();
    assert!(matches!(err, Error::MissingColumn { ref column } if column == "pressure"));
}

#[test]
fn test_float_column_rejects_strings() {
    let batch = normalize_columns(sample_batch()).unwrap();
    let err = float_column(&batch, "time").unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));
}

#[test]
fn test_int_column() {
    let batch = normalize_columns(sample_batch()).unwrap();
    let humidity = int_column(&batch, "humidity").unwrap();
    assert_eq!(humidity.values().to_vec(), vec![80, 75]);
    assert!(int_column(&batch, "temp").is_err());
}

#[test]
fn test_string_column() {
    let batch = normalize_columns(sample_batch()).unwrap();
    let times = string_column(&batch, "time").unwrap();
    assert_eq!(times.value(0), "2024-01-01T00:00");
    assert!(string_column(&batch, "temp").is_err());
}

#[test]
fn test_timestamp_column_rejects_strings() {
    let batch = normalize_columns(sample_batch()).unwrap();
    assert!(timestamp_column(&batch, "time").is_err());
}

#[test]
fn test_null_count() {
    let batch = from_columns(vec![(
        "temp",
        Arc::new(Float64Array::from(vec![Some(1.0), None, None])) as ArrayRef,
    )])
    .unwrap();
    assert_eq!(null_count(&batch), 2);
}
