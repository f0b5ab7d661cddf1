//! Record traversal: locate marked property paths in a JSON record and
//! transform the string values found there.
//!
//! Paths use dot notation with a `[]` suffix for array elements, e.g.
//! `"ssn"`, `"user.address.zip"`, `"orders[].card_number"`.

use common::EncryptionError;

/// Segments of a dot-notation property path.
pub(crate) enum PathSegment {
    /// Navigate into an object property by name.
    Key(String),
    /// Expand into every element of a JSON array.
    ArrayItem,
}

/// Parse a dot-notation property path into a list of [`PathSegment`]s.
///
/// Array fields use the `[]` suffix before the dot separator, e.g.
/// `"orders[].card_number"` → `[Key("orders"), ArrayItem, Key("card_number")]`.
pub(crate) fn parse_path(path: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    for part in path.split('.') {
        if let Some(key) = part.strip_suffix("[]") {
            segments.push(PathSegment::Key(key.to_owned()));
            segments.push(PathSegment::ArrayItem);
        } else {
            segments.push(PathSegment::Key(part.to_owned()));
        }
    }
    segments
}

/// Recursively navigate `value` following `segments` and apply `op` to the
/// string leaf found at the end of the path.
///
/// Absent properties and JSON `null` leaves are skipped (null handling is
/// this boundary's responsibility, keeping the crypto core total). A
/// non-string, non-null leaf at a marked path is a modelling error.
///
/// Returns the number of leaves transformed.
fn transform_at_path(
    value: &mut serde_json::Value,
    segments: &[PathSegment],
    path: &str,
    op: &dyn Fn(&str) -> Result<String, EncryptionError>,
) -> Result<usize, EncryptionError> {
    if segments.is_empty() {
        return match value {
            serde_json::Value::Null => Ok(0),
            serde_json::Value::String(s) => {
                *value = serde_json::Value::String(op(s)?);
                Ok(1)
            }
            _ => Err(EncryptionError::InvalidArgument(format!(
                "encrypted property `{path}` must be a string value"
            ))),
        };
    }

    let mut transformed = 0;
    match &segments[0] {
        PathSegment::Key(key) => {
            if let serde_json::Value::Object(map) = value {
                if let Some(child) = map.get_mut(key) {
                    transformed += transform_at_path(child, &segments[1..], path, op)?;
                }
            }
        }
        PathSegment::ArrayItem => {
            if let serde_json::Value::Array(arr) = value {
                for item in arr.iter_mut() {
                    transformed += transform_at_path(item, &segments[1..], path, op)?;
                }
            }
        }
    }
    Ok(transformed)
}

/// Apply `op` to every marked string property of `record`.
///
/// Stops at the first failure; a record is never reported as successfully
/// transformed with a mix of processed and unprocessed properties.
pub(crate) fn transform_record<'a>(
    record: &mut serde_json::Value,
    paths: impl IntoIterator<Item = &'a String>,
    op: &dyn Fn(&str) -> Result<String, EncryptionError>,
) -> Result<usize, EncryptionError> {
    let mut transformed = 0;
    for path in paths {
        let segments = parse_path(path);
        transformed += transform_at_path(record, &segments, path, op)?;
    }
    Ok(transformed)
}
