//! Chart blob normalization
//!
//! The backend emits chart specifications in two shapes depending on the
//! endpoint: inline JSON objects, or JSON documents re-encoded as strings.
//! Each blob is parsed independently so one malformed chart never takes
//! down the rest of a response.

use finsight_core::ChartSpec;
use serde_json::Value;
use tracing::warn;

/// Parse raw chart blobs into renderable specs.
///
/// Malformed blobs are logged and dropped; the returned charts keep their
/// original order.
pub fn parse_chart_specs(blobs: Vec<Value>) -> Vec<ChartSpec> {
    blobs
        .into_iter()
        .enumerate()
        .filter_map(|(index, blob)| match blob {
            Value::Object(_) => Some(ChartSpec(blob)),
            Value::String(encoded) => match serde_json::from_str::<Value>(&encoded) {
                Ok(decoded @ Value::Object(_)) => Some(ChartSpec(decoded)),
                Ok(other) => {
                    warn!(index, "Dropping chart blob that decoded to {:?}", other);
                    None
                }
                Err(error) => {
                    warn!(index, %error, "Dropping malformed chart blob");
                    None
                }
            },
            other => {
                warn!(index, "Dropping non-object chart blob: {:?}", other);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_inline_objects_and_encoded_strings() {
        let blobs = vec![
            json!({"data": [], "layout": {"title": "Price"}}),
            Value::String(r#"{"data": [], "layout": {"title": "Volume"}}"#.to_string()),
        ];
        let charts = parse_chart_specs(blobs);
        assert_eq!(charts.len(), 2);
        assert_eq!(charts[0].title(), Some("Price"));
        assert_eq!(charts[1].title(), Some("Volume"));
    }

    #[test]
    fn malformed_blob_does_not_abort_the_others() {
        let blobs = vec![
            json!({"layout": {"title": "First"}}),
            Value::String("{{{ not json".to_string()),
            json!({"layout": {"title": "Third"}}),
        ];
        let charts = parse_chart_specs(blobs);
        assert_eq!(charts.len(), 2);
        assert_eq!(charts[0].title(), Some("First"));
        assert_eq!(charts[1].title(), Some("Third"));
    }

    #[test]
    fn non_object_blobs_are_dropped() {
        let charts = parse_chart_specs(vec![json!(42), json!(["not", "a", "chart"])]);
        assert!(charts.is_empty());
    }
}
