//! Request rows → schema-ordered numeric matrix

use serde_json::Value;

use crate::domain::model::{FeatureMatrix, FeatureSchema, FeatureSpec, FeatureType};
use crate::domain::DecodeError;

/// Decode untyped request rows against the model schema.
///
/// Rows are either objects keyed by feature name or arrays of values in
/// schema order. Object fields that are not in the schema are ignored.
/// A missing (or `null`) feature falls back to the schema default when one is
/// declared and fails the whole batch otherwise.
pub fn decode(rows: &[Value], schema: &FeatureSchema) -> Result<FeatureMatrix, DecodeError> {
    let mut matrix = FeatureMatrix::with_capacity(schema.len(), rows.len());
    let mut buffer = Vec::with_capacity(schema.len());

    for (index, row) in rows.iter().enumerate() {
        buffer.clear();

        match row {
            Value::Object(fields) => {
                for spec in schema.features() {
                    buffer.push(coerce(index, spec, fields.get(spec.name()))?);
                }
            }
            Value::Array(values) => {
                if values.len() != schema.len() {
                    return Err(DecodeError::RowWidthMismatch {
                        row: index,
                        expected: schema.len(),
                        actual: values.len(),
                    });
                }

                for (spec, value) in schema.features().iter().zip(values) {
                    buffer.push(coerce(index, spec, Some(value))?);
                }
            }
            _ => return Err(DecodeError::MalformedRow { row: index }),
        }

        matrix.push_row(&buffer);
    }

    Ok(matrix)
}

fn coerce(row: usize, spec: &FeatureSpec, value: Option<&Value>) -> Result<f64, DecodeError> {
    let value = match value {
        None | Some(Value::Null) => {
            return spec
                .encoded_default()
                .ok_or_else(|| DecodeError::missing_feature(row, spec.name()));
        }
        Some(value) => value,
    };

    let coerced = match spec.feature_type() {
        FeatureType::Numeric => value.as_f64().filter(|v| v.is_finite()),
        FeatureType::Categorical { .. } => value.as_str().and_then(|c| spec.category_code(c)),
    };

    coerced.ok_or_else(|| DecodeError::type_mismatch(row, spec.name(), spec.kind()))
}
