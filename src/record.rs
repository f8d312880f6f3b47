//! Record building and alignment to a model's declared input columns.

use crate::form::FormValues;
use crate::schema::{FormSchema, ENGINE_HP_FORM, FUEL_TYPE_FORM};
use crate::types::{Record, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlignError {
    #[error("model '{0}' does not declare its input columns")]
    NoDeclaredColumns(String),
}

/// One row, columns named and ordered exactly as the schema's features.
pub fn build_record(schema: &FormSchema, values: &FormValues) -> Record {
    let mut record = Record::new();
    for field in schema.fields {
        let value = values
            .get(field.feature)
            .cloned()
            .unwrap_or_else(|| Value::Text(String::new()));
        record.push(field.feature, value);
    }
    record
}

pub fn build_fuel_type_record(values: &FormValues) -> Record {
    build_record(&FUEL_TYPE_FORM, values)
}

pub fn build_engine_hp_record(values: &FormValues) -> Record {
    build_record(&ENGINE_HP_FORM, values)
}

/// Reindex `record` to `expected`, zero-filling columns the form never
/// collected.
pub fn align_to_model(
    model: &str,
    record: &Record,
    expected: Option<&[String]>,
) -> Result<Record, AlignError> {
    let expected = expected
        .filter(|cols| !cols.is_empty())
        .ok_or_else(|| AlignError::NoDeclaredColumns(model.to_string()))?;
    Ok(record.reindex(expected, &Value::Int(0)))
}
