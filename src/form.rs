//! Form collection: raw submitted pairs -> typed values, one per schema field.

use crate::schema::{Control, FieldSpec, FormSchema};
use crate::types::Value;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormError {
    #[error("{label}: '{raw}' is not a whole number")]
    NotAnInteger { label: &'static str, raw: String },

    #[error("{label}: {value} is outside the allowed range {range}")]
    OutOfRange { label: &'static str, value: i64, range: String },

    #[error("{label}: {value} must be a multiple of {step} from {min}")]
    OffStep { label: &'static str, value: i64, min: i64, step: i64 },

    #[error("{label}: '{raw}' is not one of the available choices")]
    InvalidChoice { label: &'static str, raw: String },
}

/// Collected values, in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct FormValues {
    values: Vec<(&'static str, Value)>,
}

impl FormValues {
    /// What an untouched form shows.
    pub fn defaults(schema: &FormSchema) -> Self {
        let values = schema
            .fields
            .iter()
            .map(|f| (f.feature, default_value(&f.control)))
            .collect();
        Self { values }
    }

    pub fn get(&self, feature: &str) -> Option<&Value> {
        self.values.iter().find(|(k, _)| *k == feature).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Outcome of collecting a submission. The raw text is kept for every field
/// so a rejected form re-renders with what the user typed.
#[derive(Debug, Clone)]
pub struct Submission {
    pub raw: Vec<(&'static str, String)>,
    pub result: Result<FormValues, Vec<FormError>>,
}

impl Submission {
    pub fn raw_value(&self, feature: &str) -> Option<&str> {
        self.raw.iter().find(|(k, _)| *k == feature).map(|(_, v)| v.as_str())
    }
}

pub fn collect(schema: &FormSchema, raw: &[(String, String)]) -> Result<FormValues, Vec<FormError>> {
    submit(schema, raw).result
}

pub fn submit(schema: &FormSchema, raw: &[(String, String)]) -> Submission {
    let mut values = Vec::with_capacity(schema.fields.len());
    let mut errors = Vec::new();
    let mut echoed = Vec::with_capacity(schema.fields.len());

    for field in schema.fields {
        let submitted: Vec<&str> = raw
            .iter()
            .filter(|(k, _)| k == field.feature)
            .map(|(_, v)| v.as_str())
            .collect();

        echoed.push((field.feature, submitted.join(", ")));
        match collect_field(field, &submitted) {
            Ok(v) => values.push((field.feature, v)),
            Err(e) => errors.push(e),
        }
    }

    let result = if errors.is_empty() {
        Ok(FormValues { values })
    } else {
        Err(errors)
    };
    Submission { raw: echoed, result }
}

fn default_value(control: &Control) -> Value {
    match control {
        Control::Text { .. } | Control::MultiSelect { .. } => Value::Text(String::new()),
        Control::Integer { default, .. } | Control::Slider { default, .. } => Value::Int(*default),
        Control::Radio { choices } | Control::Select { choices } => {
            Value::Text(choices.first().copied().unwrap_or_default().to_string())
        }
    }
}

fn collect_field(field: &FieldSpec, submitted: &[&str]) -> Result<Value, FormError> {
    let first = submitted.first().copied();
    match &field.control {
        Control::Text { .. } => Ok(Value::Text(first.unwrap_or_default().to_string())),
        Control::Integer { min, max, default, .. } => {
            let Some(raw) = first.filter(|s| !s.trim().is_empty()) else {
                return Ok(Value::Int(*default));
            };
            let v = parse_int(field.label, raw)?;
            check_range(field.label, v, *min, *max)?;
            Ok(Value::Int(v))
        }
        Control::Slider { min, max, step, default } => {
            let Some(raw) = first.filter(|s| !s.trim().is_empty()) else {
                return Ok(Value::Int(*default));
            };
            let v = parse_int(field.label, raw)?;
            check_range(field.label, v, *min, Some(*max))?;
            if *step > 0 && (v - min) % step != 0 {
                return Err(FormError::OffStep { label: field.label, value: v, min: *min, step: *step });
            }
            Ok(Value::Int(v))
        }
        Control::Radio { choices } | Control::Select { choices } => match first {
            None => Ok(default_value(&field.control)),
            Some(raw) => check_choice(field.label, choices, raw).map(|c| Value::Text(c.to_string())),
        },
        Control::MultiSelect { choices } => {
            let picked = submitted
                .iter()
                .map(|raw| check_choice(field.label, choices, raw))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Text(picked.join(", ")))
        }
    }
}

fn parse_int(label: &'static str, raw: &str) -> Result<i64, FormError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| FormError::NotAnInteger { label, raw: raw.to_string() })
}

fn check_range(label: &'static str, value: i64, min: i64, max: Option<i64>) -> Result<(), FormError> {
    let above_max = max.map_or(false, |m| value > m);
    if value < min || above_max {
        let range = match max {
            Some(m) => format!("{}..={}", min, m),
            None => format!(">= {}", min),
        };
        return Err(FormError::OutOfRange { label, value, range });
    }
    Ok(())
}

fn check_choice<'a>(
    label: &'static str,
    choices: &'a [&'static str],
    raw: &str,
) -> Result<&'a str, FormError> {
    choices
        .iter()
        .copied()
        .find(|c| *c == raw)
        .ok_or_else(|| FormError::InvalidChoice { label, raw: raw.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ENGINE_HP_FORM, FUEL_TYPE_FORM};

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn empty_submission_takes_defaults() {
        let values = collect(&FUEL_TYPE_FORM, &[]).unwrap();
        assert_eq!(values, FormValues::defaults(&FUEL_TYPE_FORM));
        assert_eq!(values.get("Year"), Some(&Value::Int(2022)));
        assert_eq!(values.get("Number of Doors"), Some(&Value::Int(4)));
        assert_eq!(values.get("Transmission Type"), Some(&Value::from("Automatic")));
        assert_eq!(values.get("Make"), Some(&Value::from("")));
    }

    #[test]
    fn year_bounds_are_enforced() {
        let errs = collect(&ENGINE_HP_FORM, &pairs(&[("Year", "2030")])).unwrap_err();
        assert!(matches!(errs[0], FormError::OutOfRange { value: 2030, .. }));

        let errs = collect(&ENGINE_HP_FORM, &pairs(&[("Year", "1899")])).unwrap_err();
        assert_eq!(errs.len(), 1);
    }

    #[test]
    fn unbounded_max_accepts_large_values() {
        let values = collect(&ENGINE_HP_FORM, &pairs(&[("MSRP", "2000000")])).unwrap();
        assert_eq!(values.get("MSRP"), Some(&Value::Int(2_000_000)));
    }

    #[test]
    fn slider_must_sit_on_step() {
        let errs = collect(&FUEL_TYPE_FORM, &pairs(&[("Number of Doors", "3")])).unwrap_err();
        assert!(matches!(errs[0], FormError::OffStep { value: 3, step: 2, .. }));
        let ok = collect(&FUEL_TYPE_FORM, &pairs(&[("Number of Doors", "2")])).unwrap();
        assert_eq!(ok.get("Number of Doors"), Some(&Value::Int(2)));
    }

    #[test]
    fn choices_are_checked() {
        let errs = collect(&ENGINE_HP_FORM, &pairs(&[("Vehicle Size", "Huge")])).unwrap_err();
        assert!(matches!(errs[0], FormError::InvalidChoice { .. }));
    }

    #[test]
    fn non_numeric_integer_is_reported_with_label() {
        let errs = collect(&ENGINE_HP_FORM, &pairs(&[("city mpg", "lots")])).unwrap_err();
        assert_eq!(
            errs[0].to_string(),
            "City Miles per Gallon (MPG): 'lots' is not a whole number"
        );
    }

    #[test]
    fn all_errors_are_reported_and_raw_is_echoed() {
        let sub = submit(&ENGINE_HP_FORM, &pairs(&[("Year", "abc"), ("MSRP", "-5")]));
        assert_eq!(sub.result.as_ref().unwrap_err().len(), 2);
        assert_eq!(sub.raw_value("Year"), Some("abc"));
    }

    #[test]
    fn multi_select_joins_choices() {
        const TAGS: FormSchema = FormSchema {
            id: "tags",
            fields: &[FieldSpec {
                feature: "Market Category",
                label: "Market Category",
                control: Control::MultiSelect { choices: &["Luxury", "Performance", "Hybrid"] },
            }],
        };
        let values = collect(
            &TAGS,
            &pairs(&[("Market Category", "Luxury"), ("Market Category", "Performance")]),
        )
        .unwrap();
        assert_eq!(values.get("Market Category"), Some(&Value::from("Luxury, Performance")));

        let none = collect(&TAGS, &[]).unwrap();
        assert_eq!(none.get("Market Category"), Some(&Value::from("")));

        assert!(collect(&TAGS, &pairs(&[("Market Category", "Cheap")])).is_err());
    }
}
