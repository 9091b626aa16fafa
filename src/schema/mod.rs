//! Entity schemas.
//!
//! Each entity is described by a static list of [`FieldSpec`] constraints.
//! One engine evaluates every list the same way: it walks the declared
//! fields, records each violation it finds, and only produces a record when
//! the list of violations is empty.

mod entities;

pub use entities::{Athlete, Note, SkillPlan, ATHLETE, NOTE, SKILL_PLAN};

use serde::Serialize;
use serde_json::{json, Map, Value};
use std::fmt;

/// Value shape accepted by a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// A string
    Text,
    /// A whole number
    Integer,
    /// A list of strings
    TextList,
}

impl FieldKind {
    fn expected(self) -> &'static str {
        match self {
            FieldKind::Text => "a string",
            FieldKind::Integer => "an integer",
            FieldKind::TextList => "a list of strings",
        }
    }
}

/// A single declared field and its constraints
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Field name in the JSON body
    pub name: &'static str,
    /// Accepted value shape
    pub kind: FieldKind,
    /// Whether the field must be present and non-null
    pub required: bool,
    /// Inclusive bounds for integer fields
    pub range: Option<(i64, i64)>,
    /// Human-readable description for form generation
    pub description: Option<&'static str>,
}

impl FieldSpec {
    /// A field that must be supplied
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            range: None,
            description: None,
        }
    }

    /// A field that may be omitted or null
    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            range: None,
            description: None,
        }
    }

    /// Restrict an integer field to `min..=max`
    pub const fn range(mut self, min: i64, max: i64) -> Self {
        self.range = Some((min, max));
        self
    }

    /// Attach a description
    pub const fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    /// Value stored when the field is omitted
    fn default_value(&self) -> Value {
        match self.kind {
            FieldKind::TextList => Value::Array(Vec::new()),
            _ => Value::Null,
        }
    }

    fn check(&self, value: &Value) -> Result<Value, ViolationKind> {
        match self.kind {
            FieldKind::Text => match value {
                Value::String(_) => Ok(value.clone()),
                _ => Err(ViolationKind::WrongType {
                    expected: self.kind.expected(),
                }),
            },
            FieldKind::Integer => {
                let n = as_integer(value).ok_or(ViolationKind::WrongType {
                    expected: self.kind.expected(),
                })?;
                if let Some((min, max)) = self.range {
                    if n < min || n > max {
                        return Err(ViolationKind::OutOfRange { min, max });
                    }
                }
                Ok(Value::from(n))
            }
            FieldKind::TextList => match value {
                Value::Array(items) if items.iter().all(Value::is_string) => Ok(value.clone()),
                _ => Err(ViolationKind::WrongType {
                    expected: self.kind.expected(),
                }),
            },
        }
    }

    fn property(&self) -> Value {
        let mut base = match self.kind {
            FieldKind::Text => json!({"type": "string"}),
            FieldKind::Integer => json!({"type": "integer"}),
            FieldKind::TextList => json!({"type": "array", "items": {"type": "string"}}),
        };
        if let (Some((min, max)), Value::Object(map)) = (self.range, &mut base) {
            map.insert("minimum".into(), json!(min));
            map.insert("maximum".into(), json!(max));
        }

        let mut property = if self.required || self.kind == FieldKind::TextList {
            base
        } else {
            json!({"anyOf": [base, {"type": "null"}]})
        };
        if let Value::Object(map) = &mut property {
            map.insert("title".into(), json!(title_case(self.name)));
            if let Some(description) = self.description {
                map.insert("description".into(), json!(description));
            }
            if !self.required {
                map.insert("default".into(), self.default_value());
            }
        }
        property
    }
}

/// Accept JSON integers and integral floats.
fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        _ => None,
    }
}

fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Why a field was rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationKind {
    /// Required field absent or null
    Missing,
    /// Value has the wrong JSON type
    WrongType {
        /// Description of the accepted shape
        expected: &'static str,
    },
    /// Integer outside its inclusive bounds
    OutOfRange {
        /// Lowest accepted value
        min: i64,
        /// Highest accepted value
        max: i64,
    },
    /// Input could not be interpreted at all
    Malformed {
        /// What went wrong
        reason: String,
    },
}

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Offending field, or `body` for the request as a whole
    pub field: String,
    /// Machine-readable reason
    #[serde(flatten)]
    pub kind: ViolationKind,
    /// Human-readable reason
    pub message: String,
}

impl Violation {
    /// Build a violation with its standard message
    pub fn new(field: &str, kind: ViolationKind) -> Self {
        let message = match &kind {
            ViolationKind::Missing => "field required".to_string(),
            ViolationKind::WrongType { expected } => format!("must be {expected}"),
            ViolationKind::OutOfRange { min, max } => {
                format!("must be between {min} and {max}")
            }
            ViolationKind::Malformed { reason } => reason.clone(),
        };
        Self {
            field: field.to_string(),
            kind,
            message,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every violation found while validating one input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {entity}: {}", join_violations(.violations))]
pub struct ValidationError {
    /// Schema title of the rejected input
    pub entity: &'static str,
    /// Every rejected field, in declaration order
    pub violations: Vec<Violation>,
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    /// Error carrying exactly one violation
    pub fn single(entity: &'static str, violation: Violation) -> Self {
        Self {
            entity,
            violations: vec![violation],
        }
    }

    /// Whether `field` is among the rejected fields
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

/// Declarative description of one entity type
#[derive(Debug)]
pub struct EntitySchema {
    /// Entity name used in descriptions and errors
    pub title: &'static str,
    /// Store collection holding the records
    pub collection: &'static str,
    /// Summary shown in the schema description
    pub description: &'static str,
    /// Declared fields, in order
    pub fields: &'static [FieldSpec],
}

impl EntitySchema {
    /// Check `input` against every declared field.
    ///
    /// Returns the normalized record: declared fields only, defaults filled
    /// in, integers canonicalized. Undeclared input fields are dropped.
    pub fn validate(&self, input: &Value) -> Result<Map<String, Value>, ValidationError> {
        let Value::Object(input) = input else {
            return Err(ValidationError::single(
                self.title,
                Violation::new(
                    "body",
                    ViolationKind::Malformed {
                        reason: "must be a JSON object".to_string(),
                    },
                ),
            ));
        };

        let mut record = Map::new();
        let mut violations = Vec::new();

        for field in self.fields {
            match input.get(field.name) {
                None | Some(Value::Null) if field.required => {
                    violations.push(Violation::new(field.name, ViolationKind::Missing));
                }
                None | Some(Value::Null) => {
                    record.insert(field.name.to_string(), field.default_value());
                }
                Some(value) => match field.check(value) {
                    Ok(value) => {
                        record.insert(field.name.to_string(), value);
                    }
                    Err(kind) => violations.push(Violation::new(field.name, kind)),
                },
            }
        }

        if violations.is_empty() {
            Ok(record)
        } else {
            Err(ValidationError {
                entity: self.title,
                violations,
            })
        }
    }

    /// Structural description for client-side form generation
    pub fn describe(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.name.to_string(), f.property()))
            .collect();
        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect();

        json!({
            "title": self.title,
            "description": self.description,
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// Descriptions of every entity, keyed by collection name
pub fn describe_all() -> Value {
    let mut all = Map::new();
    for schema in [&ATHLETE, &NOTE, &SKILL_PLAN] {
        all.insert(schema.collection.to_string(), schema.describe());
    }
    Value::Object(all)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: EntitySchema = EntitySchema {
        title: "Sample",
        collection: "sample",
        description: "test schema",
        fields: &[
            FieldSpec::required("name", FieldKind::Text),
            FieldSpec::optional("score", FieldKind::Integer).range(1, 5),
            FieldSpec::optional("labels", FieldKind::TextList),
        ],
    };

    #[test]
    fn test_defaults_for_omitted_fields() {
        let record = SAMPLE.validate(&json!({"name": "x"})).unwrap();
        assert_eq!(record.get("score"), Some(&Value::Null));
        assert_eq!(record.get("labels"), Some(&json!([])));
    }

    #[test]
    fn test_undeclared_fields_dropped() {
        let record = SAMPLE
            .validate(&json!({"name": "x", "extra": true, "_id": "abc"}))
            .unwrap();
        assert!(record.get("extra").is_none());
        assert!(record.get("_id").is_none());
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn test_collects_every_violation() {
        let err = SAMPLE
            .validate(&json!({"score": 9, "labels": ["a", 1]}))
            .unwrap_err();
        assert_eq!(err.entity, "Sample");
        assert_eq!(err.violations.len(), 3);
        assert_eq!(err.violations[0], Violation::new("name", ViolationKind::Missing));
        assert_eq!(
            err.violations[1].kind,
            ViolationKind::OutOfRange { min: 1, max: 5 }
        );
        assert_eq!(
            err.violations[2].kind,
            ViolationKind::WrongType {
                expected: "a list of strings"
            }
        );
        assert!(err.to_string().contains("name: field required"));
    }

    #[test]
    fn test_null_required_is_missing() {
        let err = SAMPLE.validate(&json!({"name": null})).unwrap_err();
        assert!(err.has_field("name"));
        assert_eq!(err.violations[0].kind, ViolationKind::Missing);
    }

    #[test]
    fn test_integer_coercion() {
        let record = SAMPLE.validate(&json!({"name": "x", "score": 3.0})).unwrap();
        assert_eq!(record.get("score"), Some(&json!(3)));

        let err = SAMPLE
            .validate(&json!({"name": "x", "score": 3.5}))
            .unwrap_err();
        assert!(err.has_field("score"));

        let err = SAMPLE
            .validate(&json!({"name": "x", "score": "3"}))
            .unwrap_err();
        assert!(err.has_field("score"));
    }

    #[test]
    fn test_text_rejects_numbers() {
        let err = SAMPLE.validate(&json!({"name": 7})).unwrap_err();
        assert_eq!(
            err.violations[0].kind,
            ViolationKind::WrongType {
                expected: "a string"
            }
        );
    }

    #[test]
    fn test_non_object_body() {
        let err = SAMPLE.validate(&json!([1, 2])).unwrap_err();
        assert!(err.has_field("body"));
    }

    #[test]
    fn test_describe_shape() {
        let description = SAMPLE.describe();
        assert_eq!(description["title"], "Sample");
        assert_eq!(description["type"], "object");
        assert_eq!(description["required"], json!(["name"]));
        assert_eq!(description["properties"]["name"]["type"], "string");
        assert_eq!(description["properties"]["name"]["title"], "Name");

        let score = &description["properties"]["score"];
        assert_eq!(score["anyOf"][0]["minimum"], 1);
        assert_eq!(score["anyOf"][0]["maximum"], 5);
        assert_eq!(score["anyOf"][1]["type"], "null");
        assert_eq!(score["default"], Value::Null);

        let labels = &description["properties"]["labels"];
        assert_eq!(labels["type"], "array");
        assert_eq!(labels["default"], json!([]));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("timeframe_weeks"), "Timeframe Weeks");
        assert_eq!(title_case("age"), "Age");
    }

    #[test]
    fn test_violation_serializes_flat() {
        let value = serde_json::to_value(Violation::new(
            "age",
            ViolationKind::OutOfRange { min: 0, max: 120 },
        ))
        .unwrap();
        assert_eq!(
            value,
            json!({
                "field": "age",
                "kind": "out_of_range",
                "min": 0,
                "max": 120,
                "message": "must be between 0 and 120"
            })
        );
    }
}
