//! Athlete, Note and SkillPlan definitions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{EntitySchema, FieldKind, FieldSpec, ValidationError, Violation, ViolationKind};

/// Athletes collection schema
pub static ATHLETE: EntitySchema = EntitySchema {
    title: "Athlete",
    collection: "athlete",
    description: "Athletes collection schema",
    fields: &[
        FieldSpec::required("first_name", FieldKind::Text).describe("Athlete first name"),
        FieldSpec::required("last_name", FieldKind::Text).describe("Athlete last name"),
        FieldSpec::optional("sport", FieldKind::Text).describe("Primary sport"),
        FieldSpec::optional("team", FieldKind::Text).describe("Team or group"),
        FieldSpec::optional("age", FieldKind::Integer).range(0, 120),
        FieldSpec::optional("tags", FieldKind::TextList)
            .describe("Labels like positions, strengths"),
    ],
};

/// Notes collection schema
pub static NOTE: EntitySchema = EntitySchema {
    title: "Note",
    collection: "note",
    description: "Notes collection schema",
    fields: &[
        FieldSpec::required("athlete_id", FieldKind::Text)
            .describe("Related athlete document _id as string"),
        FieldSpec::required("title", FieldKind::Text).describe("Short note title"),
        FieldSpec::required("content", FieldKind::Text)
            .describe("Detailed observation / coaching note"),
        FieldSpec::optional("focus_skills", FieldKind::TextList)
            .describe("Skills or areas of focus"),
        FieldSpec::optional("rating", FieldKind::Integer)
            .range(1, 5)
            .describe("Optional 1-5 rating"),
    ],
};

/// Skill plans collection schema
pub static SKILL_PLAN: EntitySchema = EntitySchema {
    title: "SkillPlan",
    collection: "skillplan",
    description: "Skill plans collection schema",
    fields: &[
        FieldSpec::required("athlete_id", FieldKind::Text),
        FieldSpec::required("skill", FieldKind::Text).describe("Skill to develop"),
        FieldSpec::required("goal", FieldKind::Text).describe("Specific measurable goal"),
        FieldSpec::optional("timeframe_weeks", FieldKind::Integer).range(1, 52),
        FieldSpec::optional("notes", FieldKind::Text),
    ],
};

/// An athlete profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Athlete {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Primary sport
    pub sport: Option<String>,
    /// Team or group
    pub team: Option<String>,
    /// Age in years, 0 to 120
    pub age: Option<i64>,
    /// Free-form labels used for filtering
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A coaching note about one athlete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Identifier of the athlete the note is about
    pub athlete_id: String,
    /// Short title
    pub title: String,
    /// Note body
    pub content: String,
    /// Skills the session focused on
    #[serde(default)]
    pub focus_skills: Vec<String>,
    /// Session rating, 1 to 5
    pub rating: Option<i64>,
}

/// A skill-development plan for one athlete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillPlan {
    /// Identifier of the athlete the plan is for
    pub athlete_id: String,
    /// Skill to develop
    pub skill: String,
    /// Measurable goal
    pub goal: String,
    /// Plan length in weeks, 1 to 52
    pub timeframe_weeks: Option<i64>,
    /// Free-form remarks
    pub notes: Option<String>,
}

/// Run the schema, then lift the normalized mapping into the typed record.
fn typed<T: serde::de::DeserializeOwned>(
    schema: &EntitySchema,
    input: &Value,
) -> Result<T, ValidationError> {
    let record = schema.validate(input)?;
    serde_json::from_value(Value::Object(record)).map_err(|e| {
        ValidationError::single(
            schema.title,
            Violation::new(
                "body",
                ViolationKind::Malformed {
                    reason: e.to_string(),
                },
            ),
        )
    })
}

fn to_document<T: Serialize>(record: &T) -> Map<String, Value> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

impl Athlete {
    /// Validate a request body into a record
    pub fn from_input(input: &Value) -> Result<Self, ValidationError> {
        typed(&ATHLETE, input)
    }

    /// Field map ready for insertion
    pub fn to_document(&self) -> Map<String, Value> {
        to_document(self)
    }
}

impl Note {
    /// Validate a request body into a record
    pub fn from_input(input: &Value) -> Result<Self, ValidationError> {
        typed(&NOTE, input)
    }

    /// Field map ready for insertion
    pub fn to_document(&self) -> Map<String, Value> {
        to_document(self)
    }
}

impl SkillPlan {
    /// Validate a request body into a record
    pub fn from_input(input: &Value) -> Result<Self, ValidationError> {
        typed(&SKILL_PLAN, input)
    }

    /// Field map ready for insertion
    pub fn to_document(&self) -> Map<String, Value> {
        to_document(self)
    }
}
