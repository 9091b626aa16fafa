use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use tracing::info;

use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::schema::{
    describe_all, Athlete, EntitySchema, Note, SkillPlan, ValidationError, Violation,
    ViolationKind, ATHLETE, NOTE, SKILL_PLAN,
};
use crate::store::{is_valid_id, Document, Filter, StoreStatus, ID_FIELD};

/// Page size for `GET /api/athletes` when `limit` is omitted
pub const DEFAULT_ATHLETE_LIMIT: usize = 50;
/// Page size for note and skill plan listings when `limit` is omitted
pub const DEFAULT_RECORD_LIMIT: usize = 100;

/// Parse a request body as JSON, reporting syntax errors as a validation failure.
fn parse_body(schema: &EntitySchema, body: &[u8]) -> ApiResult<Value> {
    serde_json::from_slice(body).map_err(|e| {
        ApiError::from(ValidationError::single(
            schema.title,
            Violation::new(
                "body",
                ViolationKind::Malformed {
                    reason: format!("invalid JSON: {e}"),
                },
            ),
        ))
    })
}

/// Non-empty query parameter
fn param<'a>(params: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    params
        .get(name)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
}

fn parse_limit(params: &HashMap<String, String>, default: usize) -> ApiResult<usize> {
    let Some(raw) = param(params, "limit") else {
        return Ok(default);
    };
    match raw.trim().parse::<i64>() {
        Ok(n) if n >= 1 => Ok(usize::try_from(n).unwrap_or(usize::MAX)),
        _ => Err(ValidationError::single(
            "query",
            Violation::new(
                "limit",
                ViolationKind::Malformed {
                    reason: "must be a positive integer".to_string(),
                },
            ),
        )
        .into()),
    }
}

fn check_reference(field: &'static str, value: &str) -> ApiResult<()> {
    if is_valid_id(value) {
        Ok(())
    } else {
        Err(ApiError::InvalidReference {
            field,
            value: value.to_string(),
        })
    }
}

/// Replace the store identity field with a string `id`.
pub(crate) fn expose_id(mut record: Document) -> Value {
    let id = match record.remove(ID_FIELD) {
        Some(Value::String(s)) => Value::String(s),
        Some(Value::Null) | None => Value::Null,
        Some(other) => Value::String(other.to_string()),
    };
    record.insert("id".to_string(), id);
    Value::Object(record)
}

fn text_field<'a>(record: &'a Map<String, Value>, name: &str) -> &'a str {
    record.get(name).and_then(Value::as_str).unwrap_or("")
}

/// Case-insensitive substring match on full name or sport.
///
/// `needle` must already be lowercase.
pub(crate) fn matches_text(record: &Document, needle: &str) -> bool {
    let full_name = format!(
        "{} {}",
        text_field(record, "first_name"),
        text_field(record, "last_name")
    );
    full_name.to_lowercase().contains(needle)
        || text_field(record, "sport").to_lowercase().contains(needle)
}

fn created(id: String) -> Json<Value> {
    Json(json!({ "id": id }))
}

pub(crate) async fn root_handler() -> Json<Value> {
    Json(json!({ "message": "Sports Coaching Notes API is running" }))
}

pub(crate) async fn status_handler(State(state): State<AppState>) -> Json<StoreStatus> {
    Json(state.db.status().await)
}

pub(crate) async fn schema_handler() -> Json<Value> {
    Json(describe_all())
}

pub(crate) async fn create_athlete_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let input = parse_body(&ATHLETE, &body)?;
    let athlete = Athlete::from_input(&input)?;
    let id = state
        .db
        .insert(ATHLETE.collection, athlete.to_document())
        .await?;
    info!(id = %id, "athlete created");
    Ok(created(id))
}

pub(crate) async fn list_athletes_handler(
    State(state): State<AppState>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> ApiResult<Json<Vec<Value>>> {
    let Query(params) = query?;
    let limit = parse_limit(&params, DEFAULT_ATHLETE_LIMIT)?;
    let mut filter = Filter::new();
    if let Some(tag) = param(&params, "tag") {
        filter = filter.is_in("tags", [tag]);
    }

    let mut records = state.db.query(ATHLETE.collection, &filter, limit).await?;

    // Text search only sees the records the store returned under `limit`.
    if let Some(q) = param(&params, "q") {
        let needle = q.to_lowercase();
        records.retain(|record| matches_text(record, &needle));
    }

    Ok(Json(records.into_iter().map(expose_id).collect()))
}

pub(crate) async fn create_note_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let input = parse_body(&NOTE, &body)?;
    let note = Note::from_input(&input)?;
    check_reference("athlete_id", &note.athlete_id)?;
    let id = state.db.insert(NOTE.collection, note.to_document()).await?;
    info!(id = %id, athlete_id = %note.athlete_id, "note created");
    Ok(created(id))
}

async fn list_for_athlete(
    state: &AppState,
    collection: &str,
    params: &HashMap<String, String>,
) -> ApiResult<Json<Vec<Value>>> {
    let limit = parse_limit(params, DEFAULT_RECORD_LIMIT)?;
    let filter = match param(params, "athlete_id") {
        Some(athlete_id) => Filter::new().equals("athlete_id", athlete_id),
        None => Filter::new(),
    };
    let records = state.db.query(collection, &filter, limit).await?;
    Ok(Json(records.into_iter().map(expose_id).collect()))
}

pub(crate) async fn list_notes_handler(
    State(state): State<AppState>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> ApiResult<Json<Vec<Value>>> {
    let Query(params) = query?;
    list_for_athlete(&state, NOTE.collection, &params).await
}

pub(crate) async fn create_skill_plan_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let input = parse_body(&SKILL_PLAN, &body)?;
    let plan = SkillPlan::from_input(&input)?;
    check_reference("athlete_id", &plan.athlete_id)?;
    let id = state
        .db
        .insert(SKILL_PLAN.collection, plan.to_document())
        .await?;
    info!(id = %id, athlete_id = %plan.athlete_id, "skill plan created");
    Ok(created(id))
}

pub(crate) async fn list_skill_plans_handler(
    State(state): State<AppState>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> ApiResult<Json<Vec<Value>>> {
    let Query(params) = query?;
    list_for_athlete(&state, SKILL_PLAN.collection, &params).await
}
