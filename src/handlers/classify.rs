//! Classification handlers
//!
//! One operation, two surfaces: the HTML form post re-renders the page with
//! the decoded label, the JSON route answers machine-readable. Both build a
//! single-record batch, predict, and decode through the label encoder.

use axum::extract::State;
use axum::response::Html;
use axum::{Form, Json};
use serde::Serialize;

use crate::record::AccidentRecord;
use crate::{AppError, AppResult, AppState};

use super::page::{self, ClassifiedResult};

/// `POST /classify` — HTML form submission.
pub async fn classify_form(
    State(state): State<AppState>,
    Form(record): Form<AccidentRecord>,
) -> AppResult<Html<String>> {
    let result: ClassifiedResult = run(&state, record)?.into();
    Ok(Html(page::render(&state, Some(&result))))
}

#[derive(Serialize)]
pub struct ClassifyResponse {
    pub label: String,
    pub class_index: usize,
    /// The record exactly as it was scored, echoed for audit.
    pub record: AccidentRecord,
}

/// `POST /api/v1/classify` — JSON in, JSON out.
pub async fn classify_json(
    State(state): State<AppState>,
    Json(record): Json<AccidentRecord>,
) -> AppResult<Json<ClassifyResponse>> {
    let result = run(&state, record)?;
    Ok(Json(ClassifyResponse {
        label: result.label,
        class_index: result.class_index,
        record: result.record,
    }))
}

fn run(state: &AppState, record: AccidentRecord) -> AppResult<Classified> {
    let verified = (*state.engine)
        .as_ref()
        .map_err(|e| AppError::ModelUnavailable(format!("model not loaded: {}", e)))?;

    let indices = verified.model.predict(std::slice::from_ref(&record))?;
    let class_index = indices
        .first()
        .copied()
        .ok_or_else(|| AppError::InternalError("predictor returned empty batch".to_string()))?;

    let label = verified
        .encoder
        .inverse_transform(class_index)
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .to_string();

    tracing::info!(label = %label, class_index, "record classified");

    Ok(Classified {
        label,
        class_index,
        record,
    })
}

struct Classified {
    label: String,
    class_index: usize,
    record: AccidentRecord,
}

impl From<Classified> for ClassifiedResult {
    fn from(c: Classified) -> Self {
        ClassifiedResult {
            label: c.label,
            record: c.record,
        }
    }
}
