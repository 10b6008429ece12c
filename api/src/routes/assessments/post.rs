use super::{find_assessment, owned_answer, owned_assessment};
use crate::auth::AuthUser;
use crate::response::{self, db_error, format_validation_errors, model_error};
use crate::routes::common::{
    ai_verdict, commit_file, discard_file, owned_course, read_limited_upload, require_enrollment, store_tagged_file,
};
use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use db::models::{ai_detection::DetectionReport, assessment, student_answer};
use serde::Deserialize;
use util::{paths::UploadKind, state::AppState};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAssessmentRequest {
    pub course_id: i64,
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 1, message = "total_marks must be positive"))]
    #[serde(default = "default_total_marks")]
    pub total_marks: i32,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

pub(crate) fn default_total_marks() -> i32 {
    100
}

/// POST /api/assessments/
///
/// ### Request Body
/// ```json
/// {
///   "course_id": 1,
///   "title": "Week 3 worksheet",
///   "description": "Fractions",
///   "total_marks": 20,
///   "due_date": "2025-10-20T23:59:00Z"
/// }
/// ```
///
/// ### Responses
/// - `201 Created`
/// - `400 Bad Request` (validation failure)
/// - `403 Forbidden` (not the course teacher)
/// - `404 Not Found` (no such course)
pub async fn create_assessment(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateAssessmentRequest>,
) -> impl IntoResponse {
    let db = app_state.db();
    if let Err(e) = req.validate() {
        return response::error(StatusCode::BAD_REQUEST, format_validation_errors(&e));
    }
    if let Err(resp) = owned_course(db, req.course_id, &user).await {
        return resp;
    }

    match assessment::Model::create(
        db,
        req.course_id,
        req.title.trim(),
        &req.description,
        req.total_marks,
        req.due_date,
    )
    .await
    {
        Ok(a) => response::ok(StatusCode::CREATED, a, "Assessment created"),
        Err(e) => db_error(e),
    }
}

/// POST /api/assessments/{assessment_id}/questions/
///
/// Multipart upload with the questions document in field `file`. Stored
/// under `exam_questions/`; a new upload replaces the previous one.
///
/// ### Responses
/// - `200 OK` with the assessment
/// - `400 Bad Request` (no file)
/// - `413 Payload Too Large`
pub async fn upload_questions(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(assessment_id): Path<i64>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let db = app_state.db();
    let assessment = match owned_assessment(db, assessment_id, &user).await {
        Ok(a) => a,
        Err(resp) => return resp,
    };

    let form = match read_limited_upload(db, &mut multipart).await {
        Ok(f) => f,
        Err(resp) => return resp,
    };
    let Some(file) = form.file.as_ref() else {
        return response::error(StatusCode::BAD_REQUEST, "No file provided");
    };

    let staged = match store_tagged_file(UploadKind::ExamQuestions, assessment.id, "assessment", file).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let stored = staged.stored();
    let result = assessment::Model::set_questions_file(db, assessment.id, &stored.relative_path, &stored.filename).await;
    match result {
        Ok(updated) => {
            let stored = match commit_file(staged) {
                Ok(s) => s,
                Err(resp) => return resp,
            };
            if let Some(old) = assessment.questions_file.filter(|old| *old != stored.relative_path) {
                discard_file(&old).await;
            }
            response::ok(StatusCode::OK, updated, "Questions uploaded")
        }
        Err(e) => db_error(e),
    }
}

/// POST /api/assessments/{assessment_id}/answers/
///
/// Multipart form with `answer_text` and an optional `file`. Submitting again
/// replaces the previous answer and clears its score and AI-detection
/// results; a replaced file is removed from storage.
///
/// ### Responses
/// - `200 OK` with the stored answer
/// - `400 Bad Request` (neither text nor file)
/// - `403 Forbidden` (not enrolled)
/// - `413 Payload Too Large`
pub async fn submit_answer(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(assessment_id): Path<i64>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let db = app_state.db();
    let assessment = match find_assessment(db, assessment_id).await {
        Ok(a) => a,
        Err(resp) => return resp,
    };
    if let Err(resp) = require_enrollment(db, assessment.course_id, &user).await {
        return resp;
    }

    let form = match read_limited_upload(db, &mut multipart).await {
        Ok(f) => f,
        Err(resp) => return resp,
    };
    let text = form.text("answer_text").unwrap_or_default().trim().to_string();
    if text.is_empty() && form.file.is_none() {
        return response::error(StatusCode::BAD_REQUEST, "Provide answer_text or a file");
    }

    let staged = match form.file.as_ref() {
        Some(file) => {
            match store_tagged_file(UploadKind::StudentAnswers, assessment.id, &user.id().to_string(), file).await {
                Ok(s) => Some(s),
                Err(resp) => return resp,
            }
        }
        None => None,
    };

    let file = staged.as_ref().map(|s| s.stored());
    let result = student_answer::Model::submit(db, assessment.id, user.id(), &text, file).await;
    match result {
        Ok((answer, replaced)) => {
            if let Some(staged) = staged {
                if let Err(resp) = commit_file(staged) {
                    return resp;
                }
            }
            if let Some(old) = replaced {
                discard_file(&old).await;
            }
            tracing::info!(answer_id = answer.id, assessment_id, student_id = user.id(), "Answer submitted");
            response::ok(StatusCode::OK, answer, "Answer submitted")
        }
        Err(e) => db_error(e),
    }
}

/// POST /api/assessments/answers/{answer_id}/ai-detection/
///
/// ### Request Body
/// ```json
/// { "score": 91.0, "result": { "sentences_flagged": 12 } }
/// ```
///
/// ### Responses
/// - `200 OK` with the answer
/// - `400 Bad Request` (score outside 0–100)
pub async fn record_answer_ai_detection(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(answer_id): Path<i64>,
    Json(report): Json<DetectionReport>,
) -> impl IntoResponse {
    let db = app_state.db();
    if let Err(resp) = owned_answer(db, answer_id, &user).await {
        return resp;
    }
    let verdict = match ai_verdict(db, report).await {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match student_answer::Model::record_ai_detection(db, answer_id, &verdict).await {
        Ok(answer) => {
            if answer.is_flagged_ai {
                tracing::warn!(answer_id, score = verdict.score, "Answer flagged for AI-generated content");
            }
            response::ok(StatusCode::OK, answer, "AI detection recorded")
        }
        Err(e) => model_error(e),
    }
}
