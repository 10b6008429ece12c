use super::{find_assignment, owned_assignment, owned_submission};
use crate::auth::AuthUser;
use crate::response::{self, db_error, format_validation_errors, model_error};
use crate::routes::assessments::post::default_total_marks;
use crate::routes::common::{
    ai_verdict, commit_file, discard_file, owned_course, read_limited_upload, require_enrollment, store_file, store_tagged_file,
};
use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use db::models::{ai_detection::DetectionReport, assignment, assignment_submission};
use serde::Deserialize;
use util::{paths::UploadKind, state::AppState};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAssignmentRequest {
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

/// POST /api/assessments/assignments/
///
/// ### Request Body
/// ```json
/// { "course_id": 1, "title": "Essay", "total_marks": 100, "due_date": "2025-11-15T17:00:00Z" }
/// ```
///
/// ### Responses
/// - `201 Created`
/// - `400 Bad Request`
/// - `403 Forbidden`
pub async fn create_assignment(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateAssignmentRequest>,
) -> impl IntoResponse {
    let db = app_state.db();
    if let Err(e) = req.validate() {
        return response::error(StatusCode::BAD_REQUEST, format_validation_errors(&e));
    }
    if let Err(resp) = owned_course(db, req.course_id, &user).await {
        return resp;
    }

    match assignment::Model::create(
        db,
        req.course_id,
        req.title.trim(),
        &req.description,
        req.total_marks,
        req.due_date,
    )
    .await
    {
        Ok(a) => response::ok(StatusCode::CREATED, a, "Assignment created"),
        Err(e) => db_error(e),
    }
}

/// POST /api/assessments/assignments/{assignment_id}/attachment/
///
/// Multipart upload (field `file`) stored under `assignment_attachments/`.
pub async fn upload_attachment(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(assignment_id): Path<i64>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let db = app_state.db();
    let assignment = match owned_assignment(db, assignment_id, &user).await {
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

    let staged = match store_file(UploadKind::AssignmentAttachments, assignment.id, file).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let stored = staged.stored();
    let result = assignment::Model::set_attachment(db, assignment.id, &stored.relative_path, &stored.filename).await;
    match result {
        Ok(updated) => {
            let stored = match commit_file(staged) {
                Ok(s) => s,
                Err(resp) => return resp,
            };
            if let Some(old) = assignment.attachment.filter(|old| *old != stored.relative_path) {
                discard_file(&old).await;
            }
            response::ok(StatusCode::OK, updated, "Attachment uploaded")
        }
        Err(e) => db_error(e),
    }
}

/// POST /api/assessments/assignments/{assignment_id}/submissions/
///
/// Multipart form with `content` and an optional `file` (stored under
/// `assignments/`). Submitting again replaces the previous submission and
/// clears its grade, feedback and AI-detection results.
pub async fn submit_assignment(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(assignment_id): Path<i64>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let db = app_state.db();
    let assignment = match find_assignment(db, assignment_id).await {
        Ok(a) => a,
        Err(resp) => return resp,
    };
    if let Err(resp) = require_enrollment(db, assignment.course_id, &user).await {
        return resp;
    }

    let form = match read_limited_upload(db, &mut multipart).await {
        Ok(f) => f,
        Err(resp) => return resp,
    };
    let content = form.text("content").unwrap_or_default().trim().to_string();
    if content.is_empty() && form.file.is_none() {
        return response::error(StatusCode::BAD_REQUEST, "Provide content or a file");
    }

    let staged = match form.file.as_ref() {
        Some(file) => match store_tagged_file(
            UploadKind::AssignmentSubmissions,
            assignment.id,
            &user.id().to_string(),
            file,
        )
        .await
        {
            Ok(s) => Some(s),
            Err(resp) => return resp,
        },
        None => None,
    };

    let file = staged.as_ref().map(|s| s.stored());
    let result = assignment_submission::Model::submit(db, assignment.id, user.id(), &content, file).await;
    match result {
        Ok((submission, replaced)) => {
            if let Some(staged) = staged {
                if let Err(resp) = commit_file(staged) {
                    return resp;
                }
            }
            if let Some(old) = replaced {
                discard_file(&old).await;
            }
            tracing::info!(
                submission_id = submission.id,
                assignment_id,
                student_id = user.id(),
                "Assignment submitted"
            );
            response::ok(StatusCode::OK, submission, "Assignment submitted")
        }
        Err(e) => db_error(e),
    }
}

/// POST /api/assessments/submissions/{submission_id}/ai-detection/
pub async fn record_submission_ai_detection(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(submission_id): Path<i64>,
    Json(report): Json<DetectionReport>,
) -> impl IntoResponse {
    let db = app_state.db();
    if let Err(resp) = owned_submission(db, submission_id, &user).await {
        return resp;
    }
    let verdict = match ai_verdict(db, report).await {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match assignment_submission::Model::record_ai_detection(db, submission_id, &verdict).await {
        Ok(submission) => {
            if submission.is_flagged_ai {
                tracing::warn!(submission_id, score = verdict.score, "Submission flagged for AI-generated content");
            }
            response::ok(StatusCode::OK, submission, "AI detection recorded")
        }
        Err(e) => model_error(e),
    }
}
