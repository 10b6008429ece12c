use super::{course_exam, find_attempt};
use crate::auth::AuthUser;
use crate::response::{self, model_error};
use crate::routes::common::{
    ai_verdict, commit_file, discard_file, find_course, owned_course, read_limited_upload, require_enrollment,
    store_file, store_tagged_file,
};
use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use db::models::{
    ai_detection::DetectionReport,
    exam::{self, ExamStatus, NewExam},
    exam_attempt::Model as Attempt,
};
use util::{paths::UploadKind, state::AppState};

/// POST /api/courses/{course_id}/exams/
///
/// Creates a `draft` exam.
///
/// ### Request Body
/// ```json
/// {
///   "title": "Midterm",
///   "description": "Chapters 1-4",
///   "exam_type": "Mid",
///   "total_marks": 50,
///   "duration_minutes": 90,
///   "due_date": "2025-11-01T09:00:00Z",
///   "question_count": 20
/// }
/// ```
///
/// ### Responses
/// - `201 Created`
/// - `400 Bad Request` (non-positive marks or duration)
/// - `403 Forbidden`
pub async fn create_exam(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(course_id): Path<i64>,
    Json(req): Json<NewExam>,
) -> impl IntoResponse {
    let db = app_state.db();
    if let Err(resp) = owned_course(db, course_id, &user).await {
        return resp;
    }
    if req.title.trim().is_empty() {
        return response::error(StatusCode::BAD_REQUEST, "Title is required");
    }

    match exam::Model::create(db, course_id, req).await {
        Ok(exam) => response::ok(StatusCode::CREATED, exam, "Exam created"),
        Err(e) => model_error(e),
    }
}

/// POST /api/courses/{course_id}/exams/{exam_id}/questions/
///
/// Multipart upload. Field `file` holds the questions document; the optional
/// text field `question_count` updates the exam's question count. A new
/// upload replaces the previous file.
///
/// ### Responses
/// - `200 OK` with the exam
/// - `400 Bad Request` (no file, or the exam is completed)
/// - `413 Payload Too Large`
pub async fn upload_questions(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((course_id, exam_id)): Path<(i64, i64)>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let db = app_state.db();
    if let Err(resp) = owned_course(db, course_id, &user).await {
        return resp;
    }
    let exam = match course_exam(db, course_id, exam_id).await {
        Ok(e) => e,
        Err(resp) => return resp,
    };
    if exam.status == ExamStatus::Completed {
        return response::error(StatusCode::BAD_REQUEST, "Cannot change questions of a completed exam");
    }

    let form = match read_limited_upload(db, &mut multipart).await {
        Ok(f) => f,
        Err(resp) => return resp,
    };
    let Some(file) = form.file.as_ref() else {
        return response::error(StatusCode::BAD_REQUEST, "No file provided");
    };
    let question_count = match form.text("question_count").map(|v| v.trim().parse::<i32>()) {
        None => None,
        Some(Ok(n)) if n >= 0 => Some(n),
        Some(_) => return response::error(StatusCode::BAD_REQUEST, "question_count must be a non-negative integer"),
    };

    let staged = match store_tagged_file(UploadKind::ExamQuestions, exam.id, "exam", file).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let stored = staged.stored();
    let result =
        exam::Model::set_questions_file(db, exam.id, &stored.relative_path, &stored.filename, question_count).await;
    match result {
        Ok(updated) => {
            let stored = match commit_file(staged) {
                Ok(s) => s,
                Err(resp) => return resp,
            };
            if let Some(old) = exam.questions_file.filter(|old| *old != stored.relative_path) {
                discard_file(&old).await;
            }
            response::ok(StatusCode::OK, updated, "Questions uploaded")
        }
        Err(e) => model_error(e),
    }
}

/// POST /api/courses/{course_id}/exams/{exam_id}/attempts/
///
/// Opens an attempt for the calling student.
///
/// ### Responses
/// - `201 Created` with the attempt
/// - `400 Bad Request` (exam not published)
/// - `403 Forbidden` (not enrolled)
/// - `409 Conflict` (an attempt is already open)
pub async fn start_attempt(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((course_id, exam_id)): Path<(i64, i64)>,
) -> impl IntoResponse {
    let db = app_state.db();
    if let Err(resp) = find_course(db, course_id).await {
        return resp;
    }
    if let Err(resp) = require_enrollment(db, course_id, &user).await {
        return resp;
    }
    let exam = match course_exam(db, course_id, exam_id).await {
        Ok(e) => e,
        Err(resp) => return resp,
    };

    match Attempt::start(db, &exam, user.id()).await {
        Ok(attempt) => response::ok(StatusCode::CREATED, attempt, "Attempt started"),
        Err(e) => model_error(e),
    }
}

/// POST /api/courses/{course_id}/exams/{exam_id}/attempts/{attempt_id}/submit/
///
/// Multipart form with an optional `answer_text` field and an optional
/// `file`. At least one must be present. Time taken is recorded in whole
/// minutes, rounded up.
///
/// ### Responses
/// - `200 OK` with the submitted attempt
/// - `400 Bad Request` (empty submission)
/// - `404 Not Found` (not the caller's attempt)
/// - `409 Conflict` (already submitted)
/// - `413 Payload Too Large`
pub async fn submit_attempt(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((course_id, exam_id, attempt_id)): Path<(i64, i64, i64)>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let db = app_state.db();
    if let Err(resp) = course_exam(db, course_id, exam_id).await {
        return resp;
    }
    let attempt = match find_attempt(db, exam_id, attempt_id).await {
        Ok(a) if a.student_id == user.id() => a,
        Ok(_) => return response::error(StatusCode::NOT_FOUND, "Attempt not found"),
        Err(resp) => return resp,
    };
    if !attempt.is_open() {
        return response::error(StatusCode::CONFLICT, "Attempt has already been submitted");
    }

    let form = match read_limited_upload(db, &mut multipart).await {
        Ok(f) => f,
        Err(resp) => return resp,
    };
    let text = form
        .text("answer_text")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);
    if text.is_none() && form.file.is_none() {
        return response::error(StatusCode::BAD_REQUEST, "Provide answer_text or a file");
    }

    let staged = match form.file.as_ref() {
        Some(file) => match store_file(UploadKind::ExamAnswers, attempt.id, file).await {
            Ok(s) => Some(s),
            Err(resp) => return resp,
        },
        None => None,
    };

    let result = Attempt::submit(db, attempt.id, user.id(), text, staged.as_ref().map(|s| s.stored())).await;
    match result {
        Ok(submitted) => {
            if let Some(staged) = staged {
                if let Err(resp) = commit_file(staged) {
                    return resp;
                }
            }
            tracing::info!(attempt_id = submitted.id, exam_id, student_id = user.id(), "Exam attempt submitted");
            response::ok(StatusCode::OK, submitted, "Attempt submitted")
        }
        Err(e) => model_error(e),
    }
}

/// POST /api/courses/{course_id}/exams/{exam_id}/attempts/{attempt_id}/ai-detection/
///
/// Stores a result produced by an external AI-writing detector.
///
/// ### Request Body
/// ```json
/// { "score": 82.0, "result": { "model": "detector-v2" }, "flag_reason": null }
/// ```
///
/// ### Responses
/// - `200 OK` with the attempt; `is_flagged_ai` is set when the score reaches the configured threshold
/// - `400 Bad Request` (score outside 0–100)
pub async fn record_attempt_ai_detection(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((course_id, exam_id, attempt_id)): Path<(i64, i64, i64)>,
    Json(report): Json<DetectionReport>,
) -> impl IntoResponse {
    let db = app_state.db();
    if let Err(resp) = owned_course(db, course_id, &user).await {
        return resp;
    }
    if let Err(resp) = course_exam(db, course_id, exam_id).await {
        return resp;
    }
    if let Err(resp) = find_attempt(db, exam_id, attempt_id).await {
        return resp;
    }

    let verdict = match ai_verdict(db, report).await {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match Attempt::record_ai_detection(db, attempt_id, &verdict).await {
        Ok(attempt) => {
            if attempt.is_flagged_ai {
                tracing::warn!(attempt_id, score = verdict.score, "Exam attempt flagged for AI-generated content");
            }
            response::ok(StatusCode::OK, attempt, "AI detection recorded")
        }
        Err(e) => model_error(e),
    }
}
