//! Assignment routes nested under `/assessments/assignments` and
//! `/assessments/submissions`.

use crate::auth::{
    AuthUser,
    guards::{allow_approved_teacher, allow_authenticated, allow_student},
};
use crate::response::{self, db_error};
use crate::routes::common::owned_course;
use axum::{
    Router,
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    response::Response,
    routing::{get, post, put},
};
use db::models::{assignment, assignment_submission};
use sea_orm::{DatabaseConnection, EntityTrait};
use util::state::AppState;

pub mod get;
pub mod post;
pub mod put;

/// Routes:
/// - `GET  /assessments/assignments/?course_id=`                       → List a course's assignments
/// - `POST /assessments/assignments/`                                  → Create an assignment (owner)
/// - `POST /assessments/assignments/{assignment_id}/attachment/`       → Upload the attachment (owner, multipart)
/// - `GET  /assessments/assignments/{assignment_id}/submissions/`      → Submissions (owner: all, student: own)
/// - `POST /assessments/assignments/{assignment_id}/submissions/`      → Submit or replace (student, multipart)
/// - `PUT  /assessments/submissions/{submission_id}/grade/`            → Grade with feedback (owner)
/// - `POST /assessments/submissions/{submission_id}/ai-detection/`     → Record an AI-detection result (owner)
pub fn assignment_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .merge(
            Router::new()
                .route("/assessments/assignments/", get(get::list_assignments))
                .route(
                    "/assessments/assignments/{assignment_id}/submissions/",
                    get(get::list_submissions),
                )
                .route_layer(from_fn(allow_authenticated)),
        )
        .merge(
            Router::new()
                .route("/assessments/assignments/", post(post::create_assignment))
                .route(
                    "/assessments/assignments/{assignment_id}/attachment/",
                    post(post::upload_attachment),
                )
                .route(
                    "/assessments/submissions/{submission_id}/grade/",
                    put(put::grade_submission),
                )
                .route(
                    "/assessments/submissions/{submission_id}/ai-detection/",
                    post(post::record_submission_ai_detection),
                )
                .route_layer(from_fn_with_state(app_state, allow_approved_teacher)),
        )
        .merge(
            Router::new()
                .route(
                    "/assessments/assignments/{assignment_id}/submissions/",
                    post(post::submit_assignment),
                )
                .route_layer(from_fn(allow_student)),
        )
}

pub async fn find_assignment(db: &DatabaseConnection, assignment_id: i64) -> Result<assignment::Model, Response> {
    assignment::Entity::find_by_id(assignment_id)
        .one(db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| response::error(StatusCode::NOT_FOUND, "Assignment not found"))
}

pub async fn owned_assignment(
    db: &DatabaseConnection,
    assignment_id: i64,
    user: &AuthUser,
) -> Result<assignment::Model, Response> {
    let assignment = find_assignment(db, assignment_id).await?;
    owned_course(db, assignment.course_id, user).await?;
    Ok(assignment)
}

pub async fn owned_submission(
    db: &DatabaseConnection,
    submission_id: i64,
    user: &AuthUser,
) -> Result<assignment_submission::Model, Response> {
    let submission = assignment_submission::Entity::find_by_id(submission_id)
        .one(db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| response::error(StatusCode::NOT_FOUND, "Submission not found"))?;
    owned_assignment(db, submission.assignment_id, user).await?;
    Ok(submission)
}
