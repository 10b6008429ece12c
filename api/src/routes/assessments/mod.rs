//! Assessment routes module.
//!
//! Provides the `/assessments` route group: assessments with their question
//! sheets and student answers, plus the nested assignment routes.
//!
//! Access control:
//! - Listing is open to authenticated users; students must hold an approved
//!   enrollment in the course.
//! - Creating, uploading questions, grading and recording AI-detection
//!   results need an approved teacher who owns the course (admins pass).
//! - Submitting answers needs an enrolled student.

use crate::auth::{
    AuthUser,
    guards::{allow_approved_teacher, allow_authenticated, allow_student},
};
use crate::response::{self, db_error};
use crate::routes::common::owned_course;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    response::Response,
    routing::{get, post, put},
};
use db::models::{assessment, student_answer};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Deserialize;
use util::state::AppState;

pub mod assignments;
pub mod get;
pub mod post;
pub mod put;

/// Builds and returns the `/assessments` route group.
///
/// Routes:
/// - `GET  /assessments/?course_id=`                          → List a course's assessments
/// - `POST /assessments/`                                     → Create an assessment (owner)
/// - `POST /assessments/{assessment_id}/questions/`           → Upload the questions file (owner, multipart)
/// - `GET  /assessments/{assessment_id}/answers/`             → Answers (owner: all, student: own)
/// - `POST /assessments/{assessment_id}/answers/`             → Submit or replace an answer (student, multipart)
/// - `PUT  /assessments/answers/{answer_id}/grade/`           → Grade an answer (owner)
/// - `POST /assessments/answers/{answer_id}/ai-detection/`    → Record an AI-detection result (owner)
///
/// Nested routes:
/// - Assignment and submission routes → `assignments::assignment_routes`
pub fn assessments_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .merge(
            Router::new()
                .route("/assessments/", get(get::list_assessments))
                .route("/assessments/{assessment_id}/answers/", get(get::list_answers))
                .route_layer(from_fn(allow_authenticated)),
        )
        .merge(
            Router::new()
                .route("/assessments/", post(post::create_assessment))
                .route(
                    "/assessments/{assessment_id}/questions/",
                    post(post::upload_questions),
                )
                .route("/assessments/answers/{answer_id}/grade/", put(put::grade_answer))
                .route(
                    "/assessments/answers/{answer_id}/ai-detection/",
                    post(post::record_answer_ai_detection),
                )
                .route_layer(from_fn_with_state(app_state.clone(), allow_approved_teacher)),
        )
        .merge(
            Router::new()
                .route("/assessments/{assessment_id}/answers/", post(post::submit_answer))
                .route_layer(from_fn(allow_student)),
        )
        .merge(assignments::assignment_routes(app_state))
        .layer(DefaultBodyLimit::disable())
}

#[derive(Debug, Deserialize)]
pub struct CourseFilter {
    pub course_id: Option<i64>,
}

pub async fn find_assessment(db: &DatabaseConnection, assessment_id: i64) -> Result<assessment::Model, Response> {
    assessment::Entity::find_by_id(assessment_id)
        .one(db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| response::error(StatusCode::NOT_FOUND, "Assessment not found"))
}

/// The assessment, if the caller teaches its course or is an admin.
pub async fn owned_assessment(
    db: &DatabaseConnection,
    assessment_id: i64,
    user: &AuthUser,
) -> Result<assessment::Model, Response> {
    let assessment = find_assessment(db, assessment_id).await?;
    owned_course(db, assessment.course_id, user).await?;
    Ok(assessment)
}

/// The answer, if the caller teaches the course it was submitted to.
pub async fn owned_answer(
    db: &DatabaseConnection,
    answer_id: i64,
    user: &AuthUser,
) -> Result<student_answer::Model, Response> {
    let answer = student_answer::Entity::find_by_id(answer_id)
        .one(db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| response::error(StatusCode::NOT_FOUND, "Answer not found"))?;
    owned_assessment(db, answer.assessment_id, user).await?;
    Ok(answer)
}
