//! `/api/chatbot/ask/`: a keyword-driven helper answering from the caller's
//! own data. No language model is involved.

use crate::auth::AuthUser;
use crate::response::{self, db_error};
use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::{DateTime, Utc};
use db::{
    analytics, learning_path,
    models::{assessment, assignment, course, exam, exam::ExamStatus, user::Role},
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use util::state::AppState;

pub fn chatbot_routes() -> Router<AppState> {
    Router::new().route("/chatbot/ask/", post(ask))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Deadlines,
    Grades,
    Courses,
    Help,
}

const KEYWORDS: [(Intent, &[&str]); 3] = [
    (Intent::Deadlines, &["deadline", "due", "upcoming", "when", "schedule"]),
    (Intent::Grades, &["grade", "score", "mark", "result", "perform"]),
    (Intent::Courses, &["course", "enrol", "class", "subject"]),
];

/// First intent whose keyword appears in the message, else `Help`.
pub fn classify(message: &str) -> Intent {
    let message = message.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| message.contains(w)))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::Help)
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub intent: Intent,
    pub reply: String,
    pub data: Value,
}

const HELP_REPLY: &str = "I can tell you about your upcoming deadlines, your grades or your courses. \
Try asking \"what is due soon?\"";

/// POST /api/chatbot/ask/
///
/// ### Request Body
/// ```json
/// { "message": "What is due this week?" }
/// ```
///
/// ### Responses
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": {
///     "intent": "deadlines",
///     "reply": "You have 2 upcoming items. Next: Midterm (Algebra I).",
///     "data": [ ... ]
///   },
///   "message": "Answer generated"
/// }
/// ```
/// - `400 Bad Request` (empty message)
pub async fn ask(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<AskRequest>,
) -> impl IntoResponse {
    if req.message.trim().is_empty() {
        return response::error(StatusCode::BAD_REQUEST, "Message must not be empty");
    }

    let intent = classify(&req.message);
    let db = app_state.db();

    let answer = match (intent, user.role()) {
        (Intent::Help, _) => Ok(AskResponse {
            intent,
            reply: HELP_REPLY.to_string(),
            data: Value::Null,
        }),
        (_, Role::Student) => student_answer(db, user.id(), intent).await,
        (_, _) => staff_answer(db, &user, intent).await,
    };

    match answer {
        Ok(body) => response::ok(StatusCode::OK, body, "Answer generated"),
        Err(resp) => resp,
    }
}

async fn student_answer(db: &DatabaseConnection, student_id: i64, intent: Intent) -> Result<AskResponse, Response> {
    let (reply, data) = match intent {
        Intent::Deadlines => {
            let path = learning_path::learning_path(db, student_id).await.map_err(db_error)?;
            let reply = match path.upcoming.first() {
                None => "You have nothing outstanding. Well done!".to_string(),
                Some(next) => format!(
                    "You have {} upcoming item(s). Next: {} ({}).",
                    path.upcoming.len(),
                    next.title,
                    next.course_title
                ),
            };
            (reply, json!(path.upcoming))
        }
        Intent::Grades => {
            let dash = learning_path::dashboard(db, student_id).await.map_err(db_error)?;
            let reply = match dash.average_score {
                None => "You have no graded work yet.".to_string(),
                Some(avg) => format!(
                    "Your average across {} graded item(s) is {:.1}%.",
                    dash.completed_items, avg
                ),
            };
            (reply, json!(dash.recent_results))
        }
        Intent::Courses | Intent::Help => {
            let path = learning_path::learning_path(db, student_id).await.map_err(db_error)?;
            let reply = format!(
                "You are enrolled in {} course(s) with {} enrollment request(s) pending. Overall completion is {:.1}%.",
                path.courses.len(),
                path.pending_courses.len(),
                path.overall_completion
            );
            (reply, json!({ "courses": path.courses, "pending": path.pending_courses }))
        }
    };

    Ok(AskResponse { intent, reply, data })
}

#[derive(Debug, Serialize)]
struct DueItem {
    kind: &'static str,
    id: i64,
    course_title: String,
    title: String,
    due_date: DateTime<Utc>,
}

/// Dated work in the given courses that is not yet past due, soonest first.
async fn upcoming_in(db: &DatabaseConnection, courses: &[course::Model]) -> Result<Vec<DueItem>, Response> {
    let now = Utc::now();
    let mut items = Vec::new();

    for c in courses {
        for a in assessment::Model::for_course(db, c.id).await.map_err(db_error)? {
            if let Some(due) = a.due_date.filter(|d| *d >= now) {
                items.push(DueItem { kind: "assessment", id: a.id, course_title: c.title.clone(), title: a.title, due_date: due });
            }
        }
        for a in assignment::Model::for_course(db, c.id).await.map_err(db_error)? {
            if let Some(due) = a.due_date.filter(|d| *d >= now) {
                items.push(DueItem { kind: "assignment", id: a.id, course_title: c.title.clone(), title: a.title, due_date: due });
            }
        }
        for e in exam::Model::for_course(db, c.id).await.map_err(db_error)? {
            if e.status == ExamStatus::Completed {
                continue;
            }
            if let Some(due) = e.due_date.filter(|d| *d >= now) {
                items.push(DueItem { kind: "exam", id: e.id, course_title: c.title.clone(), title: e.title, due_date: due });
            }
        }
    }

    items.sort_by_key(|i| i.due_date);
    Ok(items)
}

async fn staff_answer(db: &DatabaseConnection, user: &AuthUser, intent: Intent) -> Result<AskResponse, Response> {
    let courses = if user.is_admin() {
        course::Model::list(db).await
    } else {
        course::Model::find_by_teacher(db, user.id()).await
    }
    .map_err(db_error)?;

    let (reply, data) = match intent {
        Intent::Deadlines => {
            let items = upcoming_in(db, &courses).await?;
            let reply = match items.first() {
                None => "No upcoming deadlines in your courses.".to_string(),
                Some(next) => format!(
                    "{} upcoming deadline(s). Next: {} ({}).",
                    items.len(),
                    next.title,
                    next.course_title
                ),
            };
            (reply, json!(items))
        }
        Intent::Grades => {
            let report = analytics::teacher_analytics(db, user.id()).await.map_err(db_error)?;
            let ungraded: usize = report.courses.iter().map(|c| c.ungraded_work + c.ungraded_attempts).sum();
            let reply = format!(
                "{} submission(s) across your courses, {} still waiting for a grade.",
                report.total_submissions, ungraded
            );
            (reply, json!(report.courses))
        }
        Intent::Courses | Intent::Help => {
            let reply = format!("You can see {} course(s).", courses.len());
            (reply, json!(courses))
        }
    };

    Ok(AskResponse { intent, reply, data })
}
