//! Per-student progress views: the learning path and the dashboard.

use crate::models::{
    assessment, assignment, assignment_submission, course, course_enrollment,
    course_enrollment::EnrollmentStatus, exam, exam::ExamStatus, exam_attempt, student_answer,
};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, DbConn, DbErr, EntityTrait, QueryFilter};
use serde::Serialize;
use std::collections::HashMap;

const UPCOMING_LIMIT: usize = 10;
const RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Assessment,
    Assignment,
    Exam,
}

/// One gradable item of a course from a single student's point of view.
#[derive(Debug, Clone)]
pub(crate) struct WorkItem {
    pub kind: ItemKind,
    pub id: i64,
    pub title: String,
    pub due_date: Option<DateTime<Utc>>,
    pub completed: bool,
    /// Percentage of total marks, once graded.
    pub percentage: Option<f64>,
    /// When the latest result for this item was produced.
    pub result_at: Option<DateTime<Utc>>,
    pub score: Option<f64>,
}

fn percent(score: f64, total: i32) -> Option<f64> {
    (total > 0).then(|| (score / f64::from(total) * 10000.0).round() / 100.0)
}

pub(crate) fn average(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.into_iter().fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| (sum / n as f64 * 100.0).round() / 100.0)
}

/// Collects every assessment, assignment and non-draft exam of the course
/// together with the student's progress on each.
pub(crate) async fn course_work(db: &DbConn, course_id: i64, student_id: i64) -> Result<Vec<WorkItem>, DbErr> {
    let mut items = Vec::new();

    let assessments = assessment::Model::for_course(db, course_id).await?;
    let assessment_ids: Vec<i64> = assessments.iter().map(|a| a.id).collect();
    let answers: HashMap<i64, student_answer::Model> = student_answer::Entity::find()
        .filter(student_answer::Column::StudentId.eq(student_id))
        .filter(student_answer::Column::AssessmentId.is_in(assessment_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|a| (a.assessment_id, a))
        .collect();
    for a in assessments {
        let answer = answers.get(&a.id);
        let score = answer.and_then(|x| x.score);
        items.push(WorkItem {
            kind: ItemKind::Assessment,
            id: a.id,
            title: a.title,
            due_date: a.due_date,
            completed: answer.is_some(),
            percentage: score.and_then(|s| percent(s, a.total_marks)),
            result_at: answer.map(|x| x.submitted_at),
            score,
        });
    }

    let assignments = assignment::Model::for_course(db, course_id).await?;
    let assignment_ids: Vec<i64> = assignments.iter().map(|a| a.id).collect();
    let submissions: HashMap<i64, assignment_submission::Model> = assignment_submission::Entity::find()
        .filter(assignment_submission::Column::StudentId.eq(student_id))
        .filter(assignment_submission::Column::AssignmentId.is_in(assignment_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.assignment_id, s))
        .collect();
    for a in assignments {
        let submission = submissions.get(&a.id);
        let score = submission.and_then(|x| x.score);
        items.push(WorkItem {
            kind: ItemKind::Assignment,
            id: a.id,
            title: a.title,
            due_date: a.due_date,
            completed: submission.is_some(),
            percentage: score.and_then(|s| percent(s, a.total_marks)),
            result_at: submission.map(|x| x.submitted_at),
            score,
        });
    }

    let exams: Vec<exam::Model> = exam::Model::for_course(db, course_id)
        .await?
        .into_iter()
        .filter(|e| e.status != ExamStatus::Draft)
        .collect();
    let exam_ids: Vec<i64> = exams.iter().map(|e| e.id).collect();
    let attempts = exam_attempt::Entity::find()
        .filter(exam_attempt::Column::StudentId.eq(student_id))
        .filter(exam_attempt::Column::ExamId.is_in(exam_ids))
        .all(db)
        .await?;
    for e in exams {
        let mine: Vec<&exam_attempt::Model> = attempts.iter().filter(|a| a.exam_id == e.id).collect();
        // Best graded attempt counts.
        let best = mine
            .iter()
            .filter(|a| a.percentage.is_some())
            .max_by(|a, b| a.percentage.partial_cmp(&b.percentage).unwrap_or(std::cmp::Ordering::Equal));
        items.push(WorkItem {
            kind: ItemKind::Exam,
            id: e.id,
            title: e.title,
            due_date: e.due_date,
            completed: mine.iter().any(|a| !a.is_open()),
            percentage: best.and_then(|a| a.percentage),
            result_at: best.and_then(|a| a.graded_at),
            score: best.and_then(|a| a.score),
        });
    }

    Ok(items)
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseProgress {
    pub course_id: i64,
    pub title: String,
    pub subject_id: Option<i64>,
    pub total_items: usize,
    pub completed_items: usize,
    pub completion_percentage: f64,
    pub average_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpcomingItem {
    pub kind: ItemKind,
    pub id: i64,
    pub course_id: i64,
    pub course_title: String,
    pub title: String,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PendingCourse {
    pub course_id: i64,
    pub title: String,
    pub status: EnrollmentStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct LearningPath {
    pub courses: Vec<CourseProgress>,
    pub upcoming: Vec<UpcomingItem>,
    pub pending_courses: Vec<PendingCourse>,
    pub overall_completion: f64,
}

/// Enrolled courses split by status, each paired with its course row.
async fn enrolled_courses(
    db: &DbConn,
    student_id: i64,
) -> Result<Vec<(course_enrollment::Model, course::Model)>, DbErr> {
    let rows = course_enrollment::Entity::find()
        .filter(course_enrollment::Column::StudentId.eq(student_id))
        .find_also_related(course::Entity)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(enrollment, course)| course.map(|c| (enrollment, c)))
        .collect())
}

pub async fn learning_path(db: &DbConn, student_id: i64) -> Result<LearningPath, DbErr> {
    let mut courses = Vec::new();
    let mut upcoming = Vec::new();
    let mut pending_courses = Vec::new();
    let (mut all_total, mut all_done) = (0usize, 0usize);

    for (enrollment, course) in enrolled_courses(db, student_id).await? {
        if enrollment.status != EnrollmentStatus::Approved {
            pending_courses.push(PendingCourse {
                course_id: course.id,
                title: course.title,
                status: enrollment.status,
            });
            continue;
        }

        let items = course_work(db, course.id, student_id).await?;
        let total = items.len();
        let done = items.iter().filter(|i| i.completed).count();
        all_total += total;
        all_done += done;

        courses.push(CourseProgress {
            course_id: course.id,
            title: course.title.clone(),
            subject_id: course.subject_id,
            total_items: total,
            completed_items: done,
            completion_percentage: completion(done, total),
            average_score: average(items.iter().filter_map(|i| i.percentage)),
        });

        upcoming.extend(items.into_iter().filter(|i| !i.completed).map(|i| UpcomingItem {
            kind: i.kind,
            id: i.id,
            course_id: course.id,
            course_title: course.title.clone(),
            title: i.title,
            due_date: i.due_date,
        }));
    }

    // Dated items first, earliest due first.
    upcoming.sort_by_key(|i| (i.due_date.is_none(), i.due_date));
    upcoming.truncate(UPCOMING_LIMIT);

    Ok(LearningPath {
        courses,
        upcoming,
        pending_courses,
        overall_completion: completion(all_done, all_total),
    })
}

fn completion(done: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (done as f64 / total as f64 * 10000.0).round() / 100.0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentResult {
    pub kind: ItemKind,
    pub id: i64,
    pub course_title: String,
    pub title: String,
    pub score: f64,
    pub percentage: Option<f64>,
    pub at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub approved_courses: usize,
    pub pending_enrollments: usize,
    pub completed_items: usize,
    pub outstanding_items: usize,
    pub average_score: Option<f64>,
    pub recent_results: Vec<RecentResult>,
}

pub async fn dashboard(db: &DbConn, student_id: i64) -> Result<Dashboard, DbErr> {
    let mut approved_courses = 0;
    let mut pending_enrollments = 0;
    let mut completed_items = 0;
    let mut outstanding_items = 0;
    let mut percentages = Vec::new();
    let mut recent_results = Vec::new();

    for (enrollment, course) in enrolled_courses(db, student_id).await? {
        match enrollment.status {
            EnrollmentStatus::Approved => approved_courses += 1,
            EnrollmentStatus::Pending => {
                pending_enrollments += 1;
                continue;
            }
            EnrollmentStatus::Rejected => continue,
        }

        for item in course_work(db, course.id, student_id).await? {
            if item.completed {
                completed_items += 1;
            } else {
                outstanding_items += 1;
            }
            if let Some(p) = item.percentage {
                percentages.push(p);
            }
            if let Some(score) = item.score {
                recent_results.push(RecentResult {
                    kind: item.kind,
                    id: item.id,
                    course_title: course.title.clone(),
                    title: item.title,
                    score,
                    percentage: item.percentage,
                    at: item.result_at,
                });
            }
        }
    }

    recent_results.sort_by(|a, b| b.at.cmp(&a.at));
    recent_results.truncate(RECENT_LIMIT);

    Ok(Dashboard {
        approved_courses,
        pending_enrollments,
        completed_items,
        outstanding_items,
        average_score: average(percentages),
        recent_results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::{self, Role};
    use crate::test_utils::setup_test_db;
    use chrono::Duration;

    #[tokio::test]
    async fn test_learning_path_progress_and_upcoming() {
        let db = setup_test_db().await;
        let teacher = user::Model::create(&db, "t", "t@example.com", "password1", Role::Teacher).await.unwrap();
        let student = user::Model::create(&db, "s", "s@example.com", "password1", Role::Student).await.unwrap();
        let algebra = course::Model::create(&db, teacher.id, "Algebra", "", None).await.unwrap();
        let poetry = course::Model::create(&db, teacher.id, "Poetry", "", None).await.unwrap();

        let enrollment = course_enrollment::Model::request(&db, algebra.id, student.id).await.unwrap();
        course_enrollment::Model::approve(&db, enrollment.id).await.unwrap();
        course_enrollment::Model::request(&db, poetry.id, student.id).await.unwrap();

        let soon = Utc::now() + Duration::days(1);
        let later = Utc::now() + Duration::days(5);
        let done = assessment::Model::create(&db, algebra.id, "Quiz A", "", 10, Some(soon)).await.unwrap();
        assessment::Model::create(&db, algebra.id, "Quiz B", "", 10, Some(later)).await.unwrap();
        assignment::Model::create(&db, algebra.id, "Homework", "", 20, Some(soon)).await.unwrap();
        assignment::Model::create(&db, poetry.id, "Sonnet", "", 20, None).await.unwrap();

        let (answer, _) = student_answer::Model::submit(&db, done.id, student.id, "x", None).await.unwrap();
        student_answer::Model::grade(&db, answer.id, 8.0).await.unwrap();

        let path = learning_path(&db, student.id).await.unwrap();
        assert_eq!(path.courses.len(), 1);
        let progress = &path.courses[0];
        assert_eq!(progress.total_items, 3);
        assert_eq!(progress.completed_items, 1);
        assert_eq!(progress.completion_percentage, 33.33);
        assert_eq!(progress.average_score, Some(80.0));

        assert_eq!(path.upcoming.len(), 2);
        assert_eq!(path.upcoming[0].title, "Homework");
        assert_eq!(path.upcoming[1].title, "Quiz B");

        assert_eq!(path.pending_courses.len(), 1);
        assert_eq!(path.pending_courses[0].title, "Poetry");
    }

    #[tokio::test]
    async fn test_dashboard_counts() {
        let db = setup_test_db().await;
        let teacher = user::Model::create(&db, "t", "t@example.com", "password1", Role::Teacher).await.unwrap();
        let student = user::Model::create(&db, "s", "s@example.com", "password1", Role::Student).await.unwrap();
        let course = course::Model::create(&db, teacher.id, "Art", "", None).await.unwrap();
        let enrollment = course_enrollment::Model::request(&db, course.id, student.id).await.unwrap();
        course_enrollment::Model::approve(&db, enrollment.id).await.unwrap();

        let a = assignment::Model::create(&db, course.id, "Sketch", "", 10, None).await.unwrap();
        let (sub, _) = assignment_submission::Model::submit(&db, a.id, student.id, "drawing", None)
            .await
            .unwrap();
        assignment_submission::Model::grade(&db, sub.id, 5.0, None).await.unwrap();
        assignment::Model::create(&db, course.id, "Paint", "", 10, None).await.unwrap();

        let dash = dashboard(&db, student.id).await.unwrap();
        assert_eq!(dash.approved_courses, 1);
        assert_eq!(dash.pending_enrollments, 0);
        assert_eq!(dash.completed_items, 1);
        assert_eq!(dash.outstanding_items, 1);
        assert_eq!(dash.average_score, Some(50.0));
        assert_eq!(dash.recent_results.len(), 1);
        assert_eq!(dash.recent_results[0].title, "Sketch");
    }

    #[test]
    fn test_average_and_completion() {
        assert_eq!(average(Vec::<f64>::new()), None);
        assert_eq!(average([50.0, 100.0]), Some(75.0));
        assert_eq!(completion(0, 0), 0.0);
        assert_eq!(completion(1, 4), 25.0);
    }
}
