//! Aggregate counts for teachers and administrators.

use crate::learning_path::average;
use crate::models::{
    accessibility_preference, assessment, assignment, assignment_submission, course, course_enrollment,
    course_enrollment::EnrollmentStatus, exam, exam_attempt, student_answer, student_profile, subject,
    system_setting, teacher_profile, user, user::Role,
};
use sea_orm::{ColumnTrait, DbConn, DbErr, EntityTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct CourseAnalytics {
    pub course_id: i64,
    pub title: String,
    pub enrolled_students: usize,
    pub pending_enrollments: usize,
    pub assessments: usize,
    pub assignments: usize,
    pub exams: usize,
    pub answers: usize,
    pub assignment_submissions: usize,
    pub exam_attempts: usize,
    /// Submitted exam attempts still waiting for a grade.
    pub ungraded_attempts: usize,
    /// Answers and assignment submissions without a score.
    pub ungraded_work: usize,
    pub average_score: Option<f64>,
    pub ai_flagged: usize,
}

fn pct(score: f64, total: i32) -> Option<f64> {
    (total > 0).then(|| score / f64::from(total) * 100.0)
}

pub async fn course_analytics(db: &DbConn, course: &course::Model) -> Result<CourseAnalytics, DbErr> {
    let enrollments = course_enrollment::Model::for_course(db, course.id).await?;
    let assessments = assessment::Model::for_course(db, course.id).await?;
    let assignments = assignment::Model::for_course(db, course.id).await?;
    let exams = exam::Model::for_course(db, course.id).await?;

    let mut out = CourseAnalytics {
        course_id: course.id,
        title: course.title.clone(),
        enrolled_students: enrollments.iter().filter(|e| e.status == EnrollmentStatus::Approved).count(),
        pending_enrollments: enrollments.iter().filter(|e| e.status == EnrollmentStatus::Pending).count(),
        assessments: assessments.len(),
        assignments: assignments.len(),
        exams: exams.len(),
        ..Default::default()
    };
    let mut percentages = Vec::new();

    for a in &assessments {
        for answer in student_answer::Model::for_assessment(db, a.id).await? {
            out.answers += 1;
            out.ai_flagged += usize::from(answer.is_flagged_ai);
            match answer.score {
                Some(s) => percentages.extend(pct(s, a.total_marks)),
                None => out.ungraded_work += 1,
            }
        }
    }

    for a in &assignments {
        for sub in assignment_submission::Model::for_assignment(db, a.id).await? {
            out.assignment_submissions += 1;
            out.ai_flagged += usize::from(sub.is_flagged_ai);
            match sub.score {
                Some(s) => percentages.extend(pct(s, a.total_marks)),
                None => out.ungraded_work += 1,
            }
        }
    }

    for e in &exams {
        for attempt in exam_attempt::Model::for_exam(db, e.id).await? {
            out.exam_attempts += 1;
            out.ai_flagged += usize::from(attempt.is_flagged_ai);
            if !attempt.is_open() && !attempt.is_graded() {
                out.ungraded_attempts += 1;
            }
            percentages.extend(attempt.percentage);
        }
    }

    out.average_score = average(percentages);
    Ok(out)
}

#[derive(Debug, Clone, Serialize)]
pub struct TeacherAnalytics {
    pub teacher_id: i64,
    pub total_courses: usize,
    pub total_students: usize,
    pub total_submissions: usize,
    pub ungraded_attempts: usize,
    pub ai_flagged: usize,
    pub courses: Vec<CourseAnalytics>,
}

pub async fn teacher_analytics(db: &DbConn, teacher_id: i64) -> Result<TeacherAnalytics, DbErr> {
    let mut courses = Vec::new();
    for c in course::Model::find_by_teacher(db, teacher_id).await? {
        courses.push(course_analytics(db, &c).await?);
    }

    Ok(TeacherAnalytics {
        teacher_id,
        total_courses: courses.len(),
        total_students: courses.iter().map(|c| c.enrolled_students).sum(),
        total_submissions: courses
            .iter()
            .map(|c| c.answers + c.assignment_submissions + c.exam_attempts)
            .sum(),
        ungraded_attempts: courses.iter().map(|c| c.ungraded_attempts).sum(),
        ai_flagged: courses.iter().map(|c| c.ai_flagged).sum(),
        courses,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct UserCounts {
    pub students: u64,
    pub teachers: u64,
    pub admins: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformOverview {
    pub users: UserCounts,
    pub pending_teachers: u64,
    pub subjects: u64,
    pub courses: u64,
    pub enrollments: u64,
    pub assessments: u64,
    pub assignments: u64,
    pub exams: u64,
    pub submissions: u64,
    pub ai_flagged: u64,
}

pub async fn platform_overview(db: &DbConn) -> Result<PlatformOverview, DbErr> {
    let flagged_answers = student_answer::Entity::find()
        .filter(student_answer::Column::IsFlaggedAi.eq(true))
        .count(db)
        .await?;
    let flagged_submissions = assignment_submission::Entity::find()
        .filter(assignment_submission::Column::IsFlaggedAi.eq(true))
        .count(db)
        .await?;
    let flagged_attempts = exam_attempt::Entity::find()
        .filter(exam_attempt::Column::IsFlaggedAi.eq(true))
        .count(db)
        .await?;

    Ok(PlatformOverview {
        users: UserCounts {
            students: user::Model::count_by_role(db, Role::Student).await?,
            teachers: user::Model::count_by_role(db, Role::Teacher).await?,
            admins: user::Model::count_by_role(db, Role::Admin).await?,
        },
        pending_teachers: teacher_profile::Model::count_pending(db).await?,
        subjects: subject::Entity::find().count(db).await?,
        courses: course::Entity::find().count(db).await?,
        enrollments: course_enrollment::Entity::find().count(db).await?,
        assessments: assessment::Entity::find().count(db).await?,
        assignments: assignment::Entity::find().count(db).await?,
        exams: exam::Entity::find().count(db).await?,
        submissions: student_answer::Entity::find().count(db).await?
            + assignment_submission::Entity::find().count(db).await?
            + exam_attempt::Entity::find().count(db).await?,
        ai_flagged: flagged_answers + flagged_submissions + flagged_attempts,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct TableCount {
    pub table: &'static str,
    pub rows: u64,
}

/// Row count of every application table, in schema order.
pub async fn table_counts(db: &DbConn) -> Result<Vec<TableCount>, DbErr> {
    Ok(vec![
        TableCount { table: "users", rows: user::Entity::find().count(db).await? },
        TableCount { table: "subjects", rows: subject::Entity::find().count(db).await? },
        TableCount { table: "student_profiles", rows: student_profile::Entity::find().count(db).await? },
        TableCount { table: "teacher_profiles", rows: teacher_profile::Entity::find().count(db).await? },
        TableCount { table: "courses", rows: course::Entity::find().count(db).await? },
        TableCount { table: "course_enrollments", rows: course_enrollment::Entity::find().count(db).await? },
        TableCount { table: "assessments", rows: assessment::Entity::find().count(db).await? },
        TableCount { table: "student_answers", rows: student_answer::Entity::find().count(db).await? },
        TableCount { table: "assignments", rows: assignment::Entity::find().count(db).await? },
        TableCount {
            table: "assignment_submissions",
            rows: assignment_submission::Entity::find().count(db).await?,
        },
        TableCount { table: "exams", rows: exam::Entity::find().count(db).await? },
        TableCount { table: "exam_attempts", rows: exam_attempt::Entity::find().count(db).await? },
        TableCount { table: "system_settings", rows: system_setting::Entity::find().count(db).await? },
        TableCount {
            table: "accessibility_preferences",
            rows: accessibility_preference::Entity::find().count(db).await?,
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ai_detection::{DetectionReport, evaluate};
    use crate::models::exam::{ExamStatus, ExamType, NewExam};
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_teacher_analytics_totals() {
        let db = setup_test_db().await;
        let teacher = user::Model::create(&db, "t", "t@example.com", "password1", Role::Teacher).await.unwrap();
        let s1 = user::Model::create(&db, "s1", "s1@example.com", "password1", Role::Student).await.unwrap();
        let s2 = user::Model::create(&db, "s2", "s2@example.com", "password1", Role::Student).await.unwrap();
        let c = course::Model::create(&db, teacher.id, "Physics", "", None).await.unwrap();

        let e1 = course_enrollment::Model::request(&db, c.id, s1.id).await.unwrap();
        course_enrollment::Model::approve(&db, e1.id).await.unwrap();
        course_enrollment::Model::request(&db, c.id, s2.id).await.unwrap();

        let a = assignment::Model::create(&db, c.id, "Lab", "", 10, None).await.unwrap();
        let (sub, _) = assignment_submission::Model::submit(&db, a.id, s1.id, "report", None).await.unwrap();
        let verdict = evaluate(DetectionReport { score: 95.0, result: None, flag_reason: None }, 70.0).unwrap();
        assignment_submission::Model::record_ai_detection(&db, sub.id, &verdict).await.unwrap();

        let draft = exam::Model::create(
            &db,
            c.id,
            NewExam {
                title: "Final".into(),
                description: String::new(),
                exam_type: ExamType::Final,
                total_marks: 100,
                duration_minutes: 120,
                due_date: None,
                question_count: 0,
            },
        )
        .await
        .unwrap();
        let published = exam::Model::transition(&db, draft.id, ExamStatus::Published).await.unwrap();
        let attempt = exam_attempt::Model::start(&db, &published, s1.id).await.unwrap();
        exam_attempt::Model::submit(&db, attempt.id, s1.id, None, None).await.unwrap();

        let stats = teacher_analytics(&db, teacher.id).await.unwrap();
        assert_eq!(stats.total_courses, 1);
        assert_eq!(stats.total_students, 1);
        assert_eq!(stats.total_submissions, 2);
        assert_eq!(stats.ungraded_attempts, 1);
        assert_eq!(stats.ai_flagged, 1);
        assert_eq!(stats.courses[0].pending_enrollments, 1);
        assert_eq!(stats.courses[0].ungraded_work, 1);
        assert_eq!(stats.courses[0].average_score, None);

        let overview = platform_overview(&db).await.unwrap();
        assert_eq!(overview.users.students, 2);
        assert_eq!(overview.users.teachers, 1);
        assert_eq!(overview.ai_flagged, 1);
        assert_eq!(overview.submissions, 2);
    }

    #[tokio::test]
    async fn test_table_counts_cover_schema() {
        let db = setup_test_db().await;
        user::Model::create(&db, "u", "u@example.com", "password1", Role::Student).await.unwrap();

        let counts = table_counts(&db).await.unwrap();
        assert_eq!(counts.len(), 14);
        assert_eq!(counts[0].table, "users");
        assert_eq!(counts[0].rows, 1);
        assert!(counts.iter().skip(1).all(|c| c.rows == 0));
    }
}
