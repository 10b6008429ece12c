//! Subject-strength recommendations derived from a student's graded work.

use crate::learning_path::{average, course_work};
use crate::models::{course, course_enrollment, course_enrollment::EnrollmentStatus, subject};
use sea_orm::{ColumnTrait, DbConn, DbErr, EntityTrait, QueryFilter};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

pub const STRONG_AT: f64 = 75.0;
pub const DEVELOPING_AT: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    Strong,
    Developing,
    NeedsSupport,
}

impl Strength {
    pub fn from_average(avg: f64) -> Self {
        if avg >= STRONG_AT {
            Strength::Strong
        } else if avg >= DEVELOPING_AT {
            Strength::Developing
        } else {
            Strength::NeedsSupport
        }
    }

    fn advice(self, subject: &str) -> String {
        match self {
            Strength::Strong => format!("{subject} is a strength. Consider advanced courses or related careers."),
            Strength::Developing => format!("Steady progress in {subject}. Regular practice will lift your results."),
            Strength::NeedsSupport => format!("{subject} needs attention. Ask your teacher for extra support."),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestedCourse {
    pub course_id: i64,
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub subject_id: i64,
    pub subject_code: String,
    pub subject_name: String,
    pub average_percentage: f64,
    pub graded_items: usize,
    pub strength: Strength,
    pub advice: String,
    /// Courses in the same subject the student is not enrolled in.
    pub suggested_courses: Vec<SuggestedCourse>,
}

/// Strongest subject first. Subjects without any graded work are omitted.
pub async fn recommendations(db: &DbConn, student_id: i64) -> Result<Vec<Recommendation>, DbErr> {
    let enrollments = course_enrollment::Model::for_student(db, student_id).await?;
    let enrolled: HashSet<i64> = enrollments.iter().map(|e| e.course_id).collect();
    let approved: Vec<i64> = enrollments
        .iter()
        .filter(|e| e.status == EnrollmentStatus::Approved)
        .map(|e| e.course_id)
        .collect();

    let courses = course::Entity::find()
        .filter(course::Column::Id.is_in(approved))
        .filter(course::Column::SubjectId.is_not_null())
        .all(db)
        .await?;

    let mut per_subject: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for c in &courses {
        let Some(subject_id) = c.subject_id else { continue };
        let graded = course_work(db, c.id, student_id)
            .await?
            .into_iter()
            .filter_map(|i| i.percentage);
        per_subject.entry(subject_id).or_default().extend(graded);
    }

    let mut out = Vec::new();
    for (subject_id, scores) in per_subject {
        let Some(avg) = average(scores.iter().copied()) else { continue };
        let Some(subject) = subject::Entity::find_by_id(subject_id).one(db).await? else {
            continue;
        };

        let suggested_courses = course::Entity::find()
            .filter(course::Column::SubjectId.eq(subject_id))
            .all(db)
            .await?
            .into_iter()
            .filter(|c| !enrolled.contains(&c.id))
            .map(|c| SuggestedCourse { course_id: c.id, title: c.title })
            .collect();

        let strength = Strength::from_average(avg);
        out.push(Recommendation {
            subject_id,
            advice: strength.advice(&subject.name),
            subject_code: subject.code,
            subject_name: subject.name,
            average_percentage: avg,
            graded_items: scores.len(),
            strength,
            suggested_courses,
        });
    }

    out.sort_by(|a, b| {
        b.average_percentage
            .partial_cmp(&a.average_percentage)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::{self, Role};
    use crate::models::{assessment, student_answer};
    use crate::test_utils::setup_test_db;

    #[test]
    fn test_strength_bands() {
        assert_eq!(Strength::from_average(75.0), Strength::Strong);
        assert_eq!(Strength::from_average(74.99), Strength::Developing);
        assert_eq!(Strength::from_average(50.0), Strength::Developing);
        assert_eq!(Strength::from_average(10.0), Strength::NeedsSupport);
    }

    #[tokio::test]
    async fn test_recommendations_ranked_by_average() {
        let db = setup_test_db().await;
        let teacher = user::Model::create(&db, "t", "t@example.com", "password1", Role::Teacher).await.unwrap();
        let student = user::Model::create(&db, "s", "s@example.com", "password1", Role::Student).await.unwrap();
        let (math, _) = subject::Model::insert_if_absent(&db, "MATH", "Mathematics", "").await.unwrap();
        let (eng, _) = subject::Model::insert_if_absent(&db, "ENG", "English", "").await.unwrap();

        let algebra = course::Model::create(&db, teacher.id, "Algebra", "", Some(math.id)).await.unwrap();
        let geometry = course::Model::create(&db, teacher.id, "Geometry", "", Some(math.id)).await.unwrap();
        let essays = course::Model::create(&db, teacher.id, "Essays", "", Some(eng.id)).await.unwrap();

        for c in [&algebra, &essays] {
            let e = course_enrollment::Model::request(&db, c.id, student.id).await.unwrap();
            course_enrollment::Model::approve(&db, e.id).await.unwrap();
        }

        let a1 = assessment::Model::create(&db, algebra.id, "Test", "", 10, None).await.unwrap();
        let a2 = assessment::Model::create(&db, essays.id, "Essay", "", 10, None).await.unwrap();
        let (ans1, _) = student_answer::Model::submit(&db, a1.id, student.id, "x", None).await.unwrap();
        let (ans2, _) = student_answer::Model::submit(&db, a2.id, student.id, "y", None).await.unwrap();
        student_answer::Model::grade(&db, ans1.id, 4.0).await.unwrap();
        student_answer::Model::grade(&db, ans2.id, 9.0).await.unwrap();

        let recs = recommendations(&db, student.id).await.unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].subject_code, "ENG");
        assert_eq!(recs[0].strength, Strength::Strong);
        assert_eq!(recs[1].subject_code, "MATH");
        assert_eq!(recs[1].strength, Strength::NeedsSupport);
        assert_eq!(recs[1].suggested_courses.len(), 1);
        assert_eq!(recs[1].suggested_courses[0].course_id, geometry.id);
    }
}
