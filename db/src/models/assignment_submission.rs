use crate::error::{ModelError, is_unique_violation};
use crate::models::ai_detection::Verdict;
use crate::models::assignment;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, QueryFilter, QueryOrder};
use serde::Serialize;
use util::paths::StoredFile;

/// A student's work for an assignment. Resubmitting overwrites the row and
/// clears any grade or detection result.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "assignment_submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub assignment_id: i64,
    pub student_id: i64,
    pub content: String,
    pub score: Option<f64>,
    pub feedback: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub submission_file: Option<String>,
    pub submission_filename: Option<String>,
    pub submission_file_size: i64,
    pub ai_detection_score: Option<f64>,
    pub ai_detection_result: Json,
    pub ai_detection_performed: bool,
    pub ai_detection_timestamp: Option<DateTime<Utc>>,
    pub is_flagged_ai: bool,
    pub flag_reason: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assignment::Entity",
        from = "Column::AssignmentId",
        to = "super::assignment::Column::Id",
        on_delete = "Cascade"
    )]
    Assignment,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::StudentId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Student,
}

impl Related<super::assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Returns the stored submission and the relative path of a previous file
    /// that the new one replaced. A first submission that loses a race on the
    /// unique index is retried as a replacement.
    pub async fn submit(
        db: &DbConn,
        assignment_id: i64,
        student_id: i64,
        content: &str,
        file: Option<&StoredFile>,
    ) -> Result<(Model, Option<String>), DbErr> {
        match Self::save(db, assignment_id, student_id, content, file).await {
            Err(e) if is_unique_violation(&e) => Self::save(db, assignment_id, student_id, content, file).await,
            other => other,
        }
    }

    async fn save(
        db: &DbConn,
        assignment_id: i64,
        student_id: i64,
        content: &str,
        file: Option<&StoredFile>,
    ) -> Result<(Model, Option<String>), DbErr> {
        let existing = Self::find(db, assignment_id, student_id).await?;
        let is_new = existing.is_none();
        let old_file = existing.as_ref().and_then(|s| s.submission_file.clone());

        let mut active_model = match existing {
            Some(previous) => {
                let mut am: ActiveModel = previous.into();
                am.score = Set(None);
                am.feedback = Set(None);
                am.ai_detection_score = Set(None);
                am.ai_detection_result = Set(serde_json::json!({}));
                am.ai_detection_performed = Set(false);
                am.ai_detection_timestamp = Set(None);
                am.is_flagged_ai = Set(false);
                am.flag_reason = Set(None);
                am
            }
            None => ActiveModel {
                assignment_id: Set(assignment_id),
                student_id: Set(student_id),
                ..Default::default()
            },
        };

        active_model.content = Set(content.to_owned());
        active_model.submitted_at = Set(Utc::now());

        let mut replaced = None;
        if let Some(file) = file {
            active_model.submission_file = Set(Some(file.relative_path.clone()));
            active_model.submission_filename = Set(Some(file.filename.clone()));
            active_model.submission_file_size = Set(file.size);
            replaced = old_file.filter(|old| *old != file.relative_path);
        }

        let model = if is_new {
            active_model.insert(db).await?
        } else {
            active_model.update(db).await?
        };
        Ok((model, replaced))
    }

    pub async fn find(db: &DbConn, assignment_id: i64, student_id: i64) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::AssignmentId.eq(assignment_id))
            .filter(Column::StudentId.eq(student_id))
            .one(db)
            .await
    }

    pub async fn for_assignment(db: &DbConn, assignment_id: i64) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::AssignmentId.eq(assignment_id))
            .order_by_asc(Column::SubmittedAt)
            .all(db)
            .await
    }

    pub async fn grade(
        db: &DbConn,
        submission_id: i64,
        score: f64,
        feedback: Option<String>,
    ) -> Result<Model, ModelError> {
        let submission = Entity::find_by_id(submission_id)
            .one(db)
            .await?
            .ok_or(ModelError::NotFound("Submission"))?;
        let assignment = assignment::Entity::find_by_id(submission.assignment_id)
            .one(db)
            .await?
            .ok_or(ModelError::NotFound("Assignment"))?;

        if !(0.0..=f64::from(assignment.total_marks)).contains(&score) {
            return Err(ModelError::invalid(format!(
                "Score must be between 0 and {}",
                assignment.total_marks
            )));
        }

        let mut active_model: ActiveModel = submission.into();
        active_model.score = Set(Some(score));
        active_model.feedback = Set(feedback);
        Ok(active_model.update(db).await?)
    }

    pub async fn record_ai_detection(
        db: &DbConn,
        submission_id: i64,
        verdict: &Verdict,
    ) -> Result<Model, ModelError> {
        let submission = Entity::find_by_id(submission_id)
            .one(db)
            .await?
            .ok_or(ModelError::NotFound("Submission"))?;

        let mut active_model: ActiveModel = submission.into();
        active_model.ai_detection_score = Set(Some(verdict.score));
        active_model.ai_detection_result = Set(verdict.result.clone());
        active_model.ai_detection_performed = Set(true);
        active_model.ai_detection_timestamp = Set(Some(verdict.timestamp));
        active_model.is_flagged_ai = Set(verdict.flagged);
        active_model.flag_reason = Set(verdict.reason.clone());
        Ok(active_model.update(db).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{course, user};
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_submit_grade_and_feedback() {
        let db = setup_test_db().await;
        let teacher = user::Model::create(&db, "t", "t@example.com", "password1", user::Role::Teacher)
            .await
            .unwrap();
        let student = user::Model::create(&db, "s", "s@example.com", "password1", user::Role::Student)
            .await
            .unwrap();
        let course = course::Model::create(&db, teacher.id, "History", "", None).await.unwrap();
        let assignment = assignment::Model::create(&db, course.id, "Essay", "", 50, None)
            .await
            .unwrap();

        let (submission, _) = Model::submit(&db, assignment.id, student.id, "draft", None)
            .await
            .unwrap();
        assert_eq!(submission.submission_file_size, 0);
        assert!(!submission.ai_detection_performed);

        let graded = Model::grade(&db, submission.id, 42.0, Some("Good".into())).await.unwrap();
        assert_eq!(graded.score, Some(42.0));
        assert_eq!(graded.feedback.as_deref(), Some("Good"));

        let too_high = Model::grade(&db, submission.id, 51.0, None).await;
        assert!(matches!(too_high, Err(ModelError::Invalid(_))));

        let (resubmitted, replaced) = Model::submit(&db, assignment.id, student.id, "final", None)
            .await
            .unwrap();
        assert!(replaced.is_none());
        assert_eq!(resubmitted.id, submission.id);
        assert_eq!(resubmitted.score, None);
        assert_eq!(resubmitted.content, "final");
    }

    #[tokio::test]
    async fn test_concurrent_first_submissions_keep_one_row() {
        let db = setup_test_db().await;
        let teacher = user::Model::create(&db, "t", "t@example.com", "password1", user::Role::Teacher)
            .await
            .unwrap();
        let student = user::Model::create(&db, "s", "s@example.com", "password1", user::Role::Student)
            .await
            .unwrap();
        let course = course::Model::create(&db, teacher.id, "History", "", None).await.unwrap();
        let assignment = assignment::Model::create(&db, course.id, "Essay", "", 50, None)
            .await
            .unwrap();

        let (one, two) = tokio::join!(
            Model::submit(&db, assignment.id, student.id, "one", None),
            Model::submit(&db, assignment.id, student.id, "two", None),
        );
        assert!(one.is_ok());
        assert!(two.is_ok());
        assert_eq!(Model::for_assignment(&db, assignment.id).await.unwrap().len(), 1);
    }
}
