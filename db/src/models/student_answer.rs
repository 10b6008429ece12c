use crate::error::{ModelError, is_unique_violation};
use crate::models::ai_detection::Verdict;
use crate::models::assessment;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, QueryFilter, QueryOrder};
use serde::Serialize;
use util::paths::StoredFile;

/// A student's answer to an assessment. One row per (assessment, student);
/// resubmitting replaces the previous answer.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "student_answers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub assessment_id: i64,
    pub student_id: i64,
    pub answer_text: String,
    pub score: Option<f64>,
    pub submitted_at: DateTime<Utc>,
    pub answer_file: Option<String>,
    pub answer_filename: Option<String>,
    pub answer_file_size: i64,
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
        belongs_to = "super::assessment::Entity",
        from = "Column::AssessmentId",
        to = "super::assessment::Column::Id",
        on_delete = "Cascade"
    )]
    Assessment,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::StudentId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Student,
}

impl Related<super::assessment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assessment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Stores the answer, replacing any previous one from the same student.
    /// A replaced answer loses its score and detection results. Returns the
    /// stored row and the relative path of a file that is no longer
    /// referenced.
    ///
    /// When a concurrent first submission wins the insert, the unique index
    /// rejects this one and it is applied again as a replacement.
    pub async fn submit(
        db: &DbConn,
        assessment_id: i64,
        student_id: i64,
        answer_text: &str,
        file: Option<&StoredFile>,
    ) -> Result<(Model, Option<String>), DbErr> {
        match Self::save(db, assessment_id, student_id, answer_text, file).await {
            Err(e) if is_unique_violation(&e) => Self::save(db, assessment_id, student_id, answer_text, file).await,
            other => other,
        }
    }

    async fn save(
        db: &DbConn,
        assessment_id: i64,
        student_id: i64,
        answer_text: &str,
        file: Option<&StoredFile>,
    ) -> Result<(Model, Option<String>), DbErr> {
        let existing = Self::find(db, assessment_id, student_id).await?;
        let is_new = existing.is_none();

        let (mut active_model, old_file) = match existing {
            Some(previous) => {
                let old_file = previous.answer_file.clone();
                let mut am: ActiveModel = previous.into();
                am.score = Set(None);
                am.ai_detection_score = Set(None);
                am.ai_detection_result = Set(serde_json::json!({}));
                am.ai_detection_performed = Set(false);
                am.ai_detection_timestamp = Set(None);
                am.is_flagged_ai = Set(false);
                am.flag_reason = Set(None);
                (am, old_file)
            }
            None => (
                ActiveModel {
                    assessment_id: Set(assessment_id),
                    student_id: Set(student_id),
                    ..Default::default()
                },
                None,
            ),
        };

        active_model.answer_text = Set(answer_text.to_owned());
        active_model.submitted_at = Set(Utc::now());
        let mut replaced = None;
        if let Some(file) = file {
            active_model.answer_file = Set(Some(file.relative_path.clone()));
            active_model.answer_filename = Set(Some(file.filename.clone()));
            active_model.answer_file_size = Set(file.size);
            replaced = old_file.filter(|old| *old != file.relative_path);
        }

        let model = if is_new {
            active_model.insert(db).await?
        } else {
            active_model.update(db).await?
        };
        Ok((model, replaced))
    }

    pub async fn find(db: &DbConn, assessment_id: i64, student_id: i64) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::AssessmentId.eq(assessment_id))
            .filter(Column::StudentId.eq(student_id))
            .one(db)
            .await
    }

    pub async fn for_assessment(db: &DbConn, assessment_id: i64) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::AssessmentId.eq(assessment_id))
            .order_by_asc(Column::SubmittedAt)
            .all(db)
            .await
    }

    pub async fn grade(db: &DbConn, answer_id: i64, score: f64) -> Result<Model, ModelError> {
        let answer = Entity::find_by_id(answer_id)
            .one(db)
            .await?
            .ok_or(ModelError::NotFound("Answer"))?;
        let assessment = assessment::Entity::find_by_id(answer.assessment_id)
            .one(db)
            .await?
            .ok_or(ModelError::NotFound("Assessment"))?;

        if !(0.0..=f64::from(assessment.total_marks)).contains(&score) {
            return Err(ModelError::invalid(format!(
                "Score must be between 0 and {}",
                assessment.total_marks
            )));
        }

        let mut active_model: ActiveModel = answer.into();
        active_model.score = Set(Some(score));
        Ok(active_model.update(db).await?)
    }

    pub async fn record_ai_detection(db: &DbConn, answer_id: i64, verdict: &Verdict) -> Result<Model, ModelError> {
        let answer = Entity::find_by_id(answer_id)
            .one(db)
            .await?
            .ok_or(ModelError::NotFound("Answer"))?;

        let mut active_model: ActiveModel = answer.into();
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
    use crate::models::ai_detection::{DetectionReport, evaluate};
    use crate::models::{course, user};
    use crate::test_utils::setup_test_db;

    async fn fixture(db: &DbConn) -> (assessment::Model, user::Model) {
        let teacher = user::Model::create(db, "t", "t@example.com", "password1", user::Role::Teacher)
            .await
            .unwrap();
        let student = user::Model::create(db, "s", "s@example.com", "password1", user::Role::Student)
            .await
            .unwrap();
        let course = course::Model::create(db, teacher.id, "Biology", "", None).await.unwrap();
        let assessment = assessment::Model::create(db, course.id, "Cells", "", 20, None).await.unwrap();
        (assessment, student)
    }

    #[tokio::test]
    async fn test_new_answer_uses_column_defaults() {
        let db = setup_test_db().await;
        let (assessment, student) = fixture(&db).await;

        let (answer, replaced) = Model::submit(&db, assessment.id, student.id, "mitochondria", None)
            .await
            .unwrap();
        assert!(replaced.is_none());
        assert_eq!(answer.answer_file_size, 0);
        assert!(!answer.ai_detection_performed);
        assert_eq!(answer.ai_detection_result, serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_resubmission_replaces_and_resets() {
        let db = setup_test_db().await;
        let (assessment, student) = fixture(&db).await;

        let first_file = StoredFile {
            relative_path: "student_answers/1_a.pdf".into(),
            filename: "a.pdf".into(),
            size: 12,
        };
        let (first, _) = Model::submit(&db, assessment.id, student.id, "v1", Some(&first_file))
            .await
            .unwrap();
        Model::grade(&db, first.id, 15.0).await.unwrap();
        let verdict = evaluate(DetectionReport { score: 88.0, result: None, flag_reason: None }, 70.0).unwrap();
        let flagged = Model::record_ai_detection(&db, first.id, &verdict).await.unwrap();
        assert!(flagged.is_flagged_ai);

        let second_file = StoredFile {
            relative_path: "student_answers/1_b.pdf".into(),
            filename: "b.pdf".into(),
            size: 30,
        };
        let (second, replaced) = Model::submit(&db, assessment.id, student.id, "v2", Some(&second_file))
            .await
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(replaced.as_deref(), Some("student_answers/1_a.pdf"));
        assert_eq!(second.score, None);
        assert!(!second.is_flagged_ai);
        assert!(!second.ai_detection_performed);
        assert_eq!(second.answer_file_size, 30);
        assert_eq!(Model::for_assessment(&db, assessment.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_grade_above_total_rejected() {
        let db = setup_test_db().await;
        let (assessment, student) = fixture(&db).await;
        let (answer, _) = Model::submit(&db, assessment.id, student.id, "x", None).await.unwrap();

        let res = Model::grade(&db, answer.id, 21.0).await;
        assert!(matches!(res, Err(ModelError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_duplicate_row_rejected_by_index() {
        let db = setup_test_db().await;
        let (assessment, student) = fixture(&db).await;
        Model::submit(&db, assessment.id, student.id, "first", None).await.unwrap();

        let err = ActiveModel {
            assessment_id: Set(assessment.id),
            student_id: Set(student.id),
            answer_text: Set("sneaky".into()),
            submitted_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap_err();
        assert!(crate::error::is_unique_violation(&err));
    }

    #[tokio::test]
    async fn test_concurrent_first_submissions_keep_one_row() {
        let db = setup_test_db().await;
        let (assessment, student) = fixture(&db).await;

        let (one, two) = tokio::join!(
            Model::submit(&db, assessment.id, student.id, "one", None),
            Model::submit(&db, assessment.id, student.id, "two", None),
        );
        assert!(one.is_ok());
        assert!(two.is_ok());

        let rows = Model::for_assessment(&db, assessment.id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(["one", "two"].contains(&rows[0].answer_text.as_str()));
    }
}
