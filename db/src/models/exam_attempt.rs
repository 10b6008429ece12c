use crate::error::{ModelError, is_unique_violation};
use crate::models::ai_detection::Verdict;
use crate::models::exam::{self, ExamStatus};
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, QueryFilter, QueryOrder};
use serde::Serialize;
use util::paths::StoredFile;

/// One sitting of an exam by a student. Open until `submitted_at` is set;
/// graded once `graded_at` is set.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "exam_attempts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub exam_id: i64,
    pub student_id: i64,
    /// Teacher who graded the attempt; cleared if that account is deleted.
    pub graded_by: Option<i64>,
    pub started_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub time_taken_minutes: Option<i32>,
    pub score: Option<f64>,
    pub percentage: Option<f64>,
    pub answer_file: Option<String>,
    pub answer_filename: Option<String>,
    pub answer_file_size: i64,
    pub answer_text: Option<String>,
    pub ai_detection_score: Option<f64>,
    pub ai_detection_result: Json,
    pub ai_detection_performed: bool,
    pub ai_detection_timestamp: Option<DateTime<Utc>>,
    pub is_flagged_ai: bool,
    pub flag_reason: Option<String>,
    pub feedback: Option<String>,
    pub graded_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::exam::Entity",
        from = "Column::ExamId",
        to = "super::exam::Column::Id",
        on_delete = "Cascade"
    )]
    Exam,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::StudentId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Student,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::GradedBy",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    Grader,
}

impl Related<super::exam::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Exam.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_open(&self) -> bool {
        self.submitted_at.is_none()
    }

    pub fn is_graded(&self) -> bool {
        self.graded_at.is_some()
    }

    /// Opens a new attempt on a published exam. A student may hold at most
    /// one open attempt per exam.
    pub async fn start(db: &DbConn, exam: &exam::Model, student_id: i64) -> Result<Model, ModelError> {
        if exam.status != ExamStatus::Published {
            return Err(ModelError::invalid("Exam is not open for attempts"));
        }

        let open = Entity::find()
            .filter(Column::ExamId.eq(exam.id))
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::SubmittedAt.is_null())
            .one(db)
            .await?;
        if open.is_some() {
            return Err(ModelError::conflict("An attempt for this exam is already in progress"));
        }

        ActiveModel {
            exam_id: Set(exam.id),
            student_id: Set(student_id),
            started_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ModelError::conflict("An attempt for this exam is already in progress")
            } else {
                ModelError::Db(e)
            }
        })
    }

    pub async fn submit(
        db: &DbConn,
        attempt_id: i64,
        student_id: i64,
        answer_text: Option<String>,
        file: Option<&StoredFile>,
    ) -> Result<Model, ModelError> {
        let attempt = Entity::find_by_id(attempt_id)
            .one(db)
            .await?
            .filter(|a| a.student_id == student_id)
            .ok_or(ModelError::NotFound("Attempt"))?;
        if !attempt.is_open() {
            return Err(ModelError::conflict("Attempt has already been submitted"));
        }

        let now = Utc::now();
        let elapsed_secs = (now - attempt.started_at).num_seconds().max(0);
        let minutes = ((elapsed_secs + 59) / 60) as i32;

        let mut active_model: ActiveModel = attempt.into();
        active_model.submitted_at = Set(Some(now));
        active_model.time_taken_minutes = Set(Some(minutes));
        active_model.answer_text = Set(answer_text);
        if let Some(file) = file {
            active_model.answer_file = Set(Some(file.relative_path.clone()));
            active_model.answer_filename = Set(Some(file.filename.clone()));
            active_model.answer_file_size = Set(file.size);
        }
        Ok(active_model.update(db).await?)
    }

    pub async fn grade(
        db: &DbConn,
        attempt_id: i64,
        score: f64,
        feedback: Option<String>,
        grader_id: i64,
    ) -> Result<Model, ModelError> {
        let attempt = Entity::find_by_id(attempt_id)
            .one(db)
            .await?
            .ok_or(ModelError::NotFound("Attempt"))?;
        if attempt.is_open() {
            return Err(ModelError::invalid("Attempt has not been submitted yet"));
        }
        let exam = exam::Entity::find_by_id(attempt.exam_id)
            .one(db)
            .await?
            .ok_or(ModelError::NotFound("Exam"))?;

        let total = f64::from(exam.total_marks);
        if !(0.0..=total).contains(&score) {
            return Err(ModelError::invalid(format!(
                "Score must be between 0 and {}",
                exam.total_marks
            )));
        }
        let percentage = (score / total * 10000.0).round() / 100.0;

        let mut active_model: ActiveModel = attempt.into();
        active_model.score = Set(Some(score));
        active_model.percentage = Set(Some(percentage));
        active_model.feedback = Set(feedback);
        active_model.graded_by = Set(Some(grader_id));
        active_model.graded_at = Set(Some(Utc::now()));
        Ok(active_model.update(db).await?)
    }

    pub async fn record_ai_detection(
        db: &DbConn,
        attempt_id: i64,
        verdict: &Verdict,
    ) -> Result<Model, ModelError> {
        let attempt = Entity::find_by_id(attempt_id)
            .one(db)
            .await?
            .ok_or(ModelError::NotFound("Attempt"))?;

        let mut active_model: ActiveModel = attempt.into();
        active_model.ai_detection_score = Set(Some(verdict.score));
        active_model.ai_detection_result = Set(verdict.result.clone());
        active_model.ai_detection_performed = Set(true);
        active_model.ai_detection_timestamp = Set(Some(verdict.timestamp));
        active_model.is_flagged_ai = Set(verdict.flagged);
        active_model.flag_reason = Set(verdict.reason.clone());
        Ok(active_model.update(db).await?)
    }

    pub async fn for_exam(db: &DbConn, exam_id: i64) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::ExamId.eq(exam_id))
            .order_by_asc(Column::StartedAt)
            .all(db)
            .await
    }

    pub async fn for_student(db: &DbConn, exam_id: i64, student_id: i64) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::ExamId.eq(exam_id))
            .filter(Column::StudentId.eq(student_id))
            .order_by_asc(Column::StartedAt)
            .all(db)
            .await
    }
}
