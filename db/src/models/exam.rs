use crate::error::ModelError;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A timed exam belonging to a course. Exams start as drafts and move
/// forward through `published` to `completed`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "exams")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: String,
    pub exam_type: ExamType,
    pub total_marks: i32,
    pub duration_minutes: i32,
    pub due_date: Option<DateTime<Utc>>,
    pub question_count: i32,
    pub status: ExamStatus,
    /// Relative path under `exam_questions/`.
    pub questions_file: Option<String>,
    pub questions_filename: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "exam_type")]
#[strum(ascii_case_insensitive)]
pub enum ExamType {
    #[sea_orm(string_value = "Quiz")]
    Quiz,

    #[sea_orm(string_value = "Mid")]
    Mid,

    #[sea_orm(string_value = "Final")]
    Final,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "exam_status")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExamStatus {
    #[sea_orm(string_value = "draft")]
    Draft,

    #[sea_orm(string_value = "published")]
    Published,

    #[sea_orm(string_value = "completed")]
    Completed,
}

impl ExamStatus {
    pub fn can_become(self, next: ExamStatus) -> bool {
        matches!(
            (self, next),
            (ExamStatus::Draft, ExamStatus::Published) | (ExamStatus::Published, ExamStatus::Completed)
        )
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id",
        on_delete = "Cascade"
    )]
    Course,

    #[sea_orm(has_many = "super::exam_attempt::Entity")]
    Attempts,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::exam_attempt::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attempts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Deserialize)]
pub struct NewExam {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub exam_type: ExamType,
    pub total_marks: i32,
    pub duration_minutes: i32,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub question_count: i32,
}

impl Model {
    pub async fn create(db: &DbConn, course_id: i64, exam: NewExam) -> Result<Model, ModelError> {
        if exam.total_marks <= 0 {
            return Err(ModelError::invalid("total_marks must be positive"));
        }
        if exam.duration_minutes <= 0 {
            return Err(ModelError::invalid("duration_minutes must be positive"));
        }
        if exam.question_count < 0 {
            return Err(ModelError::invalid("question_count cannot be negative"));
        }

        let now = Utc::now();
        let model = ActiveModel {
            course_id: Set(course_id),
            title: Set(exam.title),
            description: Set(exam.description),
            exam_type: Set(exam.exam_type),
            total_marks: Set(exam.total_marks),
            duration_minutes: Set(exam.duration_minutes),
            due_date: Set(exam.due_date),
            question_count: Set(exam.question_count),
            status: Set(ExamStatus::Draft),
            questions_file: Set(None),
            questions_filename: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;

        Ok(model)
    }

    pub async fn for_course(db: &DbConn, course_id: i64) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }

    pub async fn set_questions_file(
        db: &DbConn,
        exam_id: i64,
        relative_path: &str,
        filename: &str,
        question_count: Option<i32>,
    ) -> Result<Model, ModelError> {
        let exam = Entity::find_by_id(exam_id)
            .one(db)
            .await?
            .ok_or(ModelError::NotFound("Exam"))?;
        if exam.status == ExamStatus::Completed {
            return Err(ModelError::invalid("Cannot change questions of a completed exam"));
        }

        let mut active_model: ActiveModel = exam.into();
        active_model.questions_file = Set(Some(relative_path.to_owned()));
        active_model.questions_filename = Set(Some(filename.to_owned()));
        if let Some(count) = question_count.filter(|c| *c >= 0) {
            active_model.question_count = Set(count);
        }
        active_model.updated_at = Set(Utc::now());
        Ok(active_model.update(db).await?)
    }

    pub async fn transition(db: &DbConn, exam_id: i64, next: ExamStatus) -> Result<Model, ModelError> {
        let exam = Entity::find_by_id(exam_id)
            .one(db)
            .await?
            .ok_or(ModelError::NotFound("Exam"))?;

        if !exam.status.can_become(next) {
            return Err(ModelError::invalid(format!(
                "Cannot change exam status from {} to {}",
                exam.status, next
            )));
        }

        let mut active_model: ActiveModel = exam.into();
        active_model.status = Set(next);
        active_model.updated_at = Set(Utc::now());
        Ok(active_model.update(db).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{course, user};
    use crate::test_utils::setup_test_db;

    fn quiz() -> NewExam {
        NewExam {
            title: "Quiz 1".into(),
            description: String::new(),
            exam_type: ExamType::Quiz,
            total_marks: 40,
            duration_minutes: 30,
            due_date: None,
            question_count: 10,
        }
    }

    #[tokio::test]
    async fn test_status_moves_forward_only() {
        let db = setup_test_db().await;
        let teacher = user::Model::create(&db, "t", "t@example.com", "password1", user::Role::Teacher)
            .await
            .unwrap();
        let course = course::Model::create(&db, teacher.id, "Chem", "", None).await.unwrap();
        let exam = Model::create(&db, course.id, quiz()).await.unwrap();
        assert_eq!(exam.status, ExamStatus::Draft);

        let skip = Model::transition(&db, exam.id, ExamStatus::Completed).await;
        assert!(matches!(skip, Err(ModelError::Invalid(_))));

        Model::transition(&db, exam.id, ExamStatus::Published).await.unwrap();
        let done = Model::transition(&db, exam.id, ExamStatus::Completed).await.unwrap();
        assert_eq!(done.status, ExamStatus::Completed);

        let back = Model::transition(&db, exam.id, ExamStatus::Draft).await;
        assert!(matches!(back, Err(ModelError::Invalid(_))));
    }

    #[test]
    fn test_exam_type_parsing() {
        use std::str::FromStr;
        assert_eq!(ExamType::from_str("mid").unwrap(), ExamType::Mid);
        assert_eq!(ExamType::Final.to_string(), "Final");
        assert_eq!(ExamStatus::from_str("Published").unwrap(), ExamStatus::Published);
    }
}
