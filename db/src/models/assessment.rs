use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, QueryFilter, QueryOrder};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "assessments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: String,
    pub total_marks: i32,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Relative path under the storage root (`exam_questions/...`).
    pub questions_file: Option<String>,
    pub questions_filename: Option<String>,
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

    #[sea_orm(has_many = "super::student_answer::Entity")]
    Answers,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::student_answer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Answers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DbConn,
        course_id: i64,
        title: &str,
        description: &str,
        total_marks: i32,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();
        ActiveModel {
            course_id: Set(course_id),
            title: Set(title.to_owned()),
            description: Set(description.to_owned()),
            total_marks: Set(total_marks),
            due_date: Set(due_date),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
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
        assessment_id: i64,
        relative_path: &str,
        filename: &str,
    ) -> Result<Model, DbErr> {
        let model = Entity::find_by_id(assessment_id)
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound("Assessment not found".to_string()))?;

        let mut active_model: ActiveModel = model.into();
        active_model.questions_file = Set(Some(relative_path.to_owned()));
        active_model.questions_filename = Set(Some(filename.to_owned()));
        active_model.updated_at = Set(Utc::now());
        active_model.update(db).await
    }
}
