use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, QueryFilter, QueryOrder};
use serde::Serialize;

/// A course owned by one teacher, optionally filed under a subject.
///
/// Deleting a course removes its enrollments, assessments, assignments and
/// exams through `ON DELETE CASCADE`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Set to `NULL` when the subject is deleted.
    pub subject_id: Option<i64>,
    pub teacher_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::subject::Entity",
        from = "Column::SubjectId",
        to = "super::subject::Column::Id",
        on_delete = "SetNull"
    )]
    Subject,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::TeacherId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Teacher,

    #[sea_orm(has_many = "super::course_enrollment::Entity")]
    Enrollments,

    #[sea_orm(has_many = "super::assessment::Entity")]
    Assessments,

    #[sea_orm(has_many = "super::assignment::Entity")]
    Assignments,

    #[sea_orm(has_many = "super::exam::Entity")]
    Exams,
}

impl Related<super::subject::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subject.def()
    }
}

impl Related<super::course_enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollments.def()
    }
}

impl Related<super::assessment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assessments.def()
    }
}

impl Related<super::assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

impl Related<super::exam::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Exams.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DbConn,
        teacher_id: i64,
        title: &str,
        description: &str,
        subject_id: Option<i64>,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();
        ActiveModel {
            title: Set(title.to_owned()),
            description: Set(description.to_owned()),
            subject_id: Set(subject_id),
            teacher_id: Set(teacher_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    pub async fn list(db: &DbConn) -> Result<Vec<Model>, DbErr> {
        Entity::find().order_by_asc(Column::Title).all(db).await
    }

    pub async fn find_by_teacher(db: &DbConn, teacher_id: i64) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::TeacherId.eq(teacher_id))
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }

    pub fn is_owner(&self, user_id: i64) -> bool {
        self.teacher_id == user_id
    }
}
