use crate::error::ModelError;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A student's membership request for a course.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "course_enrollments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: i64,
    pub student_id: i64,
    pub status: EnrollmentStatus,
    pub enrolled_at: DateTime<Utc>,
    /// Set when the course owner approves the request.
    pub approved_at: Option<DateTime<Utc>>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "enrollment_status")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EnrollmentStatus {
    #[sea_orm(string_value = "pending")]
    Pending,

    #[sea_orm(string_value = "approved")]
    Approved,

    #[sea_orm(string_value = "rejected")]
    Rejected,
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

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::StudentId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Student,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Records a pending request. A student can only hold one enrollment row
    /// per course.
    pub async fn request(db: &DbConn, course_id: i64, student_id: i64) -> Result<Model, ModelError> {
        if Self::find(db, course_id, student_id).await?.is_some() {
            return Err(ModelError::conflict("Already enrolled or awaiting approval"));
        }

        let model = ActiveModel {
            course_id: Set(course_id),
            student_id: Set(student_id),
            status: Set(EnrollmentStatus::Pending),
            enrolled_at: Set(Utc::now()),
            approved_at: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await?;

        Ok(model)
    }

    pub async fn find(db: &DbConn, course_id: i64, student_id: i64) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::StudentId.eq(student_id))
            .one(db)
            .await
    }

    pub async fn approve(db: &DbConn, enrollment_id: i64) -> Result<Model, ModelError> {
        Self::set_status(db, enrollment_id, EnrollmentStatus::Approved).await
    }

    pub async fn reject(db: &DbConn, enrollment_id: i64) -> Result<Model, ModelError> {
        Self::set_status(db, enrollment_id, EnrollmentStatus::Rejected).await
    }

    async fn set_status(
        db: &DbConn,
        enrollment_id: i64,
        status: EnrollmentStatus,
    ) -> Result<Model, ModelError> {
        let enrollment = Entity::find_by_id(enrollment_id)
            .one(db)
            .await?
            .ok_or(ModelError::NotFound("Enrollment"))?;

        let mut active_model: ActiveModel = enrollment.into();
        active_model.status = Set(status);
        active_model.approved_at = Set(match status {
            EnrollmentStatus::Approved => Some(Utc::now()),
            _ => None,
        });
        Ok(active_model.update(db).await?)
    }

    pub async fn is_approved(db: &DbConn, course_id: i64, student_id: i64) -> Result<bool, DbErr> {
        Ok(Self::find(db, course_id, student_id)
            .await?
            .is_some_and(|e| e.status == EnrollmentStatus::Approved))
    }

    pub async fn for_course(db: &DbConn, course_id: i64) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_asc(Column::EnrolledAt)
            .all(db)
            .await
    }

    pub async fn for_student(db: &DbConn, student_id: i64) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .order_by_asc(Column::EnrolledAt)
            .all(db)
            .await
    }
}
