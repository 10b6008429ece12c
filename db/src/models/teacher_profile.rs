use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, QueryFilter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Teacher-specific data. A teacher may log in while `pending`, but only an
/// `approved` teacher may use teacher-only endpoints.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "teacher_profiles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub user_id: i64,
    pub specialization: String,
    pub bio: String,
    pub created_at: DateTime<Utc>,
    pub approval_status: ApprovalStatus,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "teacher_approval_status")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ApprovalStatus {
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
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create<C>(
        db: &C,
        user_id: i64,
        specialization: &str,
        status: ApprovalStatus,
    ) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        ActiveModel {
            user_id: Set(user_id),
            specialization: Set(specialization.to_owned()),
            bio: Set(String::new()),
            created_at: Set(Utc::now()),
            approval_status: Set(status),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    pub async fn find_by_user(db: &DbConn, user_id: i64) -> Result<Option<Model>, DbErr> {
        Entity::find().filter(Column::UserId.eq(user_id)).one(db).await
    }

    pub async fn set_approval(
        db: &DbConn,
        user_id: i64,
        status: ApprovalStatus,
    ) -> Result<Model, DbErr> {
        let profile = Self::find_by_user(db, user_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Teacher profile not found".to_string()))?;

        let mut active_model: ActiveModel = profile.into();
        active_model.approval_status = Set(status);
        active_model.update(db).await
    }

    pub async fn is_approved(db: &DbConn, user_id: i64) -> Result<bool, DbErr> {
        Ok(Self::find_by_user(db, user_id)
            .await?
            .is_some_and(|p| p.approval_status == ApprovalStatus::Approved))
    }

    pub async fn count_pending(db: &DbConn) -> Result<u64, DbErr> {
        use sea_orm::PaginatorTrait;
        Entity::find()
            .filter(Column::ApprovalStatus.eq(ApprovalStatus::Pending))
            .count(db)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::{self, Role};
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_approval_flow() {
        let db = setup_test_db().await;
        let teacher = user::Model::create(&db, "t1", "t1@example.com", "password1", Role::Teacher)
            .await
            .unwrap();
        Model::create(&db, teacher.id, "Physics", ApprovalStatus::Pending)
            .await
            .unwrap();

        assert!(!Model::is_approved(&db, teacher.id).await.unwrap());
        assert_eq!(Model::count_pending(&db).await.unwrap(), 1);

        let updated = Model::set_approval(&db, teacher.id, ApprovalStatus::Approved)
            .await
            .unwrap();
        assert_eq!(updated.approval_status, ApprovalStatus::Approved);
        assert!(Model::is_approved(&db, teacher.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_set_approval_missing_profile() {
        let db = setup_test_db().await;
        let err = Model::set_approval(&db, 999, ApprovalStatus::Approved).await;
        assert!(matches!(err, Err(DbErr::RecordNotFound(_))));
    }
}
