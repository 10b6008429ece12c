use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue::Set, QueryFilter, QueryOrder};
use serde::Serialize;

/// Reference subject that courses are grouped under.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "subjects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Short unique code, e.g. `MATH`.
    pub code: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::course::Entity")]
    Courses,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Courses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Inserts the subject unless a row with the same code exists. Existing
    /// rows are never overwritten. Returns the stored row and whether it was
    /// created by this call.
    pub async fn insert_if_absent(
        db: &DbConn,
        code: &str,
        name: &str,
        description: &str,
    ) -> Result<(Model, bool), DbErr> {
        let now = Utc::now();
        let active_model = ActiveModel {
            code: Set(code.to_owned()),
            name: Set(name.to_owned()),
            description: Set(description.to_owned()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let created = Entity::insert(active_model)
            .on_conflict(OnConflict::column(Column::Code).do_nothing().to_owned())
            .exec_without_returning(db)
            .await?
            == 1;

        let model = Self::find_by_code(db, code)
            .await?
            .ok_or(DbErr::RecordNotFound(format!("Subject {code} not found")))?;

        Ok((model, created))
    }

    pub async fn find_by_code(db: &DbConn, code: &str) -> Result<Option<Model>, DbErr> {
        Entity::find().filter(Column::Code.eq(code)).one(db).await
    }

    pub async fn list(db: &DbConn) -> Result<Vec<Model>, DbErr> {
        Entity::find().order_by_asc(Column::Code).all(db).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_insert_if_absent_never_overwrites() {
        let db = setup_test_db().await;

        let (first, created) = Model::insert_if_absent(&db, "MATH", "Mathematics", "Numbers")
            .await
            .unwrap();
        assert!(created);

        let (second, created_again) =
            Model::insert_if_absent(&db, "MATH", "Renamed", "Changed").await.unwrap();
        assert!(!created_again);
        assert_eq!(second.id, first.id);
        assert_eq!(second.name, "Mathematics");

        assert_eq!(Model::list(&db).await.unwrap().len(), 1);
    }
}
