use crate::error::ModelError;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, QueryFilter};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "accessibility_preferences")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub user_id: i64,
    pub font_scale: f64,
    pub high_contrast: bool,
    pub dyslexia_font: bool,
    pub screen_reader: bool,
    pub reduce_motion: bool,
    pub text_to_speech: bool,
    pub updated_at: DateTime<Utc>,
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

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct PreferencesUpdate {
    pub font_scale: Option<f64>,
    pub high_contrast: Option<bool>,
    pub dyslexia_font: Option<bool>,
    pub screen_reader: Option<bool>,
    pub reduce_motion: Option<bool>,
    pub text_to_speech: Option<bool>,
}

pub const FONT_SCALE_RANGE: std::ops::RangeInclusive<f64> = 0.5..=3.0;

impl Model {
    pub async fn get_or_create(db: &DbConn, user_id: i64) -> Result<Model, DbErr> {
        if let Some(existing) = Entity::find()
            .filter(Column::UserId.eq(user_id))
            .one(db)
            .await?
        {
            return Ok(existing);
        }

        ActiveModel {
            user_id: Set(user_id),
            font_scale: Set(1.0),
            high_contrast: Set(false),
            dyslexia_font: Set(false),
            screen_reader: Set(false),
            reduce_motion: Set(false),
            text_to_speech: Set(false),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    pub async fn update(
        db: &DbConn,
        user_id: i64,
        changes: PreferencesUpdate,
    ) -> Result<Model, ModelError> {
        if let Some(scale) = changes.font_scale {
            if !FONT_SCALE_RANGE.contains(&scale) {
                return Err(ModelError::invalid("font_scale must be between 0.5 and 3.0"));
            }
        }

        let current = Self::get_or_create(db, user_id).await?;
        let mut active_model: ActiveModel = current.into();

        if let Some(v) = changes.font_scale {
            active_model.font_scale = Set(v);
        }
        if let Some(v) = changes.high_contrast {
            active_model.high_contrast = Set(v);
        }
        if let Some(v) = changes.dyslexia_font {
            active_model.dyslexia_font = Set(v);
        }
        if let Some(v) = changes.screen_reader {
            active_model.screen_reader = Set(v);
        }
        if let Some(v) = changes.reduce_motion {
            active_model.reduce_motion = Set(v);
        }
        if let Some(v) = changes.text_to_speech {
            active_model.text_to_speech = Set(v);
        }
        active_model.updated_at = Set(Utc::now());

        Ok(active_model.update(db).await?)
    }
}
