use crate::error::ModelError;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};

/// Primary key of the single settings row.
pub const SETTINGS_ID: i64 = 1;

/// Platform-wide settings. Exactly one row exists, created with defaults on
/// first read.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "system_settings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub site_name: String,
    pub maintenance_mode: bool,
    pub allow_registration: bool,
    /// AI-detection scores at or above this value flag the work.
    pub ai_flag_threshold: f64,
    pub max_upload_mb: i32,
    pub updated_by: Option<i64>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UpdatedBy",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    UpdatedBy,
}

impl ActiveModelBehavior for ActiveModel {}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SettingsUpdate {
    pub site_name: Option<String>,
    pub maintenance_mode: Option<bool>,
    pub allow_registration: Option<bool>,
    pub ai_flag_threshold: Option<f64>,
    pub max_upload_mb: Option<i32>,
}

impl Model {
    pub async fn get_or_create(db: &DbConn) -> Result<Model, DbErr> {
        if let Some(existing) = Entity::find_by_id(SETTINGS_ID).one(db).await? {
            return Ok(existing);
        }

        ActiveModel {
            id: Set(SETTINGS_ID),
            site_name: Set("Learning Platform".to_string()),
            maintenance_mode: Set(false),
            allow_registration: Set(true),
            ai_flag_threshold: Set(70.0),
            max_upload_mb: Set(10),
            updated_by: Set(None),
            updated_at: Set(Utc::now()),
        }
        .insert(db)
        .await
    }

    pub async fn update(
        db: &DbConn,
        changes: SettingsUpdate,
        updated_by: i64,
    ) -> Result<Model, ModelError> {
        if let Some(threshold) = changes.ai_flag_threshold {
            if !(0.0..=100.0).contains(&threshold) {
                return Err(ModelError::invalid("ai_flag_threshold must be between 0 and 100"));
            }
        }
        if let Some(max) = changes.max_upload_mb {
            if !(1..=1024).contains(&max) {
                return Err(ModelError::invalid("max_upload_mb must be between 1 and 1024"));
            }
        }
        if changes.site_name.as_deref().is_some_and(|s| s.trim().is_empty()) {
            return Err(ModelError::invalid("site_name cannot be empty"));
        }

        let current = Self::get_or_create(db).await?;
        let mut active_model: ActiveModel = current.into();

        if let Some(site_name) = changes.site_name {
            active_model.site_name = Set(site_name.trim().to_string());
        }
        if let Some(flag) = changes.maintenance_mode {
            active_model.maintenance_mode = Set(flag);
        }
        if let Some(flag) = changes.allow_registration {
            active_model.allow_registration = Set(flag);
        }
        if let Some(threshold) = changes.ai_flag_threshold {
            active_model.ai_flag_threshold = Set(threshold);
        }
        if let Some(max) = changes.max_upload_mb {
            active_model.max_upload_mb = Set(max);
        }
        active_model.updated_by = Set(Some(updated_by));
        active_model.updated_at = Set(Utc::now());

        Ok(active_model.update(db).await?)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.max(0) as usize * 1024 * 1024
    }
}
