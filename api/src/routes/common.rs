//! Helpers shared by route handlers: ownership checks, multipart uploads and
//! response shapes used by several route groups.

use crate::auth::AuthUser;
use crate::response::{self, db_error};
use axum::{
    extract::Multipart,
    http::StatusCode,
    response::Response,
};
use db::models::{
    ai_detection::{self, DetectionReport, Verdict},
    course, course_enrollment, system_setting, user,
};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;
use std::collections::HashMap;
use util::paths::{self, StagedUpload, StoredFile, UploadKind};

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: user::Role,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            first_name: user.first_name,
            last_name: user.last_name,
            is_active: user.is_active,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

pub async fn find_course(db: &DatabaseConnection, course_id: i64) -> Result<course::Model, Response> {
    course::Entity::find_by_id(course_id)
        .one(db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| response::error(StatusCode::NOT_FOUND, "Course not found"))
}

/// The course, if the caller owns it or is an admin.
pub async fn owned_course(
    db: &DatabaseConnection,
    course_id: i64,
    user: &AuthUser,
) -> Result<course::Model, Response> {
    let course = find_course(db, course_id).await?;
    if user.is_admin() || course.is_owner(user.id()) {
        Ok(course)
    } else {
        Err(response::error(
            StatusCode::FORBIDDEN,
            "Only the course teacher can do this",
        ))
    }
}

/// Fails with 403 unless the caller holds an approved enrollment.
pub async fn require_enrollment(db: &DatabaseConnection, course_id: i64, user: &AuthUser) -> Result<(), Response> {
    match course_enrollment::Model::is_approved(db, course_id, user.id()).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(response::error(
            StatusCode::FORBIDDEN,
            "You are not enrolled in this course",
        )),
        Err(e) => Err(db_error(e)),
    }
}

pub async fn settings(db: &DatabaseConnection) -> Result<system_setting::Model, Response> {
    system_setting::Model::get_or_create(db).await.map_err(db_error)
}

/// Validates a detector payload against the configured flag threshold.
pub async fn ai_verdict(db: &DatabaseConnection, report: DetectionReport) -> Result<Verdict, Response> {
    let threshold = settings(db).await?.ai_flag_threshold;
    ai_detection::evaluate(report, threshold).map_err(response::model_error)
}

pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Text fields plus at most one file taken from the `file` field.
#[derive(Default)]
pub struct UploadForm {
    pub fields: HashMap<String, String>,
    pub file: Option<UploadedFile>,
}

impl UploadForm {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Reads the multipart body, streaming the file so that anything above
/// `max_bytes` is refused with 413 before it is fully buffered.
pub async fn read_upload(multipart: &mut Multipart, max_bytes: usize) -> Result<UploadForm, Response> {
    let mut form = UploadForm::default();
    let bad_body = |_| response::error(StatusCode::BAD_REQUEST, "Malformed multipart body");

    while let Some(mut field) = multipart.next_field().await.map_err(bad_body)? {
        let name = field.name().unwrap_or("").to_string();

        if name == "file" {
            if form.file.is_some() {
                return Err(response::error(
                    StatusCode::BAD_REQUEST,
                    "Only one file may be uploaded per request",
                ));
            }
            let filename = field.file_name().unwrap_or("upload").to_string();
            let mut bytes = Vec::new();
            while let Some(chunk) = field.chunk().await.map_err(bad_body)? {
                if bytes.len() + chunk.len() > max_bytes {
                    return Err(response::error(
                        StatusCode::PAYLOAD_TOO_LARGE,
                        format!("File exceeds the {} MB upload limit", max_bytes / (1024 * 1024)),
                    ));
                }
                bytes.extend_from_slice(&chunk);
            }
            if bytes.is_empty() {
                return Err(response::error(StatusCode::BAD_REQUEST, "Empty file provided"));
            }
            form.file = Some(UploadedFile { filename, bytes });
        } else if !name.is_empty() {
            let value = field.text().await.map_err(bad_body)?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

/// Reads an upload using the size limit from the system settings.
pub async fn read_limited_upload(db: &DatabaseConnection, multipart: &mut Multipart) -> Result<UploadForm, Response> {
    let limit = settings(db).await?.max_upload_bytes();
    read_upload(multipart, limit).await
}

/// Stages the upload beside its final path. Commit it with [`commit_file`]
/// once the row that references it is saved; dropping it leaves storage
/// untouched.
pub async fn store_file(kind: UploadKind, owner_id: i64, file: &UploadedFile) -> Result<StagedUpload, Response> {
    write_upload(kind, owner_id, &file.filename, file).await
}

/// Stages the file as `{tag}_{filename}` so that uploads sharing an owner id
/// do not overwrite each other. The original filename is kept in the result.
pub async fn store_tagged_file(
    kind: UploadKind,
    owner_id: i64,
    tag: &str,
    file: &UploadedFile,
) -> Result<StagedUpload, Response> {
    let mut staged = write_upload(kind, owner_id, &format!("{tag}_{}", file.filename), file).await?;
    staged.rename_original(&file.filename);
    Ok(staged)
}

async fn write_upload(
    kind: UploadKind,
    owner_id: i64,
    stored_name: &str,
    file: &UploadedFile,
) -> Result<StagedUpload, Response> {
    paths::stage_upload(kind, owner_id, stored_name, &file.bytes)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, prefix = kind.prefix(), "Failed to save upload");
            response::error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save file")
        })
}

/// Moves a staged upload onto its final path.
pub fn commit_file(staged: StagedUpload) -> Result<StoredFile, Response> {
    let path = staged.stored().relative_path.clone();
    staged.commit().map_err(|e| {
        tracing::error!(error = %e, path = %path, "Failed to move upload into place");
        response::error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save file")
    })
}

/// Best-effort removal of a file that is no longer referenced.
pub async fn discard_file(relative_path: &str) {
    if let Err(e) = paths::remove_upload(relative_path).await {
        tracing::warn!(error = %e, path = relative_path, "Failed to remove replaced upload");
    }
}
