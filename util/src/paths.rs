use crate::config;
use std::{
    io,
    path::{Path, PathBuf},
};

/// Ensure the parent directory of a *file path* exists (no-op if none).
pub fn ensure_parent_dir<P: AsRef<Path>>(file_path: P) -> io::Result<()> {
    if let Some(parent) = file_path.as_ref().parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Global storage root (absolute), from `config::storage_root()`.
/// If relative in env, resolve against current_dir().
pub fn storage_root() -> PathBuf {
    let p = PathBuf::from(config::storage_root());
    if p.is_absolute() {
        p
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(p)
    }
}

/// Upload destinations. Each maps to a fixed prefix under the storage root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    /// Question sheets for exams and assessments.
    ExamQuestions,
    StudentAnswers,
    AssignmentAttachments,
    /// Files handed in for an assignment.
    AssignmentSubmissions,
    ExamAnswers,
}

impl UploadKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            UploadKind::ExamQuestions => "exam_questions",
            UploadKind::StudentAnswers => "student_answers",
            UploadKind::AssignmentAttachments => "assignment_attachments",
            UploadKind::AssignmentSubmissions => "assignments",
            UploadKind::ExamAnswers => "exam_answers",
        }
    }
}

/// Strips directory components and anything outside `[A-Za-z0-9._-]`.
/// Never returns an empty string.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Relative storage path for an upload: `{prefix}/{owner_id}_{filename}`.
pub fn upload_relative_path(kind: UploadKind, owner_id: i64, filename: &str) -> String {
    format!("{}/{}_{}", kind.prefix(), owner_id, sanitize_filename(filename))
}

/// Resolves a stored relative path against the storage root.
pub fn absolute_path(relative: &str) -> PathBuf {
    storage_root().join(relative)
}

/// Metadata describing a file written to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Path relative to the storage root, as persisted in the database.
    pub relative_path: String,
    /// Original filename supplied by the client.
    pub filename: String,
    pub size: i64,
}

/// An upload written next to its final location under a temporary name.
/// Nothing at the final path changes until [`StagedUpload::commit`]; dropping
/// the value removes the temporary file.
#[derive(Debug)]
pub struct StagedUpload {
    stored: StoredFile,
    temp: tempfile::TempPath,
    target: PathBuf,
}

impl StagedUpload {
    /// Metadata the file will have once committed.
    pub fn stored(&self) -> &StoredFile {
        &self.stored
    }

    /// Replaces the client filename recorded for the upload. The storage path
    /// is unaffected.
    pub fn rename_original(&mut self, filename: &str) {
        self.stored.filename = filename.to_string();
    }

    /// Moves the staged file onto its final path, replacing any file there.
    pub fn commit(self) -> io::Result<StoredFile> {
        self.temp.persist(&self.target).map_err(|e| e.error)?;
        tracing::debug!(path = %self.target.display(), size = self.stored.size, "Stored upload");
        Ok(self.stored)
    }
}

/// Writes `bytes` to a temporary file beside the path derived from `kind`,
/// `owner_id` and `filename`. The caller commits it once the referencing row
/// has been saved.
pub async fn stage_upload(
    kind: UploadKind,
    owner_id: i64,
    filename: &str,
    bytes: &[u8],
) -> io::Result<StagedUpload> {
    let relative_path = upload_relative_path(kind, owner_id, filename);
    let target = absolute_path(&relative_path);
    let parent = target
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(storage_root);
    tokio::fs::create_dir_all(&parent).await?;

    let temp = tempfile::Builder::new()
        .prefix(".staged-")
        .tempfile_in(&parent)?
        .into_temp_path();
    tokio::fs::write(&temp, bytes).await?;

    Ok(StagedUpload {
        stored: StoredFile {
            relative_path,
            filename: filename.to_string(),
            size: bytes.len() as i64,
        },
        temp,
        target,
    })
}

/// Deletes a previously stored upload. Missing files are not an error.
pub async fn remove_upload(relative: &str) -> io::Result<()> {
    match tokio::fs::remove_file(absolute_path(relative)).await {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use serial_test::serial;

    #[test]
    fn sanitize_drops_directories_and_odd_characters() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\temp\\my essay.pdf"), "my_essay.pdf");
        assert_eq!(sanitize_filename(".hidden"), "hidden");
        assert_eq!(sanitize_filename(""), "upload");
    }

    #[test]
    fn relative_paths_use_kind_prefix() {
        assert_eq!(
            upload_relative_path(UploadKind::ExamAnswers, 7, "answers.pdf"),
            "exam_answers/7_answers.pdf"
        );
        assert_eq!(
            upload_relative_path(UploadKind::AssignmentSubmissions, 3, "a.zip"),
            "assignments/3_a.zip"
        );
    }

    #[tokio::test]
    #[serial]
    async fn staged_upload_only_replaces_on_commit() {
        let tmp = tempfile::tempdir().unwrap();
        AppConfig::set_storage_root(tmp.path().to_string_lossy().to_string());
        let target = tmp.path().join("student_answers/12_essay.txt");

        let first = stage_upload(UploadKind::StudentAnswers, 12, "essay.txt", b"hello")
            .await
            .unwrap();
        assert_eq!(first.stored().relative_path, "student_answers/12_essay.txt");
        assert_eq!(first.stored().size, 5);
        assert!(!target.exists());
        first.commit().unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"hello");

        let dropped = stage_upload(UploadKind::StudentAnswers, 12, "essay.txt", b"changed")
            .await
            .unwrap();
        drop(dropped);
        assert_eq!(std::fs::read(&target).unwrap(), b"hello");
        let leftovers = std::fs::read_dir(tmp.path().join("student_answers")).unwrap().count();
        assert_eq!(leftovers, 1);

        remove_upload("student_answers/12_essay.txt").await.unwrap();
        assert!(!target.exists());
        remove_upload("student_answers/12_essay.txt").await.unwrap();
    }
}
