use api::auth::generate_jwt;
use axum::{
    body::Body,
    http::{Request, header::CONTENT_TYPE},
    response::Response,
};
use db::models::{
    course, course_enrollment,
    student_profile,
    teacher_profile::{self, ApprovalStatus},
    user::{self, Role},
};
use sea_orm::DatabaseConnection;
use serde_json::Value;

pub const PASSWORD: &str = "password123";

pub async fn create_student(db: &DatabaseConnection, username: &str) -> user::Model {
    let u = user::Model::create(db, username, &format!("{username}@test.com"), PASSWORD, Role::Student)
        .await
        .expect("Failed to create student");
    student_profile::Model::create(db, u.id).await.expect("Failed to create student profile");
    u
}

pub async fn create_teacher(db: &DatabaseConnection, username: &str, status: ApprovalStatus) -> user::Model {
    let u = user::Model::create(db, username, &format!("{username}@test.com"), PASSWORD, Role::Teacher)
        .await
        .expect("Failed to create teacher");
    teacher_profile::Model::create(db, u.id, "Mathematics", status)
        .await
        .expect("Failed to create teacher profile");
    u
}

pub async fn create_admin(db: &DatabaseConnection) -> user::Model {
    user::Model::create(db, "root", "root@test.com", PASSWORD, Role::Admin)
        .await
        .expect("Failed to create admin")
}

/// A course taught by `teacher` with `student` already approved.
pub async fn course_with_student(
    db: &DatabaseConnection,
    teacher: &user::Model,
    student: &user::Model,
) -> course::Model {
    let c = course::Model::create(db, teacher.id, "Algebra I", "Linear equations", None)
        .await
        .expect("Failed to create course");
    let e = course_enrollment::Model::request(db, c.id, student.id)
        .await
        .expect("Failed to request enrollment");
    course_enrollment::Model::approve(db, e.id).await.expect("Failed to approve");
    c
}

pub fn token_for(user: &user::Model) -> String {
    generate_jwt(user.id, user.role).expect("Failed to sign token").0
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        builder = builder.header("Authorization", format!("Token {t}"));
    }
    match body {
        Some(b) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

const BOUNDARY: &str = "----lms-test-boundary";

/// `multipart/form-data` request with text fields and an optional `file`.
pub fn multipart_request(
    uri: &str,
    token: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &[u8])>,
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
        );
    }
    if let Some((filename, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Authorization", format!("Token {token}"))
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

pub async fn json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}
