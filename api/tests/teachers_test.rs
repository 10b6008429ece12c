mod helpers;

#[cfg(test)]
mod tests {
    use crate::helpers::{
        fixtures::{create_admin, create_student, create_teacher, json_body, json_request, token_for},
        make_test_app,
    };
    use axum::http::StatusCode;
    use db::models::teacher_profile::{self, ApprovalStatus};
    use serde_json::json;
    use tower::ServiceExt;

    #[tokio::test]
    async fn pending_teacher_gains_analytics_after_admin_approval() {
        let (app, app_state) = make_test_app().await;
        let db = app_state.db();
        let teacher = create_teacher(db, "mrsmith", ApprovalStatus::Pending).await;
        let admin = create_admin(db).await;
        let teacher_token = token_for(&teacher);

        let response = app
            .clone()
            .oneshot(json_request("GET", "/api/teachers/analytics/", Some(&teacher_token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let json = json_body(response).await;
        assert_eq!(json["message"], "Teacher account is awaiting approval");

        let uri = format!("/api/teachers/{}/approval/", teacher.id);
        let response = app
            .clone()
            .oneshot(json_request("PUT", &uri, Some(&token_for(&admin)), Some(json!({ "status": "approved" }))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["data"]["approval_status"], "approved");
        assert!(teacher_profile::Model::is_approved(db, teacher.id).await.unwrap());

        let response = app
            .oneshot(json_request("GET", "/api/teachers/analytics/", Some(&teacher_token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["data"]["teacher_id"], teacher.id);
        assert_eq!(json["data"]["total_courses"], 0);
    }

    #[tokio::test]
    async fn students_are_refused_teacher_analytics() {
        let (app, app_state) = make_test_app().await;
        let student = create_student(app_state.db(), "alice").await;

        let response = app
            .oneshot(json_request("GET", "/api/teachers/analytics/", Some(&token_for(&student)), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let json = json_body(response).await;
        assert_eq!(json["message"], "Teacher access required");
    }

    #[tokio::test]
    async fn approval_is_admin_only_and_targets_teachers() {
        let (app, app_state) = make_test_app().await;
        let db = app_state.db();
        let pending = create_teacher(db, "mrsmith", ApprovalStatus::Pending).await;
        let approved = create_teacher(db, "mrsjones", ApprovalStatus::Approved).await;
        let student = create_student(db, "alice").await;
        let admin = create_admin(db).await;

        let uri = format!("/api/teachers/{}/approval/", pending.id);
        let response = app
            .clone()
            .oneshot(json_request("PUT", &uri, Some(&token_for(&approved)), Some(json!({ "status": "approved" }))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let uri = format!("/api/teachers/{}/approval/", student.id);
        let response = app
            .clone()
            .oneshot(json_request("PUT", &uri, Some(&token_for(&admin)), Some(json!({ "status": "approved" }))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(json_request("GET", "/api/teachers/pending/", Some(&token_for(&admin)), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        let list = json["data"].as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["user_id"], pending.id);
        assert_eq!(list[0]["specialization"], "Mathematics");
    }
}
