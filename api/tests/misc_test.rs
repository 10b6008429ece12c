mod helpers;

#[cfg(test)]
mod tests {
    use crate::helpers::{
        fixtures::{
            course_with_student, create_admin, create_student, create_teacher, json_body, json_request, token_for,
        },
        make_test_app,
    };
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};
    use db::models::{assessment, teacher_profile::ApprovalStatus};
    use serde_json::json;
    use tower::ServiceExt;

    #[tokio::test]
    async fn accessibility_features_are_public_and_preferences_validated() {
        let (app, app_state) = make_test_app().await;
        let student = create_student(app_state.db(), "alice").await;
        let token = token_for(&student);

        let response = app
            .clone()
            .oneshot(json_request("GET", "/api/accessibility/features/", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["data"].as_array().unwrap().len(), 6);

        let response = app
            .clone()
            .oneshot(json_request("GET", "/api/accessibility/preferences/", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .clone()
            .oneshot(json_request("GET", "/api/accessibility/preferences/", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["data"]["font_scale"], 1.0);

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/api/accessibility/preferences/",
                Some(&token),
                Some(json!({ "font_scale": 5.0 })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(json_request(
                "PUT",
                "/api/accessibility/preferences/",
                Some(&token),
                Some(json!({ "font_scale": 1.5, "high_contrast": true })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["data"]["font_scale"], 1.5);
        assert_eq!(json["data"]["high_contrast"], true);
        assert_eq!(json["data"]["dyslexia_font"], false);
    }

    #[tokio::test]
    async fn system_settings_read_by_anyone_signed_in_and_written_by_admins() {
        let (app, app_state) = make_test_app().await;
        let db = app_state.db();
        let admin = create_admin(db).await;
        let student = create_student(db, "alice").await;

        let response = app
            .clone()
            .oneshot(json_request("GET", "/api/admin/system-settings/", Some(&token_for(&student)), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["data"]["allow_registration"], true);
        assert_eq!(json["data"]["ai_flag_threshold"], 70.0);

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/api/admin/system-settings/",
                Some(&token_for(&student)),
                Some(json!({ "allow_registration": false })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/api/admin/system-settings/",
                Some(&token_for(&admin)),
                Some(json!({ "ai_flag_threshold": 150.0 })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(json_request(
                "PUT",
                "/api/admin/system-settings/",
                Some(&token_for(&admin)),
                Some(json!({ "ai_flag_threshold": 85.0 })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["data"]["ai_flag_threshold"], 85.0);
        assert_eq!(json["data"]["updated_by"], admin.id);
    }

    #[tokio::test]
    async fn chatbot_answers_deadline_questions_from_the_learning_path() {
        let (app, app_state) = make_test_app().await;
        let db = app_state.db();
        let teacher = create_teacher(db, "mrsmith", ApprovalStatus::Approved).await;
        let student = create_student(db, "alice").await;
        let c = course_with_student(db, &teacher, &student).await;
        assessment::Model::create(db, c.id, "Worksheet 1", "", 20, Some(Utc::now() + Duration::days(2)))
            .await
            .unwrap();
        let token = token_for(&student);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/chatbot/ask/",
                Some(&token),
                Some(json!({ "message": "When is my next thing due?" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["data"]["intent"], "deadlines");
        assert!(!json["data"]["reply"].as_str().unwrap().is_empty());

        let response = app
            .oneshot(json_request("POST", "/api/chatbot/ask/", Some(&token), Some(json!({ "message": "   " }))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn analytics_overview_is_admin_only_and_course_analytics_owner_only() {
        let (app, app_state) = make_test_app().await;
        let db = app_state.db();
        let admin = create_admin(db).await;
        let teacher = create_teacher(db, "mrsmith", ApprovalStatus::Approved).await;
        let other = create_teacher(db, "mrsjones", ApprovalStatus::Approved).await;
        let student = create_student(db, "alice").await;
        let c = course_with_student(db, &teacher, &student).await;

        let response = app
            .clone()
            .oneshot(json_request("GET", "/api/analytics/overview/", Some(&token_for(&admin)), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["data"]["users"]["students"], 1);
        assert_eq!(json["data"]["users"]["teachers"], 2);
        assert_eq!(json["data"]["courses"], 1);

        let response = app
            .clone()
            .oneshot(json_request("GET", "/api/analytics/overview/", Some(&token_for(&teacher)), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let uri = format!("/api/analytics/courses/{}/", c.id);
        let response = app
            .clone()
            .oneshot(json_request("GET", &uri, Some(&token_for(&teacher)), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["data"]["enrolled_students"], 1);
        assert_eq!(json["data"]["title"], "Algebra I");

        let response = app
            .oneshot(json_request("GET", &uri, Some(&token_for(&other)), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
