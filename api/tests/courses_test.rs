mod helpers;

#[cfg(test)]
mod tests {
    use crate::helpers::{
        fixtures::{
            course_with_student, create_student, create_teacher, json_body, json_request, multipart_request,
            token_for,
        },
        make_test_app,
    };
    use axum::http::StatusCode;
    use db::models::{course, exam, exam_attempt, teacher_profile::ApprovalStatus};
    use sea_orm::EntityTrait;
    use serde_json::json;
    use tower::ServiceExt;

    #[tokio::test]
    async fn only_approved_teachers_create_courses() {
        let (app, app_state) = make_test_app().await;
        let db = app_state.db();
        let approved = create_teacher(db, "mrsmith", ApprovalStatus::Approved).await;
        let pending = create_teacher(db, "mrsjones", ApprovalStatus::Pending).await;
        let body = json!({ "title": "Algebra I", "description": "Linear equations" });

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/courses/", Some(&token_for(&approved)), Some(body.clone())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = json_body(response).await;
        assert_eq!(json["data"]["title"], "Algebra I");
        assert_eq!(json["data"]["teacher_id"], approved.id);

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/courses/", Some(&token_for(&pending)), Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/courses/",
                Some(&token_for(&approved)),
                Some(json!({ "title": "Physics", "subject_id": 999 })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn enrollment_request_and_approval() {
        let (app, app_state) = make_test_app().await;
        let db = app_state.db();
        let teacher = create_teacher(db, "mrsmith", ApprovalStatus::Approved).await;
        let other = create_teacher(db, "mrsjones", ApprovalStatus::Approved).await;
        let student = create_student(db, "alice").await;
        let c = course::Model::create(db, teacher.id, "Algebra I", "", None).await.unwrap();
        let student_token = token_for(&student);

        let enroll_uri = format!("/api/courses/{}/enroll/", c.id);
        let response = app
            .clone()
            .oneshot(json_request("POST", &enroll_uri, Some(&student_token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = json_body(response).await;
        assert_eq!(json["data"]["status"], "pending");
        let enrollment_id = json["data"]["id"].as_i64().unwrap();

        let response = app
            .clone()
            .oneshot(json_request("POST", &enroll_uri, Some(&student_token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let decide_uri = format!("/api/courses/{}/enrollments/{}/", c.id, enrollment_id);
        let response = app
            .clone()
            .oneshot(json_request("PUT", &decide_uri, Some(&token_for(&other)), Some(json!({ "status": "approved" }))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .clone()
            .oneshot(json_request("PUT", &decide_uri, Some(&token_for(&teacher)), Some(json!({ "status": "pending" }))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .clone()
            .oneshot(json_request("PUT", &decide_uri, Some(&token_for(&teacher)), Some(json!({ "status": "approved" }))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["data"]["status"], "approved");
        assert!(json["data"]["approved_at"].is_string());

        let list_uri = format!("/api/courses/{}/enrollments/", c.id);
        let response = app
            .oneshot(json_request("GET", &list_uri, Some(&token_for(&teacher)), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn exam_lifecycle_from_draft_to_graded_attempt() {
        let (app, app_state) = make_test_app().await;
        let db = app_state.db();
        let teacher = create_teacher(db, "mrsmith", ApprovalStatus::Approved).await;
        let student = create_student(db, "alice").await;
        let c = course_with_student(db, &teacher, &student).await;
        let teacher_token = token_for(&teacher);
        let student_token = token_for(&student);

        let exams_uri = format!("/api/courses/{}/exams/", c.id);
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &exams_uri,
                Some(&teacher_token),
                Some(json!({
                    "title": "Midterm",
                    "exam_type": "Mid",
                    "total_marks": 50,
                    "duration_minutes": 90
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = json_body(response).await;
        assert_eq!(json["data"]["status"], "draft");
        let exam_id = json["data"]["id"].as_i64().unwrap();

        // Drafts stay hidden from students.
        let response = app
            .clone()
            .oneshot(json_request("GET", &exams_uri, Some(&student_token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(json_body(response).await["data"].as_array().unwrap().is_empty());

        let attempts_uri = format!("/api/courses/{}/exams/{}/attempts/", c.id, exam_id);
        let response = app
            .clone()
            .oneshot(json_request("POST", &attempts_uri, Some(&student_token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let status_uri = format!("/api/courses/{}/exams/{}/status/", c.id, exam_id);
        let response = app
            .clone()
            .oneshot(json_request("PUT", &status_uri, Some(&teacher_token), Some(json!({ "status": "published" }))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(json_request("GET", &exams_uri, Some(&student_token), None))
            .await
            .unwrap();
        assert_eq!(json_body(response).await["data"].as_array().unwrap().len(), 1);

        let response = app
            .clone()
            .oneshot(json_request("POST", &attempts_uri, Some(&student_token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let attempt_id = json_body(response).await["data"]["id"].as_i64().unwrap();

        let response = app
            .clone()
            .oneshot(json_request("POST", &attempts_uri, Some(&student_token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let submit_uri = format!("{attempts_uri}{attempt_id}/submit/");
        let response = app
            .clone()
            .oneshot(multipart_request(&submit_uri, &student_token, &[("answer_text", "   ")], None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .clone()
            .oneshot(multipart_request(&submit_uri, &student_token, &[("answer_text", "x = 4")], None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["data"]["answer_text"], "x = 4");
        assert!(json["data"]["submitted_at"].is_string());
        assert!(json["data"]["time_taken_minutes"].as_i64().unwrap() <= 1);

        let response = app
            .clone()
            .oneshot(multipart_request(&submit_uri, &student_token, &[("answer_text", "again")], None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let grade_uri = format!("{attempts_uri}{attempt_id}/grade/");
        let response = app
            .clone()
            .oneshot(json_request("PUT", &grade_uri, Some(&teacher_token), Some(json!({ "score": 51.0 }))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                &grade_uri,
                Some(&teacher_token),
                Some(json!({ "score": 40.0, "feedback": "Good work" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["data"]["percentage"], 80.0);
        assert_eq!(json["data"]["graded_by"], teacher.id);
        assert_eq!(json["data"]["feedback"], "Good work");

        let ai_uri = format!("{attempts_uri}{attempt_id}/ai-detection/");
        let response = app
            .clone()
            .oneshot(json_request("POST", &ai_uri, Some(&teacher_token), Some(json!({ "score": 150.0 }))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &ai_uri,
                Some(&teacher_token),
                Some(json!({ "score": 90.0, "result": { "model": "detector-v2" } })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["data"]["is_flagged_ai"], true);
        assert_eq!(json["data"]["ai_detection_performed"], true);
        assert_eq!(json["data"]["ai_detection_result"]["model"], "detector-v2");

        let response = app
            .clone()
            .oneshot(json_request("GET", &attempts_uri, Some(&student_token), None))
            .await
            .unwrap();
        assert_eq!(json_body(response).await["data"].as_array().unwrap().len(), 1);

        let response = app
            .oneshot(json_request("DELETE", &format!("/api/courses/{}/", c.id), Some(&teacher_token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(exam::Entity::find_by_id(exam_id).one(db).await.unwrap().is_none());
        assert!(exam_attempt::Entity::find_by_id(attempt_id).one(db).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn exams_of_another_teachers_course_are_forbidden() {
        let (app, app_state) = make_test_app().await;
        let db = app_state.db();
        let teacher = create_teacher(db, "mrsmith", ApprovalStatus::Approved).await;
        let other = create_teacher(db, "mrsjones", ApprovalStatus::Approved).await;
        let student = create_student(db, "alice").await;
        let outsider = create_student(db, "bob").await;
        let c = course_with_student(db, &teacher, &student).await;
        let uri = format!("/api/courses/{}/exams/", c.id);

        for token in [token_for(&other), token_for(&outsider)] {
            let response = app.clone().oneshot(json_request("GET", &uri, Some(&token), None)).await.unwrap();
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
        }

        let response = app
            .oneshot(json_request(
                "POST",
                &uri,
                Some(&token_for(&other)),
                Some(json!({ "title": "Quiz", "exam_type": "Quiz", "total_marks": 10, "duration_minutes": 15 })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
