mod helpers;

#[cfg(test)]
mod tests {
    use crate::helpers::{
        fixtures::{
            course_with_student, create_admin, create_student, create_teacher, json_body, json_request,
            multipart_request, token_for,
        },
        make_test_app,
    };
    use axum::http::StatusCode;
    use db::models::{
        assessment, assignment,
        exam::{self, ExamStatus, ExamType, NewExam},
        teacher_profile::ApprovalStatus,
    };
    use serde_json::json;
    use serial_test::serial;
    use tower::ServiceExt;
    use util::{config::AppConfig, paths::absolute_path, test_helpers::setup_test_storage_root};

    #[tokio::test]
    #[serial]
    async fn assessment_questions_and_answers_are_stored_per_owner() {
        let _tmp = setup_test_storage_root();
        let (app, app_state) = make_test_app().await;
        let db = app_state.db();
        let teacher = create_teacher(db, "mrsmith", ApprovalStatus::Approved).await;
        let student = create_student(db, "alice").await;
        let c = course_with_student(db, &teacher, &student).await;
        let a = assessment::Model::create(db, c.id, "Worksheet", "", 20, None).await.unwrap();

        let uri = format!("/api/assessments/{}/questions/", a.id);
        let response = app
            .clone()
            .oneshot(multipart_request(&uri, &token_for(&teacher), &[], Some(("sheet.pdf", b"%PDF-1.4".as_slice()))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        let questions = format!("exam_questions/{}_assessment_sheet.pdf", a.id);
        assert_eq!(json["data"]["questions_file"], questions.as_str());
        assert_eq!(json["data"]["questions_filename"], "sheet.pdf");
        assert!(absolute_path(&questions).exists());

        let answers_uri = format!("/api/assessments/{}/answers/", a.id);
        let student_token = token_for(&student);
        let response = app
            .clone()
            .oneshot(multipart_request(
                &answers_uri,
                &student_token,
                &[("answer_text", "see file")],
                Some(("first.txt", b"x = 4".as_slice())),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        let first = format!("student_answers/{}_{}_first.txt", a.id, student.id);
        assert_eq!(json["data"]["answer_file"], first.as_str());
        assert_eq!(json["data"]["answer_filename"], "first.txt");
        assert_eq!(json["data"]["answer_file_size"], 5);
        let answer_id = json["data"]["id"].as_i64().unwrap();
        assert!(absolute_path(&first).exists());

        let grade_uri = format!("/api/assessments/answers/{answer_id}/grade/");
        let response = app
            .clone()
            .oneshot(json_request("PUT", &grade_uri, Some(&token_for(&teacher)), Some(json!({ "score": 15.0 }))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["data"]["score"], 15.0);

        let response = app
            .clone()
            .oneshot(multipart_request(&answers_uri, &student_token, &[], Some(("second.txt", b"x = 5".as_slice()))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        let second = format!("student_answers/{}_{}_second.txt", a.id, student.id);
        assert_eq!(json["data"]["id"], answer_id);
        assert_eq!(json["data"]["answer_file"], second.as_str());
        assert!(json["data"]["score"].is_null());
        assert!(absolute_path(&second).exists());
        assert!(!absolute_path(&first).exists());

        AppConfig::reset();
    }

    #[tokio::test]
    #[serial]
    async fn uploads_above_configured_limit_are_refused() {
        let _tmp = setup_test_storage_root();
        let (app, app_state) = make_test_app().await;
        let db = app_state.db();
        let admin = create_admin(db).await;
        let teacher = create_teacher(db, "mrsmith", ApprovalStatus::Approved).await;
        let student = create_student(db, "alice").await;
        let c = course_with_student(db, &teacher, &student).await;
        let a = assessment::Model::create(db, c.id, "Worksheet", "", 20, None).await.unwrap();

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/api/admin/system-settings/",
                Some(&token_for(&admin)),
                Some(json!({ "max_upload_mb": 1 })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let big = vec![b'a'; 2 * 1024 * 1024];
        let uri = format!("/api/assessments/{}/answers/", a.id);
        let response = app
            .oneshot(multipart_request(&uri, &token_for(&student), &[], Some(("big.txt", big.as_slice()))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let json = json_body(response).await;
        assert_eq!(json["message"], "File exceeds the 1 MB upload limit");

        AppConfig::reset();
    }

    #[tokio::test]
    #[serial]
    async fn assignment_submission_and_grading() {
        let _tmp = setup_test_storage_root();
        let (app, app_state) = make_test_app().await;
        let db = app_state.db();
        let teacher = create_teacher(db, "mrsmith", ApprovalStatus::Approved).await;
        let student = create_student(db, "alice").await;
        let outsider = create_student(db, "bob").await;
        let c = course_with_student(db, &teacher, &student).await;
        let a = assignment::Model::create(db, c.id, "Lab report", "", 10, None).await.unwrap();

        let uri = format!("/api/assessments/assignments/{}/submissions/", a.id);
        let response = app
            .clone()
            .oneshot(multipart_request(&uri, &token_for(&outsider), &[("content", "hello")], None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .clone()
            .oneshot(multipart_request(&uri, &token_for(&student), &[("content", "")], None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .clone()
            .oneshot(multipart_request(
                &uri,
                &token_for(&student),
                &[("content", "Results attached")],
                Some(("report.pdf", b"%PDF-1.4".as_slice())),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        let path = format!("assignments/{}_{}_report.pdf", a.id, student.id);
        assert_eq!(json["data"]["submission_file"], path.as_str());
        assert!(absolute_path(&path).exists());
        let submission_id = json["data"]["id"].as_i64().unwrap();

        let grade_uri = format!("/api/assessments/submissions/{submission_id}/grade/");
        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                &grade_uri,
                Some(&token_for(&teacher)),
                Some(json!({ "score": 11.0, "feedback": "Too high" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                &grade_uri,
                Some(&token_for(&teacher)),
                Some(json!({ "score": 8.5, "feedback": "Clear method" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["data"]["score"], 8.5);
        assert_eq!(json["data"]["feedback"], "Clear method");

        let response = app
            .oneshot(json_request("GET", &uri, Some(&token_for(&teacher)), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["data"].as_array().unwrap().len(), 1);

        AppConfig::reset();
    }

    #[tokio::test]
    #[serial]
    async fn rejected_question_upload_leaves_stored_file_untouched() {
        let tmp = setup_test_storage_root();
        let (app, app_state) = make_test_app().await;
        let db = app_state.db();
        let teacher = create_teacher(db, "mrsmith", ApprovalStatus::Approved).await;
        let student = create_student(db, "alice").await;
        let c = course_with_student(db, &teacher, &student).await;
        let draft = exam::Model::create(
            db,
            c.id,
            NewExam {
                title: "Final".into(),
                description: String::new(),
                exam_type: ExamType::Final,
                total_marks: 100,
                duration_minutes: 120,
                due_date: None,
                question_count: 10,
            },
        )
        .await
        .unwrap();

        let uri = format!("/api/courses/{}/exams/{}/questions/", c.id, draft.id);
        let response = app
            .clone()
            .oneshot(multipart_request(&uri, &token_for(&teacher), &[], Some(("q.pdf", b"ORIGINAL".as_slice()))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let path = format!("exam_questions/{}_exam_q.pdf", draft.id);
        assert_eq!(json_body(response).await["data"]["questions_file"], path.as_str());

        exam::Model::transition(db, draft.id, ExamStatus::Published).await.unwrap();
        exam::Model::transition(db, draft.id, ExamStatus::Completed).await.unwrap();

        let response = app
            .clone()
            .oneshot(multipart_request(&uri, &token_for(&teacher), &[], Some(("q.pdf", b"TAMPERED".as_slice()))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        assert_eq!(std::fs::read(absolute_path(&path)).unwrap(), b"ORIGINAL");
        let stored = std::fs::read_dir(tmp.path().join("exam_questions")).unwrap().count();
        assert_eq!(stored, 1);

        AppConfig::reset();
    }
}
