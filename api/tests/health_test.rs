mod helpers;

#[cfg(test)]
mod tests {
    use crate::helpers::{
        fixtures::{create_admin, create_student, json_body, json_request, token_for},
        make_test_app,
    };
    use axum::http::StatusCode;
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_check_returns_ok_json() {
        let (app, _) = make_test_app().await;

        let response = app.oneshot(json_request("GET", "/api/health/", None, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], "OK");
        assert_eq!(json["message"], "Health check passed");
    }

    #[tokio::test]
    async fn admin_index_lists_row_counts_for_admins_only() {
        let (app, app_state) = make_test_app().await;
        let admin = create_admin(app_state.db()).await;
        let student = create_student(app_state.db(), "alice").await;

        let response = app.clone().oneshot(json_request("GET", "/admin/", None, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .clone()
            .oneshot(json_request("GET", "/admin/", Some(&token_for(&student)), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .oneshot(json_request("GET", "/admin/", Some(&token_for(&admin)), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        let tables = json["data"].as_array().expect("array of table counts");
        assert_eq!(tables.len(), 14);
        let users = tables.iter().find(|t| t["table"] == "users").unwrap();
        assert_eq!(users["rows"], 2);
    }
}
