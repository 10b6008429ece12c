use api::routes::app_router;
use axum::{body::Body, http::Request, response::Response};
use db::test_utils::setup_test_db;
use std::convert::Infallible;
use tower::ServiceExt;
use tower::util::BoxCloneService;
use util::state::AppState;

pub type TestApp = BoxCloneService<Request<Body>, Response, Infallible>;

/// The full router over a fresh in-memory database.
pub async fn make_test_app() -> (TestApp, AppState) {
    let db = setup_test_db().await;
    let app_state = AppState::new(db);

    let router = app_router(app_state.clone());
    (router.into_service().boxed_clone(), app_state)
}
