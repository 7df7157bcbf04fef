// src/tests/auth_tests.rs

use crate::db::settings;
use crate::errors::ServerError;
use crate::responses::error_to_response;
use crate::router::handle;
use crate::tests::utils::{body_string, make_app, request};

#[test]
fn login_page_renders_token_form() {
    let app = make_app("login_page");

    let mut resp = handle(request("GET", "/login", ""), &app).unwrap();
    assert_eq!(resp.status(), 200);

    let body = body_string(&mut resp);
    assert!(body.contains("CivicConnect access token"));
    assert!(!body.contains("Your session expired"));
}

#[test]
fn expired_flag_shows_session_message() {
    let app = make_app("login_expired");

    let mut resp = handle(request("GET", "/login?expired=1", ""), &app).unwrap();
    let body = body_string(&mut resp);
    assert!(body.contains("Your session expired"));
}

#[test]
fn login_stores_token_and_logout_clears_it() {
    let app = make_app("login_logout");

    let resp = handle(request("POST", "/login", "token=tok-abc-123"), &app).unwrap();
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers().get("Location").unwrap(), "/worker");
    assert_eq!(
        settings::get_auth_token(&app.db).unwrap().as_deref(),
        Some("tok-abc-123")
    );

    // The login page now offers logout.
    let mut resp = handle(request("GET", "/login", ""), &app).unwrap();
    assert!(body_string(&mut resp).contains("A token is currently stored"));

    let resp = handle(request("POST", "/logout", ""), &app).unwrap();
    assert_eq!(resp.status(), 303);
    assert_eq!(settings::get_auth_token(&app.db).unwrap(), None);
}

#[test]
fn empty_token_is_rejected() {
    let app = make_app("login_empty");

    let err = handle(request("POST", "/login", "token=++"), &app).unwrap_err();
    assert!(matches!(err, ServerError::BadRequest(_)));
}

#[test]
fn unauthorized_response_redirects_to_login() {
    let resp = error_to_response(ServerError::Unauthorized);
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers().get("Location").unwrap(), "/login?expired=1");
}
