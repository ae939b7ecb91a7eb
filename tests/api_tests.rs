use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use ricettario::config::Config;
use tower::ServiceExt;

/// Username/password seeded by the initial migration.
const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "password";

async fn spawn_app() -> (Router, tempfile::TempDir) {
    let images_dir = tempfile::tempdir().expect("Failed to create temp images dir");

    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.general.images_path = images_dir.path().to_string_lossy().to_string();
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;
    config.server.secure_cookies = false;

    let state = ricettario::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");

    (ricettario::api::router(state).await, images_dir)
}

fn session_cookie<B>(response: &Response<B>) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("Expected a session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

fn json_request_with_cookie(
    method: &str,
    uri: &str,
    cookie: &str,
    body: &serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .header(header::COOKIE, cookie)
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

async fn register(app: &Router, username: &str, email: &str) -> Response<axum::body::Body> {
    let payload = serde_json::json!({
        "name": "Test",
        "surname": "User",
        "email": email,
        "username": username,
        "password": "hunter2hunter2"
    });

    app.clone()
        .oneshot(json_request("POST", "/api/auth/register", &payload))
        .await
        .unwrap()
}

async fn login(app: &Router, username: &str, password: &str) -> Response<axum::body::Body> {
    let payload = serde_json::json!({ "username": username, "password": password });

    app.clone()
        .oneshot(json_request("POST", "/api/auth/login", &payload))
        .await
        .unwrap()
}

async fn login_cookie(app: &Router, username: &str, password: &str) -> String {
    let response = login(app, username, password).await;
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response)
}

async fn create_recipe(app: &Router, cookie: &str, name: &str) -> i64 {
    let payload = serde_json::json!({
        "name": name,
        "description": "A test recipe",
        "category": "Primi"
    });

    let response = app
        .clone()
        .oneshot(json_request_with_cookie("POST", "/api/recipes", cookie, &payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    body["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_public_routes_need_no_session() {
    let (app, _images) = spawn_app().await;

    for uri in ["/api/recipes", "/api/cooks", "/api/ingredients"] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK, "{uri}");
    }
}

#[tokio::test]
async fn test_protected_routes_require_session() {
    let (app, _images) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/users/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/recipes",
            &serde_json::json!({ "name": "x", "description": "y" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_login_flow() {
    let (app, _images) = spawn_app().await;

    let response = register(&app, "alice", "alice@example.com").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = login(&app, "alice", "wrong-password").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = login(&app, "alice", "hunter2hunter2").await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response);
    let body = body_json(response).await;
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["role"], "DEFAULT");
    assert_eq!(body["data"]["redirect"], "/");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/users/me")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["user"]["email"], "alice@example.com");
}

#[tokio::test]
async fn test_duplicate_username_rejected() {
    let (app, _images) = spawn_app().await;

    let response = register(&app, "alice", "alice@example.com").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = register(&app, "alice", "other@example.com").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(
        body["error"],
        "Username already exists. Please choose another one."
    );

    // The first registration still logs in; the second never existed.
    let response = login(&app, "alice", "hunter2hunter2").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["username"], "alice");
}

#[tokio::test]
async fn test_admin_login_redirects_to_admin() {
    let (app, _images) = spawn_app().await;

    let response = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["role"], "ADMIN");
    assert_eq!(body["data"]["redirect"], "/admin");
}

#[tokio::test]
async fn test_recipe_crud_flow() {
    let (app, _images) = spawn_app().await;

    register(&app, "alice", "alice@example.com").await;
    let cookie = login_cookie(&app, "alice", "hunter2hunter2").await;

    let id = create_recipe(&app, &cookie, "Carbonara").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/recipes/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["name"], "Carbonara");
    assert_eq!(body["data"]["category"], "Primi");

    let response = app
        .clone()
        .oneshot(json_request_with_cookie(
            "PUT",
            &format!("/api/recipes/{id}"),
            &cookie,
            &serde_json::json!({ "name": "Carbonara (updated)", "description": "More guanciale" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["name"], "Carbonara (updated)");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/recipes/{id}"))
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/recipes/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_recipe_is_404() {
    let (app, _images) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/recipes/9999")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_only_owner_or_admin_may_mutate() {
    let (app, _images) = spawn_app().await;

    register(&app, "alice", "alice@example.com").await;
    register(&app, "bob", "bob@example.com").await;
    let alice = login_cookie(&app, "alice", "hunter2hunter2").await;
    let bob = login_cookie(&app, "bob", "hunter2hunter2").await;

    let id = create_recipe(&app, &alice, "Amatriciana").await;

    // Bob is not the owner.
    let response = app
        .clone()
        .oneshot(json_request_with_cookie(
            "PUT",
            &format!("/api/recipes/{id}"),
            &bob,
            &serde_json::json!({ "name": "Hijacked", "description": "nope" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/recipes/{id}"))
                .header(header::COOKIE, &bob)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Unchanged after the rejected attempts.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/recipes/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["name"], "Amatriciana");

    // The admin path is allowed.
    let admin = login_cookie(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/admin/recipes/{id}"))
                .header(header::COOKIE, &admin)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_routes_reject_default_role() {
    let (app, _images) = spawn_app().await;

    register(&app, "alice", "alice@example.com").await;
    let alice = login_cookie(&app, "alice", "hunter2hunter2").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/admin/users")
                .header(header::COOKIE, &alice)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin = login_cookie(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/admin/users")
                .header(header::COOKIE, &admin)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_photo_upload_appends_and_remove_deletes_file() {
    let (app, images) = spawn_app().await;

    register(&app, "alice", "alice@example.com").await;
    let cookie = login_cookie(&app, "alice", "hunter2hunter2").await;
    let id = create_recipe(&app, &cookie, "Tiramisu").await;

    let boundary = "X-RICETTARIO-BOUNDARY";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"image\"; filename=\"plate.jpg\"\r\n\
         Content-Type: image/jpeg\r\n\r\n\
         not-really-a-jpeg\r\n\
         --{boundary}--\r\n"
    );

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/recipes/{id}/photos"))
                .header(header::COOKIE, &cookie)
                .header(
                    "Content-Type",
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["photos"][0], "plate.jpg");
    assert!(images.path().join("plate.jpg").exists());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/recipes/{id}/photos/plate.jpg"))
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(!images.path().join("plate.jpg").exists());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/recipes/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["photos"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_system_status_requires_session() {
    let (app, _images) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/system/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let admin = login_cookie(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/system/status")
                .header(header::COOKIE, &admin)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["database"], "ok");
}

#[tokio::test]
async fn test_google_login_redirects_to_consent_screen() {
    let images_dir = tempfile::tempdir().unwrap();

    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.general.images_path = images_dir.path().to_string_lossy().to_string();
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;
    config.server.secure_cookies = false;
    config.oauth.google.enabled = true;
    config.oauth.google.client_id = "client-123".to_string();
    config.oauth.google.client_secret = "secret".to_string();

    let state = ricettario::api::create_app_state_from_config(config, None)
        .await
        .unwrap();
    let app = ricettario::api::router(state).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/google")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
    assert!(location.contains("state="));
}

#[tokio::test]
async fn test_google_login_disabled_is_rejected() {
    let (app, _images) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/google")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_logout_invalidates_session() {
    let (app, _images) = spawn_app().await;

    register(&app, "alice", "alice@example.com").await;
    let cookie = login_cookie(&app, "alice", "hunter2hunter2").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/logout")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/users/me")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
