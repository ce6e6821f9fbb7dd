mod common;

use axum::http::StatusCode;
use cinema_api::domain::entities::{MOVIES_READ, MOVIES_WRITE};
use serde_json::{Value, json};

fn alice() -> Value {
    json!({
        "name": "Alice Smith",
        "email": "alice@example.com",
        "password": common::PASSWORD,
    })
}

#[tokio::test]
async fn test_register_user_success() {
    let store = common::InMemoryStore::new();
    let mailer = common::RecordingMailer::new();
    let server = common::create_test_server_with_mailer(&store, mailer.clone());

    let response = server.post("/v1/users").json(&alice()).await;

    response.assert_status(StatusCode::ACCEPTED);
    let json = response.json::<Value>();
    assert_eq!(json["user"]["name"], "Alice Smith");
    assert_eq!(json["user"]["email"], "alice@example.com");
    assert_eq!(json["user"]["activated"], false);
    assert!(json["user"].get("password").is_none());
    assert!(json["user"].get("password_hash").is_none());

    let token = mailer.activation_token_for("alice@example.com").await;
    assert_eq!(token.len(), 24);
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let store = common::InMemoryStore::new();
    common::create_test_user(&store, "alice@example.com", true, &[]).await;
    let server = common::create_test_server(&store);

    let response = server.post("/v1/users").json(&alice()).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let json = response.json::<Value>();
    assert_eq!(json["error"]["code"], "validation_error");
    assert_eq!(
        json["error"]["details"]["email"][0],
        "a user with this email address already exists"
    );
}

#[tokio::test]
async fn test_register_validation_errors() {
    let store = common::InMemoryStore::new();
    let server = common::create_test_server(&store);

    let response = server
        .post("/v1/users")
        .json(&json!({ "name": "", "email": "not-an-email", "password": "short" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let details = &response.json::<Value>()["error"]["details"];
    assert!(details.get("name").is_some());
    assert!(details.get("email").is_some());
    assert!(details.get("password").is_some());
}

#[tokio::test]
async fn test_register_rejects_unknown_field() {
    let store = common::InMemoryStore::new();
    let server = common::create_test_server(&store);

    let mut body = alice();
    body["activated"] = json!(true);

    let response = server.post("/v1/users").json(&body).await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_activate_user_with_mailed_token() {
    let store = common::InMemoryStore::new();
    let mailer = common::RecordingMailer::new();
    let server = common::create_test_server_with_mailer(&store, mailer.clone());

    server
        .post("/v1/users")
        .json(&alice())
        .await
        .assert_status(StatusCode::ACCEPTED);
    let token = mailer.activation_token_for("alice@example.com").await;

    let response = server
        .put("/v1/users/activated")
        .json(&json!({ "token": token }))
        .await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["user"]["email"], "alice@example.com");
    assert_eq!(json["user"]["activated"], true);

    // Activation tokens are single use.
    let response = server
        .put("/v1/users/activated")
        .json(&json!({ "token": token }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_activate_with_unknown_token() {
    let store = common::InMemoryStore::new();
    let server = common::create_test_server(&store);

    let response = server
        .put("/v1/users/activated")
        .json(&json!({ "token": "Y3QMGX3PJ3WLRL2YRTQGQ6KR" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"]["details"]["token"][0],
        "invalid or expired activation token"
    );
}

#[tokio::test]
async fn test_activate_with_malformed_token() {
    let store = common::InMemoryStore::new();
    let server = common::create_test_server(&store);

    let response = server
        .put("/v1/users/activated")
        .json(&json!({ "token": "abc" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let json = response.json::<Value>();
    assert_eq!(json["error"]["code"], "validation_error");
    assert!(json["error"]["details"].get("token").is_some());
    assert_eq!(store.token_lookups(), 0);
}

#[tokio::test]
async fn test_authentication_token_does_not_activate() {
    let store = common::InMemoryStore::new();
    let (user, token) =
        common::create_authenticated_user(&store, "bob@example.com", false, &[]).await;
    let server = common::create_test_server(&store);

    let response = server
        .put("/v1/users/activated")
        .json(&json!({ "token": token }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(!store.find_user(user.id).unwrap().activated);
}

#[tokio::test]
async fn test_registered_user_reads_movies_after_activation() {
    let store = common::InMemoryStore::new();
    let mailer = common::RecordingMailer::new();
    let server = common::create_test_server_with_mailer(&store, mailer.clone());

    server
        .post("/v1/users")
        .json(&alice())
        .await
        .assert_status(StatusCode::ACCEPTED);

    let issued = server
        .post("/v1/tokens/authentication")
        .json(&json!({ "email": "alice@example.com", "password": common::PASSWORD }))
        .await
        .json::<Value>();
    let auth = format!(
        "Bearer {}",
        issued["authentication_token"]["token"].as_str().unwrap()
    );

    let response = server
        .get("/v1/movies")
        .add_header("Authorization", auth.clone())
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.json::<Value>()["error"]["code"], "account_inactive");

    let activation = mailer.activation_token_for("alice@example.com").await;
    server
        .put("/v1/users/activated")
        .json(&json!({ "token": activation }))
        .await
        .assert_status_ok();

    server
        .get("/v1/movies")
        .add_header("Authorization", auth.clone())
        .await
        .assert_status_ok();

    // Registration grants read access only.
    let response = server
        .post("/v1/movies")
        .add_header("Authorization", auth)
        .json(&json!({ "title": "Moana", "year": 2016, "runtime": "107 mins", "genres": ["animation"] }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.json::<Value>()["error"]["code"], "not_permitted");

    let user = store.find_user_by_email("alice@example.com").unwrap();
    let granted = store.granted(user.id);
    assert!(granted.contains(&MOVIES_READ.to_string()));
    assert!(!granted.contains(&MOVIES_WRITE.to_string()));
}
