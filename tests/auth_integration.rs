mod helpers;

use account_service::auth::hash_token;
use helpers::{registration_body, set_cookies, spawn_app, token, PASSWORD};
use serde_json::{json, Value};

// --- Registration Tests ---

#[tokio::test]
async fn register_returns_201_and_hides_secrets() {
    let app = spawn_app().await;

    let response = app.register("John_Doe", "John@Example.com").await;
    assert_eq!(201, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["username"], "john_doe");
    assert_eq!(body["email"], "john@example.com");
    assert!(body.get("password_hash").is_none());
    assert!(body.get("refresh_token_hash").is_none());
    assert!(body.get("access_token").is_none());

    let stored = app.user_by_username("john_doe").await;
    assert_ne!(stored.password_hash, PASSWORD);
    assert!(stored.refresh_token_hash.is_none());
}

#[tokio::test]
async fn register_accepts_ordinary_names_and_emails_containing_sql_words() {
    let app = spawn_app().await;

    let cases = [
        ("broadcaster", "broadcast@example.com", "Sandra Castillo"),
        ("sleepy", "sleepy@example.com", "Bob Sleeper"),
        ("wasp_fan", "wasp_fan@example.com", "Union Jack"),
    ];

    for (username, email, full_name) in cases {
        let mut body = registration_body(username, email);
        body["full_name"] = json!(full_name);

        let response = app.post_json("/register", &body).await;
        assert_eq!(201, response.status().as_u16(), "Rejected {} / {}", email, full_name);
    }
    assert_eq!(app.store.len().await, 3);
}

#[tokio::test]
async fn register_returns_400_for_missing_or_empty_fields() {
    let app = spawn_app().await;

    let mut test_cases = Vec::new();
    for field in ["full_name", "username", "email", "password", "avatar"] {
        let mut missing = registration_body("john", "john@example.com");
        missing.as_object_mut().unwrap().remove(field);
        test_cases.push((missing, format!("missing {}", field)));

        let mut empty = registration_body("john", "john@example.com");
        empty[field] = json!("   ");
        test_cases.push((empty, format!("empty {}", field)));
    }

    for (body, reason) in test_cases {
        let response = app.post_json("/register", &body).await;
        assert_eq!(400, response.status().as_u16(), "Should reject request: {}", reason);

        let body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body["code"], "VALIDATION_ERROR", "{}", reason);
    }
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn register_returns_400_for_weak_password() {
    let app = spawn_app().await;

    for weak in ["short1A", "nouppercase123", "NOLOWERCASE123", "NoDigitsHere"] {
        let mut body = registration_body("john", "john@example.com");
        body["password"] = json!(weak);

        let response = app.post_json("/register", &body).await;
        assert_eq!(400, response.status().as_u16(), "Should reject weak password {}", weak);
    }
}

#[tokio::test]
async fn register_returns_409_for_duplicate_username_or_email() {
    let app = spawn_app().await;

    assert_eq!(201, app.register("john", "john@example.com").await.status().as_u16());

    let same_username = app.register("JOHN", "other@example.com").await;
    assert_eq!(409, same_username.status().as_u16());

    let same_email = app.register("johnny", "john@example.com").await;
    assert_eq!(409, same_email.status().as_u16());
    let body: Value = same_email.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], "DUPLICATE_ENTRY");

    assert_eq!(1, app.store.len().await);
}

// --- Login Tests ---

#[tokio::test]
async fn login_with_username_returns_tokens_and_persists_refresh_token() {
    let app = spawn_app().await;

    let body = app.register_and_login().await;
    assert_eq!(body["user"]["username"], "john");
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 900);
    let refresh_token = token(&body, "refresh_token");
    assert!(!token(&body, "access_token").is_empty());

    let stored = app.user_by_username("john").await;
    assert_eq!(stored.refresh_token_hash, Some(hash_token(&refresh_token)));
}

#[tokio::test]
async fn login_with_email_sets_secure_http_only_cookies() {
    let app = spawn_app().await;
    app.register("john", "john@example.com").await;

    let response = app
        .post_json("/login", &json!({"email": "JOHN@example.com", "password": PASSWORD}))
        .await;
    assert_eq!(200, response.status().as_u16());

    let cookies = set_cookies(&response);
    for name in ["access_token=", "refresh_token="] {
        let cookie = cookies
            .iter()
            .find(|c| c.starts_with(name))
            .unwrap_or_else(|| panic!("No {} cookie", name));
        assert!(cookie.contains("HttpOnly"), "{}", cookie);
        assert!(cookie.contains("Secure"), "{}", cookie);
    }
}

#[tokio::test]
async fn login_with_wrong_password_returns_401_and_persists_nothing() {
    let app = spawn_app().await;
    app.register("john", "john@example.com").await;

    let response = app
        .post_json("/login", &json!({"username": "john", "password": "WrongPass123"}))
        .await;

    assert_eq!(401, response.status().as_u16());
    assert!(set_cookies(&response).is_empty());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], "INVALID_CREDENTIALS");

    assert!(app.user_by_username("john").await.refresh_token_hash.is_none());
}

#[tokio::test]
async fn login_for_unknown_user_returns_404() {
    let app = spawn_app().await;

    let response = app
        .post_json("/login", &json!({"username": "nobody", "password": PASSWORD}))
        .await;

    assert_eq!(404, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn login_returns_400_for_missing_fields() {
    let app = spawn_app().await;

    let test_cases = vec![
        (json!({"password": PASSWORD}), "missing identifier"),
        (json!({"username": "", "email": "", "password": PASSWORD}), "empty identifiers"),
        (json!({"username": "john"}), "missing password"),
        (json!({"username": "john", "password": ""}), "empty password"),
        (json!({}), "missing all fields"),
    ];

    for (body, reason) in test_cases {
        let response = app.post_json("/login", &body).await;
        assert_eq!(400, response.status().as_u16(), "Should reject request: {}", reason);
    }
}

// --- Token Refresh Tests ---

#[tokio::test]
async fn refresh_rotates_token_and_rejects_old_one() {
    let app = spawn_app().await;
    let login = app.register_and_login().await;
    let old_refresh_token = token(&login, "refresh_token");

    let response = app.refresh(&old_refresh_token).await;
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    let new_refresh_token = token(&body, "refresh_token");
    assert!(!token(&body, "access_token").is_empty());
    assert_ne!(old_refresh_token, new_refresh_token);

    let replay = app.refresh(&old_refresh_token).await;
    assert_eq!(401, replay.status().as_u16());
    let replay_body: Value = replay.json().await.expect("Failed to parse response");
    assert_eq!(replay_body["code"], "TOKEN_REUSED");

    // The newest token still works
    assert_eq!(200, app.refresh(&new_refresh_token).await.status().as_u16());
}

#[tokio::test]
async fn refresh_reads_token_from_cookie() {
    let app = spawn_app().await;
    let login = app.register_and_login().await;
    let refresh_token = token(&login, "refresh_token");

    let response = app
        .client
        .post(&app.url("/refresh-token"))
        .header("Cookie", format!("refresh_token={}", refresh_token))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    assert_eq!(2, set_cookies(&response).len());
}

#[tokio::test]
async fn refresh_without_token_returns_401_unauthorized() {
    let app = spawn_app().await;

    for body in [json!({}), json!({"refresh_token": ""})] {
        let response = app.post_json("/refresh-token", &body).await;
        assert_eq!(401, response.status().as_u16());
        let body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    let no_body = app
        .client
        .post(&app.url("/refresh-token"))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, no_body.status().as_u16());
}

#[tokio::test]
async fn refresh_with_garbage_token_returns_401_token_invalid() {
    let app = spawn_app().await;
    let login = app.register_and_login().await;

    // An access token is signed with a different secret
    for bad in ["definitely.not.valid".to_string(), token(&login, "access_token")] {
        let response = app.refresh(&bad).await;
        assert_eq!(401, response.status().as_u16());
        let body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body["code"], "TOKEN_INVALID");
    }
}

#[tokio::test]
async fn second_login_supersedes_first_session() {
    let app = spawn_app().await;
    let first = app.register_and_login().await;

    let second: Value = app
        .post_json("/login", &json!({"username": "john", "password": PASSWORD}))
        .await
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(401, app.refresh(&token(&first, "refresh_token")).await.status().as_u16());
    assert_eq!(200, app.refresh(&token(&second, "refresh_token")).await.status().as_u16());
}

// --- Logout Tests ---

#[tokio::test]
async fn logout_clears_session_and_last_token_fails() {
    let app = spawn_app().await;
    let login = app.register_and_login().await;

    let response = app
        .client
        .post(&app.url("/logout"))
        .bearer_auth(token(&login, "access_token"))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());

    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("access_token=;")));
    assert!(cookies.iter().any(|c| c.starts_with("refresh_token=;")));

    assert!(app.user_by_username("john").await.refresh_token_hash.is_none());

    let refresh = app.refresh(&token(&login, "refresh_token")).await;
    assert_eq!(401, refresh.status().as_u16());
    let body: Value = refresh.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], "TOKEN_REUSED");
}

#[tokio::test]
async fn logout_requires_access_token() {
    let app = spawn_app().await;
    let login = app.register_and_login().await;

    let response = app.post_json("/logout", &json!({})).await;
    assert_eq!(401, response.status().as_u16());

    // Session untouched
    assert_eq!(200, app.refresh(&token(&login, "refresh_token")).await.status().as_u16());
}
