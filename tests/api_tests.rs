//! API integration tests
//!
//! Run against a live server with seeded data:
//! cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Unique suffix so repeated runs do not trip uniqueness constraints
fn unique_tag() -> String {
    format!(
        "{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    )
}

async fn create_book(client: &Client, total_copies: i32) -> i64 {
    let tag = unique_tag();
    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": format!("Test Book {}", tag),
            "author": "Test Author",
            "isbn": format!("978{}", &tag[tag.len() - 10..]),
            "total_copies": total_copies
        }))
        .send()
        .await
        .expect("Failed to create book");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
    body["entity_id"].as_i64().expect("No book ID")
}

async fn create_member(client: &Client) -> i64 {
    let tag = unique_tag();
    let response = client
        .post(format!("{}/members", BASE_URL))
        .json(&json!({
            "full_name": format!("Test Member {}", tag),
            "email": format!("member{}@example.org", tag),
            "phone": "0123456789"
        }))
        .send()
        .await
        .expect("Failed to create member");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["entity_id"].as_i64().expect("No member ID")
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_readiness_reflects_store_connectivity() {
    let client = Client::new();

    // With the database up, /ready must have round-tripped a query
    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_login_unknown_user_reports_in_band_failure() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "nobody-in-particular",
            "password": "whatever"
        }))
        .send()
        .await
        .expect("Failed to send request");

    // Auth failures are in-band, not transport faults
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], false);
    assert!(body["staff_id"].is_null());
    assert!(!body["message"].as_str().unwrap().is_empty());
}

#[tokio::test]
#[ignore]
async fn test_staff_account_lifecycle() {
    let client = Client::new();
    let tag = unique_tag();
    let username = format!("librarian{}", tag);

    // Create account
    let response = client
        .post(format!("{}/staff", BASE_URL))
        .json(&json!({
            "username": username,
            "email": format!("{}@example.org", username),
            "password": "shelf-stacker-9"
        }))
        .send()
        .await
        .expect("Failed to create staff account");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let staff_id = body["entity_id"].as_i64().expect("No staff ID");

    // Correct credentials log in
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "username": username, "password": "shelf-stacker-9" }))
        .send()
        .await
        .expect("Failed to send login");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
    assert_eq!(body["staff_id"].as_i64(), Some(staff_id));

    // Wrong password does not
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "username": username, "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send login");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], false);

    // Duplicate username is rejected
    let response = client
        .post(format!("{}/staff", BASE_URL))
        .json(&json!({
            "username": username,
            "email": format!("other{}@example.org", tag),
            "password": "another-pass"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    // Cleanup
    let response = client
        .delete(format!("{}/staff/{}", BASE_URL, staff_id))
        .send()
        .await
        .expect("Failed to delete staff account");
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_duplicate_staff_email_rejected_case_insensitively() {
    let client = Client::new();
    let tag = unique_tag();

    let response = client
        .post(format!("{}/staff", BASE_URL))
        .json(&json!({
            "username": format!("mailed{}", tag),
            "email": format!("shared{}@example.org", tag),
            "password": "first-pass"
        }))
        .send()
        .await
        .expect("Failed to create staff account");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    let staff_id = body["entity_id"].as_i64().unwrap();

    // Same address, different case and username: still one account per email
    let response = client
        .post(format!("{}/staff", BASE_URL))
        .json(&json!({
            "username": format!("mailedtwo{}", tag),
            "email": format!("SHARED{}@example.org", tag),
            "password": "second-pass"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "ALREADY_EXISTS");

    let _ = client
        .delete(format!("{}/staff/{}", BASE_URL, staff_id))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_self_profile_update_requires_current_password() {
    let client = Client::new();
    let tag = unique_tag();
    let username = format!("profiled{}", tag);

    let response = client
        .post(format!("{}/staff", BASE_URL))
        .json(&json!({
            "username": username,
            "email": format!("{}@example.org", username),
            "password": "original-pass"
        }))
        .send()
        .await
        .expect("Failed to create staff account");
    let body: Value = response.json().await.unwrap();
    let staff_id = body["entity_id"].as_i64().unwrap();

    // Wrong current password: nothing changes
    let response = client
        .put(format!("{}/staff/{}/profile", BASE_URL, staff_id))
        .json(&json!({
            "new_username": format!("renamed{}", tag),
            "current_password": "not-the-password"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);

    let response = client
        .get(format!("{}/staff/{}", BASE_URL, staff_id))
        .send()
        .await
        .expect("Failed to fetch account");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["username"].as_str(), Some(username.as_str()));

    // Correct current password with a password change flags the session
    let response = client
        .put(format!("{}/staff/{}/profile", BASE_URL, staff_id))
        .json(&json!({
            "current_password": "original-pass",
            "new_password": "rotated-pass"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["password_changed"], true);

    let _ = client
        .delete(format!("{}/staff/{}", BASE_URL, staff_id))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_duplicate_isbn_rejected() {
    let client = Client::new();
    let tag = unique_tag();
    let isbn = format!("978{}", &tag[tag.len() - 10..]);

    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": "First Copy",
            "author": "A. Author",
            "isbn": isbn,
            "total_copies": 1
        }))
        .send()
        .await
        .expect("Failed to create book");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    let book_id = body["entity_id"].as_i64().unwrap();

    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": "Second Copy",
            "author": "A. Author",
            "isbn": isbn,
            "total_copies": 1
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "ALREADY_EXISTS");

    // First book unaffected
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to fetch book");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["title"], "First Copy");

    let _ = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_search_books_streams_ndjson() {
    let client = Client::new();
    let book_id = create_book(&client, 2).await;

    let response = client
        .get(format!("{}/books/search?q=test book", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    assert_eq!(
        response.headers()["content-type"],
        "application/x-ndjson"
    );

    let text = response.text().await.expect("Failed to read body");
    let found = text
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| serde_json::from_str::<Value>(line).expect("Invalid NDJSON line"))
        .any(|book| book["id"].as_i64() == Some(book_id));
    assert!(found);

    let _ = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_member_crud() {
    let client = Client::new();
    let member_id = create_member(&client).await;

    let response = client
        .get(format!("{}/members/{}", BASE_URL, member_id))
        .send()
        .await
        .expect("Failed to fetch member");
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert!(body["member_id"].as_str().unwrap().starts_with("M-"));
    assert_eq!(body["max_loans"].as_i64(), Some(5));
    assert_eq!(body["is_active"], true);

    let response = client
        .put(format!("{}/members/{}", BASE_URL, member_id))
        .json(&json!({ "phone": "0987654321" }))
        .send()
        .await
        .expect("Failed to update member");
    assert!(response.status().is_success());

    let response = client
        .delete(format!("{}/members/{}", BASE_URL, member_id))
        .send()
        .await
        .expect("Failed to delete member");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/members/{}", BASE_URL, member_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}
