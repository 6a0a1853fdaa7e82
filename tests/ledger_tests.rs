//! Inventory ledger integration tests
//!
//! These exercise the copy-count invariants through the RPC surface against
//! a live server: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

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
            "title": format!("Ledger Book {}", tag),
            "author": "Ledger Author",
            "isbn": format!("979{}", &tag[tag.len() - 10..]),
            "total_copies": total_copies
        }))
        .send()
        .await
        .expect("Failed to create book");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    body["entity_id"].as_i64().expect("No book ID")
}

async fn create_member(client: &Client) -> i64 {
    let tag = unique_tag();
    let response = client
        .post(format!("{}/members", BASE_URL))
        .json(&json!({
            "full_name": format!("Ledger Member {}", tag),
            "email": format!("ledger{}@example.org", tag),
            "phone": ""
        }))
        .send()
        .await
        .expect("Failed to create member");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    body["entity_id"].as_i64().expect("No member ID")
}

async fn available_copies(client: &Client, book_id: i64) -> i64 {
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to fetch book");
    let body: Value = response.json().await.unwrap();
    body["available_copies"].as_i64().unwrap()
}

async fn borrow(client: &Client, book_id: i64, member_id: i64) -> (u16, Value) {
    let response = client
        .post(format!("{}/loans/borrow", BASE_URL))
        .json(&json!({ "book_id": book_id, "member_id": member_id }))
        .send()
        .await
        .expect("Failed to send borrow");
    let status = response.status().as_u16();
    let body: Value = response.json().await.unwrap();
    (status, body)
}

async fn return_book(client: &Client, book_id: i64, member_id: i64) -> (u16, Value) {
    let response = client
        .post(format!("{}/loans/return", BASE_URL))
        .json(&json!({ "book_id": book_id, "member_id": member_id }))
        .send()
        .await
        .expect("Failed to send return");
    let status = response.status().as_u16();
    let body: Value = response.json().await.unwrap();
    (status, body)
}

#[tokio::test]
#[ignore]
async fn concurrent_borrows_never_oversell_the_last_copy() {
    let client = Client::new();
    let book_id = create_book(&client, 1).await;

    let mut members = Vec::new();
    for _ in 0..4 {
        members.push(create_member(&client).await);
    }

    // Fire all four borrows at once; the row lock must let exactly one win.
    let mut handles = Vec::new();
    for member_id in members {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            borrow(&client, book_id, member_id).await
        }));
    }

    let mut successes = 0;
    let mut out_of_stock = 0;
    for handle in handles {
        let (status, body) = handle.await.unwrap();
        if status == 201 {
            successes += 1;
        } else {
            assert_eq!(status, 409);
            assert_eq!(body["code"], "FAILED_PRECONDITION");
            out_of_stock += 1;
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(out_of_stock, 3);
    assert_eq!(available_copies(&client, book_id).await, 0);
}

#[tokio::test]
#[ignore]
async fn borrow_return_borrow_restores_the_count_exactly() {
    let client = Client::new();
    let book_id = create_book(&client, 2).await;
    let member_id = create_member(&client).await;

    let before = available_copies(&client, book_id).await;

    let (status, _) = borrow(&client, book_id, member_id).await;
    assert_eq!(status, 201);
    assert_eq!(available_copies(&client, book_id).await, before - 1);

    let (status, _) = return_book(&client, book_id, member_id).await;
    assert_eq!(status, 200);
    assert_eq!(available_copies(&client, book_id).await, before);

    let (status, _) = borrow(&client, book_id, member_id).await;
    assert_eq!(status, 201);
    assert_eq!(available_copies(&client, book_id).await, before - 1);
}

#[tokio::test]
#[ignore]
async fn return_without_active_loan_is_rejected() {
    let client = Client::new();
    let book_id = create_book(&client, 1).await;
    let member_id = create_member(&client).await;

    let (status, body) = return_book(&client, book_id, member_id).await;
    assert_eq!(status, 409);
    assert_eq!(body["success"], false);
    assert_eq!(available_copies(&client, book_id).await, 1);
}

#[tokio::test]
#[ignore]
async fn second_return_does_not_credit_stock_twice() {
    let client = Client::new();
    let book_id = create_book(&client, 1).await;
    let member_id = create_member(&client).await;

    let (status, _) = borrow(&client, book_id, member_id).await;
    assert_eq!(status, 201);

    let (status, _) = return_book(&client, book_id, member_id).await;
    assert_eq!(status, 200);
    assert_eq!(available_copies(&client, book_id).await, 1);

    let (status, _) = return_book(&client, book_id, member_id).await;
    assert_eq!(status, 409);
    assert_eq!(available_copies(&client, book_id).await, 1);
}

#[tokio::test]
#[ignore]
async fn three_copy_scenario() {
    let client = Client::new();
    let book_id = create_book(&client, 3).await;

    let m1 = create_member(&client).await;
    let m2 = create_member(&client).await;
    let m3 = create_member(&client).await;
    let m4 = create_member(&client).await;

    assert_eq!(borrow(&client, book_id, m1).await.0, 201);
    assert_eq!(borrow(&client, book_id, m2).await.0, 201);
    assert_eq!(borrow(&client, book_id, m3).await.0, 201);
    assert_eq!(available_copies(&client, book_id).await, 0);

    // Fourth borrower finds no stock
    assert_eq!(borrow(&client, book_id, m4).await.0, 409);

    assert_eq!(return_book(&client, book_id, m1).await.0, 200);
    assert_eq!(available_copies(&client, book_id).await, 1);

    assert_eq!(borrow(&client, book_id, m4).await.0, 201);
    assert_eq!(available_copies(&client, book_id).await, 0);
}

#[tokio::test]
#[ignore]
async fn loan_limit_is_enforced() {
    let client = Client::new();
    let book_a = create_book(&client, 1).await;
    let book_b = create_book(&client, 1).await;
    let member_id = create_member(&client).await;

    let response = client
        .put(format!("{}/members/{}", BASE_URL, member_id))
        .json(&json!({ "max_loans": 1 }))
        .send()
        .await
        .expect("Failed to update member");
    assert!(response.status().is_success());

    assert_eq!(borrow(&client, book_a, member_id).await.0, 201);

    let (status, body) = borrow(&client, book_b, member_id).await;
    assert_eq!(status, 409);
    assert_eq!(body["code"], "FAILED_PRECONDITION");
    // The unborrowed book is untouched
    assert_eq!(available_copies(&client, book_b).await, 1);
}

#[tokio::test]
#[ignore]
async fn inactive_member_cannot_borrow() {
    let client = Client::new();
    let book_id = create_book(&client, 1).await;
    let member_id = create_member(&client).await;

    let response = client
        .put(format!("{}/members/{}", BASE_URL, member_id))
        .json(&json!({ "is_active": false }))
        .send()
        .await
        .expect("Failed to update member");
    assert!(response.status().is_success());

    let (status, _) = borrow(&client, book_id, member_id).await;
    assert_eq!(status, 400);
    assert_eq!(available_copies(&client, book_id).await, 1);
}

#[tokio::test]
#[ignore]
async fn loan_history_blocks_deletion() {
    let client = Client::new();
    let book_id = create_book(&client, 1).await;
    let member_id = create_member(&client).await;

    assert_eq!(borrow(&client, book_id, member_id).await.0, 201);
    assert_eq!(return_book(&client, book_id, member_id).await.0, 200);

    // Returned loans are history; both sides stay undeletable
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    let response = client
        .delete(format!("{}/members/{}", BASE_URL, member_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn raising_total_copies_raises_available_by_the_delta() {
    let client = Client::new();
    let book_id = create_book(&client, 2).await;
    let member_id = create_member(&client).await;

    assert_eq!(borrow(&client, book_id, member_id).await.0, 201);
    assert_eq!(available_copies(&client, book_id).await, 1);

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to fetch book");
    let book: Value = response.json().await.unwrap();

    // Omit available_copies: the ledger applies the same delta
    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .json(&json!({
            "title": book["title"],
            "author": book["author"],
            "isbn": book["isbn"],
            "total_copies": 5
        }))
        .send()
        .await
        .expect("Failed to update book");
    assert!(response.status().is_success());

    assert_eq!(available_copies(&client, book_id).await, 4);
}
