//! Integration tests for the book catalog endpoints

mod common;

use axum::http::StatusCode;

const PDF: &[u8] = b"%PDF-1.4\n%integration\n";

#[tokio::test]
#[ignore = "requires database"]
async fn test_create_get_list_delete() {
    let app = common::TestApp::new().await;
    let (user_id, token, _) = app.signed_in_user().await;

    let (status, created) = app
        .multipart(
            "POST",
            "/api/v1/books",
            &token,
            &[("title", "Dune"), ("description", "A desert planet saga")],
            Some(PDF),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    let book_id = created["book"]["id"].as_str().unwrap().to_string();

    let (status, fetched) = app.get(&format!("/api/v1/books/{}", book_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["owner"]["id"], user_id.as_str());

    let (status, listed) = app.get(&format!("/api/v1/books/user/{}", user_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["count"], 1);

    let (status, _) = app.delete(&format!("/api/v1/books/{}", book_id), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get(&format!("/api/v1/books/{}", book_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_only_owner_can_update() {
    let app = common::TestApp::new().await;
    let (_, owner, _) = app.signed_in_user().await;
    let (_, intruder, _) = app.signed_in_user().await;

    let (_, created) = app
        .multipart(
            "POST",
            "/api/v1/books",
            &owner,
            &[("title", "Dune"), ("description", "A desert planet saga")],
            Some(PDF),
        )
        .await;
    let path = format!("/api/v1/books/{}", created["book"]["id"].as_str().unwrap());

    let (status, _) = app
        .multipart("PUT", &path, &intruder, &[("title", "Stolen")], None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, updated) = app
        .multipart("PUT", &path, &owner, &[("title", "Dune Messiah")], None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["message"], "book updated successfully!");
    assert_eq!(updated["book"]["title"], "Dune Messiah");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_update_missing_book_is_404() {
    let app = common::TestApp::new().await;
    let (_, token, _) = app.signed_in_user().await;

    let path = format!("/api/v1/books/{}", uuid::Uuid::new_v4());
    let (status, _) = app.multipart("PUT", &path, &token, &[("title", "Ghost")], None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
