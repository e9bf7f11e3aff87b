//! Book routes
//!
//! Create and update take `multipart/form-data` with `title`,
//! `description` and a PDF `file` part.

use crate::auth::RequireUser;
use crate::blob::PdfUpload;
use crate::error::{ApiError, ApiResult};
use crate::services::{BookForm, BookService};
use crate::state::AppState;
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, Path, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use book_catalog_shared::models::{BookId, UserId};
use book_catalog_shared::types::{BookDeletedResponse, BookListResponse, BookMutationResponse, BookResponse};
use std::str::FromStr;

/// Upper bound on a multipart request, PDF included
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Create book routes
pub fn book_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_book))
        .route("/user/:user_id", get(list_user_books))
        .route("/:book_id", get(get_book).put(update_book).delete(delete_book))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

fn parse_id<T: FromStr>(raw: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::Validation("Invalid ID".to_string()))
}

fn multipart_error(err: MultipartError) -> ApiError {
    ApiError::BadRequest(err.body_text())
}

/// Collect the known parts of a book form; unknown parts are skipped
async fn read_form(multipart: Result<Multipart, MultipartRejection>) -> Result<BookForm, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let mut form = BookForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => form.title = Some(field.text().await.map_err(multipart_error)?),
            "description" => form.description = Some(field.text().await.map_err(multipart_error)?),
            "file" => {
                let file_name = field.file_name().unwrap_or("upload.pdf").to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                form.file = Some(PdfUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Upload a new book
///
/// POST /api/v1/books
async fn create_book(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, Json<BookMutationResponse>)> {
    let form = read_form(multipart).await?;
    let created = BookService::create(state.books.as_ref(), state.blobs.as_ref(), state.links(), &user, form).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// List the books uploaded by one user
///
/// GET /api/v1/books/user/:user_id
async fn list_user_books(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<BookListResponse>> {
    let user_id: UserId = parse_id(&user_id)?;
    let listed = BookService::list_for_user(state.users.as_ref(), state.books.as_ref(), state.links(), user_id).await?;
    Ok(Json(listed))
}

/// GET /api/v1/books/:book_id
async fn get_book(State(state): State<AppState>, Path(book_id): Path<String>) -> ApiResult<Json<BookResponse>> {
    let book_id: BookId = parse_id(&book_id)?;
    Ok(Json(BookService::get(state.books.as_ref(), state.links(), book_id).await?))
}

/// Update a book; owner only, every part optional
///
/// PUT /api/v1/books/:book_id
async fn update_book(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(book_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<BookMutationResponse>> {
    let book_id: BookId = parse_id(&book_id)?;
    let form = read_form(multipart).await?;
    let updated = BookService::update(
        state.books.as_ref(),
        state.blobs.as_ref(),
        state.links(),
        &user,
        book_id,
        form,
    )
    .await?;
    Ok(Json(updated))
}

/// Delete a book; owner only
///
/// DELETE /api/v1/books/:book_id
async fn delete_book(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(book_id): Path<String>,
) -> ApiResult<Json<BookDeletedResponse>> {
    let book_id: BookId = parse_id(&book_id)?;
    Ok(Json(BookService::delete(state.books.as_ref(), state.links(), &user, book_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("not-a-uuid")]
    #[case("")]
    #[case("123")]
    #[case("6f1c2b2e-0000-0000-0000")]
    fn test_parse_id_rejects_garbage(#[case] raw: &str) {
        assert!(matches!(parse_id::<BookId>(raw), Err(ApiError::Validation(ref m)) if m == "Invalid ID"));
    }

    #[test]
    fn test_parse_id_accepts_uuid() {
        let id = BookId::new();
        assert_eq!(parse_id::<BookId>(&id.to_string()).unwrap(), id);
    }
}
