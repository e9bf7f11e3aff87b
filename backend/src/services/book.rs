//! Book catalog
//!
//! Anyone may read books. Mutations need a logged-in user and, for update
//! and delete, ownership of the book. Within one mutation the order is:
//! input validation, existence (404), ownership (401), PDF upload, store
//! write. Concurrent updates of one book are last-write-wins.

use crate::auth::{ensure_owner, AuthenticatedUser, OwnerAction};
use crate::blob::{BlobUploader, PdfUpload};
use crate::error::ApiError;
use crate::repositories::{BookChanges, BookStore, NewBook, UserStore};
use book_catalog_shared::errors::FieldError;
use book_catalog_shared::models::{Book, BookId, UserId};
use book_catalog_shared::types::{
    ActingUser, BookDeletedResponse, BookListResponse, BookMutationResponse, BookResponse, RequestLink,
};
use book_catalog_shared::validation::{validate_description, validate_title};
use tracing::info;

const NOT_FOUND_MESSAGE: &str = "No record found for provided ID";

/// Multipart fields of a create or update request
#[derive(Debug, Clone, Default)]
pub struct BookForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub file: Option<PdfUpload>,
}

impl BookForm {
    /// Checks for create, where every field is required
    fn validate_complete(&self) -> Result<(), FieldError> {
        validate_title(self.title.as_deref().unwrap_or_default())?;
        validate_description(self.description.as_deref().unwrap_or_default())?;
        match &self.file {
            Some(file) => file.validate(),
            None => Err(FieldError::new("file", "File is required")),
        }
    }

    /// Checks for update, where only supplied fields are validated
    fn validate_partial(&self) -> Result<(), FieldError> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        if let Some(file) = &self.file {
            file.validate()?;
        }
        Ok(())
    }
}

/// Builds the follow-up links attached to book responses
#[derive(Debug, Clone)]
pub struct BookLinks {
    base_url: String,
}

impl BookLinks {
    pub fn new(public_url: &str) -> Self {
        Self {
            base_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn single(&self, id: BookId) -> RequestLink {
        RequestLink {
            method: "GET".to_string(),
            url: format!("{}/books/{}", self.base_url, id),
            description: "Get this single book by ID at the above url".to_string(),
        }
    }

    pub fn owner_listing(&self, owner: UserId) -> RequestLink {
        RequestLink {
            method: "GET".to_string(),
            url: format!("{}/books/user/{}", self.base_url, owner),
            description: "Get the list of all books for this user at the above url".to_string(),
        }
    }

    pub fn create(&self) -> RequestLink {
        RequestLink {
            method: "POST".to_string(),
            url: format!("{}/books", self.base_url),
            description: "Create a new book at the above url".to_string(),
        }
    }
}

fn acting(requester: &AuthenticatedUser) -> ActingUser {
    ActingUser {
        id: requester.user_id(),
        name: requester.user.name.clone(),
    }
}

/// Book operations
pub struct BookService;

impl BookService {
    pub async fn create(
        books: &dyn BookStore,
        blobs: &dyn BlobUploader,
        links: &BookLinks,
        requester: &AuthenticatedUser,
        form: BookForm,
    ) -> Result<BookMutationResponse, ApiError> {
        form.validate_complete()?;
        let BookForm {
            title: Some(title),
            description: Some(description),
            file: Some(file),
        } = form
        else {
            return Err(ApiError::Validation("title, description and file are required".to_string()));
        };

        let pdf = blobs.upload(file).await?;
        let book = books
            .create(NewBook {
                owner_id: requester.user_id(),
                title: title.trim().to_string(),
                description,
                pdf,
            })
            .await?;

        info!(book_id = %book.id, user_id = %book.owner_id, "Created book");

        let link = links.single(book.id);
        Ok(BookMutationResponse {
            message: "New book created successfully!".to_string(),
            user: acting(requester),
            book: BookResponse::from_book(book, link),
        })
    }

    pub async fn get(books: &dyn BookStore, links: &BookLinks, id: BookId) -> Result<BookResponse, ApiError> {
        let book = Self::find(books, id).await?;
        let link = links.owner_listing(book.owner_id);
        Ok(BookResponse::from_book(book, link))
    }

    /// Books uploaded by `owner_id`; 404 if there is no such user
    pub async fn list_for_user(
        users: &dyn UserStore,
        books: &dyn BookStore,
        links: &BookLinks,
        owner_id: UserId,
    ) -> Result<BookListResponse, ApiError> {
        let owner = users
            .find_by_id(owner_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("No user found with ID {}", owner_id)))?;

        let books: Vec<BookResponse> = books
            .list_by_owner(owner.id)
            .await?
            .into_iter()
            .map(|book| {
                let link = links.single(book.id);
                BookResponse::from_book(book, link)
            })
            .collect();

        Ok(BookListResponse {
            count: books.len(),
            description: format!("List of books uploaded by user: {}, user ID: {}", owner.name, owner.id),
            books,
        })
    }

    pub async fn update(
        books: &dyn BookStore,
        blobs: &dyn BlobUploader,
        links: &BookLinks,
        requester: &AuthenticatedUser,
        id: BookId,
        form: BookForm,
    ) -> Result<BookMutationResponse, ApiError> {
        form.validate_partial()?;

        let existing = Self::find(books, id).await?;
        ensure_owner(&existing, requester, OwnerAction::Update)?;

        let pdf = match form.file {
            Some(file) => Some(blobs.upload(file).await?),
            None => None,
        };
        let changes = BookChanges {
            title: form.title.map(|t| t.trim().to_string()),
            description: form.description,
            pdf,
        };

        let message = if changes.differs_from(&existing) {
            "book updated successfully!"
        } else {
            "No change made"
        };

        let book = if changes.is_empty() {
            existing
        } else {
            books
                .update(id, &changes)
                .await?
                .ok_or_else(|| ApiError::NotFound(NOT_FOUND_MESSAGE.to_string()))?
        };

        info!(book_id = %book.id, user_id = %requester.user_id(), outcome = message, "Updated book");

        let link = links.single(book.id);
        Ok(BookMutationResponse {
            message: message.to_string(),
            user: acting(requester),
            book: BookResponse::from_book(book, link),
        })
    }

    pub async fn delete(
        books: &dyn BookStore,
        links: &BookLinks,
        requester: &AuthenticatedUser,
        id: BookId,
    ) -> Result<BookDeletedResponse, ApiError> {
        let existing = Self::find(books, id).await?;
        ensure_owner(&existing, requester, OwnerAction::Delete)?;

        if !books.delete(id).await? {
            return Err(ApiError::NotFound(NOT_FOUND_MESSAGE.to_string()));
        }

        info!(book_id = %id, user_id = %requester.user_id(), "Deleted book");

        Ok(BookDeletedResponse {
            message: "book deleted successfully!".to_string(),
            user: acting(requester),
            request: links.create(),
        })
    }

    async fn find(books: &dyn BookStore, id: BookId) -> Result<Book, ApiError> {
        books
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(NOT_FOUND_MESSAGE.to_string()))
    }
}
