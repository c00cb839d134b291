use chrono::{DateTime, Utc};

use crate::{CreateError, DeleteError, Name, ReadError, UserID, ValidationError};

#[allow(async_fn_in_trait)]
pub trait PostService {
    /// Announcements, newest first.
    async fn get_posts(&self) -> Result<Vec<Post>, ReadError>;
    async fn create_post(&self, title: Name, content: String) -> Result<Post, CreateError>;
    async fn delete_post(&self, id: &PostID) -> Result<PostID, DeleteError>;

    fn validate_post_title(&self, title: &str) -> Result<Name, ValidationError> {
        Name::new(title).map_err(|err| ValidationError::Other(err.into()))
    }

    fn validate_post_content(&self, content: &str) -> Result<String, ValidationError> {
        let content = content.trim();
        if content.is_empty() {
            Err(ValidationError::Other("Content must not be empty".into()))
        } else {
            Ok(content.to_string())
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait PostRepository {
    async fn read_posts(&self) -> Result<Vec<Post>, ReadError>;
    async fn create_post(&self, post: Post) -> Result<Post, CreateError>;
    async fn delete_post(&self, id: &PostID) -> Result<PostID, DeleteError>;
}

document_id!(PostID);

/// An announcement of the gym shown on the home page.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: PostID,
    pub title: Name,
    pub content: String,
    pub author_id: UserID,
    pub created_at: DateTime<Utc>,
}
