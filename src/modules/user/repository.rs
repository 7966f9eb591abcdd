use uuid::Uuid;

use crate::{api::error, modules::user::model::InsertUser, modules::user::schema::UserEntity};

/// The user directory. One method per access pattern; the search dispatch
/// (email vs. name) lives in the service.
#[async_trait::async_trait]
pub trait UserRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError>;

    /// Exact match, case-insensitive.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, error::SystemError>;

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<UserEntity>, error::SystemError>;

    async fn create(&self, user: &InsertUser) -> Result<UserEntity, error::SystemError>;

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<UserEntity>, error::SystemError>;

    /// Exact case-insensitive email match, paginated.
    async fn search_by_email(
        &self,
        email: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserEntity>, error::SystemError>;

    /// Case-insensitive substring match on first or last name.
    async fn search_by_name(
        &self,
        fragment: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserEntity>, error::SystemError>;
}
