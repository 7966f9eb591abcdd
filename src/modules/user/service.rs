use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::ENV;
use crate::api::error;
use crate::modules::user::model::{InsertUser, SignInModel, SignUpModel, UserResponse};
use crate::modules::user::repository::UserRepository;
use crate::utils::{Claims, Pagination, hash_password, verify_password};

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository + Send + Sync>,
}

impl UserService {
    pub fn with_dependencies(repo: Arc<dyn UserRepository + Send + Sync>) -> Self {
        info!("UserService initialized with dependencies");
        UserService { repo }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<UserResponse, error::SystemError> {
        let user = self
            .repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;
        Ok(UserResponse::from(user))
    }

    pub async fn sign_up(&self, user: SignUpModel) -> Result<UserResponse, error::SystemError> {
        let hash_password = hash_password(&user.password)?;

        let new_user = InsertUser {
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            hash_password,
        };

        let created = self.repo.create(&new_user).await?;
        Ok(UserResponse::from(created))
    }

    pub async fn sign_in(&self, user: SignInModel) -> Result<String, error::SystemError> {
        let user_entity = self
            .repo
            .find_by_email(&user.email)
            .await?
            .ok_or_else(|| error::SystemError::unauthorized("Invalid email or password"))?;

        let valid = verify_password(&user_entity.hash_password, &user.password)?;
        if !valid {
            return Err(error::SystemError::unauthorized("Invalid email or password"));
        }

        let access_token = Claims::new(&user_entity.id, ENV.access_token_expiration)
            .encode(ENV.jwt_secret.as_ref())?;

        Ok(access_token)
    }

    /// Directory search: a keyword containing '@' is treated as an exact
    /// case-insensitive email, anything else as a substring of the first or
    /// last name. An empty keyword lists everyone.
    pub async fn fetch_all(
        &self,
        search: Option<&str>,
        page: Pagination,
    ) -> Result<Vec<UserResponse>, error::SystemError> {
        let (limit, offset) = (page.limit(), page.offset());

        let users = match search.map(str::trim) {
            None | Some("") => self.repo.list(limit, offset).await?,
            Some(keyword) if keyword.contains('@') => {
                self.repo.search_by_email(keyword, limit, offset).await?
            }
            Some(keyword) => self.repo.search_by_name(keyword, limit, offset).await?,
        };

        Ok(users.into_iter().map(UserResponse::from).collect())
    }
}
