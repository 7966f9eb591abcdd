use actix_web::{HttpRequest, get, post, web};

use crate::middlewares::get_claims;
use crate::modules::user::{model, service::UserService};
use crate::{
    api::{error, success},
    utils::{ValidatedJson, ValidatedQuery},
};

#[get("/user")]
pub async fn get_profile(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<success::Success<model::UserResponse>, error::Error> {
    let id = get_claims(&req)?.sub;
    let user = user_service.get_by_id(id).await?;
    Ok(success::Success::ok(Some(user)).message("Profile retrieved successfully"))
}

#[get("/user/all")]
pub async fn fetch_all_users(
    user_service: web::Data<UserService>,
    query: ValidatedQuery<model::UserListQuery>,
    req: HttpRequest,
) -> Result<success::Success<Vec<model::UserResponse>>, error::Error> {
    get_claims(&req)?;
    let users =
        user_service.fetch_all(query.0.search.as_deref(), query.0.pagination()).await?;
    Ok(success::Success::ok(Some(users)).message("Users retrieved successfully"))
}

#[post("/user/create")]
pub async fn sign_up(
    user_service: web::Data<UserService>,
    user_data: ValidatedJson<model::SignUpModel>,
) -> Result<success::Success<model::UserResponse>, error::Error> {
    let user = user_service.sign_up(user_data.0).await?;
    Ok(success::Success::created(Some(user)).message("Signup successful"))
}

#[post("/user/login")]
pub async fn sign_in(
    user_service: web::Data<UserService>,
    user_data: ValidatedJson<model::SignInModel>,
) -> Result<success::Success<model::SignInResponse>, error::Error> {
    let access_token = user_service.sign_in(user_data.0).await?;
    Ok(success::Success::ok(Some(model::SignInResponse { access_token }))
        .message("Signin successful"))
}
