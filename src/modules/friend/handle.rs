use actix_web::{HttpRequest, get, post, web};

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::{
        friend::{
            model::{
                HandleFriendRequestBody, ReceivedRequestResponse, SendFriendRequestBody,
                SentRequestResponse,
            },
            repository_pg::FriendRequestRepositoryPg,
            service::FriendService,
        },
        user::{model::UserResponse, repository_pg::UserRepositoryPg},
    },
    utils::{Pagination, ValidatedJson, ValidatedQuery},
};

pub type FriendSvc = FriendService<FriendRequestRepositoryPg, UserRepositoryPg>;

#[post("/send-friend-request")]
pub async fn send_friend_request(
    friend_service: web::Data<FriendSvc>,
    body: ValidatedJson<SendFriendRequestBody>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let requester_id = get_claims(&req)?.sub;
    friend_service.send_friend_request(requester_id, body.0.recipient).await?;

    Ok(success::Success::created(None).message("Friend request sent."))
}

#[post("/handle-friend-requests")]
pub async fn handle_friend_request(
    friend_service: web::Data<FriendSvc>,
    body: ValidatedJson<HandleFriendRequestBody>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let caller_id = get_claims(&req)?.sub;
    let action = friend_service
        .handle_friend_request(caller_id, body.0.id, body.0.action)
        .await
        // the external contract reports a missing pending request as a bad request
        .map_err(|e| match e {
            error::SystemError::NotFound(msg) => error::Error::BadRequest(msg),
            other => other.into(),
        })?;

    Ok(success::Success::ok(None).message(format!("Friend request {}.", action.past_tense())))
}

#[get("/all-sent")]
pub async fn list_sent_requests(
    friend_service: web::Data<FriendSvc>,
    page: ValidatedQuery<Pagination>,
    req: HttpRequest,
) -> Result<success::Success<Vec<SentRequestResponse>>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let requests = friend_service.list_sent(user_id, page.0).await?;

    Ok(success::Success::ok(Some(requests)).message("Sent requests retrieved successfully"))
}

#[get("/all-received")]
pub async fn list_received_requests(
    friend_service: web::Data<FriendSvc>,
    page: ValidatedQuery<Pagination>,
    req: HttpRequest,
) -> Result<success::Success<Vec<ReceivedRequestResponse>>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let requests = friend_service.list_received(user_id, page.0).await?;

    Ok(success::Success::ok(Some(requests)).message("Received requests retrieved successfully"))
}

#[get("/all-friends")]
pub async fn list_friends(
    friend_service: web::Data<FriendSvc>,
    page: ValidatedQuery<Pagination>,
    req: HttpRequest,
) -> Result<success::Success<Vec<UserResponse>>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let friends = friend_service.list_friends(user_id, page.0).await?;

    Ok(success::Success::ok(Some(friends)).message("Friends retrieved successfully"))
}
