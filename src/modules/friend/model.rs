use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::modules::friend::schema::RequestStatus;
use crate::modules::user::model::UserResponse;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendFriendRequestBody {
    pub recipient: Uuid,
}

/// The recipient's decision. Any other wire value fails deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestAction {
    Accepted,
    Rejected,
}

impl RequestAction {
    pub fn as_status(self) -> RequestStatus {
        match self {
            RequestAction::Accepted => RequestStatus::Accepted,
            RequestAction::Rejected => RequestStatus::Rejected,
        }
    }

    pub fn past_tense(self) -> &'static str {
        match self {
            RequestAction::Accepted => "accepted",
            RequestAction::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct HandleFriendRequestBody {
    pub id: Uuid,
    pub action: RequestAction,
}

/// A pending request the caller sent, expanded with the recipient's profile.
#[derive(Debug, Clone, Serialize)]
pub struct SentRequestResponse {
    pub id: Uuid,
    pub recipient: UserResponse,
    pub request_status: RequestStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A pending request the caller received, expanded with the requester's profile.
#[derive(Debug, Clone, Serialize)]
pub struct ReceivedRequestResponse {
    pub id: Uuid,
    pub requester: UserResponse,
    pub request_status: RequestStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Joined row shape shared by the sent/received listing queries.
#[derive(FromRow)]
pub struct RequestUserRow {
    pub req_id: Uuid,
    pub request_status: RequestStatus,
    pub req_created_at: chrono::DateTime<chrono::Utc>,
    pub user_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl RequestUserRow {
    pub fn profile(&self) -> UserResponse {
        UserResponse {
            id: self.user_id,
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}
