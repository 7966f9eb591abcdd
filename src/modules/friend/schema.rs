use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

/// Lifecycle of a friend request. `Pending` is the only non-terminal state;
/// the recipient moves it to exactly one of `Accepted` or `Rejected`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FriendRequestEntity {
    pub id: Uuid,
    pub requester: Uuid,
    pub recipient: Uuid,
    pub request_status: RequestStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
