use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::api::error;
use crate::modules::friend::model::{ReceivedRequestResponse, SentRequestResponse};
use crate::modules::friend::schema::{FriendRequestEntity, RequestStatus};

/// Store for friend-request rows. One method per access pattern; every write
/// is a single atomic statement so the engine never does check-then-act
/// against the database.
#[async_trait::async_trait]
pub trait FriendRequestRepository {
    /// Requests created by `requester` at or after `since`. Used by the rate
    /// limiter; a plain read, best-effort under concurrent bursts.
    async fn count_created_since(
        &self,
        requester: &Uuid,
        since: DateTime<Utc>,
    ) -> Result<i64, error::SystemError>;

    /// Insert a pending request unless one already exists for the pair.
    /// Returns `None` when the pending-uniqueness constraint suppressed the
    /// insert, i.e. the request was already sent.
    async fn insert_pending(
        &self,
        requester: &Uuid,
        recipient: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError>;

    /// Conditional single-transition update: moves the request to `status`
    /// only while it is pending and `recipient` is its recipient. Returns
    /// `None` when no such row exists — wrong id, already resolved, or the
    /// caller is not the recipient.
    async fn transition_pending(
        &self,
        request_id: &Uuid,
        recipient: &Uuid,
        status: RequestStatus,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError>;

    /// Pending requests sent by `requester`, in insertion order, expanded
    /// with the recipient profile.
    async fn list_pending_from(
        &self,
        requester: &Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SentRequestResponse>, error::SystemError>;

    /// Pending requests addressed to `recipient`, in insertion order,
    /// expanded with the requester profile.
    async fn list_pending_to(
        &self,
        recipient: &Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ReceivedRequestResponse>, error::SystemError>;

    /// Every accepted request involving `user_id`, in either direction.
    async fn find_accepted_touching(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<FriendRequestEntity>, error::SystemError>;
}
