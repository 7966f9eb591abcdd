use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        friend::{
            model::{ReceivedRequestResponse, RequestAction, SentRequestResponse},
            repository::FriendRequestRepository,
        },
        user::{model::UserResponse, repository::UserRepository},
    },
    utils::Pagination,
};

/// Outgoing requests allowed per requester inside the trailing window.
const RATE_LIMIT: i64 = 3;
const RATE_WINDOW_SECS: i64 = 60;

#[derive(Clone)]
pub struct FriendService<R, U>
where
    R: FriendRequestRepository + Send + Sync,
    U: UserRepository + Send + Sync,
{
    request_repo: Arc<R>,
    user_repo: Arc<U>,
}

impl<R, U> FriendService<R, U>
where
    R: FriendRequestRepository + Send + Sync,
    U: UserRepository + Send + Sync,
{
    pub fn with_dependencies(request_repo: Arc<R>, user_repo: Arc<U>) -> Self {
        FriendService { request_repo, user_repo }
    }

    pub async fn send_friend_request(
        &self,
        requester_id: Uuid,
        recipient_id: Uuid,
    ) -> Result<(), error::SystemError> {
        if self.user_repo.find_by_id(&recipient_id).await?.is_none() {
            return Err(error::SystemError::not_found("Recipient user not found"));
        }

        if requester_id == recipient_id {
            return Err(error::SystemError::bad_request(
                "Cannot send a friend request to yourself",
            ));
        }

        let window_start = Utc::now() - chrono::Duration::seconds(RATE_WINDOW_SECS);
        let recent = self.request_repo.count_created_since(&requester_id, window_start).await?;
        if recent >= RATE_LIMIT {
            return Err(error::SystemError::too_many_requests(
                "You can't send more than 3 friend requests per minute.",
            ));
        }

        // Atomic insert-if-absent; the pending-uniqueness index is the arbiter.
        let created = self.request_repo.insert_pending(&requester_id, &recipient_id).await?;
        if created.is_none() {
            return Err(error::SystemError::bad_request("Friend request already sent."));
        }

        Ok(())
    }

    /// Single-transition state machine: pending → accepted | rejected, driven
    /// by the recipient only. Wrong id, an already-resolved request, and a
    /// caller who is not the recipient are deliberately indistinguishable so
    /// a request's existence never leaks to third parties.
    pub async fn handle_friend_request(
        &self,
        caller_id: Uuid,
        request_id: Uuid,
        action: RequestAction,
    ) -> Result<RequestAction, error::SystemError> {
        let updated = self
            .request_repo
            .transition_pending(&request_id, &caller_id, action.as_status())
            .await?;

        match updated {
            Some(_) => Ok(action),
            None => Err(error::SystemError::not_found("No pending friend request found with id")),
        }
    }

    pub async fn list_sent(
        &self,
        user_id: Uuid,
        page: Pagination,
    ) -> Result<Vec<SentRequestResponse>, error::SystemError> {
        self.request_repo.list_pending_from(&user_id, page.limit(), page.offset()).await
    }

    pub async fn list_received(
        &self,
        user_id: Uuid,
        page: Pagination,
    ) -> Result<Vec<ReceivedRequestResponse>, error::SystemError> {
        self.request_repo.list_pending_to(&user_id, page.limit(), page.offset()).await
    }

    /// Friendship is derived, not stored: for every accepted request touching
    /// the caller, take the opposite party's id, dedupe, then resolve the
    /// profiles through the user directory.
    pub async fn list_friends(
        &self,
        user_id: Uuid,
        page: Pagination,
    ) -> Result<Vec<UserResponse>, error::SystemError> {
        let accepted = self.request_repo.find_accepted_touching(&user_id).await?;

        let mut friend_ids = BTreeSet::new();
        for request in accepted {
            let other =
                if request.requester == user_id { request.recipient } else { request.requester };
            friend_ids.insert(other);
        }

        let ids: Vec<Uuid> = friend_ids
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();

        let users = self.user_repo.find_by_ids(&ids).await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::friend::schema::{FriendRequestEntity, RequestStatus};
    use crate::modules::user::{model::InsertUser, schema::UserEntity};
    use chrono::{DateTime, Duration};
    use std::sync::Mutex;

    struct InMemoryStore {
        users: Mutex<Vec<UserEntity>>,
        requests: Mutex<Vec<FriendRequestEntity>>,
    }

    impl InMemoryStore {
        fn new() -> Arc<Self> {
            Arc::new(Self { users: Mutex::new(Vec::new()), requests: Mutex::new(Vec::new()) })
        }

        fn seed_user(&self, email: &str, first: &str, last: &str) -> Uuid {
            let now = Utc::now();
            let user = UserEntity {
                id: Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext)),
                email: email.to_string(),
                first_name: first.to_string(),
                last_name: last.to_string(),
                hash_password: String::new(),
                created_at: now,
                updated_at: now,
            };
            let id = user.id;
            self.users.lock().unwrap().push(user);
            id
        }

        /// Shift every stored request's creation time into the past, as if
        /// the clock had advanced.
        fn age_requests(&self, by: Duration) {
            for request in self.requests.lock().unwrap().iter_mut() {
                request.created_at = request.created_at - by;
            }
        }

        fn profile_of(&self, id: &Uuid) -> UserResponse {
            let users = self.users.lock().unwrap();
            let user = users.iter().find(|u| u.id == *id).unwrap();
            UserResponse::from(user.clone())
        }
    }

    struct Requests(Arc<InMemoryStore>);
    struct Users(Arc<InMemoryStore>);

    #[async_trait::async_trait]
    impl FriendRequestRepository for Requests {
        async fn count_created_since(
            &self,
            requester: &Uuid,
            since: DateTime<Utc>,
        ) -> Result<i64, error::SystemError> {
            Ok(self
                .0
                .requests
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.requester == *requester && r.created_at >= since)
                .count() as i64)
        }

        async fn insert_pending(
            &self,
            requester: &Uuid,
            recipient: &Uuid,
        ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
            let mut requests = self.0.requests.lock().unwrap();
            let duplicate = requests.iter().any(|r| {
                r.requester == *requester
                    && r.recipient == *recipient
                    && r.request_status == RequestStatus::Pending
            });
            if duplicate {
                return Ok(None);
            }
            let request = FriendRequestEntity {
                id: Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext)),
                requester: *requester,
                recipient: *recipient,
                request_status: RequestStatus::Pending,
                created_at: Utc::now(),
            };
            requests.push(request.clone());
            Ok(Some(request))
        }

        async fn transition_pending(
            &self,
            request_id: &Uuid,
            recipient: &Uuid,
            status: RequestStatus,
        ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
            let mut requests = self.0.requests.lock().unwrap();
            for request in requests.iter_mut() {
                if request.id == *request_id
                    && request.recipient == *recipient
                    && request.request_status == RequestStatus::Pending
                {
                    request.request_status = status;
                    return Ok(Some(request.clone()));
                }
            }
            Ok(None)
        }

        async fn list_pending_from(
            &self,
            requester: &Uuid,
            limit: i64,
            offset: i64,
        ) -> Result<Vec<SentRequestResponse>, error::SystemError> {
            Ok(self
                .0
                .requests
                .lock()
                .unwrap()
                .iter()
                .filter(|r| {
                    r.requester == *requester && r.request_status == RequestStatus::Pending
                })
                .skip(offset as usize)
                .take(limit as usize)
                .map(|r| SentRequestResponse {
                    id: r.id,
                    recipient: self.0.profile_of(&r.recipient),
                    request_status: r.request_status,
                    created_at: r.created_at,
                })
                .collect())
        }

        async fn list_pending_to(
            &self,
            recipient: &Uuid,
            limit: i64,
            offset: i64,
        ) -> Result<Vec<ReceivedRequestResponse>, error::SystemError> {
            Ok(self
                .0
                .requests
                .lock()
                .unwrap()
                .iter()
                .filter(|r| {
                    r.recipient == *recipient && r.request_status == RequestStatus::Pending
                })
                .skip(offset as usize)
                .take(limit as usize)
                .map(|r| ReceivedRequestResponse {
                    id: r.id,
                    requester: self.0.profile_of(&r.requester),
                    request_status: r.request_status,
                    created_at: r.created_at,
                })
                .collect())
        }

        async fn find_accepted_touching(
            &self,
            user_id: &Uuid,
        ) -> Result<Vec<FriendRequestEntity>, error::SystemError> {
            Ok(self
                .0
                .requests
                .lock()
                .unwrap()
                .iter()
                .filter(|r| {
                    r.request_status == RequestStatus::Accepted
                        && (r.requester == *user_id || r.recipient == *user_id)
                })
                .cloned()
                .collect())
        }
    }

    #[async_trait::async_trait]
    impl UserRepository for Users {
        async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError> {
            Ok(self.0.users.lock().unwrap().iter().find(|u| u.id == *id).cloned())
        }

        async fn find_by_email(
            &self,
            email: &str,
        ) -> Result<Option<UserEntity>, error::SystemError> {
            Ok(self
                .0
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.email.eq_ignore_ascii_case(email))
                .cloned())
        }

        async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<UserEntity>, error::SystemError> {
            Ok(self
                .0
                .users
                .lock()
                .unwrap()
                .iter()
                .filter(|u| ids.contains(&u.id))
                .cloned()
                .collect())
        }

        async fn create(&self, _user: &InsertUser) -> Result<UserEntity, error::SystemError> {
            unimplemented!("not exercised by friend service tests")
        }

        async fn list(
            &self,
            _limit: i64,
            _offset: i64,
        ) -> Result<Vec<UserEntity>, error::SystemError> {
            unimplemented!("not exercised by friend service tests")
        }

        async fn search_by_email(
            &self,
            _email: &str,
            _limit: i64,
            _offset: i64,
        ) -> Result<Vec<UserEntity>, error::SystemError> {
            unimplemented!("not exercised by friend service tests")
        }

        async fn search_by_name(
            &self,
            _fragment: &str,
            _limit: i64,
            _offset: i64,
        ) -> Result<Vec<UserEntity>, error::SystemError> {
            unimplemented!("not exercised by friend service tests")
        }
    }

    fn service(store: &Arc<InMemoryStore>) -> FriendService<Requests, Users> {
        FriendService::with_dependencies(
            Arc::new(Requests(store.clone())),
            Arc::new(Users(store.clone())),
        )
    }

    fn page() -> Pagination {
        Pagination { page: None, limit: None }
    }

    #[actix_web::test]
    async fn duplicate_send_is_rejected() {
        let store = InMemoryStore::new();
        let a = store.seed_user("a@x.com", "Ann", "Ada");
        let b = store.seed_user("b@x.com", "Bob", "Stone");
        let svc = service(&store);

        svc.send_friend_request(a, b).await.unwrap();
        let second = svc.send_friend_request(a, b).await;
        assert!(matches!(second, Err(error::SystemError::BadRequest(_))));

        assert_eq!(store.requests.lock().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn self_request_is_rejected() {
        let store = InMemoryStore::new();
        let a = store.seed_user("a@x.com", "Ann", "Ada");
        let svc = service(&store);

        let result = svc.send_friend_request(a, a).await;
        assert!(matches!(result, Err(error::SystemError::BadRequest(_))));
        assert!(store.requests.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn unknown_recipient_is_not_found() {
        let store = InMemoryStore::new();
        let a = store.seed_user("a@x.com", "Ann", "Ada");
        let svc = service(&store);

        let ghost = Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext));
        let result = svc.send_friend_request(a, ghost).await;
        assert!(matches!(result, Err(error::SystemError::NotFound(_))));
    }

    #[actix_web::test]
    async fn fourth_send_within_window_is_rate_limited() {
        let store = InMemoryStore::new();
        let a = store.seed_user("a@x.com", "Ann", "Ada");
        let recipients: Vec<Uuid> = (0..4)
            .map(|i| store.seed_user(&format!("r{i}@x.com"), "Rec", &format!("Ipient{i}")))
            .collect();
        let svc = service(&store);

        for recipient in &recipients[..3] {
            svc.send_friend_request(a, *recipient).await.unwrap();
        }

        let fourth = svc.send_friend_request(a, recipients[3]).await;
        assert!(matches!(fourth, Err(error::SystemError::TooManyRequests(_))));

        // once the trailing window has passed the quota frees up again
        store.age_requests(Duration::seconds(61));
        svc.send_friend_request(a, recipients[3]).await.unwrap();
    }

    #[actix_web::test]
    async fn rate_limit_counts_resolved_requests_too() {
        let store = InMemoryStore::new();
        let a = store.seed_user("a@x.com", "Ann", "Ada");
        let recipients: Vec<Uuid> = (0..4)
            .map(|i| store.seed_user(&format!("r{i}@x.com"), "Rec", &format!("Ipient{i}")))
            .collect();
        let svc = service(&store);

        for recipient in &recipients[..3] {
            svc.send_friend_request(a, *recipient).await.unwrap();
        }

        // recipients resolving requests does not refund the sender's quota
        for recipient in &recipients[..3] {
            let id = store
                .requests
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.recipient == *recipient)
                .unwrap()
                .id;
            svc.handle_friend_request(*recipient, id, RequestAction::Rejected).await.unwrap();
        }

        let fourth = svc.send_friend_request(a, recipients[3]).await;
        assert!(matches!(fourth, Err(error::SystemError::TooManyRequests(_))));
    }

    #[actix_web::test]
    async fn accept_transitions_exactly_once() {
        let store = InMemoryStore::new();
        let a = store.seed_user("a@x.com", "Ann", "Ada");
        let b = store.seed_user("b@x.com", "Bob", "Stone");
        let svc = service(&store);

        svc.send_friend_request(a, b).await.unwrap();
        let request_id = store.requests.lock().unwrap()[0].id;

        let action =
            svc.handle_friend_request(b, request_id, RequestAction::Accepted).await.unwrap();
        assert_eq!(action, RequestAction::Accepted);
        assert_eq!(
            store.requests.lock().unwrap()[0].request_status,
            RequestStatus::Accepted
        );

        // terminal: neither party can move it again
        for caller in [a, b] {
            let again = svc.handle_friend_request(caller, request_id, RequestAction::Rejected).await;
            assert!(matches!(again, Err(error::SystemError::NotFound(_))));
        }
        assert_eq!(
            store.requests.lock().unwrap()[0].request_status,
            RequestStatus::Accepted
        );
    }

    #[actix_web::test]
    async fn only_the_recipient_may_resolve() {
        let store = InMemoryStore::new();
        let a = store.seed_user("a@x.com", "Ann", "Ada");
        let b = store.seed_user("b@x.com", "Bob", "Stone");
        let c = store.seed_user("c@x.com", "Cleo", "Reed");
        let svc = service(&store);

        svc.send_friend_request(a, b).await.unwrap();
        let request_id = store.requests.lock().unwrap()[0].id;

        // requester and bystander get the same undifferentiated failure
        for caller in [a, c] {
            let result = svc.handle_friend_request(caller, request_id, RequestAction::Accepted).await;
            assert!(matches!(result, Err(error::SystemError::NotFound(_))));
        }

        svc.handle_friend_request(b, request_id, RequestAction::Accepted).await.unwrap();
    }

    #[actix_web::test]
    async fn friendship_is_symmetric_and_ignores_unaccepted_rows() {
        let store = InMemoryStore::new();
        let a = store.seed_user("a@x.com", "Ann", "Ada");
        let b = store.seed_user("b@x.com", "Bob", "Stone");
        let c = store.seed_user("c@x.com", "Cleo", "Reed");
        let d = store.seed_user("d@x.com", "Dan", "Hill");
        let svc = service(&store);

        svc.send_friend_request(a, b).await.unwrap();
        svc.send_friend_request(a, c).await.unwrap(); // stays pending
        svc.send_friend_request(d, a).await.unwrap(); // will be rejected

        let to_b = store.requests.lock().unwrap()[0].id;
        svc.handle_friend_request(b, to_b, RequestAction::Accepted).await.unwrap();
        let from_d = store.requests.lock().unwrap()[2].id;
        svc.handle_friend_request(a, from_d, RequestAction::Rejected).await.unwrap();

        let friends_of_a = svc.list_friends(a, page()).await.unwrap();
        assert_eq!(friends_of_a.len(), 1);
        assert_eq!(friends_of_a[0].id, b);

        let friends_of_b = svc.list_friends(b, page()).await.unwrap();
        assert_eq!(friends_of_b.len(), 1);
        assert_eq!(friends_of_b[0].id, a);

        assert!(svc.list_friends(c, page()).await.unwrap().is_empty());
        assert!(svc.list_friends(d, page()).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn list_friends_dedupes_double_connected_pairs() {
        let store = InMemoryStore::new();
        let a = store.seed_user("a@x.com", "Ann", "Ada");
        let b = store.seed_user("b@x.com", "Bob", "Stone");
        let svc = service(&store);

        // historical accepted rows in both directions for the same pair
        for (requester, recipient) in [(a, b), (b, a)] {
            svc.send_friend_request(requester, recipient).await.unwrap();
            let id = store
                .requests
                .lock()
                .unwrap()
                .iter()
                .find(|r| {
                    r.requester == requester && r.request_status == RequestStatus::Pending
                })
                .unwrap()
                .id;
            svc.handle_friend_request(recipient, id, RequestAction::Accepted).await.unwrap();
        }

        let friends_of_a = svc.list_friends(a, page()).await.unwrap();
        assert_eq!(friends_of_a.len(), 1);
        assert_eq!(friends_of_a[0].id, b);
    }

    #[actix_web::test]
    async fn sent_and_received_only_show_pending_on_the_right_side() {
        let store = InMemoryStore::new();
        let a = store.seed_user("a@x.com", "Ann", "Ada");
        let b = store.seed_user("b@x.com", "Bob", "Stone");
        let c = store.seed_user("c@x.com", "Cleo", "Reed");
        let svc = service(&store);

        svc.send_friend_request(a, b).await.unwrap();
        svc.send_friend_request(c, a).await.unwrap();

        let sent = svc.list_sent(a, page()).await.unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient.id, b);

        let received = svc.list_received(a, page()).await.unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].requester.id, c);

        // resolving drops the row from both listings
        let incoming = received[0].id;
        svc.handle_friend_request(a, incoming, RequestAction::Accepted).await.unwrap();
        assert!(svc.list_received(a, page()).await.unwrap().is_empty());
        assert!(svc.list_sent(c, page()).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn accepting_m_of_n_requests_splits_the_listings() {
        let store = InMemoryStore::new();
        let a = store.seed_user("a@x.com", "Ann", "Ada");
        let recipients: Vec<Uuid> = (0..3)
            .map(|i| store.seed_user(&format!("r{i}@x.com"), "Rec", &format!("Ipient{i}")))
            .collect();
        let svc = service(&store);

        for recipient in &recipients {
            svc.send_friend_request(a, *recipient).await.unwrap();
        }

        // two of three recipients accept
        for recipient in &recipients[..2] {
            let id = store
                .requests
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.recipient == *recipient)
                .unwrap()
                .id;
            svc.handle_friend_request(*recipient, id, RequestAction::Accepted).await.unwrap();
        }

        assert_eq!(svc.list_friends(a, page()).await.unwrap().len(), 2);
        assert_eq!(svc.list_sent(a, page()).await.unwrap().len(), 1);
    }
}
