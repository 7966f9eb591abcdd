use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    api::error,
    modules::friend::{
        model::{ReceivedRequestResponse, RequestUserRow, SentRequestResponse},
        repository::FriendRequestRepository,
        schema::{FriendRequestEntity, RequestStatus},
    },
};

#[derive(Clone)]
pub struct FriendRequestRepositoryPg {
    pool: sqlx::PgPool,
}

impl FriendRequestRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FriendRequestRepository for FriendRequestRepositoryPg {
    async fn count_created_since(
        &self,
        requester: &Uuid,
        since: DateTime<Utc>,
    ) -> Result<i64, error::SystemError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM friend_requests WHERE requester = $1 AND created_at >= $2",
        )
        .bind(requester)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn insert_pending(
        &self,
        requester: &Uuid,
        recipient: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let id = Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext));

        // The arbiter is the partial unique index on pending pairs, so a
        // duplicate comes back as "no row" instead of a driver error.
        let request = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            INSERT INTO friend_requests (id, requester, recipient)
            VALUES ($1, $2, $3)
            ON CONFLICT (requester, recipient) WHERE request_status = 'pending'
            DO NOTHING
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(requester)
        .bind(recipient)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn transition_pending(
        &self,
        request_id: &Uuid,
        recipient: &Uuid,
        status: RequestStatus,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let request = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            UPDATE friend_requests
            SET request_status = $3
            WHERE id = $1
              AND recipient = $2
              AND request_status = 'pending'
            RETURNING *
            "#,
        )
        .bind(request_id)
        .bind(recipient)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn list_pending_from(
        &self,
        requester: &Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SentRequestResponse>, error::SystemError> {
        let rows = sqlx::query_as::<_, RequestUserRow>(
            r#"
            SELECT
                fr.id AS req_id,
                fr.request_status,
                fr.created_at AS req_created_at,
                u.id AS user_id,
                u.email,
                u.first_name,
                u.last_name
            FROM friend_requests fr
            JOIN users u
                ON u.id = fr.recipient
            WHERE fr.requester = $1
              AND fr.request_status = 'pending'
            ORDER BY fr.created_at
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(requester)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| SentRequestResponse {
                id: r.req_id,
                recipient: r.profile(),
                request_status: r.request_status,
                created_at: r.req_created_at,
            })
            .collect())
    }

    async fn list_pending_to(
        &self,
        recipient: &Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ReceivedRequestResponse>, error::SystemError> {
        let rows = sqlx::query_as::<_, RequestUserRow>(
            r#"
            SELECT
                fr.id AS req_id,
                fr.request_status,
                fr.created_at AS req_created_at,
                u.id AS user_id,
                u.email,
                u.first_name,
                u.last_name
            FROM friend_requests fr
            JOIN users u
                ON u.id = fr.requester
            WHERE fr.recipient = $1
              AND fr.request_status = 'pending'
            ORDER BY fr.created_at
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(recipient)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ReceivedRequestResponse {
                id: r.req_id,
                requester: r.profile(),
                request_status: r.request_status,
                created_at: r.req_created_at,
            })
            .collect())
    }

    async fn find_accepted_touching(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<FriendRequestEntity>, error::SystemError> {
        let rows = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            SELECT *
            FROM friend_requests
            WHERE request_status = 'accepted'
              AND (requester = $1 OR recipient = $1)
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
