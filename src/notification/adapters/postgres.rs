//! `PostgreSQL` adapter for the `notifications` table.

use crate::notification::{
    domain::{NewNotification, Notification, NotificationId, NotificationKind},
    ports::{NotificationRepository, NotificationStoreError, NotificationStoreResult},
};
use crate::shop::adapters::postgres::ShopPgPool;
use crate::shop::domain::JobId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;

mod schema {
    diesel::table! {
        /// Server-side notifications.
        notifications (id) {
            /// Serial key.
            id -> Int8,
            /// Category.
            #[sql_name = "type"]
            #[max_length = 32]
            kind -> Varchar,
            /// Headline.
            title -> Text,
            /// Body.
            message -> Text,
            /// Related job.
            job_id -> Nullable<Int8>,
            /// Creation timestamp.
            created_at -> Timestamptz,
        }
    }
}

use schema::notifications;

/// Query result row for `notifications`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct NotificationRow {
    id: i64,
    kind: String,
    title: String,
    message: String,
    job_id: Option<i64>,
    created_at: DateTime<Utc>,
}

/// Insert model for `notifications`.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
struct NewNotificationRow {
    kind: String,
    title: String,
    message: String,
    job_id: Option<i64>,
    created_at: DateTime<Utc>,
}

/// `PostgreSQL`-backed notification store.
#[derive(Debug, Clone)]
pub struct PostgresNotificationStore {
    pool: ShopPgPool,
}

impl PostgresNotificationStore {
    /// Creates a store from a connection pool.
    #[must_use]
    pub const fn new(pool: ShopPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> NotificationStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> NotificationStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(NotificationStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(NotificationStoreError::persistence)?
    }
}

#[async_trait]
impl NotificationRepository for PostgresNotificationStore {
    async fn insert(&self, notification: &NewNotification) -> NotificationStoreResult<Notification> {
        let row = NewNotificationRow {
            kind: notification.kind.as_str().to_owned(),
            title: notification.title.clone(),
            message: notification.message.clone(),
            job_id: notification.job_id.map(JobId::value),
            created_at: notification.created_at,
        };
        self.run_blocking(move |connection| {
            let stored = diesel::insert_into(notifications::table)
                .values(&row)
                .returning(NotificationRow::as_returning())
                .get_result(connection)
                .map_err(NotificationStoreError::persistence)?;
            row_to_notification(stored)
        })
        .await
    }

    async fn list_recent(&self, limit: usize) -> NotificationStoreResult<Vec<Notification>> {
        let rows = i64::try_from(limit).map_err(NotificationStoreError::persistence)?;
        self.run_blocking(move |connection| {
            notifications::table
                .order((notifications::created_at.desc(), notifications::id.desc()))
                .limit(rows)
                .select(NotificationRow::as_select())
                .load(connection)
                .map_err(NotificationStoreError::persistence)?
                .into_iter()
                .map(row_to_notification)
                .collect()
        })
        .await
    }

    async fn list_after(&self, after: NotificationId) -> NotificationStoreResult<Vec<Notification>> {
        self.run_blocking(move |connection| {
            notifications::table
                .filter(notifications::id.gt(after.value()))
                .order(notifications::id.asc())
                .select(NotificationRow::as_select())
                .load(connection)
                .map_err(NotificationStoreError::persistence)?
                .into_iter()
                .map(row_to_notification)
                .collect()
        })
        .await
    }
}

fn row_to_notification(row: NotificationRow) -> NotificationStoreResult<Notification> {
    let kind =
        NotificationKind::try_from(row.kind.as_str()).map_err(NotificationStoreError::persistence)?;
    Ok(Notification {
        id: NotificationId::new(row.id),
        kind,
        title: row.title,
        message: row.message,
        job_id: row.job_id.map(JobId::new),
        created_at: row.created_at,
    })
}
