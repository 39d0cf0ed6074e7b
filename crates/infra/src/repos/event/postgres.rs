use super::IEventRepo;
use crate::repos::shared::postgres::PgExec;
use chrono::{DateTime, Duration, Utc};
use lembra_domain::{Event, EventIdentifier, EventWithUser, ID, User};
use sqlx::{types::Uuid, FromRow};
use tracing::error;

pub struct PostgresEventRepo {
    exec: PgExec,
}

impl PostgresEventRepo {
    pub fn new(exec: PgExec) -> Self {
        Self { exec }
    }
}

const EVENT_COLUMNS: &str = "event_uid, user_uid, title, location, starts_at, \
     remind_before_minutes, remind_frequency_minutes, require_confirmation, \
     max_notifications, status, notifications_sent, last_notified_at, \
     created_at, updated_at";

#[derive(Debug, FromRow)]
struct EventRaw {
    event_uid: Uuid,
    user_uid: Uuid,
    title: String,
    location: Option<String>,
    starts_at: DateTime<Utc>,
    remind_before_minutes: i32,
    remind_frequency_minutes: i32,
    require_confirmation: bool,
    max_notifications: i32,
    status: String,
    notifications_sent: i32,
    last_notified_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EventRaw> for Event {
    fn from(e: EventRaw) -> Self {
        Self {
            id: e.event_uid.into(),
            user_id: e.user_uid.into(),
            title: e.title,
            location: e.location,
            starts_at: e.starts_at,
            remind_before_minutes: e.remind_before_minutes,
            remind_frequency_minutes: e.remind_frequency_minutes,
            require_confirmation: e.require_confirmation,
            max_notifications: e.max_notifications,
            status: e.status.into(),
            notifications_sent: e.notifications_sent,
            last_notified_at: e.last_notified_at,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct PendingReminderRaw {
    event_uid: Uuid,
    user_uid: Uuid,
    title: String,
    location: Option<String>,
    starts_at: DateTime<Utc>,
    remind_before_minutes: i32,
    remind_frequency_minutes: i32,
    require_confirmation: bool,
    max_notifications: i32,
    status: String,
    notifications_sent: i32,
    last_notified_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    u_wa_number: String,
    u_name: Option<String>,
    u_timezone: String,
    u_default_remind_before_minutes: i32,
    u_default_remind_frequency_minutes: i32,
    u_default_require_confirmation: bool,
    u_llm_provider: Option<String>,
    u_llm_model: Option<String>,
    u_rate_limit_per_minute: i32,
    u_is_active: bool,
    u_created_at: DateTime<Utc>,
    u_updated_at: DateTime<Utc>,
}

impl From<PendingReminderRaw> for EventWithUser {
    fn from(row: PendingReminderRaw) -> Self {
        let user = User {
            id: row.user_uid.into(),
            wa_number: row.u_wa_number,
            name: row.u_name,
            timezone: row.u_timezone,
            default_remind_before_minutes: row.u_default_remind_before_minutes,
            default_remind_frequency_minutes: row.u_default_remind_frequency_minutes,
            default_require_confirmation: row.u_default_require_confirmation,
            llm_provider: row.u_llm_provider,
            llm_model: row.u_llm_model,
            rate_limit_per_minute: row.u_rate_limit_per_minute,
            is_active: row.u_is_active,
            created_at: row.u_created_at,
            updated_at: row.u_updated_at,
        };
        let event = Event {
            id: row.event_uid.into(),
            user_id: user.id.clone(),
            title: row.title,
            location: row.location,
            starts_at: row.starts_at,
            remind_before_minutes: row.remind_before_minutes,
            remind_frequency_minutes: row.remind_frequency_minutes,
            require_confirmation: row.require_confirmation,
            max_notifications: row.max_notifications,
            status: row.status.into(),
            notifications_sent: row.notifications_sent,
            last_notified_at: row.last_notified_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        };
        Self { event, user }
    }
}

#[async_trait::async_trait]
impl IEventRepo for PostgresEventRepo {
    async fn insert(&self, event: &Event) -> anyhow::Result<()> {
        let query = sqlx::query(
            r#"
            INSERT INTO events
            (event_uid, user_uid, title, location, starts_at, remind_before_minutes,
             remind_frequency_minutes, require_confirmation, max_notifications, status,
             notifications_sent, last_notified_at, created_at, updated_at)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(*event.id.inner_ref())
        .bind(*event.user_id.inner_ref())
        .bind(&event.title)
        .bind(&event.location)
        .bind(event.starts_at)
        .bind(event.remind_before_minutes)
        .bind(event.remind_frequency_minutes)
        .bind(event.require_confirmation)
        .bind(event.max_notifications)
        .bind(event.status.as_str())
        .bind(event.notifications_sent)
        .bind(event.last_notified_at)
        .bind(event.created_at)
        .bind(event.updated_at);

        self.exec.execute(query).await.map_err(|e| {
            error!(
                "Unable to insert event: {:?}. DB returned error: {:?}",
                event, e
            );
            e
        })?;
        Ok(())
    }

    async fn save(&self, event: &Event) -> anyhow::Result<()> {
        let query = sqlx::query(
            r#"
            UPDATE events
            SET title = $2,
                location = $3,
                starts_at = $4,
                remind_before_minutes = $5,
                remind_frequency_minutes = $6,
                require_confirmation = $7,
                max_notifications = $8,
                status = $9,
                notifications_sent = $10,
                last_notified_at = $11,
                updated_at = $12
            WHERE event_uid = $1
            "#,
        )
        .bind(*event.id.inner_ref())
        .bind(&event.title)
        .bind(&event.location)
        .bind(event.starts_at)
        .bind(event.remind_before_minutes)
        .bind(event.remind_frequency_minutes)
        .bind(event.require_confirmation)
        .bind(event.max_notifications)
        .bind(event.status.as_str())
        .bind(event.notifications_sent)
        .bind(event.last_notified_at)
        .bind(event.updated_at);

        self.exec.execute(query).await.map_err(|e| {
            error!(
                "Unable to save event: {:?}. DB returned error: {:?}",
                event, e
            );
            e
        })?;
        Ok(())
    }

    async fn delete(&self, event_id: &ID) -> Option<Event> {
        let sql = format!(
            "DELETE FROM events WHERE event_uid = $1 RETURNING {}",
            EVENT_COLUMNS
        );
        let query = sqlx::query_as::<_, EventRaw>(&sql).bind(*event_id.inner_ref());
        self.exec
            .fetch_optional(query)
            .await
            .map_err(|e| {
                error!(
                    "Delete event with id: {} failed. DB returned error: {:?}",
                    event_id, e
                );
                e
            })
            .ok()?
            .map(|event| event.into())
    }

    async fn find(&self, event_id: &ID) -> Option<Event> {
        let sql = format!(
            "SELECT {} FROM events WHERE event_uid = $1",
            EVENT_COLUMNS
        );
        let query = sqlx::query_as::<_, EventRaw>(&sql).bind(*event_id.inner_ref());
        self.exec
            .fetch_optional(query)
            .await
            .map_err(|e| {
                error!(
                    "Find event with id: {} failed. DB returned error: {:?}",
                    event_id, e
                );
                e
            })
            .ok()?
            .map(|event| event.into())
    }

    async fn find_by_user(&self, user_id: &ID) -> Vec<Event> {
        let sql = format!(
            "SELECT {} FROM events WHERE user_uid = $1 ORDER BY starts_at ASC",
            EVENT_COLUMNS
        );
        let query = sqlx::query_as::<_, EventRaw>(&sql).bind(*user_id.inner_ref());
        self.exec
            .fetch_all(query)
            .await
            .map_err(|e| {
                error!(
                    "Find events for user: {} failed. DB returned error: {:?}",
                    user_id, e
                );
                e
            })
            .unwrap_or_default()
            .into_iter()
            .map(|event| event.into())
            .collect()
    }

    async fn find_by_user_and_range(
        &self,
        user_id: &ID,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<Event> {
        let sql = format!(
            "SELECT {} FROM events WHERE user_uid = $1 AND starts_at BETWEEN $2 AND $3 ORDER BY starts_at ASC",
            EVENT_COLUMNS
        );
        let query = sqlx::query_as::<_, EventRaw>(&sql)
            .bind(*user_id.inner_ref())
            .bind(start)
            .bind(end);
        self.exec
            .fetch_all(query)
            .await
            .map_err(|e| {
                error!(
                    "Find events in range for user: {} failed. DB returned error: {:?}",
                    user_id, e
                );
                e
            })
            .unwrap_or_default()
            .into_iter()
            .map(|event| event.into())
            .collect()
    }

    async fn find_by_user_and_identifier(
        &self,
        user_id: &ID,
        identifier: &EventIdentifier,
    ) -> anyhow::Result<Vec<Event>> {
        let mut conditions = Vec::new();
        let mut next_arg = 2;
        if identifier.event_id.is_some() {
            conditions.push(format!("event_uid = ${}", next_arg));
            next_arg += 1;
        }
        if identifier.title.is_some() {
            conditions.push(format!("title ILIKE ${}", next_arg));
            next_arg += 1;
        }
        if identifier.date_hint.is_some() {
            conditions.push(format!("DATE(starts_at) = ${}", next_arg));
        }

        let mut sql = format!("SELECT {} FROM events WHERE user_uid = $1", EVENT_COLUMNS);
        if !conditions.is_empty() {
            sql.push_str(&format!(" AND ({})", conditions.join(" OR ")));
        }
        sql.push_str(" ORDER BY starts_at ASC");

        let mut query = sqlx::query_as::<_, EventRaw>(&sql).bind(*user_id.inner_ref());
        if let Some(event_id) = &identifier.event_id {
            query = query.bind(*event_id.inner_ref());
        }
        if let Some(title) = &identifier.title {
            query = query.bind(format!("%{}%", title));
        }
        if let Some(date_hint) = identifier.date_hint {
            query = query.bind(date_hint);
        }

        let events = self.exec.fetch_all(query).await.map_err(|e| {
            error!(
                "Find events by identifier: {:?} for user: {} failed. DB returned error: {:?}",
                identifier, user_id, e
            );
            e
        })?;
        Ok(events.into_iter().map(|event| event.into()).collect())
    }

    async fn find_pending_reminders(
        &self,
        now: DateTime<Utc>,
        lookahead: Duration,
    ) -> Vec<EventWithUser> {
        let window_end = now + lookahead;
        let query = sqlx::query_as::<_, PendingReminderRaw>(
            r#"
            SELECT e.event_uid, e.user_uid, e.title, e.location, e.starts_at,
                   e.remind_before_minutes, e.remind_frequency_minutes,
                   e.require_confirmation, e.max_notifications, e.status,
                   e.notifications_sent, e.last_notified_at, e.created_at, e.updated_at,
                   u.wa_number AS u_wa_number,
                   u.name AS u_name,
                   u.timezone AS u_timezone,
                   u.default_remind_before_minutes AS u_default_remind_before_minutes,
                   u.default_remind_frequency_minutes AS u_default_remind_frequency_minutes,
                   u.default_require_confirmation AS u_default_require_confirmation,
                   u.llm_provider AS u_llm_provider,
                   u.llm_model AS u_llm_model,
                   u.rate_limit_per_minute AS u_rate_limit_per_minute,
                   u.is_active AS u_is_active,
                   u.created_at AS u_created_at,
                   u.updated_at AS u_updated_at
            FROM events AS e
            JOIN users AS u ON u.user_uid = e.user_uid
            WHERE e.status IN ('scheduled', 'confirmed')
              AND e.notifications_sent < e.max_notifications
              AND e.starts_at - e.remind_before_minutes * INTERVAL '1 minute' <= $2
              AND e.starts_at >= $1
              AND (e.last_notified_at IS NULL
                   OR e.last_notified_at <= $1 - e.remind_frequency_minutes * INTERVAL '1 minute')
            ORDER BY e.starts_at ASC
            "#,
        )
        .bind(now)
        .bind(window_end);

        self.exec
            .fetch_all(query)
            .await
            .map_err(|e| {
                error!("Pending reminder scan failed. DB returned error: {:?}", e);
                e
            })
            .unwrap_or_default()
            .into_iter()
            .map(|row| row.into())
            .collect()
    }
}
