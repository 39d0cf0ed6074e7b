use super::IUserRepo;
use crate::repos::shared::postgres::PgExec;
use chrono::{DateTime, Utc};
use lembra_domain::{User, ID};
use sqlx::{types::Uuid, FromRow};
use tracing::error;

pub struct PostgresUserRepo {
    exec: PgExec,
}

impl PostgresUserRepo {
    pub fn new(exec: PgExec) -> Self {
        Self { exec }
    }
}

const USER_COLUMNS: &str = "user_uid, wa_number, name, timezone, \
     default_remind_before_minutes, default_remind_frequency_minutes, \
     default_require_confirmation, llm_provider, llm_model, \
     rate_limit_per_minute, is_active, created_at, updated_at";

#[derive(Debug, FromRow)]
struct UserRaw {
    user_uid: Uuid,
    wa_number: String,
    name: Option<String>,
    timezone: String,
    default_remind_before_minutes: i32,
    default_remind_frequency_minutes: i32,
    default_require_confirmation: bool,
    llm_provider: Option<String>,
    llm_model: Option<String>,
    rate_limit_per_minute: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRaw> for User {
    fn from(u: UserRaw) -> Self {
        Self {
            id: u.user_uid.into(),
            wa_number: u.wa_number,
            name: u.name,
            timezone: u.timezone,
            default_remind_before_minutes: u.default_remind_before_minutes,
            default_remind_frequency_minutes: u.default_remind_frequency_minutes,
            default_require_confirmation: u.default_require_confirmation,
            llm_provider: u.llm_provider,
            llm_model: u.llm_model,
            rate_limit_per_minute: u.rate_limit_per_minute,
            is_active: u.is_active,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[async_trait::async_trait]
impl IUserRepo for PostgresUserRepo {
    async fn insert(&self, user: &User) -> anyhow::Result<()> {
        let query = sqlx::query(
            r#"
            INSERT INTO users
            (user_uid, wa_number, name, timezone, default_remind_before_minutes,
             default_remind_frequency_minutes, default_require_confirmation,
             llm_provider, llm_model, rate_limit_per_minute, is_active,
             created_at, updated_at)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(*user.id.inner_ref())
        .bind(&user.wa_number)
        .bind(&user.name)
        .bind(&user.timezone)
        .bind(user.default_remind_before_minutes)
        .bind(user.default_remind_frequency_minutes)
        .bind(user.default_require_confirmation)
        .bind(&user.llm_provider)
        .bind(&user.llm_model)
        .bind(user.rate_limit_per_minute)
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.updated_at);

        self.exec.execute(query).await.map_err(|e| {
            error!(
                "Unable to insert user: {:?}. DB returned error: {:?}",
                user, e
            );
            e
        })?;
        Ok(())
    }

    async fn save(&self, user: &User) -> anyhow::Result<()> {
        let query = sqlx::query(
            r#"
            UPDATE users
            SET name = $2,
                timezone = $3,
                default_remind_before_minutes = $4,
                default_remind_frequency_minutes = $5,
                default_require_confirmation = $6,
                llm_provider = $7,
                llm_model = $8,
                rate_limit_per_minute = $9,
                is_active = $10,
                updated_at = $11
            WHERE user_uid = $1
            "#,
        )
        .bind(*user.id.inner_ref())
        .bind(&user.name)
        .bind(&user.timezone)
        .bind(user.default_remind_before_minutes)
        .bind(user.default_remind_frequency_minutes)
        .bind(user.default_require_confirmation)
        .bind(&user.llm_provider)
        .bind(&user.llm_model)
        .bind(user.rate_limit_per_minute)
        .bind(user.is_active)
        .bind(user.updated_at);

        self.exec.execute(query).await.map_err(|e| {
            error!(
                "Unable to save user: {:?}. DB returned error: {:?}",
                user, e
            );
            e
        })?;
        Ok(())
    }

    async fn find(&self, user_id: &ID) -> Option<User> {
        let sql = format!("SELECT {} FROM users WHERE user_uid = $1", USER_COLUMNS);
        let query = sqlx::query_as::<_, UserRaw>(&sql).bind(*user_id.inner_ref());
        self.exec
            .fetch_optional(query)
            .await
            .map_err(|e| {
                error!(
                    "Find user with id: {} failed. DB returned error: {:?}",
                    user_id, e
                );
                e
            })
            .ok()?
            .map(|user| user.into())
    }

    async fn find_by_wa_number(&self, wa_number: &str) -> Option<User> {
        let sql = format!("SELECT {} FROM users WHERE wa_number = $1", USER_COLUMNS);
        let query = sqlx::query_as::<_, UserRaw>(&sql).bind(wa_number);
        self.exec
            .fetch_optional(query)
            .await
            .map_err(|e| {
                error!(
                    "Find user with wa_number: {} failed. DB returned error: {:?}",
                    wa_number, e
                );
                e
            })
            .ok()?
            .map(|user| user.into())
    }
}
