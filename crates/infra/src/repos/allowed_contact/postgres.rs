use super::IAllowedContactRepo;
use crate::repos::shared::postgres::PgExec;
use chrono::{DateTime, Utc};
use lembra_domain::{AllowedContact, ID};
use sqlx::{types::Uuid, FromRow};
use tracing::error;

pub struct PostgresAllowedContactRepo {
    exec: PgExec,
}

impl PostgresAllowedContactRepo {
    pub fn new(exec: PgExec) -> Self {
        Self { exec }
    }
}

#[derive(Debug, FromRow)]
struct AllowedContactRaw {
    user_uid: Uuid,
    contact_number: String,
    note: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<AllowedContactRaw> for AllowedContact {
    fn from(c: AllowedContactRaw) -> Self {
        Self {
            user_id: c.user_uid.into(),
            contact_number: c.contact_number,
            note: c.note,
            created_at: c.created_at,
        }
    }
}

#[async_trait::async_trait]
impl IAllowedContactRepo for PostgresAllowedContactRepo {
    async fn insert(&self, contact: &AllowedContact) -> anyhow::Result<()> {
        let query = sqlx::query(
            r#"
            INSERT INTO user_allowed_contacts
            (user_uid, contact_number, note, created_at)
            VALUES($1, $2, $3, $4)
            ON CONFLICT (user_uid, contact_number) DO NOTHING
            "#,
        )
        .bind(*contact.user_id.inner_ref())
        .bind(&contact.contact_number)
        .bind(&contact.note)
        .bind(contact.created_at);

        self.exec.execute(query).await.map_err(|e| {
            error!(
                "Unable to insert allowed contact: {:?}. DB returned error: {:?}",
                contact, e
            );
            e
        })?;
        Ok(())
    }

    async fn delete(&self, user_id: &ID, contact_number: &str) -> bool {
        let query = sqlx::query(
            "DELETE FROM user_allowed_contacts WHERE user_uid = $1 AND contact_number = $2",
        )
        .bind(*user_id.inner_ref())
        .bind(contact_number);

        match self.exec.execute(query).await {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                error!(
                    "Delete allowed contact: {} for user: {} failed. DB returned error: {:?}",
                    contact_number, user_id, e
                );
                false
            }
        }
    }

    async fn find_by_user(&self, user_id: &ID) -> Vec<AllowedContact> {
        let query = sqlx::query_as::<_, AllowedContactRaw>(
            r#"
            SELECT user_uid, contact_number, note, created_at
            FROM user_allowed_contacts
            WHERE user_uid = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(*user_id.inner_ref());

        self.exec
            .fetch_all(query)
            .await
            .map_err(|e| {
                error!(
                    "Find allowed contacts for user: {} failed. DB returned error: {:?}",
                    user_id, e
                );
                e
            })
            .unwrap_or_default()
            .into_iter()
            .map(|contact| contact.into())
            .collect()
    }

    async fn is_allowed(&self, user_id: &ID, contact_number: &str) -> bool {
        let query = sqlx::query_as::<_, (bool,)>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM user_allowed_contacts
                WHERE user_uid = $1 AND contact_number = $2
            )
            "#,
        )
        .bind(*user_id.inner_ref())
        .bind(contact_number);

        match self.exec.fetch_one(query).await {
            Ok((allowed,)) => allowed,
            Err(e) => {
                error!(
                    "Allowed contact check for user: {} failed. DB returned error: {:?}",
                    user_id, e
                );
                false
            }
        }
    }
}
