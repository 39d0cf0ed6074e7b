use super::IInboundMessageRepo;
use crate::repos::shared::postgres::PgExec;
use lembra_domain::InboundMessage;
use tracing::error;

pub struct PostgresInboundMessageRepo {
    exec: PgExec,
}

impl PostgresInboundMessageRepo {
    pub fn new(exec: PgExec) -> Self {
        Self { exec }
    }
}

#[async_trait::async_trait]
impl IInboundMessageRepo for PostgresInboundMessageRepo {
    async fn insert(&self, message: &InboundMessage) -> anyhow::Result<bool> {
        let query = sqlx::query(
            r#"
            INSERT INTO inbound_messages
            (inbound_message_uid, provider_message_id, from_number, raw_payload,
             processed_at, created_at)
            VALUES($1, $2, $3, $4, $5, $6)
            ON CONFLICT (provider_message_id) DO NOTHING
            "#,
        )
        .bind(*message.id.inner_ref())
        .bind(&message.provider_message_id)
        .bind(&message.from_number)
        .bind(&message.raw_payload)
        .bind(message.processed_at)
        .bind(message.created_at);

        let res = self.exec.execute(query).await.map_err(|e| {
            error!(
                "Unable to insert inbound message: {}. DB returned error: {:?}",
                message.provider_message_id, e
            );
            e
        })?;
        Ok(res.rows_affected() > 0)
    }

    async fn exists(&self, provider_message_id: &str) -> bool {
        let query = sqlx::query_as::<_, (bool,)>(
            "SELECT EXISTS(SELECT 1 FROM inbound_messages WHERE provider_message_id = $1)",
        )
        .bind(provider_message_id);

        match self.exec.fetch_one(query).await {
            Ok((exists,)) => exists,
            Err(e) => {
                error!(
                    "Inbound message existence check for: {} failed. DB returned error: {:?}",
                    provider_message_id, e
                );
                false
            }
        }
    }
}
