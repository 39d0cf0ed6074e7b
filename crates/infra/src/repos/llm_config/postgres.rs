use super::ILlmConfigRepo;
use crate::repos::shared::postgres::PgExec;
use chrono::{DateTime, Utc};
use lembra_domain::{LlmModel, LlmProvider};
use sqlx::{types::Uuid, FromRow};
use tracing::error;

pub struct PostgresLlmConfigRepo {
    exec: PgExec,
}

impl PostgresLlmConfigRepo {
    pub fn new(exec: PgExec) -> Self {
        Self { exec }
    }
}

const MODEL_WITH_PROVIDER_COLUMNS: &str = "m.model_uid, m.provider_uid, m.name, m.display_name, \
     m.is_active, m.is_default, m.created_at, m.updated_at, \
     p.name AS p_name, p.description AS p_description, p.is_active AS p_is_active, \
     p.created_at AS p_created_at, p.updated_at AS p_updated_at";

#[derive(Debug, FromRow)]
struct LlmProviderRaw {
    provider_uid: Uuid,
    name: String,
    description: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LlmProviderRaw> for LlmProvider {
    fn from(p: LlmProviderRaw) -> Self {
        Self {
            id: p.provider_uid.into(),
            name: p.name,
            description: p.description,
            is_active: p.is_active,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct LlmModelRaw {
    model_uid: Uuid,
    provider_uid: Uuid,
    name: String,
    display_name: String,
    is_active: bool,
    is_default: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    p_name: String,
    p_description: String,
    p_is_active: bool,
    p_created_at: DateTime<Utc>,
    p_updated_at: DateTime<Utc>,
}

impl From<LlmModelRaw> for LlmModel {
    fn from(m: LlmModelRaw) -> Self {
        let provider = LlmProvider {
            id: m.provider_uid.into(),
            name: m.p_name,
            description: m.p_description,
            is_active: m.p_is_active,
            created_at: m.p_created_at,
            updated_at: m.p_updated_at,
        };
        Self {
            id: m.model_uid.into(),
            provider_id: provider.id.clone(),
            name: m.name,
            display_name: m.display_name,
            is_active: m.is_active,
            is_default: m.is_default,
            created_at: m.created_at,
            updated_at: m.updated_at,
            provider: Some(provider),
        }
    }
}

#[async_trait::async_trait]
impl ILlmConfigRepo for PostgresLlmConfigRepo {
    async fn find_default_model(&self) -> Option<LlmModel> {
        let sql = format!(
            r#"
            SELECT {}
            FROM llm_models AS m
            JOIN llm_providers AS p ON p.provider_uid = m.provider_uid
            WHERE m.is_default AND m.is_active AND p.is_active
            LIMIT 1
            "#,
            MODEL_WITH_PROVIDER_COLUMNS
        );
        let query = sqlx::query_as::<_, LlmModelRaw>(&sql);
        self.exec
            .fetch_optional(query)
            .await
            .map_err(|e| {
                error!("Find default LLM model failed. DB returned error: {:?}", e);
                e
            })
            .ok()?
            .map(|model| model.into())
    }

    async fn find_model(&self, provider_name: &str, model_name: &str) -> Option<LlmModel> {
        let sql = format!(
            r#"
            SELECT {}
            FROM llm_models AS m
            JOIN llm_providers AS p ON p.provider_uid = m.provider_uid
            WHERE p.name = $1 AND m.name = $2 AND m.is_active AND p.is_active
            "#,
            MODEL_WITH_PROVIDER_COLUMNS
        );
        let query = sqlx::query_as::<_, LlmModelRaw>(&sql)
            .bind(provider_name)
            .bind(model_name);
        self.exec
            .fetch_optional(query)
            .await
            .map_err(|e| {
                error!(
                    "Find LLM model: {}/{} failed. DB returned error: {:?}",
                    provider_name, model_name, e
                );
                e
            })
            .ok()?
            .map(|model| model.into())
    }

    async fn list_active_providers(&self) -> Vec<LlmProvider> {
        let query = sqlx::query_as::<_, LlmProviderRaw>(
            r#"
            SELECT provider_uid, name, description, is_active, created_at, updated_at
            FROM llm_providers
            WHERE is_active
            ORDER BY name ASC
            "#,
        );
        self.exec
            .fetch_all(query)
            .await
            .map_err(|e| {
                error!("List LLM providers failed. DB returned error: {:?}", e);
                e
            })
            .unwrap_or_default()
            .into_iter()
            .map(|provider| provider.into())
            .collect()
    }

    async fn list_active_models_by_provider(&self, provider_name: &str) -> Vec<LlmModel> {
        let sql = format!(
            r#"
            SELECT {}
            FROM llm_models AS m
            JOIN llm_providers AS p ON p.provider_uid = m.provider_uid
            WHERE p.name = $1 AND m.is_active
            ORDER BY m.name ASC
            "#,
            MODEL_WITH_PROVIDER_COLUMNS
        );
        let query = sqlx::query_as::<_, LlmModelRaw>(&sql).bind(provider_name);
        self.exec
            .fetch_all(query)
            .await
            .map_err(|e| {
                error!(
                    "List LLM models for provider: {} failed. DB returned error: {:?}",
                    provider_name, e
                );
                e
            })
            .unwrap_or_default()
            .into_iter()
            .map(|model| model.into())
            .collect()
    }
}
