mod allowed_contact;
mod event;
mod inbound_message;
mod llm_config;
mod shared;
mod user;

pub use allowed_contact::{IAllowedContactRepo, InMemoryAllowedContactRepo, PostgresAllowedContactRepo};
pub use event::{IEventRepo, InMemoryEventRepo, PostgresEventRepo};
pub use inbound_message::{
    IInboundMessageRepo, InMemoryInboundMessageRepo, PostgresInboundMessageRepo,
};
pub use llm_config::{ILlmConfigRepo, InMemoryLlmConfigRepo, PostgresLlmConfigRepo};
pub use user::{IUserRepo, InMemoryUserRepo, PostgresUserRepo};

use shared::postgres::PgExec;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::future::Future;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct Repos {
    pub events: Arc<dyn IEventRepo>,
    pub users: Arc<dyn IUserRepo>,
    pub inbound_messages: Arc<dyn IInboundMessageRepo>,
    pub allowed_contacts: Arc<dyn IAllowedContactRepo>,
    pub llm_configs: Arc<dyn ILlmConfigRepo>,
    tx_source: TxSource,
}

#[derive(Clone)]
enum TxSource {
    InMemory,
    Postgres(PgPool),
    /// Already running inside a transaction; nested closures share it
    Nested,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;

        info!("DB CHECKING CONNECTION ...");
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("DB CHECKING CONNECTION ... [done]");

        Ok(Self::postgres_with_exec(
            PgExec::Pool(pool.clone()),
            TxSource::Postgres(pool),
        ))
    }

    fn postgres_with_exec(exec: PgExec, tx_source: TxSource) -> Self {
        Self {
            events: Arc::new(PostgresEventRepo::new(exec.clone())),
            users: Arc::new(PostgresUserRepo::new(exec.clone())),
            inbound_messages: Arc::new(PostgresInboundMessageRepo::new(exec.clone())),
            allowed_contacts: Arc::new(PostgresAllowedContactRepo::new(exec.clone())),
            llm_configs: Arc::new(PostgresLlmConfigRepo::new(exec)),
            tx_source,
        }
    }

    pub fn create_inmemory() -> Self {
        let users = Arc::new(InMemoryUserRepo::new());
        Self {
            events: Arc::new(InMemoryEventRepo::new(users.clone())),
            users,
            inbound_messages: Arc::new(InMemoryInboundMessageRepo::new()),
            allowed_contacts: Arc::new(InMemoryAllowedContactRepo::new()),
            llm_configs: Arc::new(InMemoryLlmConfigRepo::new()),
            tx_source: TxSource::InMemory,
        }
    }

    /// Readiness probe
    pub async fn check_connection(&self) -> anyhow::Result<()> {
        if let TxSource::Postgres(pool) = &self.tx_source {
            sqlx::query("SELECT 1").execute(pool).await?;
        }
        Ok(())
    }

    /// Runs `f` against a transactional clone of all repositories: commits
    /// when `f` returns `Ok`, rolls back otherwise. The in-memory flavour
    /// has no transaction to speak of and runs `f` directly.
    pub async fn with_transaction<T, E, F, Fut>(&self, f: F) -> Result<T, E>
    where
        E: From<anyhow::Error>,
        F: FnOnce(Repos) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let pool = match &self.tx_source {
            TxSource::Postgres(pool) => pool.clone(),
            TxSource::InMemory | TxSource::Nested => return f(self.clone()).await,
        };

        let mut conn = pool
            .acquire()
            .await
            .map_err(|e| E::from(anyhow::Error::from(e)))?;
        sqlx::query("BEGIN")
            .execute(&mut *conn)
            .await
            .map_err(|e| E::from(anyhow::Error::from(e)))?;

        let conn = Arc::new(tokio::sync::Mutex::new(conn));
        let tx_repos = Self::postgres_with_exec(PgExec::Tx(conn.clone()), TxSource::Nested);
        let res = f(tx_repos).await;

        let end = if res.is_ok() { "COMMIT" } else { "ROLLBACK" };
        let mut conn = conn.lock().await;
        sqlx::query(end)
            .execute(&mut **conn)
            .await
            .map_err(|e| E::from(anyhow::Error::from(e)))?;

        res
    }
}
