use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgArguments, PgQueryResult, PgRow};
use sqlx::query::{Query, QueryAs};
use sqlx::{FromRow, PgPool, Postgres};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Where a repository sends its queries: the shared pool, or one pinned
/// connection when the repository is a transactional clone handed out by
/// `Repos::with_transaction`.
#[derive(Clone)]
pub enum PgExec {
    Pool(PgPool),
    Tx(Arc<Mutex<PoolConnection<Postgres>>>),
}

impl PgExec {
    pub async fn execute<'q>(
        &self,
        query: Query<'q, Postgres, PgArguments>,
    ) -> sqlx::Result<PgQueryResult> {
        match self {
            Self::Pool(pool) => query.execute(pool).await,
            Self::Tx(conn) => {
                let mut conn = conn.lock().await;
                query.execute(&mut **conn).await
            }
        }
    }

    pub async fn fetch_optional<'q, O>(
        &self,
        query: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> sqlx::Result<Option<O>>
    where
        O: Send + Unpin + for<'r> FromRow<'r, PgRow>,
    {
        match self {
            Self::Pool(pool) => query.fetch_optional(pool).await,
            Self::Tx(conn) => {
                let mut conn = conn.lock().await;
                query.fetch_optional(&mut **conn).await
            }
        }
    }

    pub async fn fetch_one<'q, O>(
        &self,
        query: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> sqlx::Result<O>
    where
        O: Send + Unpin + for<'r> FromRow<'r, PgRow>,
    {
        match self {
            Self::Pool(pool) => query.fetch_one(pool).await,
            Self::Tx(conn) => {
                let mut conn = conn.lock().await;
                query.fetch_one(&mut **conn).await
            }
        }
    }

    pub async fn fetch_all<'q, O>(
        &self,
        query: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> sqlx::Result<Vec<O>>
    where
        O: Send + Unpin + for<'r> FromRow<'r, PgRow>,
    {
        match self {
            Self::Pool(pool) => query.fetch_all(pool).await,
            Self::Tx(conn) => {
                let mut conn = conn.lock().await;
                query.fetch_all(&mut **conn).await
            }
        }
    }
}
