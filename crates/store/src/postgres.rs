use std::time::Instant;

use async_trait::async_trait;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{PgConnection, PgPool, Postgres};

use crate::{Columns, Committer, Mutation, MutationPlan, Result, StoreError, Table, Value};

/// PostgreSQL-backed committer. Each plan runs in one transaction.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn execute(conn: &mut PgConnection, mutation: Mutation) -> Result<()> {
        match mutation {
            Mutation::Insert { table, columns } => {
                let key = columns
                    .get(table.key)
                    .and_then(Value::as_str)
                    .map(str::to_owned)
                    .ok_or(StoreError::MissingKey {
                        table: table.name,
                        column: table.key,
                    })?;

                let sql = insert_sql(table, &columns);
                let mut query = sqlx::query(&sql);
                for value in columns.into_values() {
                    query = bind(query, value);
                }

                query.execute(conn).await.map_err(|e| {
                    if let sqlx::Error::Database(ref db_err) = e
                        && db_err.is_unique_violation()
                    {
                        return StoreError::AlreadyExists {
                            table: table.name,
                            key,
                        };
                    }
                    StoreError::Database(e)
                })?;
            }
            Mutation::Update {
                table,
                key,
                columns,
            } => {
                let affected = if columns.is_empty() {
                    let sql = format!("SELECT 1 FROM {} WHERE {} = $1", table.name, table.key);
                    sqlx::query(&sql)
                        .bind(&key)
                        .fetch_optional(conn)
                        .await?
                        .map_or(0, |_| 1)
                } else {
                    let sql = update_sql(table, &columns);
                    let mut query = sqlx::query(&sql);
                    for value in columns.into_values() {
                        query = bind(query, value);
                    }
                    query.bind(&key).execute(conn).await?.rows_affected()
                };

                if affected == 0 {
                    return Err(StoreError::RowNotFound {
                        table: table.name,
                        key,
                    });
                }
            }
        }

        Ok(())
    }
}

fn insert_sql(table: Table, columns: &Columns) -> String {
    let names: Vec<&str> = columns.keys().copied().collect();
    let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("${i}")).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table.name,
        names.join(", "),
        placeholders.join(", ")
    )
}

fn update_sql(table: Table, columns: &Columns) -> String {
    let assignments: Vec<String> = columns
        .keys()
        .enumerate()
        .map(|(i, name)| format!("{name} = ${}", i + 1))
        .collect();
    format!(
        "UPDATE {} SET {} WHERE {} = ${}",
        table.name,
        assignments.join(", "),
        table.key,
        columns.len() + 1
    )
}

fn bind<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: Value,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        Value::Int(v) => query.bind(v),
        Value::Text(v) => query.bind(v),
        Value::Timestamp(v) => query.bind(v),
        Value::Json(v) => query.bind(v),
    }
}

#[async_trait]
impl Committer for PostgresStore {
    async fn apply(&self, plan: MutationPlan) -> Result<()> {
        if plan.is_empty() {
            return Ok(());
        }

        let started = Instant::now();
        let count = plan.len();

        let mut tx = self.pool.begin().await?;
        for mutation in plan.into_mutations() {
            if let Err(e) = Self::execute(&mut tx, mutation).await {
                tracing::warn!(error = %e, "mutation rejected, rolling back");
                // Dropping the transaction rolls it back.
                return Err(e);
            }
        }
        tx.commit().await?;

        metrics::histogram!("store_commit_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        tracing::debug!(mutations = count, "plan committed");

        Ok(())
    }
}
