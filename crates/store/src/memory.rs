use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{Committer, Mutation, MutationPlan, Result, Row, StoreError};

#[derive(Debug, Clone, Default)]
struct TableData {
    rows: HashMap<String, Row>,
    order: Vec<String>,
}

/// In-memory committer for tests and local runs.
///
/// A plan is validated against the current tables before anything is
/// written, and the whole plan is applied under one write lock, so readers
/// never observe a partially applied plan.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<HashMap<&'static str, TableData>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent non-empty commit fail with
    /// [`StoreError::Unavailable`] until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Returns a copy of a single row.
    pub async fn row(&self, table: &str, key: &str) -> Option<Row> {
        let tables = self.tables.read().await;
        tables.get(table).and_then(|t| t.rows.get(key)).cloned()
    }

    /// Returns every row of a table in insertion order.
    pub async fn rows(&self, table: &str) -> Vec<Row> {
        let tables = self.tables.read().await;
        tables
            .get(table)
            .map(|t| {
                t.order
                    .iter()
                    .filter_map(|key| t.rows.get(key))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the number of rows stored in a table.
    pub async fn row_count(&self, table: &str) -> usize {
        let tables = self.tables.read().await;
        tables.get(table).map_or(0, |t| t.rows.len())
    }

    /// Removes every row from every table.
    pub async fn clear(&self) {
        self.tables.write().await.clear();
    }
}

/// Checks every mutation against the current tables plus the inserts staged
/// earlier in the same plan.
fn validate(tables: &HashMap<&'static str, TableData>, mutations: &[Mutation]) -> Result<()> {
    let mut staged: HashSet<(&'static str, &str)> = HashSet::new();

    for mutation in mutations {
        let table = mutation.table();
        let key = mutation.key().ok_or(StoreError::MissingKey {
            table: table.name,
            column: table.key,
        })?;
        let exists = staged.contains(&(table.name, key))
            || tables
                .get(table.name)
                .is_some_and(|t| t.rows.contains_key(key));

        match mutation {
            Mutation::Insert { .. } if exists => {
                return Err(StoreError::AlreadyExists {
                    table: table.name,
                    key: key.to_string(),
                });
            }
            Mutation::Insert { .. } => {
                staged.insert((table.name, key));
            }
            Mutation::Update { .. } if !exists => {
                return Err(StoreError::RowNotFound {
                    table: table.name,
                    key: key.to_string(),
                });
            }
            Mutation::Update { .. } => {}
        }
    }

    Ok(())
}

fn write(tables: &mut HashMap<&'static str, TableData>, mutation: Mutation) {
    let Some(key) = mutation.key().map(str::to_owned) else {
        return;
    };
    let data = tables.entry(mutation.table().name).or_default();

    match mutation {
        Mutation::Insert { columns, .. } => {
            data.order.push(key.clone());
            data.rows.insert(key, columns);
        }
        Mutation::Update { columns, .. } => {
            if let Some(row) = data.rows.get_mut(&key) {
                row.extend(columns);
            }
        }
    }
}

#[async_trait]
impl Committer for InMemoryStore {
    async fn apply(&self, plan: MutationPlan) -> Result<()> {
        if plan.is_empty() {
            return Ok(());
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "in-memory store is rejecting transactions".to_string(),
            ));
        }

        let mut tables = self.tables.write().await;
        validate(&tables, plan.mutations())?;
        for mutation in plan.into_mutations() {
            write(&mut tables, mutation);
        }

        Ok(())
    }
}
