//! Storage mutations and the plan that batches them.

use crate::{Columns, Table, Value};

/// A single unapplied write.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Inserts a new row. `columns` must contain the table's key column.
    Insert { table: Table, columns: Columns },

    /// Overwrites the given columns of the row identified by `key`.
    Update {
        table: Table,
        key: String,
        columns: Columns,
    },
}

impl Mutation {
    pub fn insert(table: Table, columns: Columns) -> Self {
        Mutation::Insert { table, columns }
    }

    pub fn update(table: Table, key: impl Into<String>, columns: Columns) -> Self {
        Mutation::Update {
            table,
            key: key.into(),
            columns,
        }
    }

    /// Returns the table this mutation writes to.
    pub fn table(&self) -> Table {
        match self {
            Mutation::Insert { table, .. } | Mutation::Update { table, .. } => *table,
        }
    }

    /// Returns the columns written by this mutation.
    pub fn columns(&self) -> &Columns {
        match self {
            Mutation::Insert { columns, .. } | Mutation::Update { columns, .. } => columns,
        }
    }

    /// Returns the primary key of the targeted row, if it can be determined.
    pub fn key(&self) -> Option<&str> {
        match self {
            Mutation::Insert { table, columns } => columns.get(table.key).and_then(Value::as_str),
            Mutation::Update { key, .. } => Some(key),
        }
    }
}

/// An ordered batch of mutations, applied as one atomic unit by a
/// [`Committer`](crate::Committer).
///
/// Plans are built fresh per request and consumed when applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationPlan {
    mutations: Vec<Mutation>,
}

impl MutationPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a mutation. `None` is ignored, so builders that may have
    /// nothing to write can be added without branching.
    pub fn add(&mut self, mutation: impl Into<Option<Mutation>>) -> &mut Self {
        if let Some(mutation) = mutation.into() {
            self.mutations.push(mutation);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    /// Returns the mutations in submission order.
    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    pub fn into_mutations(self) -> Vec<Mutation> {
        self.mutations
    }
}

impl FromIterator<Mutation> for MutationPlan {
    fn from_iter<I: IntoIterator<Item = Mutation>>(iter: I) -> Self {
        Self {
            mutations: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ITEMS: Table = Table::new("items", "id");

    fn insert(id: &str) -> Mutation {
        let mut columns = Columns::new();
        columns.insert("id", Value::text(id));
        Mutation::insert(ITEMS, columns)
    }

    #[test]
    fn add_ignores_none() {
        let mut plan = MutationPlan::new();
        plan.add(None);
        assert!(plan.is_empty());

        plan.add(insert("a")).add(None).add(Some(insert("b")));
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn mutations_keep_insertion_order() {
        let mut plan = MutationPlan::new();
        plan.add(insert("a"));
        plan.add(Mutation::update(ITEMS, "a", Columns::new()));
        plan.add(insert("b"));

        let keys: Vec<_> = plan.mutations().iter().filter_map(Mutation::key).collect();
        assert_eq!(keys, vec!["a", "a", "b"]);
    }

    #[test]
    fn insert_key_comes_from_key_column() {
        let m = insert("k1");
        assert_eq!(m.key(), Some("k1"));
        assert_eq!(m.table(), ITEMS);

        let keyless = Mutation::insert(ITEMS, Columns::new());
        assert_eq!(keyless.key(), None);
    }
}
