use std::sync::Arc;

use async_trait::async_trait;

use crate::{MutationPlan, Result};

/// Applies a [`MutationPlan`] atomically.
///
/// Implementations must either apply every mutation in the plan or none of
/// them. An empty plan is a successful no-op and never opens a transaction.
#[async_trait]
pub trait Committer: Send + Sync {
    async fn apply(&self, plan: MutationPlan) -> Result<()>;
}

#[async_trait]
impl<C: Committer + ?Sized> Committer for Arc<C> {
    async fn apply(&self, plan: MutationPlan) -> Result<()> {
        (**self).apply(plan).await
    }
}
