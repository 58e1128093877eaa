use tracing::{debug, warn};

use crate::model::{TaskTree, TreeInvariantError};
use crate::sync::store::{StoreError, TreeStore};

/// Error type for the sync boundary
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("saving tree failed, local changes reverted: {0}")]
    SaveFailed(#[from] StoreError),
    #[error("remote tree rejected: {0}")]
    InvalidRemoteTree(#[from] TreeInvariantError),
}

/// Owns the authoritative local copy of one owner's tree and the boundary
/// to the persistence collaborator.
///
/// Commits are optimistic: the mutation lands locally first, then the
/// resulting tree is handed to the store. On save failure the pre-mutation
/// snapshot is restored exactly — correct because mutations are serialized
/// per tree on the single-threaded event loop, so no later mutation can
/// have landed in between.
pub struct SyncAdapter<S> {
    store: S,
    owner_id: String,
    tree: TaskTree,
}

impl<S: TreeStore> SyncAdapter<S> {
    /// Load the owner's tree from the store.
    pub fn load(store: S, owner_id: impl Into<String>) -> Result<Self, StoreError> {
        let owner_id = owner_id.into();
        let tree = store.load_tree(&owner_id)?;
        Ok(SyncAdapter {
            store,
            owner_id,
            tree,
        })
    }

    /// Start from an already-materialized tree (e.g. a fresh owner).
    pub fn with_tree(store: S, owner_id: impl Into<String>, tree: TaskTree) -> Self {
        SyncAdapter {
            store,
            owner_id: owner_id.into(),
            tree,
        }
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// The current authoritative copy.
    pub fn tree(&self) -> &TaskTree {
        &self.tree
    }

    /// Apply a mutation optimistically and forward the result to the
    /// store. A mutation that leaves the tree unchanged skips the save. On
    /// save failure the prior tree is restored and the error surfaced for
    /// the UI; the mutation is not retried.
    pub fn commit<F>(&mut self, mutate: F) -> Result<(), SyncError>
    where
        F: FnOnce(&TaskTree) -> TaskTree,
    {
        let snapshot = self.tree.clone();
        self.tree = mutate(&self.tree);
        if self.tree == snapshot {
            debug!(owner = %self.owner_id, "mutation was a no-op, skipping save");
            return Ok(());
        }
        match self.store.save_tree(&self.owner_id, &self.tree) {
            Ok(()) => {
                debug!(owner = %self.owner_id, tasks = self.tree.node_count(), "tree saved");
                Ok(())
            }
            Err(e) => {
                warn!(owner = %self.owner_id, error = %e, "save failed, reverting optimistic update");
                self.tree = snapshot;
                Err(SyncError::SaveFailed(e))
            }
        }
    }

    /// Target for the store's change subscription. Validates the tree-wide
    /// id invariant before accepting; an echo of already-applied state is
    /// idempotent.
    pub fn ingest_remote(&mut self, tree: TaskTree) -> Result<(), SyncError> {
        tree.validate()?;
        if tree == self.tree {
            debug!(owner = %self.owner_id, "remote echo matches local tree");
            return Ok(());
        }
        debug!(owner = %self.owner_id, tasks = tree.node_count(), "remote tree replaces local copy");
        self.tree = tree;
        Ok(())
    }
}
