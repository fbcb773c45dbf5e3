//! Ownership directory seam and approval bookkeeping.

use hexns_primitives::{NodeId, WalletId};
use std::collections::HashSet;
use std::sync::Arc;

/// Read-only view of the external ownership directory.
///
/// The engine never mutates ownership; it only asks who holds a node and
/// whether an operator blanket approval exists on the directory side.
pub trait OwnershipDirectory: Send + Sync {
    /// Owner of record for `node`, `None` when unregistered.
    fn owner_of(&self, node: NodeId) -> Option<WalletId>;

    /// Whether `operator` may act for every node `owner` holds.
    fn is_approved_for_all(&self, owner: WalletId, operator: WalletId) -> bool;
}

/// Wrapping indirection over the ownership directory.
///
/// When the directory reports `identity` as a node's owner, the node is
/// held by the wrapping layer and the acting owner is whoever `handle`
/// reports for it. A `None` from the handle means the wrapped entry has
/// no reachable owner and every owner-derived permission is denied.
#[derive(Clone)]
pub struct Wrapper {
    /// The wrapping layer's own identity within the directory.
    pub identity: WalletId,
    /// Lookup handle into the wrapping layer's ownership records.
    pub handle: Arc<dyn OwnershipDirectory>,
}

/// Operator and delegate grants, both keyed by the granting principal.
///
/// Only the approval entry points mutate these sets and only the
/// authorization predicate reads them.
#[derive(Debug, Default)]
pub(crate) struct Approvals {
    operators: HashSet<(WalletId, WalletId)>,
    delegates: HashSet<(WalletId, NodeId, WalletId)>,
}

impl Approvals {
    pub(crate) fn set_operator(&mut self, owner: WalletId, operator: WalletId, approved: bool) {
        if approved {
            self.operators.insert((owner, operator));
        } else {
            self.operators.remove(&(owner, operator));
        }
    }

    pub(crate) fn is_operator(&self, owner: WalletId, operator: WalletId) -> bool {
        self.operators.contains(&(owner, operator))
    }

    pub(crate) fn set_delegate(
        &mut self,
        owner: WalletId,
        node: NodeId,
        delegate: WalletId,
        approved: bool,
    ) {
        if approved {
            self.delegates.insert((owner, node, delegate));
        } else {
            self.delegates.remove(&(owner, node, delegate));
        }
    }

    pub(crate) fn is_delegate(&self, owner: WalletId, node: NodeId, delegate: WalletId) -> bool {
        self.delegates.contains(&(owner, node, delegate))
    }
}
