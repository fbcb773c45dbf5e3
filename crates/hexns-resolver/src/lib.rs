//! # hexns Resolver
//!
//! The local resolution engine: versioned record tables, the
//! authorization predicate gating every mutation, and the wildcard
//! dispatcher that answers for hex-identity labels no one ever claimed.
//!
//! ## Wildcard resolution
//!
//! A resolution request arrives as a wire-encoded name plus a
//! selector-encoded accessor call. When the first label of the name is 40
//! or 42 characters long it is treated as a wallet identity: the label is
//! decoded, the default-address accessor answers with the decoded identity
//! itself, and every other accessor is answered from the record tables
//! under the wallet's reverse node. The node argument the caller encoded
//! is ignored on this path, which is what lets `<wallet>.foo` and
//! `<wallet>.bar` share one record set without either name being
//! registered. Names whose first label has any other length fall through
//! to a plain table lookup on the encoded node.
//!
//! ## Authorization
//!
//! Mutations name the acting wallet explicitly; the host is responsible
//! for authenticating it. A caller may modify a node's records when the
//! node is the caller's own reverse node, when the caller owns the node in
//! the external directory (resolving the wrapping indirection), when the
//! owner granted the caller an operator approval here or in the
//! directory, or when the owner delegated exactly this node to the
//! caller. Unauthorized calls fail before any state is touched.

mod auth;
mod store;

pub use auth::{OwnershipDirectory, Wrapper};
pub use store::RecordStore;

use crate::auth::Approvals;
use hexns_primitives::call::{CallError, RecordAnswer, RecordCall};
use hexns_primitives::identity::{self, HEX_LABEL_LEN, IdentityError, PREFIXED_HEX_LABEL_LEN};
use hexns_primitives::name::{NameError, WireName};
use hexns_primitives::{NodeId, U256, WalletId};
use parking_lot::RwLock;
use std::sync::Arc;

/// Resolver error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A name whose first label has identity length failed to decode.
    #[error("invalid identity label: {0}")]
    InvalidIdentity(#[from] IdentityError),
    /// The acting wallet holds no permission over the node.
    #[error("{caller} is not authorized to modify records of {node}")]
    Unauthorized { caller: WalletId, node: NodeId },
    /// A principal cannot grant an approval to itself.
    #[error("a principal cannot approve itself")]
    SelfApproval,
    /// The wildcard path cannot answer this call.
    #[error("unsupported wildcard resolution: {0}")]
    UnsupportedResolution(CallError),
    /// A direct resolution carried undecodable call data.
    #[error("resolution failed: {0}")]
    ResolutionFailed(CallError),
    #[error(transparent)]
    Name(#[from] NameError),
}

/// Resolver configuration.
pub struct Config {
    /// Handle to the external ownership directory.
    pub directory: Arc<dyn OwnershipDirectory>,
    /// Optional wrapping layer the directory may report as owner.
    pub wrapper: Option<Wrapper>,
}

/// The local resolution engine.
///
/// One instance owns every record facet plus the approval sets; reads
/// take a shared lock and never write, mutations authorize first and only
/// then touch state.
pub struct Resolver {
    config: Config,
    store: RwLock<RecordStore>,
    approvals: RwLock<Approvals>,
}

impl Resolver {
    /// Creates an engine with empty tables.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            store: RwLock::new(RecordStore::new()),
            approvals: RwLock::new(Approvals::default()),
        }
    }

    /// Default address record of `node`, zero when unset.
    pub fn addr(&self, node: NodeId) -> WalletId {
        self.store.read().addr(node)
    }

    /// Address record of `node` for `coin_type`, empty when unset.
    pub fn addr_coin(&self, node: NodeId, coin_type: U256) -> Vec<u8> {
        self.store.read().addr_coin(node, coin_type)
    }

    /// Text record of `node` under `key`, empty when unset.
    pub fn text(&self, node: NodeId, key: &str) -> String {
        self.store.read().text(node, key)
    }

    /// Content hash of `node`, empty when unset.
    pub fn contenthash(&self, node: NodeId) -> Vec<u8> {
        self.store.read().contenthash(node)
    }

    /// Current record version of `node`.
    pub fn record_version(&self, node: NodeId) -> u64 {
        self.store.read().version(node)
    }

    /// Executes a selector-encoded accessor call against the tables.
    pub fn call(&self, call_data: &[u8]) -> Result<Vec<u8>, Error> {
        let call = RecordCall::decode(call_data).map_err(Error::ResolutionFailed)?;
        Ok(self.store.read().answer(&call).encode())
    }

    /// Resolves a wire-encoded name with a selector-encoded accessor call.
    ///
    /// This is the wildcard entry point; see the crate docs for the
    /// dispatch rules. Never mutates any record state.
    pub fn resolve(&self, name: &[u8], call_data: &[u8]) -> Result<Vec<u8>, Error> {
        let wire = WireName::parse(name)?;
        match wire.first_label() {
            Some(label)
                if label.len() == HEX_LABEL_LEN || label.len() == PREFIXED_HEX_LABEL_LEN =>
            {
                let wallet = identity::parse_hex_label(label)?;
                let call =
                    RecordCall::decode(call_data).map_err(Error::UnsupportedResolution)?;
                tracing::trace!(%wire, %wallet, "Dispatching wildcard resolution");
                let answer = match call {
                    RecordCall::Addr { .. } => RecordAnswer::Address(wallet),
                    other => {
                        let reverse = identity::reverse_node(wallet);
                        self.store.read().answer(&other.with_node(reverse))
                    }
                };
                Ok(answer.encode())
            }
            _ => {
                tracing::trace!(%wire, "Dispatching direct resolution");
                self.call(call_data)
            }
        }
    }

    /// Sets the default address record of `node`.
    pub fn set_addr(&self, caller: WalletId, node: NodeId, wallet: WalletId) -> Result<(), Error> {
        self.authorize(caller, node)?;
        self.store.write().set_addr(node, wallet);
        Ok(())
    }

    /// Sets the address record of `node` for `coin_type`.
    pub fn set_addr_coin(
        &self,
        caller: WalletId,
        node: NodeId,
        coin_type: U256,
        address: Vec<u8>,
    ) -> Result<(), Error> {
        self.authorize(caller, node)?;
        self.store.write().set_addr_coin(node, coin_type, address);
        Ok(())
    }

    /// Sets the text record of `node` under `key`.
    pub fn set_text(
        &self,
        caller: WalletId,
        node: NodeId,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), Error> {
        self.authorize(caller, node)?;
        self.store.write().set_text(node, key.into(), value.into());
        Ok(())
    }

    /// Sets the content hash of `node`.
    pub fn set_contenthash(
        &self,
        caller: WalletId,
        node: NodeId,
        hash: Vec<u8>,
    ) -> Result<(), Error> {
        self.authorize(caller, node)?;
        self.store.write().set_contenthash(node, hash);
        Ok(())
    }

    /// Invalidates every record of `node` in one step.
    pub fn clear_records(&self, caller: WalletId, node: NodeId) -> Result<(), Error> {
        self.authorize(caller, node)?;
        self.store.write().clear_records(node);
        Ok(())
    }

    /// Grants or revokes an operator approval over every node of `owner`.
    ///
    /// `owner` is the granting principal; the host enforces that it is the
    /// authenticated caller.
    pub fn approve_operator(
        &self,
        owner: WalletId,
        operator: WalletId,
        approved: bool,
    ) -> Result<(), Error> {
        if owner == operator {
            return Err(Error::SelfApproval);
        }
        self.approvals.write().set_operator(owner, operator, approved);
        tracing::debug!(%owner, %operator, approved, "Operator approval changed");
        Ok(())
    }

    /// Grants or revokes a delegate approval scoped to one node.
    pub fn approve_delegate(
        &self,
        owner: WalletId,
        node: NodeId,
        delegate: WalletId,
        approved: bool,
    ) -> Result<(), Error> {
        if owner == delegate {
            return Err(Error::SelfApproval);
        }
        self.approvals.write().set_delegate(owner, node, delegate, approved);
        tracing::debug!(%owner, %node, %delegate, approved, "Delegate approval changed");
        Ok(())
    }

    /// Whether an engine-local operator approval exists.
    ///
    /// Only reflects grants made through [`Resolver::approve_operator`];
    /// the predicate additionally honors directory-side approvals.
    pub fn is_approved_for_all(&self, owner: WalletId, operator: WalletId) -> bool {
        self.approvals.read().is_operator(owner, operator)
    }

    /// Whether a delegate approval exists for exactly `node`.
    pub fn is_approved_for(&self, owner: WalletId, node: NodeId, delegate: WalletId) -> bool {
        self.approvals.read().is_delegate(owner, node, delegate)
    }

    /// The authorization predicate behind every mutation.
    pub fn is_authorized(&self, caller: WalletId, node: NodeId) -> bool {
        if identity::reverse_node(caller) == node {
            return true;
        }
        let Some(owner) = self.node_owner(node) else {
            return false;
        };
        if owner == caller {
            return true;
        }
        if self.approvals.read().is_operator(owner, caller) {
            return true;
        }
        if self.config.directory.is_approved_for_all(owner, caller) {
            return true;
        }
        self.approvals.read().is_delegate(owner, node, caller)
    }

    /// Acting owner of `node`, resolving the wrapping indirection.
    fn node_owner(&self, node: NodeId) -> Option<WalletId> {
        let owner = self.config.directory.owner_of(node)?;
        match &self.config.wrapper {
            Some(wrapper) if owner == wrapper.identity => wrapper.handle.owner_of(node),
            _ => Some(owner),
        }
    }

    fn authorize(&self, caller: WalletId, node: NodeId) -> Result<(), Error> {
        if self.is_authorized(caller, node) {
            Ok(())
        } else {
            tracing::debug!(%caller, %node, "Rejected record mutation");
            Err(Error::Unauthorized { caller, node })
        }
    }
}
