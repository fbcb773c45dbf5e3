//! In-memory collaborators for hexns tests.
//!
//! Everything integration tests need to stand up both engines without an
//! external environment: an ownership directory, a word-addressed slot
//! storage populated through the canonical layout, and a gateway that
//! proves query plans against it the way the remote verifier would.

use hexns_primitives::{DEFAULT_COIN_TYPE, H256, NodeId, U256, WalletId};
use hexns_remote::layout;
use hexns_remote::query::{QueryPlan, ReadKind};
use hexns_remote::transport::{ProofResponse, QueryTransport, TransportError};
use hexns_resolver::OwnershipDirectory;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Deterministic test wallet derived from one byte.
pub fn test_wallet(tag: u8) -> WalletId {
    WalletId::repeat_byte(tag)
}

/// In-memory ownership directory.
#[derive(Default)]
pub struct MemoryDirectory {
    owners: RwLock<HashMap<NodeId, WalletId>>,
    operators: RwLock<HashSet<(WalletId, WalletId)>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `owner` as the owner of record for `node`.
    pub fn register(&self, node: NodeId, owner: WalletId) {
        self.owners.write().insert(node, owner);
    }

    /// Removes the owner entry for `node`.
    pub fn forget(&self, node: NodeId) {
        self.owners.write().remove(&node);
    }

    /// Marks `operator` approved for every node of `owner` on the
    /// directory side.
    pub fn approve(&self, owner: WalletId, operator: WalletId) {
        self.operators.write().insert((owner, operator));
    }
}

impl OwnershipDirectory for MemoryDirectory {
    fn owner_of(&self, node: NodeId) -> Option<WalletId> {
        self.owners.read().get(&node).copied()
    }

    fn is_approved_for_all(&self, owner: WalletId, operator: WalletId) -> bool {
        self.operators.read().contains(&(owner, operator))
    }
}

/// Word-addressed slot storage, as the remote environment persists it.
///
/// Untouched slots read as the zero word.
#[derive(Default)]
pub struct SlotStorage {
    words: RwLock<HashMap<H256, H256>>,
}

impl SlotStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn word(&self, slot: H256) -> H256 {
        self.words.read().get(&slot).copied().unwrap_or_default()
    }

    pub fn put(&self, slot: H256, word: H256) {
        self.words.write().insert(slot, word);
    }
}

/// A record store committed to slot storage through the canonical layout.
///
/// Mirrors the write path of the remote environment, so plans built
/// locally can be proven against real slot contents instead of fixtures
/// that happen to match.
pub struct RemoteStoreSim {
    storage: Arc<SlotStorage>,
    versions: RwLock<HashMap<NodeId, u64>>,
}

impl RemoteStoreSim {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(SlotStorage::new()),
            versions: RwLock::new(HashMap::new()),
        }
    }

    /// Handle to the underlying slot storage.
    pub fn storage(&self) -> Arc<SlotStorage> {
        self.storage.clone()
    }

    /// Persists the default address record of `node`.
    pub fn set_addr(&self, node: NodeId, wallet: WalletId) {
        self.set_addr_coin(node, U256::from(DEFAULT_COIN_TYPE), wallet.as_bytes());
    }

    /// Persists the address record of `node` for `coin_type`.
    pub fn set_addr_coin(&self, node: NodeId, coin_type: U256, address: &[u8]) {
        let version = self.version(node);
        self.write_value(layout::address_value_slot(version, node, coin_type), address);
    }

    /// Persists the text record of `node` under `key`.
    pub fn set_text(&self, node: NodeId, key: &str, value: &str) {
        let version = self.version(node);
        self.write_value(layout::text_value_slot(version, node, key), value.as_bytes());
    }

    /// Persists the content hash of `node`.
    pub fn set_contenthash(&self, node: NodeId, hash: &[u8]) {
        let version = self.version(node);
        self.write_value(layout::hash_value_slot(version, node), hash);
    }

    /// Bumps the record version of `node`, stranding its current rows.
    pub fn clear_records(&self, node: NodeId) {
        let mut versions = self.versions.write();
        let version = versions.entry(node).or_insert(0);
        *version += 1;
        self.storage.put(layout::version_slot(node), H256::from_low_u64_be(*version));
    }

    fn version(&self, node: NodeId) -> u64 {
        self.versions.read().get(&node).copied().unwrap_or(0)
    }

    fn write_value(&self, slot: H256, value: &[u8]) {
        for (slot, word) in layout::value_words(slot, value) {
            self.storage.put(slot, word);
        }
    }
}

impl Default for RemoteStoreSim {
    fn default() -> Self {
        Self::new()
    }
}

/// Gateway proving query plans against a [`SlotStorage`].
///
/// Stands in for the external verifier: resolves each read's slot,
/// following backreferences into earlier head words, assembles inline and
/// spilled values, and reports the configured status. A forced status
/// simulates an unreachable or unprovable remote.
pub struct SimulatedGateway {
    storage: Arc<SlotStorage>,
    forced_status: RwLock<Option<u64>>,
}

impl SimulatedGateway {
    pub fn new(storage: Arc<SlotStorage>) -> Self {
        Self { storage, forced_status: RwLock::new(None) }
    }

    /// Makes every later fetch report `status` instead of proving.
    pub fn force_status(&self, status: u64) {
        *self.forced_status.write() = Some(status);
    }

    /// Restores normal proving.
    pub fn clear_forced_status(&self) {
        *self.forced_status.write() = None;
    }

    fn prove(&self, plan: &QueryPlan) -> Option<Vec<Vec<u8>>> {
        let mut heads: Vec<H256> = Vec::with_capacity(plan.reads.len());
        let mut values = Vec::with_capacity(plan.reads.len());
        for read in &plan.reads {
            let slot = read.slot(&heads)?;
            let head = self.storage.word(slot);
            let value = match read.kind {
                ReadKind::Word => head.as_bytes().to_vec(),
                ReadKind::Value => layout::decode_value(head, |i| {
                    self.storage.word(layout::offset_slot(layout::spill_slot(slot), i))
                })?,
            };
            heads.push(head);
            values.push(value);
        }
        Some(values)
    }
}

#[async_trait::async_trait]
impl QueryTransport for SimulatedGateway {
    async fn fetch(&self, plan: &QueryPlan) -> Result<ProofResponse, TransportError> {
        if let Some(status) = *self.forced_status.read() {
            return Ok(ProofResponse::missing(status));
        }
        match self.prove(plan) {
            Some(values) => Ok(ProofResponse::proven(values)),
            None => Ok(ProofResponse::missing(1)),
        }
    }
}

/// Gateway whose verifier endpoint is never reachable.
///
/// Every fetch fails with [`TransportError::Unavailable`] instead of
/// returning a proof, for exercising the transport-failure path.
pub struct UnreachableGateway;

#[async_trait::async_trait]
impl QueryTransport for UnreachableGateway {
    async fn fetch(&self, _plan: &QueryPlan) -> Result<ProofResponse, TransportError> {
        Err(TransportError::Unavailable("verifier endpoint is offline".to_string()))
    }
}
