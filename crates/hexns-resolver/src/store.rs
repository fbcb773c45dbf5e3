//! Versioned record tables.

use hexns_primitives::call::{RecordAnswer, RecordCall};
use hexns_primitives::{DEFAULT_COIN_TYPE, NodeId, U256, WalletId};
use std::collections::HashMap;

/// The record tables of one namespace, all keyed by record version.
///
/// Every row carries the node's version at the time it was written, so
/// [`RecordStore::clear_records`] wipes a node by bumping one counter
/// instead of enumerating rows. Stale rows become unreachable rather than
/// deleted, and a later write at the new version starts from a clean
/// slate.
#[derive(Debug, Default)]
pub struct RecordStore {
    versions: HashMap<NodeId, u64>,
    addresses: HashMap<(u64, NodeId, U256), Vec<u8>>,
    texts: HashMap<(u64, NodeId, String), String>,
    content_hashes: HashMap<(u64, NodeId), Vec<u8>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current record version of `node`. Fresh nodes start at zero.
    pub fn version(&self, node: NodeId) -> u64 {
        self.versions.get(&node).copied().unwrap_or(0)
    }

    /// Invalidates every record of `node` by bumping its version.
    pub fn clear_records(&mut self, node: NodeId) {
        let version = self.versions.entry(node).or_insert(0);
        *version += 1;
        tracing::debug!(%node, version = *version, "Cleared records");
    }

    /// Default address record of `node`.
    ///
    /// Zero when unset, and zero when the stored value is not exactly 20
    /// bytes; a malformed row never escapes as a truncated address.
    pub fn addr(&self, node: NodeId) -> WalletId {
        let raw = self.addr_coin(node, U256::from(DEFAULT_COIN_TYPE));
        if raw.len() == 20 {
            WalletId::from_slice(&raw)
        } else {
            WalletId::zero()
        }
    }

    /// Sets the default address record of `node`.
    pub fn set_addr(&mut self, node: NodeId, wallet: WalletId) {
        self.set_addr_coin(node, U256::from(DEFAULT_COIN_TYPE), wallet.as_bytes().to_vec());
    }

    /// Address record of `node` for `coin_type`, empty when unset.
    pub fn addr_coin(&self, node: NodeId, coin_type: U256) -> Vec<u8> {
        self.addresses
            .get(&(self.version(node), node, coin_type))
            .cloned()
            .unwrap_or_default()
    }

    /// Sets the address record of `node` for `coin_type`.
    pub fn set_addr_coin(&mut self, node: NodeId, coin_type: U256, address: Vec<u8>) {
        let version = self.version(node);
        self.addresses.insert((version, node, coin_type), address);
    }

    /// Text record of `node` under `key`, empty when unset.
    pub fn text(&self, node: NodeId, key: &str) -> String {
        self.texts
            .get(&(self.version(node), node, key.to_owned()))
            .cloned()
            .unwrap_or_default()
    }

    /// Sets the text record of `node` under `key`.
    pub fn set_text(&mut self, node: NodeId, key: String, value: String) {
        let version = self.version(node);
        self.texts.insert((version, node, key), value);
    }

    /// Content hash of `node`, empty when unset.
    pub fn contenthash(&self, node: NodeId) -> Vec<u8> {
        self.content_hashes
            .get(&(self.version(node), node))
            .cloned()
            .unwrap_or_default()
    }

    /// Sets the content hash of `node`.
    pub fn set_contenthash(&mut self, node: NodeId, hash: Vec<u8>) {
        let version = self.version(node);
        self.content_hashes.insert((version, node), hash);
    }

    /// Answers a decoded accessor call from these tables.
    pub fn answer(&self, call: &RecordCall) -> RecordAnswer {
        match call {
            RecordCall::Addr { node } => RecordAnswer::Address(self.addr(*node)),
            RecordCall::AddrCoin { node, coin_type } => {
                RecordAnswer::Bytes(self.addr_coin(*node, *coin_type))
            }
            RecordCall::Text { node, key } => RecordAnswer::Text(self.text(*node, key)),
            RecordCall::Contenthash { node } => RecordAnswer::Bytes(self.contenthash(*node)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(byte: u8) -> NodeId {
        NodeId::repeat_byte(byte)
    }

    #[test]
    fn unset_records_read_as_zero_values() {
        let store = RecordStore::new();
        assert_eq!(store.addr(node(1)), WalletId::zero());
        assert_eq!(store.addr_coin(node(1), U256::from(0u64)), Vec::<u8>::new());
        assert_eq!(store.text(node(1), "url"), "");
        assert_eq!(store.contenthash(node(1)), Vec::<u8>::new());
        assert_eq!(store.version(node(1)), 0);
    }

    #[test]
    fn default_addr_is_the_60_coin_record() {
        let mut store = RecordStore::new();
        let wallet = WalletId::repeat_byte(0xaa);
        store.set_addr(node(1), wallet);

        assert_eq!(store.addr(node(1)), wallet);
        assert_eq!(
            store.addr_coin(node(1), U256::from(DEFAULT_COIN_TYPE)),
            wallet.as_bytes().to_vec(),
        );
    }

    #[test]
    fn malformed_address_rows_read_as_zero() {
        let mut store = RecordStore::new();
        store.set_addr_coin(node(1), U256::from(DEFAULT_COIN_TYPE), vec![1, 2, 3]);

        assert_eq!(store.addr(node(1)), WalletId::zero());
        // The raw accessor still exposes the stored bytes.
        assert_eq!(
            store.addr_coin(node(1), U256::from(DEFAULT_COIN_TYPE)),
            vec![1, 2, 3],
        );
    }

    #[test]
    fn clear_records_invalidates_every_facet_at_once() {
        let mut store = RecordStore::new();
        store.set_addr(node(1), WalletId::repeat_byte(1));
        store.set_text(node(1), "url".into(), "https://example.com".into());
        store.set_contenthash(node(1), vec![0xe3]);

        store.clear_records(node(1));

        assert_eq!(store.version(node(1)), 1);
        assert_eq!(store.addr(node(1)), WalletId::zero());
        assert_eq!(store.text(node(1), "url"), "");
        assert_eq!(store.contenthash(node(1)), Vec::<u8>::new());

        // Writes after the bump land in the new version.
        store.set_text(node(1), "url".into(), "https://new.example".into());
        assert_eq!(store.text(node(1), "url"), "https://new.example");
    }

    #[test]
    fn clearing_one_node_leaves_others_alone() {
        let mut store = RecordStore::new();
        store.set_text(node(1), "k".into(), "one".into());
        store.set_text(node(2), "k".into(), "two".into());

        store.clear_records(node(1));

        assert_eq!(store.text(node(1), "k"), "");
        assert_eq!(store.text(node(2), "k"), "two");
    }

    #[test]
    fn answer_dispatches_over_every_call_shape() {
        let mut store = RecordStore::new();
        let wallet = WalletId::repeat_byte(0x42);
        store.set_addr(node(1), wallet);
        store.set_addr_coin(node(1), U256::from(0u64), vec![9, 9]);
        store.set_text(node(1), "avatar".into(), "ipfs://img".into());
        store.set_contenthash(node(1), vec![0xe3, 0x01]);

        assert_eq!(
            store.answer(&RecordCall::Addr { node: node(1) }),
            RecordAnswer::Address(wallet),
        );
        assert_eq!(
            store.answer(&RecordCall::AddrCoin { node: node(1), coin_type: U256::from(0u64) }),
            RecordAnswer::Bytes(vec![9, 9]),
        );
        assert_eq!(
            store.answer(&RecordCall::Text { node: node(1), key: "avatar".into() }),
            RecordAnswer::Text("ipfs://img".into()),
        );
        assert_eq!(
            store.answer(&RecordCall::Contenthash { node: node(1) }),
            RecordAnswer::Bytes(vec![0xe3, 0x01]),
        );
    }
}
