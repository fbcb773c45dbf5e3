//! # hexns Remote Reader
//!
//! The proof-carrying read engine: answers record calls against a record
//! store that lives in another word-addressed domain, without trusting
//! the party that fetched the data.
//!
//! A read runs in three steps. [`query::QueryPlan::for_call`] derives the
//! storage slots that hold the answer, using the same canonical layout
//! the remote store writes through. A [`transport::QueryTransport`]
//! implementation ships the plan to an external verifier and returns the
//! proven slot contents. [`callback::handle_response`] finally decodes
//! the response into a typed answer, mapping verification misses to zero
//! values so absent remote records read exactly like absent local ones.
//!
//! [`RemoteReader`] wires the three steps behind the same accessor
//! surface the local engine exposes.

pub mod callback;
pub mod layout;
pub mod query;
pub mod transport;

pub use callback::{handle_response, zero_answer};
pub use query::{OutputKind, QueryPlan, ReadKind, SlotKey, StorageRead};
pub use transport::{PROOF_OK, ProofResponse, QueryTransport, TransportError};

use hexns_primitives::call::{RecordAnswer, RecordCall};
use hexns_primitives::{NodeId, U256, WalletId};
use std::sync::Arc;

/// Remote reader error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Remote reader configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Identity of the remote record store to read.
    pub target: WalletId,
}

/// Plan building, transport and decoding behind one accessor surface.
pub struct RemoteReader {
    config: Config,
    transport: Arc<dyn QueryTransport>,
}

impl RemoteReader {
    pub fn new(config: Config, transport: Arc<dyn QueryTransport>) -> Self {
        Self { config, transport }
    }

    /// The plan a call would execute, without executing it.
    pub fn plan(&self, call: &RecordCall) -> QueryPlan {
        QueryPlan::for_call(self.config.target, call)
    }

    /// Default address record of `node` on the remote store.
    pub async fn addr(&self, node: NodeId) -> Result<WalletId, Error> {
        Ok(self.read(RecordCall::Addr { node }).await?.into_address())
    }

    /// Address record of `node` for `coin_type` on the remote store.
    pub async fn addr_coin(&self, node: NodeId, coin_type: U256) -> Result<Vec<u8>, Error> {
        Ok(self.read(RecordCall::AddrCoin { node, coin_type }).await?.into_bytes())
    }

    /// Text record of `node` under `key` on the remote store.
    pub async fn text(&self, node: NodeId, key: &str) -> Result<String, Error> {
        let call = RecordCall::Text { node, key: key.to_owned() };
        Ok(self.read(call).await?.into_text())
    }

    /// Content hash of `node` on the remote store.
    pub async fn contenthash(&self, node: NodeId) -> Result<Vec<u8>, Error> {
        Ok(self.read(RecordCall::Contenthash { node }).await?.into_bytes())
    }

    async fn read(&self, call: RecordCall) -> Result<RecordAnswer, Error> {
        let plan = self.plan(&call);
        tracing::trace!(store = %self.config.target, reads = plan.reads.len(), "Fetching remote records");
        let response = self.transport.fetch(&plan).await?;
        Ok(handle_response(&plan, &response))
    }
}
