//! Query transport seam.

use crate::query::QueryPlan;
use serde::{Deserialize, Serialize};

/// Proof status meaning the values were proven against remote state.
pub const PROOF_OK: u64 = 0;

/// A proof-carrying response to a query plan.
///
/// One byte string per plan read, in plan order, plus the verifier's
/// status code. The transport fills this in, the callback handler decodes
/// it; nothing in between interprets the values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofResponse {
    /// One value per requested read.
    pub values: Vec<Vec<u8>>,
    /// Verifier status; anything but [`PROOF_OK`] is a miss.
    pub status: u64,
}

impl ProofResponse {
    /// A response whose values were proven.
    pub fn proven(values: Vec<Vec<u8>>) -> Self {
        Self { values, status: PROOF_OK }
    }

    /// A response reporting an unprovable or missing read.
    pub fn missing(status: u64) -> Self {
        Self { values: Vec::new(), status }
    }
}

/// Transport failure while fetching a proof.
///
/// Distinct from a miss: a miss decodes to the zero value, a transport
/// failure propagates to the caller.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The verifier endpoint could not be reached.
    #[error("query transport unavailable: {0}")]
    Unavailable(String),
    /// The verifier refused the plan outright.
    #[error("verifier rejected the query plan: {0}")]
    Rejected(String),
}

/// Asynchronous path to the external verifier.
///
/// Implementations own endpoint selection, retries and timeouts. The
/// engine only requires that a plan may be fetched any number of times
/// and that `values` is complete whenever the status is [`PROOF_OK`].
#[async_trait::async_trait]
pub trait QueryTransport: Send + Sync {
    /// Executes `plan` and returns the proof-carrying response.
    async fn fetch(&self, plan: &QueryPlan) -> Result<ProofResponse, TransportError>;
}
