//! Verified-callback decoding.
//!
//! The last step of a remote read: turning a proof-carrying response back
//! into a typed record answer. Decoding is total and idempotent. A
//! non-zero status is a remote miss, not an error; the caller observes
//! the output shape's zero value exactly as if the record were locally
//! unset. Malformed payloads degrade the same way.

use crate::query::{OutputKind, QueryPlan};
use crate::transport::{PROOF_OK, ProofResponse};
use hexns_primitives::WalletId;
use hexns_primitives::call::RecordAnswer;

/// Zero value of an output shape.
pub fn zero_answer(output: OutputKind) -> RecordAnswer {
    match output {
        OutputKind::DefaultAddress => RecordAnswer::Address(WalletId::zero()),
        OutputKind::AddressBytes | OutputKind::ContentHash => RecordAnswer::Bytes(Vec::new()),
        OutputKind::Text => RecordAnswer::Text(String::new()),
    }
}

/// Decodes the response to `plan` into a typed answer.
pub fn handle_response(plan: &QueryPlan, response: &ProofResponse) -> RecordAnswer {
    if response.status != PROOF_OK {
        tracing::debug!(status = response.status, "Remote record miss");
        return zero_answer(plan.output);
    }
    let Some(index) = plan.reads.len().checked_sub(1) else {
        return zero_answer(plan.output);
    };
    let Some(value) = response.values.get(index) else {
        return zero_answer(plan.output);
    };
    match plan.output {
        OutputKind::DefaultAddress => {
            if value.len() == 20 {
                RecordAnswer::Address(WalletId::from_slice(value))
            } else {
                zero_answer(plan.output)
            }
        }
        OutputKind::AddressBytes | OutputKind::ContentHash => RecordAnswer::Bytes(value.clone()),
        OutputKind::Text => match String::from_utf8(value.clone()) {
            Ok(text) => RecordAnswer::Text(text),
            Err(_) => zero_answer(plan.output),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexns_primitives::NodeId;
    use hexns_primitives::call::RecordCall;

    fn plan(call: &RecordCall) -> QueryPlan {
        QueryPlan::for_call(WalletId::repeat_byte(0x10), call)
    }

    #[test]
    fn nonzero_status_decodes_to_the_zero_value() {
        let node = NodeId::repeat_byte(1);
        let addr_plan = plan(&RecordCall::Addr { node });
        let text_plan = plan(&RecordCall::Text { node, key: "url".into() });

        // Even with garbage values attached, a miss is a miss.
        let response = ProofResponse {
            values: vec![vec![0xff; 32], vec![0xff; 64]],
            status: 7,
        };
        assert_eq!(
            handle_response(&addr_plan, &response),
            RecordAnswer::Address(WalletId::zero()),
        );
        assert_eq!(
            handle_response(&text_plan, &response),
            RecordAnswer::Text(String::new()),
        );
    }

    #[test]
    fn short_responses_decode_to_the_zero_value() {
        let node = NodeId::repeat_byte(1);
        let hash_plan = plan(&RecordCall::Contenthash { node });
        let response = ProofResponse::proven(vec![vec![0u8; 32]]);
        assert_eq!(
            handle_response(&hash_plan, &response),
            RecordAnswer::Bytes(Vec::new()),
        );
    }

    #[test]
    fn proven_values_decode_by_output_shape() {
        let node = NodeId::repeat_byte(2);
        let wallet = WalletId::repeat_byte(0xaa);

        let addr_plan = plan(&RecordCall::Addr { node });
        let response = ProofResponse::proven(vec![
            vec![0u8; 32],
            wallet.as_bytes().to_vec(),
        ]);
        assert_eq!(
            handle_response(&addr_plan, &response),
            RecordAnswer::Address(wallet),
        );

        let text_plan = plan(&RecordCall::Text { node, key: "url".into() });
        let response = ProofResponse::proven(vec![vec![0u8; 32], b"https://example.com".to_vec()]);
        assert_eq!(
            handle_response(&text_plan, &response),
            RecordAnswer::Text("https://example.com".into()),
        );
    }

    #[test]
    fn malformed_payloads_degrade_to_the_zero_value() {
        let node = NodeId::repeat_byte(3);

        // A 19-byte default address.
        let addr_plan = plan(&RecordCall::Addr { node });
        let response = ProofResponse::proven(vec![vec![0u8; 32], vec![1u8; 19]]);
        assert_eq!(
            handle_response(&addr_plan, &response),
            RecordAnswer::Address(WalletId::zero()),
        );

        // Text that is not UTF-8.
        let text_plan = plan(&RecordCall::Text { node, key: "url".into() });
        let response = ProofResponse::proven(vec![vec![0u8; 32], vec![0xff, 0xfe]]);
        assert_eq!(
            handle_response(&text_plan, &response),
            RecordAnswer::Text(String::new()),
        );
    }

    #[test]
    fn handling_is_idempotent() {
        let node = NodeId::repeat_byte(4);
        let text_plan = plan(&RecordCall::Text { node, key: "url".into() });
        let response = ProofResponse::proven(vec![vec![0u8; 32], b"once".to_vec()]);

        let first = handle_response(&text_plan, &response);
        let second = handle_response(&text_plan, &response);
        assert_eq!(first, second);
        assert_eq!(first, RecordAnswer::Text("once".into()));
    }
}
