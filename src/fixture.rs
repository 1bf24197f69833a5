//! Fixture (input) and trace document (output) wire shapes (spec §6), plus
//! the `data × gasLimit × value` instance-expansion function the spec
//! describes. The out-of-core driver owns reading a path from argv, writing
//! files and picking exit codes; this module only owns the shapes and the
//! pure expansion the driver calls into.
//!
//! Grounded on the teacher's `hex`-string scalar convention (`word::to_hex`/
//! `from_hex`), generalized from a single word to the fixture's nested
//! arrays, plus this crate's own [`TraceEntry`] for the output side.

use crate::{
    error::ErrorCode,
    message::{CallKind, Message},
    opcode::OpCode,
    trace::TraceEntry,
    word,
};
use bytes::Bytes;
use ethereum_types::{Address, U256};
use serde::{Deserialize, Serialize};

/// Top-level fixture document: the recognised key is `transaction`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Fixture {
    pub transaction: TransactionSpec,
}

/// One Ethereum state-test transaction, with `data`/`gasLimit`/`value`
/// carrying the cartesian-expandable alternatives spec.md §6 describes.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSpec {
    pub sender: String,
    /// Empty string ⇒ `CREATE`; otherwise `CALL` to this address.
    #[serde(default)]
    pub to: String,
    pub nonce: String,
    pub gas_price: String,
    pub data: Vec<String>,
    pub gas_limit: Vec<String>,
    pub value: Vec<String>,
}

/// An error parsing a hex-string scalar out of a [`Fixture`].
#[derive(Clone, Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("invalid hex in field `{field}`: {source}")]
    InvalidHex {
        field: &'static str,
        #[source]
        source: hex::FromHexError,
    },
}

impl TransactionSpec {
    fn sender_address(&self) -> Result<Address, FixtureError> {
        word::from_hex(&self.sender)
            .map(word::to_address)
            .map_err(|source| FixtureError::InvalidHex { field: "sender", source })
    }

    fn destination(&self) -> Result<Option<Address>, FixtureError> {
        if self.to.is_empty() {
            return Ok(None);
        }
        word::from_hex(&self.to)
            .map(|w| Some(word::to_address(w)))
            .map_err(|source| FixtureError::InvalidHex { field: "to", source })
    }

    fn gas_price(&self) -> Result<U256, FixtureError> {
        word::from_hex(&self.gas_price).map_err(|source| FixtureError::InvalidHex { field: "gasPrice", source })
    }

    fn data_bytes(&self, s: &str) -> Result<Bytes, FixtureError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        hex::decode(s)
            .map(Bytes::from)
            .map_err(|source| FixtureError::InvalidHex { field: "data", source })
    }

    fn gas_limit(&self, s: &str) -> Result<i64, FixtureError> {
        let w = word::from_hex(s).map_err(|source| FixtureError::InvalidHex { field: "gasLimit", source })?;
        Ok(if w > U256::from(i64::MAX) { i64::MAX } else { w.as_u64() as i64 })
    }

    fn value(&self, s: &str) -> Result<U256, FixtureError> {
        word::from_hex(s).map_err(|source| FixtureError::InvalidHex { field: "value", source })
    }
}

/// Expands a fixture into `|data| × |gasLimit| × |value|` independent
/// instances, outer-loop order `data`, then `gasLimit`, then `value` (spec
/// §6). Every instance shares `tx.origin := sender`, `depth := 0`, and is a
/// `CALL` if `to` is present or a `CREATE` otherwise.
pub fn expand_instances(fixture: &Fixture) -> Result<Vec<Message>, FixtureError> {
    let tx = &fixture.transaction;
    let sender = tx.sender_address()?;
    let destination = tx.destination()?;
    let gas_price = tx.gas_price()?;

    let mut instances = Vec::with_capacity(tx.data.len() * tx.gas_limit.len() * tx.value.len());
    for data in &tx.data {
        let input_data = tx.data_bytes(data)?;
        for gas_limit in &tx.gas_limit {
            let gas = tx.gas_limit(gas_limit)?;
            for value in &tx.value {
                let value = tx.value(value)?;
                instances.push(Message {
                    kind: match destination {
                        Some(_) => CallKind::Call,
                        None => CallKind::Create,
                    },
                    is_static: false,
                    depth: 0,
                    gas,
                    destination: destination.unwrap_or(Address::zero()),
                    sender,
                    input_data: input_data.clone(),
                    value,
                    origin: sender,
                    gas_price,
                });
            }
        }
    }
    Ok(instances)
}

/// One trace document entry (spec §6): scalars are hex strings, the stack
/// is rendered top-last, and `touch_state` flattens the touched-slot list
/// into `(address, key, value)` triples.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TraceDocumentEntry {
    pub address: String,
    pub pc: usize,
    pub opcode: String,
    pub stack: Vec<String>,
    pub memory: String,
    pub touch_state: Vec<(String, String, String)>,
    pub gas_used: String,
    pub gas_limit: String,
    pub gas_refund: String,
    pub error_code: u32,
}

impl From<TraceEntry> for TraceDocumentEntry {
    fn from(entry: TraceEntry) -> Self {
        Self {
            address: format!("0x{}", hex::encode(entry.address.as_bytes())),
            pc: entry.pc,
            opcode: opcode_name(entry.opcode),
            stack: entry.stack.into_iter().map(word::to_hex).collect(),
            memory: format!("0x{}", hex::encode(&entry.memory)),
            touch_state: entry
                .touched
                .into_iter()
                .map(|(addr, key, val)| {
                    (
                        format!("0x{}", hex::encode(addr.as_bytes())),
                        format!("0x{}", hex::encode(key.as_bytes())),
                        format!("0x{}", hex::encode(val.as_bytes())),
                    )
                })
                .collect(),
            gas_used: format!("0x{:x}", entry.gas_used),
            gas_limit: format!("0x{:x}", entry.gas_limit),
            gas_refund: format!("0x{:x}", entry.gas_refund),
            error_code: ErrorCode::to_u32(entry.error_code),
        }
    }
}

fn opcode_name(opcode: OpCode) -> String {
    format!("0x{:02x}", opcode.to_u8())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Fixture {
        Fixture {
            transaction: TransactionSpec {
                sender: "0x00000000000000000000000000000000000001".into(),
                to: "0x00000000000000000000000000000000000002".into(),
                nonce: "0x0".into(),
                gas_price: "0x1".into(),
                data: vec!["0x".into(), "0x01".into()],
                gas_limit: vec!["0x5208".into()],
                value: vec!["0x0".into(), "0x1".into()],
            },
        }
    }

    #[test]
    fn expansion_produces_the_cartesian_product_in_outer_to_inner_order() {
        let instances = expand_instances(&fixture()).unwrap();
        assert_eq!(instances.len(), 2 * 1 * 2);

        assert!(instances[0].input_data.is_empty());
        assert_eq!(instances[0].value, U256::zero());

        assert_eq!(instances[1].input_data, Bytes::from_static(&[]));
        assert_eq!(instances[1].value, U256::one());

        assert_eq!(instances[2].input_data, Bytes::from_static(&[0x01]));
        assert_eq!(instances[2].value, U256::zero());
    }

    #[test]
    fn every_instance_carries_the_sender_as_origin_and_starts_at_depth_zero() {
        for instance in expand_instances(&fixture()).unwrap() {
            assert_eq!(instance.depth, 0);
            assert_eq!(instance.origin, instance.sender);
            assert_eq!(instance.kind, CallKind::Call);
        }
    }

    #[test]
    fn empty_destination_expands_to_create() {
        let mut f = fixture();
        f.transaction.to = String::new();
        let instances = expand_instances(&f).unwrap();
        assert!(instances.iter().all(|m| m.kind == CallKind::Create));
    }

    #[test]
    fn invalid_hex_is_reported_with_the_offending_field() {
        let mut f = fixture();
        f.transaction.sender = "not hex".into();
        assert!(matches!(
            expand_instances(&f),
            Err(FixtureError::InvalidHex { field: "sender", .. })
        ));
    }

    #[test]
    fn trace_entry_converts_to_a_hex_rendered_document_entry() {
        let entry = TraceEntry {
            address: Address::zero(),
            pc: 3,
            opcode: OpCode::ADD,
            stack: vec![U256::from(42)],
            memory: vec![1, 2, 3],
            touched: vec![],
            gas_used: 21000,
            gas_limit: 100000,
            gas_refund: 0,
            error_code: ErrorCode::None,
        };
        let doc: TraceDocumentEntry = entry.into();
        assert_eq!(doc.pc, 3);
        assert_eq!(doc.gas_used, "0x5208");
        assert_eq!(doc.error_code, 0);
        assert_eq!(doc.stack, vec![word::to_hex(U256::from(42))]);
    }
}
