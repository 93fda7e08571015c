//! Oracle and naming registry records.
//!
//! These are the values stored in the oracle and naming subtrees. Each
//! carries a canonical RLP form; like accounts, they never go through serde
//! on a consensus path.

use mc_01_codec::{CodecError, RlpItem};
use serde::{Deserialize, Serialize};
use shared_types::{ChainError, Height, PublicKey};

/// Payload format an oracle declares for its queries and responses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OracleFormat {
    /// Any bytes.
    Raw,
    /// Valid UTF-8.
    Utf8,
    /// A well-formed JSON document.
    Json,
}

impl OracleFormat {
    /// Wire byte.
    pub fn as_u8(self) -> u8 {
        match self {
            OracleFormat::Raw => 0,
            OracleFormat::Utf8 => 1,
            OracleFormat::Json => 2,
        }
    }

    /// Decode the wire byte.
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(OracleFormat::Raw),
            1 => Some(OracleFormat::Utf8),
            2 => Some(OracleFormat::Json),
            _ => None,
        }
    }

    /// Check `data` against this format.
    pub fn conforms(&self, data: &[u8]) -> Result<(), ChainError> {
        match self {
            OracleFormat::Raw => Ok(()),
            OracleFormat::Utf8 => std::str::from_utf8(data)
                .map(|_| ())
                .map_err(|_| ChainError::SchemaMismatch("payload is not valid UTF-8".into())),
            OracleFormat::Json => serde_json::from_slice::<serde_json::Value>(data)
                .map(|_| ())
                .map_err(|err| ChainError::SchemaMismatch(format!("payload is not JSON: {err}"))),
        }
    }
}

/// A registered oracle, keyed by its owner's public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisteredOracle {
    /// Account that registered and answers this oracle.
    pub owner: PublicKey,
    /// Format every query must conform to.
    pub query_format: OracleFormat,
    /// Format every response must conform to.
    pub response_format: OracleFormat,
    /// Fee a querier escrows per query.
    pub query_fee: u64,
    /// Height after which the registration is swept.
    pub expires_at: Height,
}

impl RegisteredOracle {
    /// Canonical wire form.
    pub fn to_rlp(&self) -> Vec<u8> {
        RlpItem::List(vec![
            RlpItem::bytes(&self.owner),
            RlpItem::uint(self.query_format.as_u8() as u64),
            RlpItem::uint(self.response_format.as_u8() as u64),
            RlpItem::uint(self.query_fee),
            RlpItem::uint(self.expires_at),
        ])
        .encode()
    }

    /// Decode the canonical wire form.
    pub fn from_rlp(bytes: &[u8]) -> Result<Self, CodecError> {
        let item = RlpItem::decode(bytes)?;
        let fields = expect_len(item.as_list()?, 5)?;
        Ok(Self {
            owner: fields[0].as_fixed::<32>()?,
            query_format: decode_format(&fields[1])?,
            response_format: decode_format(&fields[2])?,
            query_fee: fields[3].as_uint()?,
            expires_at: fields[4].as_uint()?,
        })
    }
}

/// The query half of an interaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OracleQueryRecord {
    /// Account that posted the query.
    pub querier: PublicKey,
    /// Oracle the query is addressed to.
    pub oracle: PublicKey,
    /// Query payload, conforming to the oracle's query format.
    pub query_data: Vec<u8>,
    /// Fee escrowed for the responding oracle.
    pub query_fee: u64,
}

/// A query paired with its optional response, keyed by the derived query id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interaction {
    /// The originating query.
    pub query: OracleQueryRecord,
    /// Response payload, set at most once.
    pub response: Option<Vec<u8>>,
    /// Height after which an unanswered query can no longer be answered.
    pub query_expires_at: Height,
    /// Height after which the whole interaction is swept.
    pub response_expires_at: Height,
}

impl Interaction {
    /// Canonical wire form. The response slot uses an explicit presence
    /// integer so "no response yet" and "empty response" stay distinct.
    pub fn to_rlp(&self) -> Vec<u8> {
        let response = match &self.response {
            Some(data) => RlpItem::List(vec![RlpItem::uint(1), RlpItem::bytes(data)]),
            None => RlpItem::List(vec![RlpItem::uint(0)]),
        };
        RlpItem::List(vec![
            RlpItem::bytes(&self.query.querier),
            RlpItem::bytes(&self.query.oracle),
            RlpItem::bytes(&self.query.query_data),
            RlpItem::uint(self.query.query_fee),
            response,
            RlpItem::uint(self.query_expires_at),
            RlpItem::uint(self.response_expires_at),
        ])
        .encode()
    }

    /// Decode the canonical wire form.
    pub fn from_rlp(bytes: &[u8]) -> Result<Self, CodecError> {
        let item = RlpItem::decode(bytes)?;
        let fields = expect_len(item.as_list()?, 7)?;
        let response_fields = fields[4].as_list()?;
        let response = match response_fields.first().map(|f| f.as_uint()) {
            Some(Ok(0)) => None,
            Some(Ok(1)) => Some(
                response_fields
                    .get(1)
                    .ok_or(CodecError::BadFieldCount {
                        expected: 2,
                        actual: response_fields.len(),
                    })?
                    .as_bytes()?
                    .to_vec(),
            ),
            _ => {
                return Err(CodecError::UnexpectedShape {
                    expected: "response slot",
                })
            }
        };
        Ok(Self {
            query: OracleQueryRecord {
                querier: fields[0].as_fixed::<32>()?,
                oracle: fields[1].as_fixed::<32>()?,
                query_data: fields[2].as_bytes()?.to_vec(),
                query_fee: fields[3].as_uint()?,
            },
            response,
            query_expires_at: fields[5].as_uint()?,
            response_expires_at: fields[6].as_uint()?,
        })
    }
}

/// A pre-claim commitment awaiting its reveal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameCommitment {
    /// Account that posted the commitment.
    pub owner: PublicKey,
    /// Height the commitment was posted at.
    pub created_at: Height,
}

impl NameCommitment {
    /// Canonical wire form.
    pub fn to_rlp(&self) -> Vec<u8> {
        RlpItem::List(vec![
            RlpItem::bytes(&self.owner),
            RlpItem::uint(self.created_at),
        ])
        .encode()
    }

    /// Decode the canonical wire form.
    pub fn from_rlp(bytes: &[u8]) -> Result<Self, CodecError> {
        let item = RlpItem::decode(bytes)?;
        let fields = expect_len(item.as_list()?, 2)?;
        Ok(Self {
            owner: fields[0].as_fixed::<32>()?,
            created_at: fields[1].as_uint()?,
        })
    }
}

/// A claimed name, keyed by its name hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameClaimRecord {
    /// The normalized name.
    pub name: String,
    /// Claiming account.
    pub owner: PublicKey,
    /// Height the claim landed at.
    pub claimed_at: Height,
}

impl NameClaimRecord {
    /// Canonical wire form.
    pub fn to_rlp(&self) -> Vec<u8> {
        RlpItem::List(vec![
            RlpItem::bytes(self.name.as_bytes()),
            RlpItem::bytes(&self.owner),
            RlpItem::uint(self.claimed_at),
        ])
        .encode()
    }

    /// Decode the canonical wire form.
    pub fn from_rlp(bytes: &[u8]) -> Result<Self, CodecError> {
        let item = RlpItem::decode(bytes)?;
        let fields = expect_len(item.as_list()?, 3)?;
        let name = String::from_utf8(fields[0].as_bytes()?.to_vec()).map_err(|_| {
            CodecError::UnexpectedShape {
                expected: "utf-8 name",
            }
        })?;
        Ok(Self {
            name,
            owner: fields[1].as_fixed::<32>()?,
            claimed_at: fields[2].as_uint()?,
        })
    }
}

fn expect_len(fields: &[RlpItem], expected: usize) -> Result<&[RlpItem], CodecError> {
    if fields.len() != expected {
        return Err(CodecError::BadFieldCount {
            expected,
            actual: fields.len(),
        });
    }
    Ok(fields)
}

fn decode_format(item: &RlpItem) -> Result<OracleFormat, CodecError> {
    let raw = item.as_uint()?;
    u8::try_from(raw)
        .ok()
        .and_then(OracleFormat::from_u8)
        .ok_or(CodecError::UnexpectedShape { expected: "format" })
}
