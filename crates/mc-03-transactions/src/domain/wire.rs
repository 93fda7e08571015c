//! Canonical byte forms of transaction bodies and envelopes.
//!
//! The packed form is what gets signed and hashed; the RLP form is what
//! travels and gets stored. Field order in both is fixed per kind by the
//! encoder below and is consensus-frozen.

use crate::domain::envelope::SignedTx;
use crate::domain::payload::{
    CoinbasePayload, DataTx, NameClaimPayload, NamePreClaimPayload, NameRevokePayload,
    OracleExtendPayload, OracleQueryPayload, OracleRegisterPayload, OracleResponsePayload,
    SpendPayload, TxPayload,
};
use mc_01_codec::{CodecError, PackedWriter, RlpItem, TxTag, WIRE_VERSION};
use mc_02_state_management::OracleFormat;
use shared_types::Ttl;

impl TxPayload {
    /// The wire tag for this kind.
    pub fn tag(&self) -> TxTag {
        match self {
            TxPayload::Spend(_) => TxTag::SpendTx,
            TxPayload::Coinbase(_) => TxTag::CoinbaseTx,
            TxPayload::OracleRegister(_) => TxTag::OracleRegisterTx,
            TxPayload::OracleQuery(_) => TxTag::OracleQueryTx,
            TxPayload::OracleResponse(_) => TxTag::OracleResponseTx,
            TxPayload::OracleExtend(_) => TxTag::OracleExtendTx,
            TxPayload::NamePreClaim(_) => TxTag::NamePreClaimTx,
            TxPayload::NameClaim(_) => TxTag::NameClaimTx,
            TxPayload::NameRevoke(_) => TxTag::NameRevokeTx,
        }
    }
}

impl DataTx {
    /// The packed signing form: tag, version, sender presence, fee, nonce,
    /// then the payload fields in declaration order.
    pub fn packed_bytes(&self) -> Vec<u8> {
        let mut w = PackedWriter::new(self.payload.tag().as_u8(), WIRE_VERSION);
        w.put_opt_fixed(self.sender.as_ref().map(|s| s.as_slice()));
        w.put_uint(self.fee).put_uint(self.nonce);
        match &self.payload {
            TxPayload::Spend(p) => {
                w.put_fixed(&p.receiver).put_uint(p.amount).put_u8(p.version);
            }
            TxPayload::Coinbase(p) => {
                w.put_fixed(&p.receiver).put_uint(p.amount);
            }
            TxPayload::OracleRegister(p) => {
                w.put_u8(p.query_format.as_u8())
                    .put_u8(p.response_format.as_u8())
                    .put_uint(p.query_fee)
                    .put_ttl(&p.ttl);
            }
            TxPayload::OracleQuery(p) => {
                w.put_fixed(&p.oracle)
                    .put_bytes(&p.query_data)
                    .put_uint(p.query_fee)
                    .put_ttl(&p.query_ttl)
                    .put_ttl(&p.response_ttl);
            }
            TxPayload::OracleResponse(p) => {
                w.put_fixed(&p.query_id).put_bytes(&p.response_data);
            }
            TxPayload::OracleExtend(p) => {
                w.put_ttl(&p.ttl);
            }
            TxPayload::NamePreClaim(p) => {
                w.put_fixed(&p.commitment);
            }
            TxPayload::NameClaim(p) => {
                w.put_bytes(p.name.as_bytes()).put_bytes(&p.name_salt);
            }
            TxPayload::NameRevoke(p) => {
                w.put_fixed(&p.name_hash);
            }
        }
        w.finish()
    }

    /// The RLP wire form: `[tag, version, field₁, …, fieldₙ]`.
    pub fn to_rlp(&self) -> RlpItem {
        let mut fields = vec![
            RlpItem::uint(self.payload.tag().as_u8() as u64),
            RlpItem::uint(WIRE_VERSION as u64),
        ];
        match &self.payload {
            TxPayload::Spend(p) => {
                fields.push(sender_item(self));
                fields.push(RlpItem::bytes(&p.receiver));
                fields.push(RlpItem::uint(p.amount));
                fields.push(RlpItem::uint(self.fee));
                fields.push(RlpItem::uint(self.nonce));
                fields.push(RlpItem::uint(p.version as u64));
            }
            TxPayload::Coinbase(p) => {
                fields.push(RlpItem::bytes(&p.receiver));
                fields.push(RlpItem::uint(p.amount));
                // The nonce slot carries the block height by convention.
                fields.push(RlpItem::uint(self.nonce));
            }
            TxPayload::OracleRegister(p) => {
                fields.push(sender_item(self));
                fields.push(RlpItem::uint(p.query_format.as_u8() as u64));
                fields.push(RlpItem::uint(p.response_format.as_u8() as u64));
                fields.push(RlpItem::uint(p.query_fee));
                push_ttl(&mut fields, &p.ttl);
                fields.push(RlpItem::uint(self.fee));
                fields.push(RlpItem::uint(self.nonce));
            }
            TxPayload::OracleQuery(p) => {
                fields.push(sender_item(self));
                fields.push(RlpItem::bytes(&p.oracle));
                fields.push(RlpItem::bytes(&p.query_data));
                fields.push(RlpItem::uint(p.query_fee));
                push_ttl(&mut fields, &p.query_ttl);
                push_ttl(&mut fields, &p.response_ttl);
                fields.push(RlpItem::uint(self.fee));
                fields.push(RlpItem::uint(self.nonce));
            }
            TxPayload::OracleResponse(p) => {
                fields.push(sender_item(self));
                fields.push(RlpItem::bytes(&p.query_id));
                fields.push(RlpItem::bytes(&p.response_data));
                fields.push(RlpItem::uint(self.fee));
                fields.push(RlpItem::uint(self.nonce));
            }
            TxPayload::OracleExtend(p) => {
                fields.push(sender_item(self));
                push_ttl(&mut fields, &p.ttl);
                fields.push(RlpItem::uint(self.fee));
                fields.push(RlpItem::uint(self.nonce));
            }
            TxPayload::NamePreClaim(p) => {
                fields.push(sender_item(self));
                fields.push(RlpItem::bytes(&p.commitment));
                fields.push(RlpItem::uint(self.fee));
                fields.push(RlpItem::uint(self.nonce));
            }
            TxPayload::NameClaim(p) => {
                fields.push(sender_item(self));
                fields.push(RlpItem::bytes(p.name.as_bytes()));
                fields.push(RlpItem::bytes(&p.name_salt));
                fields.push(RlpItem::uint(self.fee));
                fields.push(RlpItem::uint(self.nonce));
            }
            TxPayload::NameRevoke(p) => {
                fields.push(sender_item(self));
                fields.push(RlpItem::bytes(&p.name_hash));
                fields.push(RlpItem::uint(self.fee));
                fields.push(RlpItem::uint(self.nonce));
            }
        }
        RlpItem::List(fields)
    }

    /// RLP wire bytes.
    pub fn to_rlp_bytes(&self) -> Vec<u8> {
        self.to_rlp().encode()
    }

    /// Decode a body from its RLP item.
    pub fn from_rlp(item: &RlpItem) -> Result<Self, CodecError> {
        let fields = item.as_list()?;
        if fields.len() < 2 {
            return Err(CodecError::BadFieldCount {
                expected: 2,
                actual: fields.len(),
            });
        }
        let tag = TxTag::from_u8(narrow_u8(fields[0].as_uint()?)?)?;
        let version = fields[1].as_uint()?;
        if version != WIRE_VERSION as u64 {
            return Err(CodecError::InvalidVersion(version));
        }
        let body = &fields[2..];
        match tag {
            TxTag::SpendTx => {
                expect_len(body, 6)?;
                Ok(DataTx {
                    sender: Some(body[0].as_fixed::<32>()?),
                    payload: TxPayload::Spend(SpendPayload {
                        receiver: body[1].as_fixed::<32>()?,
                        amount: body[2].as_uint()?,
                        version: narrow_u8(body[5].as_uint()?)?,
                    }),
                    fee: body[3].as_uint()?,
                    nonce: body[4].as_uint()?,
                })
            }
            TxTag::CoinbaseTx => {
                expect_len(body, 3)?;
                Ok(DataTx {
                    sender: None,
                    payload: TxPayload::Coinbase(CoinbasePayload {
                        receiver: body[0].as_fixed::<32>()?,
                        amount: body[1].as_uint()?,
                    }),
                    fee: 0,
                    nonce: body[2].as_uint()?,
                })
            }
            TxTag::OracleRegisterTx => {
                expect_len(body, 8)?;
                Ok(DataTx {
                    sender: Some(body[0].as_fixed::<32>()?),
                    payload: TxPayload::OracleRegister(OracleRegisterPayload {
                        query_format: decode_format(&body[1])?,
                        response_format: decode_format(&body[2])?,
                        query_fee: body[3].as_uint()?,
                        ttl: decode_ttl(&body[4], &body[5])?,
                    }),
                    fee: body[6].as_uint()?,
                    nonce: body[7].as_uint()?,
                })
            }
            TxTag::OracleQueryTx => {
                expect_len(body, 10)?;
                Ok(DataTx {
                    sender: Some(body[0].as_fixed::<32>()?),
                    payload: TxPayload::OracleQuery(OracleQueryPayload {
                        oracle: body[1].as_fixed::<32>()?,
                        query_data: body[2].as_bytes()?.to_vec(),
                        query_fee: body[3].as_uint()?,
                        query_ttl: decode_ttl(&body[4], &body[5])?,
                        response_ttl: decode_ttl(&body[6], &body[7])?,
                    }),
                    fee: body[8].as_uint()?,
                    nonce: body[9].as_uint()?,
                })
            }
            TxTag::OracleResponseTx => {
                expect_len(body, 5)?;
                Ok(DataTx {
                    sender: Some(body[0].as_fixed::<32>()?),
                    payload: TxPayload::OracleResponse(OracleResponsePayload {
                        query_id: body[1].as_fixed::<32>()?,
                        response_data: body[2].as_bytes()?.to_vec(),
                    }),
                    fee: body[3].as_uint()?,
                    nonce: body[4].as_uint()?,
                })
            }
            TxTag::OracleExtendTx => {
                expect_len(body, 5)?;
                Ok(DataTx {
                    sender: Some(body[0].as_fixed::<32>()?),
                    payload: TxPayload::OracleExtend(OracleExtendPayload {
                        ttl: decode_ttl(&body[1], &body[2])?,
                    }),
                    fee: body[3].as_uint()?,
                    nonce: body[4].as_uint()?,
                })
            }
            TxTag::NamePreClaimTx => {
                expect_len(body, 4)?;
                Ok(DataTx {
                    sender: Some(body[0].as_fixed::<32>()?),
                    payload: TxPayload::NamePreClaim(NamePreClaimPayload {
                        commitment: body[1].as_fixed::<32>()?,
                    }),
                    fee: body[2].as_uint()?,
                    nonce: body[3].as_uint()?,
                })
            }
            TxTag::NameClaimTx => {
                expect_len(body, 5)?;
                let name = String::from_utf8(body[1].as_bytes()?.to_vec()).map_err(|_| {
                    CodecError::UnexpectedShape {
                        expected: "utf-8 name",
                    }
                })?;
                Ok(DataTx {
                    sender: Some(body[0].as_fixed::<32>()?),
                    payload: TxPayload::NameClaim(NameClaimPayload {
                        name,
                        name_salt: body[2].as_bytes()?.to_vec(),
                    }),
                    fee: body[3].as_uint()?,
                    nonce: body[4].as_uint()?,
                })
            }
            TxTag::NameRevokeTx => {
                expect_len(body, 4)?;
                Ok(DataTx {
                    sender: Some(body[0].as_fixed::<32>()?),
                    payload: TxPayload::NameRevoke(NameRevokePayload {
                        name_hash: body[1].as_fixed::<32>()?,
                    }),
                    fee: body[2].as_uint()?,
                    nonce: body[3].as_uint()?,
                })
            }
            TxTag::Account | TxTag::SignedTx => Err(CodecError::InvalidTag(tag.as_u8() as u64)),
        }
    }

    /// Decode a body from RLP bytes.
    pub fn from_rlp_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        Self::from_rlp(&RlpItem::decode(bytes)?)
    }
}

impl SignedTx {
    /// The envelope wire form: `[11, 1, signature, body]`. A missing
    /// signature serializes as the single byte `0x00`.
    pub fn to_rlp_bytes(&self) -> Vec<u8> {
        let signature = match &self.signature {
            Some(sig) => RlpItem::bytes(sig),
            None => RlpItem::Bytes(vec![0x00]),
        };
        RlpItem::List(vec![
            RlpItem::uint(TxTag::SignedTx.as_u8() as u64),
            RlpItem::uint(WIRE_VERSION as u64),
            signature,
            self.data.to_rlp(),
        ])
        .encode()
    }

    /// Decode an envelope from RLP bytes.
    pub fn from_rlp_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let item = RlpItem::decode(bytes)?;
        let fields = item.as_list()?;
        expect_len(fields, 4)?;
        let tag = fields[0].as_uint()?;
        if tag != TxTag::SignedTx.as_u8() as u64 {
            return Err(CodecError::InvalidTag(tag));
        }
        let version = fields[1].as_uint()?;
        if version != WIRE_VERSION as u64 {
            return Err(CodecError::InvalidVersion(version));
        }
        let sig_bytes = fields[2].as_bytes()?;
        let signature = if sig_bytes == [0x00] {
            None
        } else {
            Some(fields[2].as_fixed::<64>()?)
        };
        Ok(SignedTx {
            data: DataTx::from_rlp(&fields[3])?,
            signature,
        })
    }

    /// Serialized size in bytes, the quantity the fee schedule prices.
    pub fn wire_size(&self) -> usize {
        self.to_rlp_bytes().len()
    }
}

fn sender_item(tx: &DataTx) -> RlpItem {
    match &tx.sender {
        Some(sender) => RlpItem::bytes(sender),
        // Unreachable for well-formed bodies; kept total so encoding never
        // panics on one built by hand.
        None => RlpItem::Bytes(vec![0x00]),
    }
}

fn push_ttl(fields: &mut Vec<RlpItem>, ttl: &Ttl) {
    fields.push(RlpItem::uint(ttl.type_byte() as u64));
    fields.push(RlpItem::uint(ttl.value()));
}

fn decode_ttl(type_item: &RlpItem, value_item: &RlpItem) -> Result<Ttl, CodecError> {
    let type_byte = narrow_u8(type_item.as_uint()?)?;
    Ttl::from_wire(type_byte, value_item.as_uint()?)
        .ok_or(CodecError::UnexpectedShape { expected: "ttl" })
}

fn decode_format(item: &RlpItem) -> Result<OracleFormat, CodecError> {
    OracleFormat::from_u8(narrow_u8(item.as_uint()?)?)
        .ok_or(CodecError::UnexpectedShape { expected: "format" })
}

fn narrow_u8(value: u64) -> Result<u8, CodecError> {
    u8::try_from(value).map_err(|_| CodecError::LengthOverflow)
}

fn expect_len(fields: &[RlpItem], expected: usize) -> Result<(), CodecError> {
    if fields.len() != expected {
        return Err(CodecError::BadFieldCount {
            expected,
            actual: fields.len(),
        });
    }
    Ok(())
}
