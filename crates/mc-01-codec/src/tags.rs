//! The frozen type-tag table.
//!
//! One enum serves both encode and decode, so the two directions cannot
//! drift apart.

use crate::CodecError;

/// Wire version carried by every encoded object.
pub const WIRE_VERSION: u8 = 1;

/// Type tag identifying an encoded object on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TxTag {
    /// Account record.
    Account = 10,
    /// Signed transaction envelope.
    SignedTx = 11,
    /// Token transfer.
    SpendTx = 12,
    /// Block reward mint.
    CoinbaseTx = 13,
    /// Oracle registration.
    OracleRegisterTx = 22,
    /// Oracle query.
    OracleQueryTx = 23,
    /// Oracle response.
    OracleResponseTx = 24,
    /// Oracle expiry extension.
    OracleExtendTx = 25,
    /// Name pre-claim commitment.
    NamePreClaimTx = 30,
    /// Name claim reveal.
    NameClaimTx = 31,
    /// Name revocation.
    NameRevokeTx = 32,
}

impl TxTag {
    /// The wire byte for this tag.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Decode a wire byte into a tag.
    pub fn from_u8(byte: u8) -> Result<Self, CodecError> {
        match byte {
            10 => Ok(TxTag::Account),
            11 => Ok(TxTag::SignedTx),
            12 => Ok(TxTag::SpendTx),
            13 => Ok(TxTag::CoinbaseTx),
            22 => Ok(TxTag::OracleRegisterTx),
            23 => Ok(TxTag::OracleQueryTx),
            24 => Ok(TxTag::OracleResponseTx),
            25 => Ok(TxTag::OracleExtendTx),
            30 => Ok(TxTag::NamePreClaimTx),
            31 => Ok(TxTag::NameClaimTx),
            32 => Ok(TxTag::NameRevokeTx),
            other => Err(CodecError::InvalidTag(other as u64)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [TxTag; 11] = [
        TxTag::Account,
        TxTag::SignedTx,
        TxTag::SpendTx,
        TxTag::CoinbaseTx,
        TxTag::OracleRegisterTx,
        TxTag::OracleQueryTx,
        TxTag::OracleResponseTx,
        TxTag::OracleExtendTx,
        TxTag::NamePreClaimTx,
        TxTag::NameClaimTx,
        TxTag::NameRevokeTx,
    ];

    #[test]
    fn test_round_trip_is_identity() {
        for tag in ALL {
            assert_eq!(TxTag::from_u8(tag.as_u8()).unwrap(), tag);
        }
    }

    #[test]
    fn test_frozen_values() {
        assert_eq!(TxTag::Account.as_u8(), 10);
        assert_eq!(TxTag::SignedTx.as_u8(), 11);
        assert_eq!(TxTag::SpendTx.as_u8(), 12);
        assert_eq!(TxTag::CoinbaseTx.as_u8(), 13);
        assert_eq!(TxTag::OracleRegisterTx.as_u8(), 22);
        assert_eq!(TxTag::OracleQueryTx.as_u8(), 23);
        assert_eq!(TxTag::OracleResponseTx.as_u8(), 24);
        assert_eq!(TxTag::OracleExtendTx.as_u8(), 25);
        assert_eq!(TxTag::NamePreClaimTx.as_u8(), 30);
        assert_eq!(TxTag::NameClaimTx.as_u8(), 31);
        assert_eq!(TxTag::NameRevokeTx.as_u8(), 32);
    }

    #[test]
    fn test_unknown_tag_rejected() {
        assert_eq!(TxTag::from_u8(21), Err(CodecError::InvalidTag(21)));
        assert_eq!(TxTag::from_u8(0), Err(CodecError::InvalidTag(0)));
    }
}
