//! Base58-check envelope for human-facing identifiers.
//!
//! Every artifact crossing an API boundary is rendered as
//! `<prefix>$<base58(payload ∥ checksum)>`, where the two-letter prefix names
//! the artifact kind and the checksum is the first four bytes of a double
//! Keccak-256 over the payload.

use sha3::{Digest, Keccak256};
use thiserror::Error;

const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

const CHECKSUM_LEN: usize = 4;

/// Reverse lookup: ASCII byte to base58 digit value, -1 for invalid.
const DIGIT_VALUES: [i8; 128] = {
    let mut table = [-1i8; 128];
    let mut i = 0;
    while i < 58 {
        table[ALPHABET[i] as usize] = i as i8;
        i += 1;
    }
    table
};

/// Artifact kind carried in the envelope prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressPrefix {
    /// Account public key.
    Account,
    /// Transaction hash.
    TxHash,
    /// Transactions root of a block.
    TxsRoot,
    /// Detached signature.
    Signature,
    /// Chain-state root hash.
    StateRoot,
}

impl AddressPrefix {
    /// The two-letter wire prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressPrefix::Account => "ak",
            AddressPrefix::TxHash => "tx",
            AddressPrefix::TxsRoot => "bx",
            AddressPrefix::Signature => "sg",
            AddressPrefix::StateRoot => "bs",
        }
    }

    fn from_str_prefix(s: &str) -> Option<Self> {
        match s {
            "ak" => Some(AddressPrefix::Account),
            "tx" => Some(AddressPrefix::TxHash),
            "bx" => Some(AddressPrefix::TxsRoot),
            "sg" => Some(AddressPrefix::Signature),
            "bs" => Some(AddressPrefix::StateRoot),
            _ => None,
        }
    }
}

/// Envelope decode failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EnvelopeError {
    /// Missing separator, unknown prefix, or an invalid base58 character.
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),
    /// Payload checksum does not match.
    #[error("Checksum mismatch")]
    ChecksumMismatch,
    /// Envelope decodes but carries a different artifact kind.
    #[error("Prefix mismatch: expected {expected}, found {found}")]
    PrefixMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

fn checksum(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let first = Keccak256::digest(payload);
    let second = Keccak256::digest(first);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&second[..CHECKSUM_LEN]);
    out
}

/// Renders `payload` under the given prefix.
pub fn encode_envelope(prefix: AddressPrefix, payload: &[u8]) -> String {
    let mut body = payload.to_vec();
    body.extend_from_slice(&checksum(payload));
    format!("{}${}", prefix.as_str(), base58_encode(&body))
}

/// Parses an envelope, verifying prefix and checksum, returning the payload.
pub fn decode_envelope(expected: AddressPrefix, s: &str) -> Result<Vec<u8>, EnvelopeError> {
    let (prefix_str, body) = s
        .split_once('$')
        .ok_or_else(|| EnvelopeError::MalformedEnvelope("missing '$' separator".into()))?;
    let found = AddressPrefix::from_str_prefix(prefix_str)
        .ok_or_else(|| EnvelopeError::MalformedEnvelope(format!("unknown prefix '{prefix_str}'")))?;
    if found != expected {
        return Err(EnvelopeError::PrefixMismatch {
            expected: expected.as_str(),
            found: found.as_str(),
        });
    }
    let decoded = base58_decode(body)?;
    if decoded.len() < CHECKSUM_LEN {
        return Err(EnvelopeError::MalformedEnvelope("body too short".into()));
    }
    let (payload, check) = decoded.split_at(decoded.len() - CHECKSUM_LEN);
    if check != checksum(payload) {
        return Err(EnvelopeError::ChecksumMismatch);
    }
    Ok(payload.to_vec())
}

fn base58_encode(input: &[u8]) -> String {
    let zeros = input.iter().take_while(|&&b| b == 0).count();

    let mut digits: Vec<u8> = Vec::with_capacity(input.len() * 138 / 100 + 1);
    for &byte in &input[zeros..] {
        let mut carry = byte as u32;
        for digit in digits.iter_mut() {
            let acc = (*digit as u32) * 256 + carry;
            *digit = (acc % 58) as u8;
            carry = acc / 58;
        }
        while carry > 0 {
            digits.push((carry % 58) as u8);
            carry /= 58;
        }
    }

    let mut out = String::with_capacity(zeros + digits.len());
    out.extend(std::iter::repeat('1').take(zeros));
    out.extend(digits.iter().rev().map(|&d| ALPHABET[d as usize] as char));
    out
}

fn base58_decode(input: &str) -> Result<Vec<u8>, EnvelopeError> {
    let bytes = input.as_bytes();
    let zeros = bytes.iter().take_while(|&&b| b == b'1').count();

    let mut out: Vec<u8> = Vec::with_capacity(input.len());
    for (index, &byte) in bytes.iter().enumerate() {
        let value = DIGIT_VALUES
            .get(byte as usize)
            .copied()
            .filter(|&v| v >= 0)
            .ok_or_else(|| {
                EnvelopeError::MalformedEnvelope(format!(
                    "invalid base58 byte 0x{byte:02x} at index {index}"
                ))
            })?;
        let mut carry = value as u32;
        for digit in out.iter_mut() {
            let acc = (*digit as u32) * 58 + carry;
            *digit = (acc & 0xff) as u8;
            carry = acc >> 8;
        }
        while carry > 0 {
            out.push((carry & 0xff) as u8);
            carry >>= 8;
        }
    }

    // Leading zero bytes were consumed as '1' characters above.
    let significant = out.iter().rev().skip_while(|&&b| b == 0).count();
    out.truncate(significant);
    out.extend(std::iter::repeat(0).take(zeros));
    out.reverse();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_all_prefixes() {
        let payload = [0xA5u8; 32];
        for prefix in [
            AddressPrefix::Account,
            AddressPrefix::TxHash,
            AddressPrefix::TxsRoot,
            AddressPrefix::Signature,
            AddressPrefix::StateRoot,
        ] {
            let encoded = encode_envelope(prefix, &payload);
            assert!(encoded.starts_with(prefix.as_str()));
            let decoded = decode_envelope(prefix, &encoded).unwrap();
            assert_eq!(decoded, payload);
        }
    }

    #[test]
    fn test_prefix_mismatch_rejected() {
        let encoded = encode_envelope(AddressPrefix::Account, &[1, 2, 3]);
        let err = decode_envelope(AddressPrefix::TxHash, &encoded).unwrap_err();
        assert_eq!(
            err,
            EnvelopeError::PrefixMismatch {
                expected: "tx",
                found: "ak"
            }
        );
    }

    #[test]
    fn test_missing_separator_rejected() {
        let err = decode_envelope(AddressPrefix::Account, "ak123").unwrap_err();
        assert!(matches!(err, EnvelopeError::MalformedEnvelope(_)));
    }

    #[test]
    fn test_corrupted_body_fails_checksum() {
        let mut encoded = encode_envelope(AddressPrefix::Account, &[7u8; 32]);
        // Flip the last character to another alphabet member.
        let last = encoded.pop().unwrap();
        encoded.push(if last == '2' { '3' } else { '2' });
        let err = decode_envelope(AddressPrefix::Account, &encoded).unwrap_err();
        assert!(matches!(
            err,
            EnvelopeError::ChecksumMismatch | EnvelopeError::MalformedEnvelope(_)
        ));
    }

    #[test]
    fn test_leading_zeros_preserved() {
        let payload = [0u8, 0, 0, 9, 8, 7];
        let encoded = encode_envelope(AddressPrefix::TxHash, &payload);
        let decoded = decode_envelope(AddressPrefix::TxHash, &encoded).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_invalid_character_rejected() {
        // '0', 'O', 'I', 'l' are not in the alphabet.
        let err = decode_envelope(AddressPrefix::Account, "ak$0OIl").unwrap_err();
        assert!(matches!(err, EnvelopeError::MalformedEnvelope(_)));
    }
}
