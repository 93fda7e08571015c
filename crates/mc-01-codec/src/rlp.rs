//! Recursive-length-prefix wire encoding.
//!
//! Strict on decode: every value has exactly one valid encoding. Redundant
//! long forms and integers with leading zeros are rejected, so re-encoding a
//! decoded item always reproduces the input bytes.

use crate::CodecError;

/// A decoded RLP item: a byte string or a list of items.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RlpItem {
    /// Raw byte string.
    Bytes(Vec<u8>),
    /// Nested list.
    List(Vec<RlpItem>),
}

impl RlpItem {
    /// Byte-string item from a slice.
    pub fn bytes(data: &[u8]) -> Self {
        RlpItem::Bytes(data.to_vec())
    }

    /// Byte-string item holding a length-minimal big-endian integer.
    /// Zero encodes as the empty string.
    pub fn uint(value: u64) -> Self {
        RlpItem::Bytes(uint_to_be_minimal(value))
    }

    /// Encode this item to its canonical byte form.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            RlpItem::Bytes(data) => encode_bytes(data),
            RlpItem::List(items) => {
                let payload: Vec<u8> = items.iter().flat_map(|i| i.encode()).collect();
                let mut out = Vec::with_capacity(payload.len() + 9);
                write_length_prefix(&mut out, payload.len(), 0xc0, 0xf7);
                out.extend_from_slice(&payload);
                out
            }
        }
    }

    /// Decode a single item, rejecting trailing bytes.
    pub fn decode(input: &[u8]) -> Result<Self, CodecError> {
        let mut cursor = input;
        let item = decode_item(&mut cursor)?;
        if !cursor.is_empty() {
            return Err(CodecError::TrailingBytes);
        }
        Ok(item)
    }

    /// The byte-string payload, or an error for lists.
    pub fn as_bytes(&self) -> Result<&[u8], CodecError> {
        match self {
            RlpItem::Bytes(data) => Ok(data),
            RlpItem::List(_) => Err(CodecError::UnexpectedShape { expected: "bytes" }),
        }
    }

    /// The list elements, or an error for byte strings.
    pub fn as_list(&self) -> Result<&[RlpItem], CodecError> {
        match self {
            RlpItem::List(items) => Ok(items),
            RlpItem::Bytes(_) => Err(CodecError::UnexpectedShape { expected: "list" }),
        }
    }

    /// Decode the payload as a length-minimal big-endian unsigned integer.
    pub fn as_uint(&self) -> Result<u64, CodecError> {
        let data = self.as_bytes()?;
        if data.len() > 8 {
            return Err(CodecError::LengthOverflow);
        }
        if data.first() == Some(&0) {
            return Err(CodecError::NonMinimalInteger);
        }
        let mut value = 0u64;
        for &byte in data {
            value = (value << 8) | byte as u64;
        }
        Ok(value)
    }

    /// The payload as a fixed-width array.
    pub fn as_fixed<const N: usize>(&self) -> Result<[u8; N], CodecError> {
        let data = self.as_bytes()?;
        let array: [u8; N] = data.try_into().map_err(|_| CodecError::BadFieldWidth {
            expected: N,
            actual: data.len(),
        })?;
        Ok(array)
    }
}

/// RLP-encode a byte slice.
pub fn encode_bytes(data: &[u8]) -> Vec<u8> {
    if data.len() == 1 && data[0] < 0x80 {
        vec![data[0]]
    } else {
        let mut out = Vec::with_capacity(data.len() + 9);
        write_length_prefix(&mut out, data.len(), 0x80, 0xb7);
        out.extend_from_slice(data);
        out
    }
}

/// Minimal big-endian bytes of an unsigned integer; zero is empty.
pub fn uint_to_be_minimal(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    bytes[start..].to_vec()
}

fn write_length_prefix(out: &mut Vec<u8>, len: usize, short_base: u8, long_base: u8) {
    if len < 56 {
        out.push(short_base + len as u8);
    } else {
        let len_bytes = uint_to_be_minimal(len as u64);
        out.push(long_base + len_bytes.len() as u8);
        out.extend_from_slice(&len_bytes);
    }
}

fn take<'a>(input: &mut &'a [u8], n: usize) -> Result<&'a [u8], CodecError> {
    if input.len() < n {
        return Err(CodecError::UnexpectedEof);
    }
    let (head, tail) = input.split_at(n);
    *input = tail;
    Ok(head)
}

fn read_long_length(input: &mut &[u8], len_of_len: usize) -> Result<usize, CodecError> {
    let len_bytes = take(input, len_of_len)?;
    if len_bytes.first() == Some(&0) {
        return Err(CodecError::NonMinimalInteger);
    }
    if len_bytes.len() > core::mem::size_of::<usize>() {
        return Err(CodecError::LengthOverflow);
    }
    let mut len = 0usize;
    for &byte in len_bytes {
        len = (len << 8) | byte as usize;
    }
    if len < 56 {
        // Must have used the short form.
        return Err(CodecError::NonMinimalInteger);
    }
    Ok(len)
}

fn decode_item(input: &mut &[u8]) -> Result<RlpItem, CodecError> {
    let first = take(input, 1)?[0];
    match first {
        0x00..=0x7f => Ok(RlpItem::Bytes(vec![first])),
        0x80..=0xb7 => {
            let len = (first - 0x80) as usize;
            let data = take(input, len)?;
            if len == 1 && data[0] < 0x80 {
                return Err(CodecError::NonMinimalInteger);
            }
            Ok(RlpItem::Bytes(data.to_vec()))
        }
        0xb8..=0xbf => {
            let len = read_long_length(input, (first - 0xb7) as usize)?;
            Ok(RlpItem::Bytes(take(input, len)?.to_vec()))
        }
        0xc0..=0xf7 => {
            let len = (first - 0xc0) as usize;
            decode_list_payload(take(input, len)?)
        }
        0xf8..=0xff => {
            let len = read_long_length(input, (first - 0xf7) as usize)?;
            decode_list_payload(take(input, len)?)
        }
    }
}

fn decode_list_payload(mut payload: &[u8]) -> Result<RlpItem, CodecError> {
    let mut items = Vec::new();
    while !payload.is_empty() {
        items.push(decode_item(&mut payload)?);
    }
    Ok(RlpItem::List(items))
}
