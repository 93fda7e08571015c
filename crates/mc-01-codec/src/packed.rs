//! The packed signing encoding.
//!
//! A flat, deterministic byte form used for signatures and transaction
//! identity. Unlike the RLP wire form it carries no nesting: the per-kind
//! encoder emits the tag byte, the version byte, then each field in
//! declaration order.
//!
//! Field rendering:
//!
//! - fixed-width fields (keys, hashes, salts) are raw bytes;
//! - unsigned integers are a one-byte length followed by the length-minimal
//!   big-endian value (zero is a lone `0x00` length);
//! - variable-length byte fields are a one-byte length-of-length, the
//!   minimal big-endian length, then the bytes;
//! - optional fields carry an explicit presence byte (`0x00` absent,
//!   `0x01` present);
//! - TTLs are the type byte (0 absolute, 1 relative) followed by the value
//!   as an integer field.

use crate::errors::CodecError;
use crate::rlp::uint_to_be_minimal;
use shared_types::Ttl;

/// Append-only writer producing packed bytes.
#[derive(Debug, Default)]
pub struct PackedWriter {
    buf: Vec<u8>,
}

impl PackedWriter {
    /// Start a packed object with its tag and version bytes.
    pub fn new(tag: u8, version: u8) -> Self {
        Self {
            buf: vec![tag, version],
        }
    }

    /// Raw fixed-width bytes.
    pub fn put_fixed(&mut self, data: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(data);
        self
    }

    /// One raw byte.
    pub fn put_u8(&mut self, byte: u8) -> &mut Self {
        self.buf.push(byte);
        self
    }

    /// Length-minimal unsigned integer with a one-byte length prefix.
    pub fn put_uint(&mut self, value: u64) -> &mut Self {
        let be = uint_to_be_minimal(value);
        self.buf.push(be.len() as u8);
        self.buf.extend_from_slice(&be);
        self
    }

    /// Variable-length byte field: length-of-length, minimal length, bytes.
    pub fn put_bytes(&mut self, data: &[u8]) -> &mut Self {
        let len_be = uint_to_be_minimal(data.len() as u64);
        self.buf.push(len_be.len() as u8);
        self.buf.extend_from_slice(&len_be);
        self.buf.extend_from_slice(data);
        self
    }

    /// Optional fixed-width field with an explicit presence byte.
    pub fn put_opt_fixed(&mut self, data: Option<&[u8]>) -> &mut Self {
        match data {
            Some(bytes) => {
                self.buf.push(0x01);
                self.buf.extend_from_slice(bytes);
            }
            None => {
                self.buf.push(0x00);
            }
        }
        self
    }

    /// TTL field: type byte then value.
    pub fn put_ttl(&mut self, ttl: &Ttl) -> &mut Self {
        self.buf.push(ttl.type_byte());
        self.put_uint(ttl.value())
    }

    /// The finished packed bytes.
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Cursor over packed bytes, mirroring [`PackedWriter`] field by field.
#[derive(Debug)]
pub struct PackedReader<'a> {
    input: &'a [u8],
}

impl<'a> PackedReader<'a> {
    /// Wrap the packed bytes, returning the reader plus tag and version.
    pub fn new(input: &'a [u8]) -> Result<(Self, u8, u8), CodecError> {
        if input.len() < 2 {
            return Err(CodecError::UnexpectedEof);
        }
        let (tag, version) = (input[0], input[1]);
        Ok((
            Self {
                input: &input[2..],
            },
            tag,
            version,
        ))
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if self.input.len() < n {
            return Err(CodecError::UnexpectedEof);
        }
        let (head, tail) = self.input.split_at(n);
        self.input = tail;
        Ok(head)
    }

    /// Raw fixed-width field.
    pub fn read_fixed<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let data = self.take(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(data);
        Ok(out)
    }

    /// One raw byte.
    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    /// Length-prefixed minimal big-endian integer.
    pub fn read_uint(&mut self) -> Result<u64, CodecError> {
        let len = self.take(1)?[0] as usize;
        if len > 8 {
            return Err(CodecError::LengthOverflow);
        }
        let data = self.take(len)?;
        if data.first() == Some(&0) {
            return Err(CodecError::NonMinimalInteger);
        }
        let mut value = 0u64;
        for &byte in data {
            value = (value << 8) | byte as u64;
        }
        Ok(value)
    }

    /// Variable-length byte field.
    pub fn read_bytes(&mut self) -> Result<Vec<u8>, CodecError> {
        let len = self.read_uint()? as usize;
        Ok(self.take(len)?.to_vec())
    }

    /// Optional fixed-width field.
    pub fn read_opt_fixed<const N: usize>(&mut self) -> Result<Option<[u8; N]>, CodecError> {
        match self.read_u8()? {
            0x00 => Ok(None),
            0x01 => Ok(Some(self.read_fixed::<N>()?)),
            _ => Err(CodecError::UnexpectedShape {
                expected: "presence byte",
            }),
        }
    }

    /// TTL field.
    pub fn read_ttl(&mut self) -> Result<Ttl, CodecError> {
        let type_byte = self.read_u8()?;
        let value = self.read_uint()?;
        Ttl::from_wire(type_byte, value).ok_or(CodecError::UnexpectedShape { expected: "ttl" })
    }

    /// Fails unless every byte has been consumed.
    pub fn finish(self) -> Result<(), CodecError> {
        if self.input.is_empty() {
            Ok(())
        } else {
            Err(CodecError::TrailingBytes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_reader_round_trip() {
        let key = [0x5Au8; 32];
        let mut writer = PackedWriter::new(12, 1);
        writer
            .put_fixed(&key)
            .put_uint(40)
            .put_uint(0)
            .put_bytes(b"payload")
            .put_opt_fixed(None)
            .put_ttl(&Ttl::Relative(77));
        let bytes = writer.finish();

        let (mut reader, tag, version) = PackedReader::new(&bytes).unwrap();
        assert_eq!((tag, version), (12, 1));
        assert_eq!(reader.read_fixed::<32>().unwrap(), key);
        assert_eq!(reader.read_uint().unwrap(), 40);
        assert_eq!(reader.read_uint().unwrap(), 0);
        assert_eq!(reader.read_bytes().unwrap(), b"payload");
        assert_eq!(reader.read_opt_fixed::<32>().unwrap(), None);
        assert_eq!(reader.read_ttl().unwrap(), Ttl::Relative(77));
        reader.finish().unwrap();
    }

    #[test]
    fn test_zero_uint_is_lone_length_byte() {
        let mut writer = PackedWriter::new(0, 1);
        writer.put_uint(0);
        assert_eq!(writer.finish(), vec![0, 1, 0x00]);
    }

    #[test]
    fn test_determinism() {
        let build = || {
            let mut w = PackedWriter::new(22, 1);
            w.put_uint(1234).put_bytes(b"abc");
            w.finish()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut writer = PackedWriter::new(1, 1);
        writer.put_uint(5);
        let mut bytes = writer.finish();
        bytes.push(0xFF);

        let (mut reader, _, _) = PackedReader::new(&bytes).unwrap();
        reader.read_uint().unwrap();
        assert_eq!(reader.finish(), Err(CodecError::TrailingBytes));
    }

    #[test]
    fn test_truncated_field_rejected() {
        let mut writer = PackedWriter::new(1, 1);
        writer.put_bytes(&[0xAB; 10]);
        let bytes = writer.finish();

        let (mut reader, _, _) = PackedReader::new(&bytes[..bytes.len() - 1]).unwrap();
        assert_eq!(reader.read_bytes(), Err(CodecError::UnexpectedEof));
    }
}
