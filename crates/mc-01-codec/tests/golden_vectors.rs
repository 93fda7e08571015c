//! Byte-exact vectors for the canonical encodings.
//!
//! These bytes are consensus-frozen. A failing test here means a hard fork,
//! not a broken test.

use mc_01_codec::{PackedWriter, RlpItem, TxTag};

#[test]
fn rlp_spend_shaped_list_is_byte_exact() {
    let receiver = [0xAAu8; 32];
    let item = RlpItem::List(vec![
        RlpItem::uint(TxTag::SpendTx.as_u8() as u64),
        RlpItem::uint(1),
        RlpItem::bytes(&receiver),
        RlpItem::uint(40),
    ]);

    let mut expected = String::from("e40c01a0");
    expected.push_str(&"aa".repeat(32));
    expected.push_str("28");

    assert_eq!(hex::encode(item.encode()), expected);
}

#[test]
fn rlp_uint_boundary_vectors() {
    let cases: [(u64, &str); 6] = [
        (0, "80"),
        (0x0f, "0f"),
        (0x7f, "7f"),
        (0x80, "8180"),
        (0x400, "820400"),
        (0xFFFFFF, "83ffffff"),
    ];
    for (value, expected) in cases {
        assert_eq!(hex::encode(RlpItem::uint(value).encode()), expected);
    }
}

#[test]
fn rlp_decode_reproduces_input_bytes() {
    let item = RlpItem::List(vec![
        RlpItem::uint(11),
        RlpItem::uint(1),
        RlpItem::bytes(&[0x00]),
        RlpItem::List(vec![RlpItem::bytes(b"inner")]),
    ]);
    let encoded = item.encode();
    let decoded = RlpItem::decode(&encoded).unwrap();
    assert_eq!(decoded.encode(), encoded);
}

#[test]
fn packed_header_and_integer_fields_are_byte_exact() {
    let sender = [0x11u8; 32];
    let mut writer = PackedWriter::new(TxTag::SpendTx.as_u8(), 1);
    writer.put_fixed(&sender).put_uint(40);

    let mut expected = String::from("0c01");
    expected.push_str(&"11".repeat(32));
    expected.push_str("0128");

    assert_eq!(hex::encode(writer.finish()), expected);
}

#[test]
fn packed_missing_sender_is_single_zero_byte() {
    let mut writer = PackedWriter::new(TxTag::CoinbaseTx.as_u8(), 1);
    writer.put_opt_fixed(None).put_uint(10);

    assert_eq!(hex::encode(writer.finish()), "0d0100010a");
}
