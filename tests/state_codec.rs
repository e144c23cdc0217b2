use jam_node::state_codec::{
    decode_psi, encode_psi, DecodingContext, Reader, StateCodecErrorKind, Writer,
};
use jam_node::state::Psi;

#[test]
fn psi_round_trips_through_the_public_api() {
    let psi = Psi {
        good: vec![[1u8; 32], [2u8; 32], [3u8; 32]],
        bad: vec![[4u8; 32]],
        wonky: vec![],
        punish: vec![[5u8; 32], [6u8; 32]],
    };

    let mut writer = Writer::new();
    encode_psi(&mut writer, &psi);
    let bytes = writer.into_bytes();

    let mut reader = Reader::new(&bytes);
    let mut ctx = DecodingContext::new();
    let decoded = decode_psi(&mut reader, &mut ctx).expect("well-formed Psi blob decodes");

    assert_eq!(decoded, psi);
}

#[test]
fn psi_with_out_of_order_hashes_reports_invalid_format_with_a_path() {
    let mut writer = Writer::new();
    writer.write_nat(2);
    writer.write_hash(&[9u8; 32]);
    writer.write_hash(&[1u8; 32]);
    writer.write_nat(0);
    writer.write_nat(0);
    writer.write_nat(0);
    let bytes = writer.into_bytes();

    let mut reader = Reader::new(&bytes);
    let mut ctx = DecodingContext::new();
    let err = decode_psi(&mut reader, &mut ctx).unwrap_err();

    assert_eq!(err.kind, StateCodecErrorKind::InvalidFormat);
    assert!(err.path.contains("Psi"));
}

#[test]
fn truncated_blob_reports_end_of_stream() {
    let bytes = [0u8; 2];
    let mut reader = Reader::new(&bytes);
    let mut ctx = DecodingContext::new();
    let err = decode_psi(&mut reader, &mut ctx).unwrap_err();
    assert_eq!(err.kind, StateCodecErrorKind::EndOfStream);
}
