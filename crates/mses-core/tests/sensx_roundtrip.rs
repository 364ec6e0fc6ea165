mod support;

use mses_core::common::{MsesConfig, PositionBlockPolicy};
use mses_core::domain::MsesErrorCategory;
use mses_core::sensx::{
    decode_sensitivity, decode_sensitivity_file, encode_sensitivity, write_sensitivity_file,
};
use std::io::Cursor;
use support::{
    corrupt_end_marker, raw_leading_edge, record_spans, sensitivity_case, with_positions,
};
use tempfile::TempDir;

fn decode(bytes: &[u8]) -> mses_core::domain::DecodeResult<mses_core::sensx::SensitivityData> {
    decode_sensitivity(Cursor::new(bytes), &MsesConfig::default())
}

#[test]
fn encoded_cases_decode_to_identical_values() {
    for nbl in 1..=3 {
        for nmod in [0, 2] {
            let data = sensitivity_case(nbl, nmod, 12);
            let bytes = encode_sensitivity(&data).expect("encode");
            let decoded = decode(&bytes).expect("decode");
            assert_eq!(decoded, data, "nbl={nbl} nmod={nmod}");
        }
    }
}

#[test]
fn renormalisation_is_applied_once_across_repeated_round_trips() {
    let data = sensitivity_case(2, 1, 10);
    let first_bytes = encode_sensitivity(&data).expect("first encode");
    let first = decode(&first_bytes).expect("first decode");
    let second_bytes = encode_sensitivity(&first).expect("second encode");
    let second = decode(&second_bytes).expect("second decode");

    assert_eq!(first_bytes, second_bytes);
    assert_eq!(second, data);
}

#[test]
fn leading_edge_index_is_one_after_decode() {
    let data = sensitivity_case(3, 0, 9);
    let decoded = decode(&encode_sensitivity(&data).expect("encode")).expect("decode");
    let ii = decoded.sizing.ii as i32;
    for (body, indices) in decoded.indices.iter().enumerate() {
        assert_eq!(indices.ileb, 1, "body {body}");
        assert_eq!(
            indices.iend - indices.ileb,
            ii - raw_leading_edge(body),
            "body {body}"
        );
    }
}

#[test]
fn every_corrupted_end_marker_is_a_format_error() {
    let data = sensitivity_case(2, 2, 6);
    let bytes = encode_sensitivity(&data).expect("encode");
    let spans = record_spans(&bytes);
    assert!(spans.len() > 20, "expected many records, got {}", spans.len());

    for (record, (_, end_offset)) in spans.iter().enumerate() {
        let corrupted = corrupt_end_marker(&bytes, *end_offset);
        let error = decode(&corrupted).expect_err("corrupted record should fail");
        assert_eq!(
            error.category(),
            MsesErrorCategory::MalformedInput,
            "record {record}: {error}"
        );
        assert_eq!(error.placeholder(), "FORMAT.RECORD");
    }
}

#[test]
fn truncation_anywhere_is_a_format_error() {
    let bytes = encode_sensitivity(&sensitivity_case(1, 1, 5)).expect("encode");
    for len in [0, 3, 40, bytes.len() / 2, bytes.len() - 1] {
        let error = decode(&bytes[..len]).expect_err("truncated file");
        assert_eq!(error.category(), MsesErrorCategory::MalformedInput, "len {len}");
    }
}

#[test]
fn legacy_guard_leaves_positions_unread() {
    let data = with_positions(sensitivity_case(1, 1, 8), 2);
    let bytes = encode_sensitivity(&data).expect("encode");
    let decoded = decode(&bytes).expect("decode");

    assert_eq!(decoded.sizing.npos, 2);
    assert!(decoded.positions.is_empty());
    assert_eq!(decoded.modes, data.modes);
}

#[test]
fn re_encoding_a_legacy_decode_declares_no_positions() {
    let data = with_positions(sensitivity_case(1, 1, 8), 2);
    let legacy = decode(&encode_sensitivity(&data).expect("encode")).expect("legacy decode");
    assert_eq!(legacy.sizing.npos, 2);

    let bytes = encode_sensitivity(&legacy).expect("re-encode");
    let config = MsesConfig {
        position_block: PositionBlockPolicy::Read,
        ..MsesConfig::default()
    };
    let reread = decode_sensitivity(Cursor::new(&bytes[..]), &config).expect("read policy");
    assert_eq!(reread.sizing.npos, 0);
    assert!(reread.positions.is_empty());
    assert_eq!(reread.modes, data.modes);
}

#[test]
fn read_policy_decodes_the_position_block() {
    let data = with_positions(sensitivity_case(2, 1, 8), 3);
    let bytes = encode_sensitivity(&data).expect("encode");
    let config = MsesConfig {
        position_block: PositionBlockPolicy::Read,
        ..MsesConfig::default()
    };
    let decoded = decode_sensitivity(Cursor::new(&bytes[..]), &config).expect("decode");

    assert_eq!(decoded, data);
    assert_eq!(decoded.positions[2].nposel(), 3);
}

#[test]
fn sizing_beyond_configured_limits_is_rejected() {
    let bytes = encode_sensitivity(&sensitivity_case(3, 0, 6)).expect("encode");
    let mut config = MsesConfig::default();
    config.decode_limits.max_bodies = 2;
    let error = decode_sensitivity(Cursor::new(&bytes[..]), &config).expect_err("too many bodies");
    assert_eq!(error.placeholder(), "FORMAT.SENSX_SIZING");
}

#[test]
fn files_written_to_disk_decode_identically() {
    let temp = TempDir::new().expect("tempdir should be created");
    let path = temp.path().join("sensx.naca0012");
    let data = sensitivity_case(1, 2, 20);

    write_sensitivity_file(&path, &data).expect("write sensx");
    let decoded = decode_sensitivity_file(&path).expect("decode sensx");
    assert_eq!(decoded, data);
}
