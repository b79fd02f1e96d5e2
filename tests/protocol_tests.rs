//! Tests for the wire protocol
//!
//! These tests verify:
//! - Command and response framing
//! - Payload layouts for SET, GET_PREFIX and STAT
//! - Rejection of malformed frames
//! - Mapping between engine results and responses
//! - Splitting large prefix results across frames

use std::io::Cursor;
use std::time::{Duration, UNIX_EPOCH};

use bytes::Bytes;
use prefixkv::engine::Stats;
use prefixkv::protocol::{
    decode_command, decode_pairs, decode_response, decode_stats, encode_command, encode_pairs,
    encode_pairs_chunked, encode_response, encode_stats, read_command, read_response, write_command, write_response,
    Command, Reply, Response, Status, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
use prefixkv::KvError;

// =============================================================================
// Command Tests
// =============================================================================

#[test]
fn test_encode_set_layout() {
    let bytes = encode_command(&Command::Set {
        key: b"ab".to_vec(),
        value: b"xyz".to_vec(),
    })
    .unwrap();

    assert_eq!(
        bytes,
        vec![0x02, 0, 0, 0, 9, 0, 0, 0, 2, b'a', b'b', b'x', b'y', b'z']
    );
}

#[test]
fn test_encode_get_prefix_layout() {
    let bytes = encode_command(&Command::GetPrefix {
        prefix: b"us".to_vec(),
    })
    .unwrap();

    assert_eq!(bytes, vec![0x03, 0, 0, 0, 2, b'u', b's']);
}

#[test]
fn test_decode_every_command() {
    let commands = vec![
        Command::Get { key: b"k".to_vec() },
        Command::Set {
            key: b"k".to_vec(),
            value: Vec::new(),
        },
        Command::GetPrefix { prefix: Vec::new() },
        Command::Stat,
        Command::Ping,
    ];

    for command in commands {
        let decoded = decode_command(&encode_command(&command).unwrap()).unwrap();
        assert_eq!(decoded, command);
    }
}

#[test]
fn test_decode_unknown_command() {
    let result = decode_command(&[0x7f, 0, 0, 0, 0]);
    assert!(matches!(result, Err(KvError::Protocol(_))));
}

#[test]
fn test_decode_incomplete_header() {
    let result = decode_command(&[0x01, 0, 0]);
    assert!(matches!(result, Err(KvError::Protocol(_))));
}

#[test]
fn test_decode_incomplete_payload() {
    let result = decode_command(&[0x01, 0, 0, 0, 4, b'a']);
    assert!(matches!(result, Err(KvError::Protocol(_))));
}

#[test]
fn test_decode_set_with_short_key() {
    let result = decode_command(&[0x02, 0, 0, 0, 5, 0, 0, 0, 9, b'a']);
    assert!(matches!(result, Err(KvError::Protocol(_))));
}

#[test]
fn test_decode_stat_with_payload_is_rejected() {
    let result = decode_command(&[0x04, 0, 0, 0, 1, 0]);
    assert!(matches!(result, Err(KvError::Protocol(_))));
}

#[test]
fn test_read_command_rejects_oversized_payload() {
    let mut header = vec![0x01];
    header.extend_from_slice(&(MAX_PAYLOAD_SIZE + 1).to_be_bytes());

    let result = read_command(&mut Cursor::new(header));

    assert!(matches!(result, Err(KvError::Protocol(_))));
}

#[test]
fn test_stream_helpers() {
    let mut buf = Vec::new();
    write_command(&mut buf, &Command::Get { key: b"a".to_vec() }).unwrap();
    write_command(&mut buf, &Command::Ping).unwrap();

    let mut cursor = Cursor::new(buf);
    assert_eq!(
        read_command(&mut cursor).unwrap(),
        Command::Get { key: b"a".to_vec() }
    );
    assert_eq!(read_command(&mut cursor).unwrap(), Command::Ping);
}

// =============================================================================
// Response Tests
// =============================================================================

#[test]
fn test_response_framing() {
    let bytes = encode_response(&Response::ok(Some(b"v".to_vec()))).unwrap();
    assert_eq!(bytes, vec![0x00, 0, 0, 0, 1, b'v']);

    let bytes = encode_response(&Response::already_exists()).unwrap();
    assert_eq!(bytes.len(), HEADER_SIZE);
    assert_eq!(decode_response(&bytes).unwrap().status, Status::AlreadyExists);
}

#[test]
fn test_response_stream_helpers() {
    let mut buf = Vec::new();
    write_response(&mut buf, &Response::not_found()).unwrap();

    let response = read_response(&mut Cursor::new(buf)).unwrap();

    assert_eq!(response, Response::not_found());
}

#[test]
fn test_decode_unknown_status() {
    let result = decode_response(&[0x09, 0, 0, 0, 0]);
    assert!(matches!(result, Err(KvError::Protocol(_))));
}

fn single_frame(result: prefixkv::Result<Reply>) -> Response {
    let mut frames = Response::frames(result);
    assert_eq!(frames.len(), 1);
    frames.remove(0)
}

#[test]
fn test_frames_map_errors() {
    assert_eq!(single_frame(Err(KvError::NotFound)).status, Status::NotFound);
    assert_eq!(
        single_frame(Err(KvError::AlreadyExists)).status,
        Status::AlreadyExists
    );
    assert_eq!(
        single_frame(Err(KvError::Protocol("bad".to_string()))).status,
        Status::Error
    );
    assert_eq!(single_frame(Ok(Reply::Ack)), Response::ok(None));
}

#[test]
fn test_into_result_maps_statuses_back() {
    assert!(matches!(
        Response::not_found().into_value(),
        Err(KvError::NotFound)
    ));
    assert!(matches!(
        Response::already_exists().into_result(),
        Err(KvError::AlreadyExists)
    ));
    assert!(matches!(
        Response::error("boom").into_result(),
        Err(KvError::Network(ref m)) if m.contains("boom")
    ));
}

#[test]
fn test_empty_value_response() {
    let wire = encode_response(&single_frame(Ok(Reply::Value(Bytes::new())))).unwrap();
    let value = decode_response(&wire).unwrap().into_value().unwrap();

    assert!(value.is_empty());
}

// =============================================================================
// Payload Tests
// =============================================================================

#[test]
fn test_pairs_layout() {
    let pairs = vec![(Bytes::from_static(b"k"), Bytes::from_static(b"vv"))];

    let bytes = encode_pairs(&pairs).unwrap();

    assert_eq!(bytes, vec![0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 2, b'k', b'v', b'v']);
    assert_eq!(decode_pairs(&bytes).unwrap(), pairs);
}

#[test]
fn test_empty_pairs_survive_the_wire() {
    let wire = encode_response(&single_frame(Ok(Reply::Entries(Vec::new())))).unwrap();
    let pairs = decode_response(&wire).unwrap().into_pairs().unwrap();

    assert!(pairs.is_empty());
}

#[test]
fn test_decode_pairs_rejects_truncation_and_trailing_bytes() {
    let mut bytes =
        encode_pairs(&[(Bytes::from_static(b"key"), Bytes::from_static(b"value"))]).unwrap();

    let mut extra = bytes.clone();
    extra.push(0);
    assert!(matches!(decode_pairs(&extra), Err(KvError::Protocol(_))));

    bytes.pop();
    assert!(matches!(decode_pairs(&bytes), Err(KvError::Protocol(_))));
}

#[test]
fn test_stats_payload() {
    let stats = Stats {
        start_time: UNIX_EPOCH + Duration::from_millis(1_700_000_000_123),
        total: 6,
        set_count: 3,
        get_count: 2,
        prefix_count: 1,
    };

    let bytes = encode_stats(&stats);

    assert_eq!(bytes.len(), 40);
    assert_eq!(decode_stats(&bytes).unwrap(), stats);
    assert!(matches!(decode_stats(&bytes[..39]), Err(KvError::Protocol(_))));
}

// =============================================================================
// Large Result Tests
// =============================================================================

fn numbered_pairs(count: usize, value_len: usize) -> Vec<(Bytes, Bytes)> {
    (0..count)
        .map(|i| {
            (
                Bytes::from(format!("p{:02}", i)),
                Bytes::from(vec![i as u8; value_len]),
            )
        })
        .collect()
}

#[test]
fn test_chunked_pairs_respect_limit_and_keep_order() {
    // Each pair is 8 + 3 + 20 = 31 bytes; 100 bytes holds three
    let pairs = numbered_pairs(10, 20);

    let chunks = encode_pairs_chunked(&pairs, 100).unwrap();

    assert_eq!(chunks.len(), 4);
    assert!(chunks.iter().all(|c| c.len() <= 100));
    let rejoined: Vec<_> = chunks
        .iter()
        .flat_map(|c| decode_pairs(c).unwrap())
        .collect();
    assert_eq!(rejoined, pairs);
}

#[test]
fn test_chunked_pairs_empty_result_is_one_chunk() {
    let chunks = encode_pairs_chunked(&[], 100).unwrap();

    assert_eq!(chunks, vec![vec![0, 0, 0, 0]]);
}

#[test]
fn test_chunked_pairs_refuses_pair_larger_than_limit() {
    let pairs = numbered_pairs(1, 200);

    let result = encode_pairs_chunked(&pairs, 100);

    assert!(matches!(result, Err(KvError::Protocol(_))));
}

#[test]
fn test_prefix_result_over_frame_limit_is_split() {
    // 17 MiB of values cannot fit in one 16 MiB frame
    let pairs = numbered_pairs(17, 1024 * 1024);

    let frames = Response::frames(Ok(Reply::Entries(pairs.clone())));

    assert!(frames.len() >= 2);
    let (last, partial) = frames.split_last().unwrap();
    assert_eq!(last.status, Status::Ok);
    assert!(partial.iter().all(|f| f.status == Status::More));

    let mut rejoined = Vec::new();
    for frame in &frames {
        let wire = encode_response(frame).unwrap();
        assert!(wire.len() - HEADER_SIZE <= MAX_PAYLOAD_SIZE as usize);
        rejoined.extend(decode_response(&wire).unwrap().into_pairs().unwrap());
    }
    assert_eq!(rejoined, pairs);
}

#[test]
fn test_oversized_frames_are_refused_before_writing() {
    let big = vec![0u8; MAX_PAYLOAD_SIZE as usize + 1];

    assert!(matches!(
        encode_response(&Response::ok(Some(big.clone()))),
        Err(KvError::Protocol(_))
    ));
    assert!(matches!(
        encode_command(&Command::Get { key: big.clone() }),
        Err(KvError::Protocol(_))
    ));

    let mut buf = Vec::new();
    let result = write_response(&mut buf, &Response::ok(Some(big)));
    assert!(matches!(result, Err(KvError::Protocol(_))));
    assert!(buf.is_empty());
}

#[test]
fn test_more_status_decodes() {
    let wire = encode_response(&Response {
        status: Status::More,
        payload: Some(vec![0, 0, 0, 0]),
    })
    .unwrap();

    let response = decode_response(&wire).unwrap();

    assert!(response.is_partial());
    assert!(response.into_pairs().unwrap().is_empty());
}
