use std::{
    fs::{self, File},
    io::Cursor,
};

use tempfile::NamedTempFile;
use zmqd_core::{
    read_all_records, AuxHeaderExt, RecordExt, RecordReader, RecordWriter, SliceHeaderExt,
    ZMQD_V2_FIXED_SIZE,
};
use zmqd_types::{
    AuxHeader, AuxRevision, MalformedReason, Record, SliceHeader, WireVersion, ZmqdError,
};

// ===========================================================================
// Helpers — детерминированные тест-данные
// ===========================================================================

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn slice(
    frame_number: u32,
    slot: u16,
) -> SliceHeader {
    SliceHeader {
        frame_number,
        slot,
        num_rx: 4,
        num_tx: 1,
        length: 272,
        ..SliceHeader::default()
    }
}

/// Полное SRS-сообщение из 10 частей: срез, 4 пары (meta, IQ), AUX, WB.
fn srs_parts(
    frame_number: u32,
    slot: u16,
    with_aux: bool,
) -> Vec<Vec<u8>> {
    let mut parts = vec![slice(frame_number, slot).encode().to_vec()];

    for port in 0..4u8 {
        parts.push(vec![port; 4]);
        parts.push(vec![0u8; 272 * 8]); // complex64 на поднесущую
    }

    if with_aux {
        let mut aux = AuxHeader::new(AuxRevision::Timestamped);
        aux.frame_number = frame_number;
        aux.slot = slot;
        aux.numerology = 1;
        aux.seal();
        parts.push(aux.encode());
    } else {
        parts.push(Vec::new());
    }

    parts.push(vec![0u8; 4 * 8]);
    parts
}

/// Test Vector #1: смешанный файл V1 + V2.
fn build_test_vector_1() -> Vec<u8> {
    let mut writer = RecordWriter::new(Vec::new());
    writer.write_parts(&[b"legacy-hdr".to_vec(), b"legacy-payload".to_vec()], 1_000).unwrap();
    writer.write_parts(&srs_parts(10, 0, true), 2_000).unwrap();
    writer.write_parts(&srs_parts(10, 10, false), 3_000).unwrap();
    writer.finish().unwrap()
}

// ===========================================================================
// Test Vector #1 — валидный файл
// ===========================================================================

#[test]
fn test_vector_1_mixed_versions() {
    let raw = build_test_vector_1();
    let mut reader = RecordReader::new(Cursor::new(raw));
    let records = read_all_records(&mut reader).unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].version, WireVersion::V1);
    assert_eq!(records[0].parts[1], b"legacy-payload");
    assert_eq!(records[1].version, WireVersion::V2);
    assert_eq!(records[1].part_count(), 10);
    assert_eq!(records[2].recv_time_ns, 3_000);

    assert_eq!(reader.stats().v1_records, 1);
    assert_eq!(reader.stats().v2_records, 2);
}

#[test]
fn test_vector_1_headers_decode_from_parts() {
    let raw = build_test_vector_1();
    let records: Vec<Record> = RecordReader::new(Cursor::new(raw))
        .map(|r| r.unwrap())
        .collect();

    // V1 header — не заголовок среза
    assert!(records[0].part(0).and_then(SliceHeader::decode).is_none());

    let hdr = records[1].part(0).and_then(SliceHeader::decode).unwrap();
    assert_eq!(hdr.sequence_pair(), (10, 0));

    let aux = records[1].part(8).and_then(AuxHeader::decode).unwrap();
    assert_eq!(aux.numerology, 1);
    assert!(aux.crc_matches());

    // Пустая часть 8 — AUX отсутствует, но запись цела
    assert!(records[2].part(8).and_then(AuxHeader::decode).is_none());
    assert_eq!(records[2].part(8), Some(&[][..]));
}

#[test]
fn test_v2_round_trip_exact_parts() {
    let lengths = [0usize, 1, 20, 0, 4096, 3, 0, 65_537];
    let parts: Vec<Vec<u8>> = lengths
        .iter()
        .enumerate()
        .map(|(i, &len)| (0..len).map(|b| (b as u8).wrapping_add(i as u8)).collect())
        .collect();

    let rec = Record::new(WireVersion::V2, 1_704_067_200_000_000_000, parts.clone());
    let bytes = rec.serialize().unwrap();

    let expected_len = ZMQD_V2_FIXED_SIZE + lengths.iter().map(|l| 4 + l).sum::<usize>();
    assert_eq!(bytes.len(), expected_len);

    let mut reader = RecordReader::with_chunk_size(Cursor::new(bytes), 1000);
    let back = reader.next_record().unwrap().unwrap();

    assert_eq!(back.part_count(), lengths.len());
    assert_eq!(back.parts, parts);
    assert!(reader.next_record().is_none());
}

// ===========================================================================
// Test Vector #2 — усечённый хвост
// ===========================================================================

#[test]
fn test_vector_2_truncated_tail_on_disk() {
    init_logger();

    let raw = build_test_vector_1();
    let tmp = NamedTempFile::new().unwrap();

    // Отрезаем последние 5 байт третьей записи
    fs::write(tmp.path(), &raw[..raw.len() - 5]).unwrap();

    let mut reader = RecordReader::new(File::open(tmp.path()).unwrap());
    let records = read_all_records(&mut reader).unwrap();

    assert_eq!(records.len(), 2, "две целые записи, третья отброшена");
    assert_eq!(records[1].part_count(), 10);
    assert!(reader.stats().truncated_bytes > 0);
}

#[test]
fn test_vector_2_cut_inside_preamble() {
    let mut raw = build_test_vector_1();
    raw.extend_from_slice(b"ZMQD\x02"); // 5 байт следующей записи

    let mut reader = RecordReader::new(Cursor::new(raw));
    let records = read_all_records(&mut reader).unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(reader.stats().truncated_bytes, 5);
}

// ===========================================================================
// Test Vector #3 — повреждённый поток
// ===========================================================================

#[test]
fn test_vector_3_bad_magic_at_start() {
    init_logger();

    let mut raw = build_test_vector_1();
    raw[0..4].copy_from_slice(b"ZMQX");

    let mut reader = RecordReader::new(Cursor::new(raw));
    let err = read_all_records(&mut reader).unwrap_err();

    assert!(err.is_malformed());
    match err {
        ZmqdError::MalformedStream { offset, reason } => {
            assert_eq!(offset, 0);
            assert_eq!(reason, MalformedReason::BadMagic(*b"ZMQX"));
        }
        other => panic!("unexpected: {other}"),
    }
}

#[test]
fn test_vector_3_unknown_version_mid_stream() {
    let mut writer = RecordWriter::new(Vec::new());
    writer.write_parts(&[b"a".to_vec()], 1).unwrap();
    let first_len = writer.bytes_written() as usize;
    writer.write_parts(&[b"b".to_vec()], 2).unwrap();
    let mut raw = writer.finish().unwrap();

    raw[first_len + 4] = 9; // версия второй записи

    let results: Vec<_> = RecordReader::new(Cursor::new(raw)).collect();

    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(matches!(
        results[1],
        Err(ZmqdError::MalformedStream {
            reason: MalformedReason::UnknownVersion(9),
            ..
        })
    ));
}
