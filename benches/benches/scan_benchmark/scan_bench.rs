use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rand::prelude::*;
use zmqd_analyzer::{advance_absolute_slot, compute_loss, AnalysisConfig, LossAnalyzer};
use zmqd_core::{read_all_records, AuxHeaderExt, RecordReader, RecordWriter, SliceHeaderExt};
use zmqd_types::{AuxHeader, AuxRevision, SliceHeader};

const RECORDS: u64 = 2_000;

/// Захват mu = 1 с SRS раз в 10 слотов и случайными IQ.
fn synthetic_capture() -> Vec<u8> {
    let mut rng = rand::thread_rng();
    let mut writer = RecordWriter::new(Vec::new());

    for i in 0..RECORDS {
        let abs = i * 10;
        let frame_number = ((abs / 20) % 1024) as u32;
        let slot = (abs % 20) as u16;

        let mut parts = vec![Vec::new(); 10];
        parts[0] = SliceHeader {
            frame_number,
            slot,
            num_rx: 4,
            num_tx: 1,
            length: 272,
            ..SliceHeader::default()
        }
        .encode()
        .to_vec();

        for port in 0..4 {
            let mut iq = vec![0u8; 272 * 8];
            rng.fill(&mut iq[..]);
            parts[1 + port * 2] = vec![port as u8; 4];
            parts[2 + port * 2] = iq;
        }

        let mut aux = AuxHeader::new(AuxRevision::Timestamped);
        aux.frame_number = frame_number;
        aux.slot = slot;
        aux.numerology = 1;
        aux.seal();
        parts[8] = aux.encode();

        writer.write_parts(&parts, i * 5_000_000).unwrap();
    }

    writer.finish().unwrap()
}

fn benchmark(c: &mut Criterion) {
    let capture = synthetic_capture();

    let mut group = c.benchmark_group("capture");
    group.throughput(Throughput::Bytes(capture.len() as u64));

    group.bench_function("decode records", |b| {
        b.iter(|| {
            let mut reader = RecordReader::new(Cursor::new(black_box(&capture[..])));
            read_all_records(&mut reader).unwrap()
        })
    });

    let analyzer = LossAnalyzer::new(AnalysisConfig::interval_ms(5.0)).unwrap();
    group.bench_function("scan and report", |b| {
        b.iter(|| analyzer.analyze_reader(Cursor::new(black_box(&capture[..]))).unwrap())
    });
    group.finish();

    let mut rng = rand::thread_rng();
    let pairs: Vec<(u32, u16)> = (0..4096)
        .map(|_| (rng.gen_range(0..1024), rng.gen_range(0..20)))
        .collect();

    c.bench_function("advance absolute slot", |b| {
        b.iter(|| {
            let mut prev = None;
            for &(frame_number, slot) in &pairs {
                prev = Some(advance_absolute_slot(black_box(prev), frame_number, slot, 20));
            }
            prev
        })
    });

    let sequence: Vec<u64> = (0..100_000u64)
        .filter(|_| rng.gen_bool(0.95))
        .map(|i| i * 10)
        .collect();

    c.bench_function("compute loss", |b| {
        b.iter(|| compute_loss(black_box(10), black_box(&sequence)))
    });
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
