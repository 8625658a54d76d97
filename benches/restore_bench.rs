//! Benchmarks for cbfs-restore
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;

fn build_archive(records: usize) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    for i in 0..records {
        writeln!(
            encoder,
            r#"{{"Path":"photos/{}/img_{}.jpg","Meta":{{"oid":"{:040x}","length":{},"type":"image/jpeg"}}}}"#,
            i % 100,
            i,
            i,
            i * 1024
        )
        .unwrap();
    }
    encoder.finish().unwrap()
}

fn benchmark_archive_decode(c: &mut Criterion) {
    use cbfs_restore::archive::ArchiveReader;

    let archive = build_archive(10_000);

    c.bench_function("archive_decode_10k", |b| {
        b.iter(|| {
            let reader = ArchiveReader::from_reader(archive.as_slice()).unwrap();
            let count = reader.map(|r| r.unwrap()).count();
            black_box(count);
        })
    });
}

fn benchmark_path_filter(c: &mut Criterion) {
    use cbfs_restore::filter::PathFilter;

    let filter = PathFilter::new(r"^photos/(1|2)\d/.*\.jpg$").unwrap();

    c.bench_function("path_filter_match", |b| {
        b.iter(|| black_box(filter.matches(black_box("photos/17/img_1717.jpg"))))
    });
}

fn benchmark_queue_handoff(c: &mut Criterion) {
    use cbfs_restore::archive::ArchiveRecord;
    use cbfs_restore::restore::queue::HandoffQueue;

    c.bench_function("queue_send_recv", |b| {
        let (sender, receiver) = HandoffQueue::new(1024).split();
        let record = ArchiveRecord::new("a/1.txt", r#"{"oid":"abc"}"#).unwrap();

        b.iter(|| {
            sender.send(record.clone()).unwrap();
            black_box(receiver.recv().unwrap());
        })
    });
}

criterion_group!(
    benches,
    benchmark_archive_decode,
    benchmark_path_filter,
    benchmark_queue_handoff
);
criterion_main!(benches);
