//! Decode throughput over a synthetic PE image.

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;

use pescope::PeImage;

#[path = "../tests/common/mod.rs"]
mod common;

use common::{import_table, PeBuilder};

fn bench_decode(c: &mut Criterion) {
    let idata = import_table(
        0xD000,
        &[
            b"KERNEL32.dll" as &[u8],
            b"USER32.dll",
            b"ADVAPI32.dll",
            b"SHELL32.dll",
        ],
    );
    let idata_size = idata.len() as u32;

    let image = PeBuilder::pe32_plus()
        .data_directory(1, 0xD000, idata_size)
        .section(".text", 0x1000, 0x8000, 0x400, vec![0xCC; 32 * 1024])
        .section(".rdata", 0x9000, 0x4000, 0x8400, vec![0xAB; 16 * 1024])
        .section(".idata", 0xD000, 0x1000, 0xC400, idata)
        .build();

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Bytes(image.len() as u64));
    group.bench_function("from_bytes", |b| {
        b.iter(|| {
            let decoded = PeImage::from_bytes(black_box(&image)).unwrap();
            black_box(decoded)
        });
    });
    group.finish();
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
