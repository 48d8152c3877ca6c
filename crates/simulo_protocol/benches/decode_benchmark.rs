//! # Event Decode Benchmark
//!
//! Measures decoding of full poll buffers:
//! 1. Crowded frames (many pose upserts)
//! 2. Mixed traffic (upserts, deletes, resizes)
//!
//! Target: a full 32 KiB span decodes well under a frame budget.

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use simulo_core::Pose;
use simulo_protocol::{decode_into, EventEncoder, POSE_UPSERT_LEN};

const POLL_BUFFER: usize = 32 * 1024;

fn bench_pose_upserts(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_pose_upserts");
    let pose = Pose::zeroed();

    for count in [1, 16, POLL_BUFFER / POSE_UPSERT_LEN] {
        let mut encoder = EventEncoder::with_capacity(count * POSE_UPSERT_LEN);
        for id in 0..count {
            encoder.write_pose_upsert(id as u32, &pose);
        }
        let bytes = encoder.into_bytes();
        let mut events = Vec::with_capacity(count);

        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &bytes, |b, bytes| {
            b.iter(|| black_box(decode_into(black_box(bytes), &mut events)));
        });
    }

    group.finish();
}

fn bench_mixed_traffic(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_mixed");
    let pose = Pose::zeroed();

    let mut encoder = EventEncoder::with_capacity(POLL_BUFFER);
    let mut id = 0u32;
    while encoder.len() + POSE_UPSERT_LEN + 10 <= POLL_BUFFER {
        encoder.write_pose_upsert(id, &pose);
        encoder.write_pose_delete(id.wrapping_sub(1));
        encoder.write_viewport_resize(1920, 1080);
        id += 1;
    }
    let bytes = encoder.into_bytes();
    let mut events = Vec::new();

    group.throughput(Throughput::Bytes(bytes.len() as u64));
    group.bench_function("full_buffer", |b| {
        b.iter(|| black_box(decode_into(black_box(&bytes), &mut events)));
    });

    group.finish();
}

criterion_group!(benches, bench_pose_upserts, bench_mixed_traffic);
criterion_main!(benches);
