use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use tickq_queue::{ManualClock, QueueConfig, TaskQueue, Tick};

type Queue = TaskQueue<ManualClock, 64, 8>;

fn work(_queue: &mut Queue, params: &[u8]) {
    black_box(params);
}

fn filled() -> Queue {
    let mut queue = Queue::new(ManualClock::new(Tick::ZERO), QueueConfig::DEFAULT);
    for i in 0..64u32 {
        // Interleaved deadlines so every insert walks part of the list
        let delay = (i * 37) % 64;
        queue.schedule(work, &i.to_le_bytes(), delay).unwrap();
    }
    queue
}

fn bench_schedule(c: &mut Criterion) {
    c.bench_function("schedule_64", |b| b.iter(|| black_box(filled())));
}

fn bench_dispatch(c: &mut Criterion) {
    c.bench_function("dispatch_64", |b| {
        b.iter_batched(
            filled,
            |mut queue| black_box(queue.dispatch(Tick::new(64))),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_schedule, bench_dispatch);
criterion_main!(benches);
