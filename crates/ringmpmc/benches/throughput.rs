use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ringmpmc::RingQueue;
use std::sync::Arc;
use std::thread;

const MSG_PER_PRODUCER: u64 = 1_000_000;

fn bench_spsc(c: &mut Criterion) {
    let mut group = c.benchmark_group("spsc");
    group.throughput(Throughput::Elements(MSG_PER_PRODUCER));

    group.bench_function("single_producer_consumer", |b| {
        b.iter(|| {
            let queue = Arc::new(RingQueue::<u64>::with_capacity(4096).unwrap());

            let producer = {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    for i in 0..MSG_PER_PRODUCER {
                        queue.push(i);
                    }
                })
            };

            for _ in 0..MSG_PER_PRODUCER {
                black_box(queue.pop());
            }

            producer.join().unwrap();
        });
    });

    group.finish();
}

fn bench_mpmc(c: &mut Criterion) {
    let mut group = c.benchmark_group("mpmc");

    for threads in [2usize, 4].iter() {
        let total = MSG_PER_PRODUCER * (*threads as u64);
        group.throughput(Throughput::Elements(total));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{threads}P_{threads}C")),
            threads,
            |b, &n| {
                b.iter(|| {
                    let queue = Arc::new(RingQueue::<u64>::with_capacity(4096).unwrap());

                    let producers: Vec<_> = (0..n)
                        .map(|_| {
                            let queue = Arc::clone(&queue);
                            thread::spawn(move || {
                                for i in 0..MSG_PER_PRODUCER {
                                    queue.push(i);
                                }
                            })
                        })
                        .collect();

                    let consumers: Vec<_> = (0..n)
                        .map(|_| {
                            let queue = Arc::clone(&queue);
                            thread::spawn(move || {
                                for _ in 0..MSG_PER_PRODUCER {
                                    black_box(queue.pop());
                                }
                            })
                        })
                        .collect();

                    for handle in producers {
                        handle.join().unwrap();
                    }
                    for handle in consumers {
                        handle.join().unwrap();
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_spsc, bench_mpmc);
criterion_main!(benches);
