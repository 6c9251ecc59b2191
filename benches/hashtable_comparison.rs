use core::hash::Hash;
use core::hash::Hasher;
use core::hint::black_box;
use std::collections::HashMap as StdHashMap;

use criterion::AxisScale;
use criterion::BatchSize;
use criterion::Criterion;
use criterion::PlotConfiguration;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use hashbrown::HashMap as HashbrownHashMap;
use hashbrown::hash_table::Entry as HashbrownEntry;
use hashbrown::hash_table::HashTable as HashbrownHashTable;
use rand::Rng;
use rand::SeedableRng;
use rand::TryRngCore;
use rand::distr;
use rand::rngs::OsRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand_distr::Zipf;
use shift_hash::HashTable as ShiftHashTable;
use shift_hash::IntMap;
use siphasher::sip::SipHasher;

const SIZES: &[usize] = &[
    (1 << 10),
    (1 << 12),
    (1 << 14),
    (1 << 16),
    (1 << 18),
];

#[derive(Clone, Copy)]
enum Operation {
    Insert,
    Remove,
    Find,
}

fn random_keys(count: usize) -> Vec<i32> {
    let mut rng = OsRng;
    (0..count)
        .map(|_| rng.try_next_u32().unwrap() as i32)
        .collect()
}

fn sip_hash(key: &str) -> u64 {
    let mut hasher = SipHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}

fn bench_insert_random<const PREALLOCATE: bool>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("int_insert_random_preallocate_{PREALLOCATE}"));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES {
        let keys = random_keys(size);
        let initial = if PREALLOCATE { size } else { 0 };
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("shift_hash/{size}"), |b| {
            b.iter_batched(
                || keys.clone(),
                |keys| {
                    let mut map = IntMap::with_capacity(initial);
                    for key in keys {
                        black_box(map.insert(key, key as u64));
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || keys.clone(),
                |keys| {
                    let mut map = HashbrownHashMap::with_capacity(initial);
                    for key in keys {
                        black_box(map.insert(key, key as u64));
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("std/{size}"), |b| {
            b.iter_batched(
                || keys.clone(),
                |keys| {
                    let mut map = StdHashMap::with_capacity(initial);
                    for key in keys {
                        black_box(map.insert(key, key as u64));
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_find_hit_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("int_find_hit_miss");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES {
        // Sequential keys are the worst case for an identity hash without
        // multiplicative placement.
        let present: Vec<i32> = (0..size as i32).collect();
        let mut probes: Vec<i32> = present
            .iter()
            .map(|k| if k % 2 == 0 { *k } else { -k - size as i32 })
            .collect();
        probes.shuffle(&mut SmallRng::from_os_rng());

        let shift: IntMap<u64> = present.iter().map(|&k| (k, k as u64)).collect();
        let brown: HashbrownHashMap<i32, u64> = present.iter().map(|&k| (k, k as u64)).collect();
        let std: StdHashMap<i32, u64> = present.iter().map(|&k| (k, k as u64)).collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("shift_hash/{size}"), |b| {
            b.iter(|| {
                for &key in &probes {
                    black_box(shift.get(key));
                }
            })
        });
        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                for key in &probes {
                    black_box(brown.get(key));
                }
            })
        });
        group.bench_function(format!("std/{size}"), |b| {
            b.iter(|| {
                for key in &probes {
                    black_box(std.get(key));
                }
            })
        });
    }

    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("int_remove");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES {
        let keys = random_keys(size);
        let mut order = keys.clone();
        order.shuffle(&mut SmallRng::from_os_rng());

        let shift: IntMap<u64> = keys.iter().map(|&k| (k, k as u64)).collect();
        let brown: HashbrownHashMap<i32, u64> = keys.iter().map(|&k| (k, k as u64)).collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("shift_hash/{size}"), |b| {
            b.iter_batched(
                || shift.clone(),
                |mut map| {
                    for &key in &order {
                        black_box(map.remove(key));
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });
        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || brown.clone(),
                |mut map| {
                    for key in &order {
                        black_box(map.remove(key));
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("int_iteration");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES {
        let keys = random_keys(size);
        let shift: IntMap<u64> = keys.iter().map(|&k| (k, k as u64)).collect();
        let brown: HashbrownHashMap<i32, u64> = keys.iter().map(|&k| (k, k as u64)).collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("shift_hash/{size}"), |b| {
            b.iter(|| black_box(shift.values().sum::<u64>()))
        });
        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| black_box(brown.values().sum::<u64>()))
        });
    }

    group.finish();
}

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("int_churn");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES {
        // Every key appears twice: inserted on first sight, removed on second.
        let mut keys = random_keys(size);
        keys.extend_from_within(..);
        keys.shuffle(&mut SmallRng::from_os_rng());

        group.throughput(Throughput::Elements(keys.len() as u64));
        group.bench_function(format!("shift_hash/{size}"), |b| {
            b.iter(|| {
                let mut map = IntMap::with_capacity(0);
                for &key in &keys {
                    if map.remove(key).is_none() {
                        map.insert(key, key);
                    }
                }
                black_box(map)
            })
        });
        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                let mut map = HashbrownHashMap::with_capacity(0);
                for &key in &keys {
                    if map.remove(&key).is_none() {
                        map.insert(key, key);
                    }
                }
                black_box(map)
            })
        });
    }

    group.finish();
}

fn bench_mixed_probabilistic_zipf(c: &mut Criterion) {
    for exponent in [1.0, 1.3] {
        let mut group = c.benchmark_group(format!("int_mixed_probabilistic_zipf_{exponent:.01}"));
        group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

        const KEY_SPACE_MULTIPLIER: f32 = 2.0;

        for &size in SIZES {
            let mut rng = SmallRng::from_os_rng();
            let operations = (0..size * 3)
                .map(|_| {
                    let op_choice: f64 = rng.sample(distr::Uniform::new(0.0, 1.0).unwrap());
                    if op_choice < 0.5 {
                        Operation::Find
                    } else if op_choice < 0.75 {
                        Operation::Insert
                    } else {
                        Operation::Remove
                    }
                })
                .collect::<Vec<Operation>>();

            let key_distr = Zipf::new(size as f32 * KEY_SPACE_MULTIPLIER - 1.0, exponent).unwrap();
            let keys = (0..operations.len())
                .map(|_| rng.sample(key_distr) as i32)
                .collect::<Vec<i32>>();

            group.throughput(Throughput::Elements(operations.len() as u64));
            group.bench_function(format!("shift_hash/{size}"), |b| {
                b.iter(|| {
                    let mut map = IntMap::with_capacity(0);
                    for (operation, &key) in operations.iter().zip(&keys) {
                        match operation {
                            Operation::Insert => {
                                black_box(map.insert(key, key));
                            }
                            Operation::Remove => {
                                black_box(map.remove(key));
                            }
                            Operation::Find => {
                                black_box(map.get(key));
                            }
                        }
                    }
                    black_box(map)
                })
            });
            group.bench_function(format!("hashbrown/{size}"), |b| {
                b.iter(|| {
                    let mut map = HashbrownHashMap::with_capacity(0);
                    for (operation, &key) in operations.iter().zip(&keys) {
                        match operation {
                            Operation::Insert => {
                                black_box(map.insert(key, key));
                            }
                            Operation::Remove => {
                                black_box(map.remove(&key));
                            }
                            Operation::Find => {
                                black_box(map.get(&key));
                            }
                        }
                    }
                    black_box(map)
                })
            });
        }

        group.finish();
    }
}

fn bench_table_string_keys(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_collect_find_string_keys");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES {
        let hash_and_key = (0..size as u64)
            .map(|i| {
                let key = format!("key_{:016X}", i);
                (sip_hash(&key), key)
            })
            .collect::<Vec<(u64, String)>>();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("shift_hash/{size}"), |b| {
            b.iter_batched(
                || hash_and_key.clone(),
                |hash_and_key| {
                    let mut table = ShiftHashTable::<String, u64>::with_capacity(0);
                    for (hash, key) in hash_and_key.iter().cloned() {
                        match table.entry(hash, |k| *k == key, |k| sip_hash(k)) {
                            shift_hash::hash_table::Entry::Vacant(entry) => {
                                entry.insert(key, hash);
                            }
                            shift_hash::hash_table::Entry::Occupied(_) => unreachable!(),
                        }
                    }

                    for (hash, key) in &hash_and_key {
                        black_box(table.find(*hash, |k| k == key));
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || hash_and_key.clone(),
                |hash_and_key| {
                    let mut table = HashbrownHashTable::<(String, u64)>::with_capacity(0);
                    for (hash, key) in hash_and_key.iter().cloned() {
                        match table.entry(hash, |(k, _)| *k == key, |(k, _)| sip_hash(k)) {
                            HashbrownEntry::Vacant(entry) => {
                                entry.insert((key, hash));
                            }
                            HashbrownEntry::Occupied(_) => unreachable!(),
                        }
                    }

                    for (hash, key) in &hash_and_key {
                        black_box(table.find(*hash, |(k, _)| k == key));
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_insert_random::<false>,
    bench_insert_random::<true>,
    bench_find_hit_miss,
    bench_remove,
    bench_iteration,
    bench_churn,
    bench_mixed_probabilistic_zipf,
    bench_table_string_keys,
);

criterion_main!(benches);
