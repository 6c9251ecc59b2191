use clap::Parser;
use clap::ValueEnum;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use shift_hash::IntMap;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KeyPattern {
    /// 0, 1, 2, ...
    Sequential,
    /// Multiples of the stride.
    Strided,
    /// Uniformly random `i32` keys.
    Random,
}

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    #[arg(short = 'l', long = "load_factor", default_value_t = 0.8)]
    load_factor: f32,

    #[arg(short = 'p', long = "pattern", value_enum, default_value_t = KeyPattern::Random)]
    pattern: KeyPattern,

    #[arg(short = 's', long = "stride", default_value_t = 1024)]
    stride: i32,

    /// Fraction of inserted keys to remove again before printing.
    #[arg(short = 'r', long = "remove_fraction", default_value_t = 0.0)]
    remove_fraction: f64,
}

fn main() {
    let args = Args::parse();

    println!(
        "Creating IntMap with target capacity {} and load factor {}",
        args.target_capacity, args.load_factor
    );

    let mut map: IntMap<u64> =
        match IntMap::with_capacity_and_load_factor(args.target_capacity, args.load_factor) {
            Ok(map) => map,
            Err(error) => {
                eprintln!("Cannot create map: {error}");
                std::process::exit(1);
            }
        };

    println!("Actual capacity: {}", map.capacity());
    println!("Filling map with {:?} keys...", args.pattern);

    let mut rng = SmallRng::from_os_rng();
    let keys = (0..args.target_capacity)
        .map(|i| match args.pattern {
            KeyPattern::Sequential => i as i32,
            KeyPattern::Strided => (i as i32).wrapping_mul(args.stride),
            KeyPattern::Random => rng.random::<i32>(),
        })
        .collect::<Vec<i32>>();

    for &key in &keys {
        map.insert(key, key as u64);
    }

    let mut removed = 0;
    for &key in &keys {
        if rng.random_bool(args.remove_fraction.clamp(0.0, 1.0)) && map.remove(key).is_some() {
            removed += 1;
        }
    }

    println!(
        "Inserted {} distinct keys, removed {}, {} remain",
        map.len() + removed,
        removed,
        map.len()
    );
    println!("Final capacity: {}", map.capacity());
    println!(
        "Final load factor: {:.2}%",
        (map.len() as f64 / map.capacity() as f64) * 100.0
    );

    map.probe_histogram().print();
    map.debug_stats().print();
}
