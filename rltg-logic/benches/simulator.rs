use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rltg_logic::{Alphabet, ExplicitDfa, PartialAutomatonSimulator, ShapingConfig};

const SYMBOLS: [&str; 6] = ["r0", "r1", "r2", "r3", "r4", "r5"];

fn bench_make_transition(c: &mut Criterion) {
    c.bench_function("make_transition_fresh_episode", |b| {
        b.iter(|| {
            let mut sim = PartialAutomatonSimulator::new(
                ExplicitDfa::sequence(SYMBOLS, true),
                Alphabet::new(SYMBOLS),
                ShapingConfig::default(),
            )
            .unwrap();
            let mut total = 0.0;
            for symbol in SYMBOLS {
                total += sim.make_transition([symbol]);
            }
            black_box(total)
        });
    });

    let mut warm = PartialAutomatonSimulator::new(
        ExplicitDfa::sequence(SYMBOLS, true),
        Alphabet::new(SYMBOLS),
        ShapingConfig::default(),
    )
    .unwrap();
    for symbol in SYMBOLS {
        warm.make_transition([symbol]);
    }
    c.bench_function("make_transition_known_structure", |b| {
        b.iter(|| {
            warm.reset();
            let mut total = 0.0;
            for symbol in SYMBOLS {
                total += warm.make_transition([symbol]);
            }
            black_box(total)
        });
    });
}

criterion_group!(benches, bench_make_transition);
criterion_main!(benches);
