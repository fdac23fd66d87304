// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::hint::black_box;
use stowage_engine::{
    assign::AutoAssigner, journal::ChangeJournal, monitor::no_op::NoOperationMonitor,
    optimize::SequenceOptimizer,
};
use stowage_model::{
    index::{OrderId, PalletId},
    ledger::PalletLedger,
    pallet::Pallet,
};

const CAPACITY: f64 = 13.6;
const LENGTHS: [f64; 4] = [0.8, 1.2, 1.6, 2.4];

/// Builds an order of `num_pallets` pallets spread over groups of one to eight pallets.
fn random_ledger(rng: &mut StdRng, num_pallets: usize) -> PalletLedger {
    let mut pallets = Vec::with_capacity(num_pallets);
    let mut group = 0;
    while pallets.len() < num_pallets {
        let size = rng.random_range(1..=8).min(num_pallets - pallets.len());
        for _ in 0..size {
            let id = pallets.len() as u64 + 1;
            let length = LENGTHS[rng.random_range(0..LENGTHS.len())];
            pallets.push(
                Pallet::new(
                    PalletId::new(id),
                    OrderId::new(1),
                    format!("LSA-{}", group),
                    length,
                    rng.random_range(50.0..900.0),
                    id as i64,
                )
                .expect("generated pallet should be valid"),
            );
        }
        group += 1;
    }
    PalletLedger::from_pallets(OrderId::new(1), 3, pallets).expect("generated ledger should be valid")
}

fn bench_lane_passes(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let mut group = c.benchmark_group("lane_passes");

    for num_pallets in [16usize, 33, 64, 256] {
        let ledger = random_ledger(&mut rng, num_pallets);
        group.throughput(Throughput::Elements(num_pallets as u64));

        group.bench_with_input(
            BenchmarkId::new("optimize", num_pallets),
            &ledger,
            |b, ledger| {
                let optimizer = SequenceOptimizer::new(CAPACITY);
                let mut journal = ChangeJournal::preallocated(ledger.len());
                b.iter(|| {
                    let mut ledger = ledger.clone();
                    journal.clear();
                    let report = optimizer.optimize(
                        black_box(&mut ledger),
                        &mut journal,
                        &mut NoOperationMonitor,
                    );
                    black_box(report);
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("auto_assign", num_pallets),
            &ledger,
            |b, ledger| {
                let assigner = AutoAssigner::new(CAPACITY);
                let mut journal = ChangeJournal::preallocated(ledger.len());
                b.iter(|| {
                    let mut ledger = ledger.clone();
                    journal.clear();
                    let report =
                        assigner.assign(black_box(&mut ledger), &mut journal, &mut NoOperationMonitor);
                    black_box(report);
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_lane_passes);
criterion_main!(benches);
