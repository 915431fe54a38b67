use criterion::{criterion_group, criterion_main, Criterion};

use mortar::{Heap, HeapConfig};

fn alloc_free_churn(c: &mut Criterion) {
    let mut heap = Heap::new().unwrap();

    c.bench_function("alloc free churn", |b| {
        b.iter(|| {
            let ptr = heap.alloc(64).unwrap();
            heap.free(ptr);
        })
    });
}

fn first_fit_scan(c: &mut Criterion) {
    let mut heap = Heap::with_config(HeapConfig {
        reserve: 1 << 24,
        chunk: 1 << 16,
    })
    .unwrap();

    // A long run of live blocks so every allocation walks the heap.
    let live: Vec<_> = (0..1_000).map(|_| heap.alloc(48).unwrap()).collect();

    c.bench_function("first fit behind 1k live blocks", |b| {
        b.iter(|| {
            let ptr = heap.alloc(64).unwrap();
            heap.free(ptr);
        })
    });

    drop(live);
}

fn realloc_growth(c: &mut Criterion) {
    c.bench_function("realloc doubling", |b| {
        b.iter(|| {
            let mut heap = Heap::new().unwrap();
            let mut ptr = heap.alloc(8);

            for size in [16, 64, 256, 1024, 4096] {
                ptr = heap.realloc(ptr, size);
            }

            ptr
        })
    });
}

criterion_group!(benches, alloc_free_churn, first_fit_scan, realloc_growth);
criterion_main!(benches);
