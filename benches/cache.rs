use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use lru_cache_engine::LruCache;

fn new_cache(max_entries: usize) -> LruCache<Vec<u8>> {
    LruCache::builder()
        .max_entries(max_entries)
        .size_hook(|v: &Vec<u8>| v.len())
        .destroy_hook(drop)
        .build()
        .unwrap()
}

fn bench_get_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("get_1kb_hit", |b| {
        let cache = new_cache(4096);
        let data = vec![b'x'; 1024];
        let keys: Vec<String> = (0..1000).map(|i| format!("key-{}", i)).collect();
        for key in &keys {
            cache.set(key, data.clone()).unwrap();
        }

        let mut counter = 0;
        b.iter(|| {
            black_box(cache.get(&keys[counter % keys.len()]).unwrap().map(|v| v.len()));
            counter += 1;
        });
    });

    group.finish();
}

fn bench_set_with_eviction(c: &mut Criterion) {
    let mut group = c.benchmark_group("set");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("set_evicting", |b| {
        let cache = new_cache(128);
        let data = vec![b'x'; 256];

        let mut counter = 0u64;
        b.iter(|| {
            let key = format!("key-{}", counter);
            black_box(cache.set(&key, data.clone()).unwrap());
            counter += 1;
        });
    });

    group.finish();
}

fn bench_mixed_50_50(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixed");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("50_read_50_write", |b| {
        let cache = new_cache(1024);
        let data = vec![b'x'; 512];
        let keys: Vec<String> = (0..512).map(|i| format!("key-{}", i)).collect();
        for key in &keys {
            cache.set(key, data.clone()).unwrap();
        }

        let mut counter = 0usize;
        b.iter(|| {
            let key = &keys[counter % keys.len()];
            if counter % 2 == 0 {
                black_box(cache.get(key).unwrap().is_some());
            } else {
                black_box(cache.set(key, data.clone()).unwrap());
            }
            counter += 1;
        });
    });

    group.finish();
}

criterion_group!(benches, bench_get_hit, bench_set_with_eviction, bench_mixed_50_50);
criterion_main!(benches);
