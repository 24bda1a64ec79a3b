use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sflz::{ar::Store, compress::Pipeline};

const LOREMIPSUM: &str = include_str!("./loremipsum.txt");

fn pipeline(c: &mut Criterion) {
    c.bench_function("Pipeline compress", move |b| {
        b.iter(|| black_box(Pipeline::default().compress(black_box(LOREMIPSUM)).unwrap()))
    });

    let compressed = Pipeline::default().compress(LOREMIPSUM).unwrap();
    c.bench_function("Pipeline decompress", move |b| {
        b.iter(|| {
            black_box(
                Pipeline::default()
                    .decompress(black_box(&compressed.tokens), &compressed.table)
                    .unwrap(),
            )
        })
    });

    c.bench_function("Store encode and decode", move |b| {
        b.iter_with_setup(
            || tempfile::tempdir().unwrap(),
            |dir| {
                let store = Store::new(dir.path());
                let pipeline = Pipeline::default();
                store.save_encoded(&pipeline.compress(LOREMIPSUM).unwrap()).unwrap();
                let (tokens, table) = black_box(store.load_encoded()).unwrap();
                let decompressed = pipeline.decompress(&tokens, &table).unwrap();
                store.save_decoded(&tokens, &decompressed).unwrap();
            },
        )
    });
}

criterion_group!(benches, pipeline);
criterion_main!(benches);
