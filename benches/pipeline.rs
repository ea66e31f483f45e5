use std::time::Instant;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};

use recordcache::{
    ModelDefinition, Record, RecordCache, RecordIdentity, RecordOperation, RelationshipDefinition, Schema,
};

fn blog_schema() -> Schema {
    Schema::builder()
        .model(
            "article",
            ModelDefinition::new()
                .attribute("title", "string")
                .relationship("author", RelationshipDefinition::has_one("author").with_inverse("articles")),
        )
        .model(
            "author",
            ModelDefinition::new()
                .relationship("articles", RelationshipDefinition::has_many("article").with_inverse("author")),
        )
        .build()
        .unwrap()
}

fn make_cache_with_data() -> RecordCache {
    let mut cache = RecordCache::new(blog_schema());

    // Seed authors and articles so inverse maintenance does realistic lookups.
    for i in 0..64u32 {
        cache
            .patch(RecordOperation::add_record(Record::new("author", i.to_string())))
            .unwrap();
    }
    for i in 0..256u32 {
        cache
            .patch(RecordOperation::add_record(
                Record::new("article", i.to_string()).with_attribute("title", format!("article {i}")),
            ))
            .unwrap();
    }
    cache
}

fn bench_replace_attribute(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.throughput(Throughput::Elements(1));

    group.bench_function("replace_attribute", |b| {
        b.iter_custom(|iters| {
            let mut cache = make_cache_with_data();
            let target = RecordIdentity::new("article", "7");

            let start = Instant::now();
            for i in 0..iters {
                cache
                    .patch(RecordOperation::replace_attribute(target.clone(), "title", i))
                    .unwrap();
            }
            start.elapsed()
        })
    });

    group.finish();
}

fn bench_inverse_reassign(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.throughput(Throughput::Elements(1));

    group.bench_function("reassign_author", |b| {
        b.iter_custom(|iters| {
            // Fresh state per sample so to-many sets do not grow between samples.
            let mut cache = make_cache_with_data();

            let start = Instant::now();
            for i in 0..iters {
                let article = RecordIdentity::new("article", (i % 256).to_string());
                let author = RecordIdentity::new("author", (i % 64).to_string());
                cache
                    .patch(RecordOperation::replace_related_record(article, "author", Some(author)))
                    .unwrap();
            }
            start.elapsed()
        })
    });

    group.finish();
}

fn bench_rejected(c: &mut Criterion) {
    c.bench_function("pipeline/rejected_unknown_model", |b| {
        let mut cache = make_cache_with_data();
        b.iter(|| {
            let err = cache
                .patch(RecordOperation::add_record(Record::new("comment", "9")))
                .unwrap_err();
            assert!(err.is_schema_violation());
        })
    });
}

criterion_group!(pipeline, bench_replace_attribute, bench_inverse_reassign, bench_rejected);
criterion_main!(pipeline);
