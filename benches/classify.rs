//! Benchmarks for intent classification and keyword resolution.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use voxroute::config::AssistantConfig;
use voxroute::nlu::{IntentClassifier, IntentEngine, IntentTable};
use voxroute::plugin::CommandRegistry;
use voxroute::plugin::builtin::default_plugins;

const UTTERANCES: &[&str] = &[
    "코드를 정리해줘",
    "git push 해줘",
    "xyzzy plugh qwerty",
    "main.py 클래스 리팩토링",
    "안녕 반가워",
];

fn bench_classify(c: &mut Criterion) {
    let classifier = IntentClassifier::new(&IntentTable::defaults());

    c.bench_function("classify_defaults", |bench| {
        bench.iter(|| {
            for text in UTTERANCES {
                black_box(classifier.classify(black_box(text)));
            }
        })
    });
}

fn bench_analyze(c: &mut Criterion) {
    let mut engine = IntentEngine::new(IntentTable::defaults(), Some(0));

    c.bench_function("analyze_defaults", |bench| {
        bench.iter(|| {
            for text in UTTERANCES {
                black_box(engine.analyze(black_box(text)));
            }
        })
    });
}

fn bench_resolve(c: &mut Criterion) {
    let config = AssistantConfig::default();
    let registry = CommandRegistry::from_plugins(default_plugins(&config), config.keyword_matching);

    c.bench_function("resolve_keywords", |bench| {
        bench.iter(|| {
            for text in UTTERANCES {
                black_box(registry.resolve(black_box(text)));
            }
        })
    });
}

fn bench_learned_table(c: &mut Criterion) {
    let mut table = IntentTable::defaults();
    for i in 0..200 {
        table.add_pattern(&format!("intent{}", i % 20), &format!("phrase {i}")).unwrap();
    }
    let classifier = IntentClassifier::new(&table);

    c.bench_function("classify_large_table", |bench| {
        bench.iter(|| black_box(classifier.classify(black_box("phrase 150 please"))))
    });
}

criterion_group!(
    benches,
    bench_classify,
    bench_analyze,
    bench_resolve,
    bench_learned_table
);
criterion_main!(benches);
