use criterion::{black_box, criterion_group, criterion_main, Criterion};

use jackc::prelude::*;

fn criterion_benchmark(c: &mut Criterion) {
    let source_code = include_str!("../tests/Point.jack");

    c.bench_function("compile point", |b| {
        b.iter(|| {
            let lexer = Lexer::new(black_box(source_code));
            black_box(CompilationEngine::new(lexer, CompilerConf::default()).compile_class())
        })
    });

    c.bench_function("compile average to text", |b| {
        b.iter(|| black_box(jackc::compile(black_box(include_str!("../tests/Average.jack")))))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
