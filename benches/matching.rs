//! Compile and match benchmarks over representative patterns.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use regex_nfa::Regex;

const URL_PATTERN: &str = "https?://\\w+(\\.\\w+)+";
const QUAD_PATTERN: &str = "\\d{1,3}(\\.\\d{1,3}){3}";

fn bench_literal(c: &mut Criterion) {
    let re = Regex::new("Hello, world!").unwrap();
    c.bench_function("literal_match", |b| {
        b.iter(|| re.accept(black_box("Hello, world!")))
    });
}

fn bench_class_plus(c: &mut Criterion) {
    let re = Regex::new("[abc]+").unwrap();
    c.bench_function("class_plus_match", |b| {
        b.iter(|| re.accept(black_box("aabbabcabcbaabcba")))
    });
}

fn bench_url(c: &mut Criterion) {
    let re = Regex::new(URL_PATTERN).unwrap();
    c.bench_function("url_match", |b| {
        b.iter(|| re.accept(black_box("http://sub.example.com")))
    });
}

fn bench_dotted_quad(c: &mut Criterion) {
    let re = Regex::new(QUAD_PATTERN).unwrap();
    c.bench_function("dotted_quad_match", |b| {
        b.iter(|| re.accept(black_box("127.167.178.11")))
    });
}

fn bench_compile(c: &mut Criterion) {
    c.bench_function("compile_url", |b| {
        b.iter(|| Regex::new(black_box(URL_PATTERN)).unwrap())
    });
    c.bench_function("compile_dotted_quad", |b| {
        b.iter(|| Regex::new(black_box(QUAD_PATTERN)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_literal,
    bench_class_plus,
    bench_url,
    bench_dotted_quad,
    bench_compile
);
criterion_main!(benches);
