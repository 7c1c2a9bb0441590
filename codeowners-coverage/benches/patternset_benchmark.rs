use codeowners_coverage::{coverage, FileList, Options, PatternList, Syntax};
use criterion::{criterion_group, criterion_main, Criterion};

const TEST_PATHS: &[&str] = &[
    "file-a",
    "dir-a/file-a",
    "dir-a/dir-c/file-a",
    "dir-a/dir-c/file-b",
    "dir-b/file-a",
    "dir-b/dir-d/dir-e/dir-f/dir-g/file-a",
];

const TEST_PATTERNS: &[&str] = &[
    "*",
    "*-a",
    "file-*",
    "/dir-b",
    "dir-a/dir-b",
    "**/dir-*/file-*",
    "dir-*/*",
    "dir-b/dir-d/dir-e/dir-f/dir-g/file-a",
];

fn pattern_list(patterns: &[&str]) -> PatternList {
    let mut list = PatternList::new(Syntax::Glob);
    list.extend(patterns.iter().copied());
    list
}

fn patternset_benchmark(c: &mut Criterion) {
    c.bench_function("building", |b| {
        b.iter(|| pattern_list(TEST_PATTERNS).compile().unwrap())
    });

    let patternset = pattern_list(TEST_PATTERNS).compile().unwrap();
    c.bench_function("expanding", |b| b.iter(|| patternset.expand(TEST_PATHS)));

    let files = FileList::new(TEST_PATHS.iter().copied());
    let manifest = TEST_PATTERNS.join(" @owner\n");
    let options = Options {
        ignore_default: true,
        ..Default::default()
    };
    c.bench_function("reconciling", |b| {
        b.iter(|| coverage::reconcile(&files, &manifest, None, &options).unwrap())
    });
}

criterion_group!(benches, patternset_benchmark);
criterion_main!(benches);
