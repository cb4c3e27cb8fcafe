//! Benchmarks for token issue/verify hot paths

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use datapolis_auth_core::{AuthConfig, TokenIssuer, TokenVerifier};
use datapolis_types::{Identity, Role, UserId};

fn identity() -> Identity {
    Identity {
        id: UserId(42),
        username: "bench-user".to_string(),
        role: Role::User,
    }
}

fn bench_issue(c: &mut Criterion) {
    let config = AuthConfig::new("bench-access-secret", "bench-refresh-secret");
    let issuer = TokenIssuer::new(&config);
    let identity = identity();

    let mut group = c.benchmark_group("token_issue");

    group.bench_function("access", |b| {
        b.iter(|| issuer.issue_access_token(black_box(&identity)));
    });

    // Includes reading 16 bytes from the OS RNG
    group.bench_function("refresh", |b| {
        b.iter(|| issuer.issue_refresh_token(black_box(&identity)));
    });

    group.bench_function("pair", |b| {
        b.iter(|| issuer.issue_token_pair(black_box(&identity)));
    });

    group.finish();
}

fn bench_verify(c: &mut Criterion) {
    let config = AuthConfig::new("bench-access-secret", "bench-refresh-secret");
    let pair = TokenIssuer::new(&config)
        .issue_token_pair(&identity())
        .unwrap();
    let verifier = TokenVerifier::new(&config);

    let mut group = c.benchmark_group("token_verify");

    group.bench_function("access_valid", |b| {
        b.iter(|| verifier.verify_access_token(black_box(&pair.access_token)));
    });

    group.bench_function("refresh_valid", |b| {
        b.iter(|| verifier.verify_refresh_token(black_box(&pair.refresh_token)));
    });

    // Rejection path: wrong key class
    group.bench_function("access_invalid", |b| {
        b.iter(|| verifier.verify_access_token(black_box(&pair.refresh_token)));
    });

    group.finish();
}

criterion_group!(benches, bench_issue, bench_verify);
criterion_main!(benches);
