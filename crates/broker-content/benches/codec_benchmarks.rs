use broker_content::{EnvFile, parse_json};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn session_text(entries: usize) -> String {
    (0..entries)
        .map(|i| format!("SAP_KEY_{i}=\"value with spaces {i}\" # note\n"))
        .collect()
}

fn bench_env_parse(c: &mut Criterion) {
    let content = session_text(64);
    c.bench_function("env_parse_64_entries", |b| {
        b.iter(|| EnvFile::parse(black_box(&content), "bench.env").unwrap())
    });
}

fn bench_env_render(c: &mut Criterion) {
    let file = EnvFile::parse(&session_text(64), "bench.env").unwrap();
    c.bench_function("env_render_64_entries", |b| b.iter(|| black_box(&file).render().unwrap()));
}

fn bench_json_salvage(c: &mut Criterion) {
    let content = format!(
        "Getting key for service instance...\n{}\nOK\n",
        r#"{"credentials": {"url": "https://x.authentication.test", "clientid": "c", "clientsecret": "s"}}"#
    );
    c.bench_function("json_salvage_banner", |b| {
        b.iter(|| parse_json(black_box(&content), "bench.json").unwrap())
    });
}

criterion_group!(benches, bench_env_parse, bench_env_render, bench_json_salvage);
criterion_main!(benches);
