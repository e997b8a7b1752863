use std::fs;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trove_journal::ReverseLineReader;

fn journal_text(transactions: usize) -> String {
    let mut text = String::new();
    for i in 0..transactions {
        text.push_str("BEGIN # 2017-02-16T11:15:03Z\n");
        text.push_str(&format!(
            "A <trellis:repository/resource> <http://purl.org/dc/terms/title> \"title {i}\" \
             <http://www.trellisldp.org/ns/trellis#PreferUserManaged> .\n"
        ));
        text.push_str("END # 2017-02-16T11:15:03Z\n");
    }
    text
}

fn reverse_scan(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("resource.rdfp");
    fs::write(&path, journal_text(10_000)).unwrap();

    let mut group = c.benchmark_group("reverse_scan");
    for block_size in [512usize, 4096, 65536] {
        group.bench_with_input(BenchmarkId::from_parameter(block_size), &block_size, |b, &size| {
            b.iter(|| {
                let file = fs::File::open(&path).unwrap();
                let reader = ReverseLineReader::new(file, size).unwrap();
                black_box(reader.map(Result::unwrap).count())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, reverse_scan);
criterion_main!(benches);
