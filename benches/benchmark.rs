use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use gedcore::date::DateValue;
use gedcore::enums::Sex;
use gedcore::interface::NullProgress;
use gedcore::matching::{MatchParams, Matcher};
use gedcore::record::RecordType;
use gedcore::tree::Document;

const SURNAMES: [&str; 5] = ["Ivanov", "Petrov", "Sokolov", "Dubov", "Fedoroff"];
const NAMES: [&str; 4] = ["Ivan", "Petr", "Anna", "Maria"];

fn populate(n: usize) -> Document {
    let mut document = Document::new();
    for i in 0..n {
        let sex = if i % 2 == 0 { Sex::Male } else { Sex::Female };
        let individual = document.create_individual_with(NAMES[i % NAMES.len()], SURNAMES[i % SURNAMES.len()], "", sex);
        let birth = format!("{} JAN {}", 1 + i % 28, 1800 + i % 200);
        individual.add_event("BIRT", "", &birth, "Moscow");
    }
    document
}

fn criterion_benchmark(c: &mut Criterion) {
    let document = populate(1000);
    let text = document.to_gedcom_string();
    println!("{} records, {} bytes", document.len(), text.len());
    c.bench_function("serialize 1k", |b| b.iter(|| black_box(document.to_gedcom_string())));
    c.bench_function("parse 1k", |b| {
        b.iter(|| Document::parse_str(black_box(&text)).map(|d| d.len()))
    });

    c.bench_function("date parse", |b| {
        b.iter(|| DateValue::parse(black_box("BET @#DJULIAN@ 5 OCT 1582 AND 20 DEC 1600")))
    });
    let date = DateValue::parse("@#DHEBREW@ 1 TSH 5774").unwrap();
    c.bench_function("date udn", |b| b.iter(|| black_box(&date).udn()));

    let small = populate(200);
    let params = MatchParams::default();
    let matcher = Matcher::within(&small, &params);
    c.bench_function("duplicates 200", |b| {
        b.iter(|| matcher.find_duplicates(RecordType::Individual, 50.0, &mut NullProgress).len())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
