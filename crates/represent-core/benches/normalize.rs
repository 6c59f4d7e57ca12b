use criterion::{black_box, criterion_group, criterion_main, Criterion};

use represent_core::{clean_address, clean_contact, clean_string, clean_telephone_number, RawContact};

fn bench_normalize(c: &mut Criterion) {
    c.bench_function("clean_string", |b| {
        b.iter(|| clean_string(black_box("  Ward\u{200B}  7 \n  Councillor\u{2019}s  office ")))
    });

    c.bench_function("clean_telephone_number", |b| {
        b.iter(|| clean_telephone_number(black_box("(416) 555-1234 poste 221")))
    });

    c.bench_function("clean_address", |b| {
        b.iter(|| clean_address(black_box("PO Box 1617, Halifax, Nova Scotia B3J 2Y3")))
    });

    let raw = RawContact::new("Téléphone (bureau)", "514 555-0100", None);
    c.bench_function("clean_contact", |b| b.iter(|| clean_contact(black_box(&raw))));
}

criterion_group!(benches, bench_normalize);
criterion_main!(benches);
