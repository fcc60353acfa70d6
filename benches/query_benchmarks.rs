use criterion::{Criterion, black_box, criterion_group, criterion_main};

use socorro::data::query::{collate, find_record, list_categories, list_sub_categories};
use socorro::data::record::Record;
use socorro::data::store::Dataset;
use socorro::video::youtube_id;

const CATEGORIES: &[&str] = &[
    "QUEIMADURA",
    "ENGASGO",
    "RCP_ADULTO",
    "ÓLEO_QUENTE",
    "AFOGAMENTO",
    "PICADA_DE_COBRA",
    "AULA_PRIMEIROS_SOCORROS",
    "ELETROCUSSÃO",
];

fn make_dataset(rows: usize) -> Dataset {
    let langs = ["PT", "ES", "EN"];
    Dataset::new(
        (0..rows)
            .map(|i| {
                Record::new(
                    langs[i % langs.len()],
                    CATEGORIES[i % CATEGORIES.len()],
                    &format!("Passo {}", i % 12),
                    "<b>Mantenha a calma</b> e ligue 192",
                )
            })
            .collect(),
    )
}

fn bench_categories(c: &mut Criterion) {
    let dataset = make_dataset(2000);

    c.bench_function("list_categories (2000 records)", |b| {
        b.iter(|| list_categories(black_box(&dataset), black_box("PT")))
    });

    c.bench_function("list_sub_categories (2000 records)", |b| {
        b.iter(|| list_sub_categories(black_box(&dataset), black_box("PT"), black_box("ENGASGO")))
    });
}

fn bench_lookup(c: &mut Criterion) {
    let dataset = make_dataset(2000);

    c.bench_function("find_record miss (2000 records)", |b| {
        b.iter(|| find_record(black_box(&dataset), "EN", "QUEIMADURA", black_box("Passo 99")))
    });
}

fn bench_collate(c: &mut Criterion) {
    c.bench_function("collate accented pair", |b| {
        b.iter(|| collate(black_box("ELETROCUSSÃO"), black_box("eletrocussao")))
    });
}

fn bench_video_id(c: &mut Criterion) {
    c.bench_function("youtube_id watch url", |b| {
        b.iter(|| youtube_id(black_box("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ")))
    });
}

criterion_group!(
    benches,
    bench_categories,
    bench_lookup,
    bench_collate,
    bench_video_id
);
criterion_main!(benches);
