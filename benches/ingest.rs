use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use xmlrecords::{ArticleReport, ArticleSchema, MoleculeReport, MoleculeSchema, Parser};

const ARTICLES: &str = include_str!("../tests/articles.xml");
const MOLECULES: &str = include_str!("../tests/molecules.xml");

/// Repeat the records of a collection so the document is large enough to measure.
fn scale(src: &str, root: &str, copies: usize) -> String {
    let open = format!("<{root}");
    let close = format!("</{root}>");
    let (Some(start), Some(end)) = (src.find(&open), src.rfind(&close)) else {
        panic!("fixture has no <{root}> element");
    };
    let body_start = start + src[start..].find('>').unwrap() + 1;

    let mut out = String::from(&src[..body_start]);
    for _ in 0..copies {
        out.push_str(&src[body_start..end]);
    }
    out.push_str(&src[end..]);
    out
}

fn parse_articles(src: &str) -> ArticleReport {
    Parser::<ArticleSchema>::default().report_str(src).unwrap()
}

fn parse_molecules(src: &str) -> MoleculeReport {
    Parser::<MoleculeSchema>::default().report_str(src).unwrap()
}

fn criterion_benchmark(c: &mut Criterion) {
    let articles = scale(ARTICLES, "articles", 500);
    let molecules = scale(MOLECULES, "molecules", 500);

    c.bench_function("articles", |b| b.iter(|| parse_articles(black_box(&articles))));

    c.bench_function("molecules", |b| {
        b.iter(|| parse_molecules(black_box(&molecules)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
