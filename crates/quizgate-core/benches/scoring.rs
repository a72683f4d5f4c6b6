use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;

use quizgate_core::review::QuestionReviewer;
use quizgate_core::scoring::{score, ScoringInput};

fn input(text: &str, answer: &str, options: Option<&[&str]>) -> ScoringInput {
    ScoringInput {
        question_text: text.into(),
        correct_answer: answer.into(),
        options: options.map(|o| o.iter().map(|s| s.to_string()).collect()),
    }
}

fn bench_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("score");

    group.bench_function("all_bonuses", |b| {
        let q = input(
            "What is the boiling point of water at sea level?",
            "100°C",
            Some(&["90°C", "100°C", "110°C"]),
        );
        b.iter(|| score(black_box(&q)))
    });

    group.bench_function("no_bonuses", |b| {
        let q = input("Water boils.", "X", None);
        b.iter(|| score(black_box(&q)))
    });

    group.bench_function("long_text", |b| {
        let q = input(&"word ".repeat(400), "answer", Some(&["a", "b", "c", "d"]));
        b.iter(|| score(black_box(&q)))
    });

    group.finish();
}

fn bench_review(c: &mut Criterion) {
    let mut group = c.benchmark_group("review");
    let reviewer = QuestionReviewer::default();
    let question = json!({
        "questionText": "What is the primary function of mitochondria in a cell?",
        "options": [
            {"id": "A", "text": "Protein synthesis"},
            {"id": "B", "text": "ATP production"},
            {"id": "C", "text": "Cell division"},
            {"id": "D", "text": "DNA replication"}
        ],
        "correctAnswer": "B",
        "explanation": "Mitochondria produce ATP through cellular respiration."
    });
    let source = "Mitochondria are organelles that generate ATP. ".repeat(50);

    group.bench_function("without_source", |b| {
        b.iter(|| reviewer.review(black_box(&question), None, None))
    });

    group.bench_function("with_source", |b| {
        b.iter(|| reviewer.review(black_box(&question), None, Some(black_box(&source))))
    });

    group.finish();
}

criterion_group!(benches, bench_score, bench_review);
criterion_main!(benches);
