//! The `quizgate review` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use quizgate_core::config::QuizgateConfig;
use quizgate_core::model::Difficulty;
use quizgate_core::review::{QuestionReviewer, Verdict};

pub fn execute(
    input: PathBuf,
    source: Option<PathBuf>,
    difficulty: Option<Difficulty>,
    format: String,
    config: &QuizgateConfig,
) -> Result<()> {
    if !matches!(format.as_str(), "text" | "json") {
        anyhow::bail!("unknown format: {format} (expected text or json)");
    }

    let records = super::read_records(&input)?;
    let source_text = source
        .map(|path| {
            std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read source text: {}", path.display()))
        })
        .transpose()?;

    let reviewer = QuestionReviewer::new(config.review);
    let reviews = reviewer.review_batch(&records, difficulty, source_text.as_deref());

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&reviews)?);
        return Ok(());
    }

    for (i, review) in reviews.iter().enumerate() {
        let report = &review.report;
        println!(
            "[{i}] {} (score {:.2})",
            report.verdict, report.quality_score
        );
        for issue in &report.issues {
            println!("    - {issue}");
        }
    }

    let count = |verdict: Verdict| reviews.iter().filter(|r| r.report.verdict == verdict).count();
    println!(
        "\n{} reviewed: {} auto-approved, {} need review, {} rejected",
        reviews.len(),
        count(Verdict::AutoApproved),
        count(Verdict::NeedsReview),
        count(Verdict::Rejected)
    );

    Ok(())
}
