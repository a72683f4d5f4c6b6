//! The `quizgate score` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use quizgate_core::scoring::{score, ScoringInput};

pub fn execute(input: PathBuf) -> Result<()> {
    let records = super::read_records(&input)?;

    for (i, record) in records.into_iter().enumerate() {
        let question: ScoringInput = serde_json::from_value(record)
            .with_context(|| format!("record {i} is not a question"))?;
        println!("[{i}] {:.2}  {}", score(&question), preview(&question.question_text));
    }

    Ok(())
}

fn preview(text: &str) -> String {
    const MAX: usize = 60;
    if text.chars().count() > MAX {
        let cut: String = text.chars().take(MAX).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}
