//! The `quizgate init` command.

use std::path::Path;

use anyhow::{Context, Result};

pub fn execute() -> Result<()> {
    write_once(Path::new("quizgate.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("samples").context("failed to create samples/")?;
    write_once(Path::new("samples/questions.json"), SAMPLE_QUESTIONS)?;

    println!("\nNext steps:");
    println!("  1. Adjust the review thresholds in quizgate.toml");
    println!("  2. Run: quizgate review --input samples/questions.json");
    println!("  3. Run: quizgate schemas --name CreateQuestion");

    Ok(())
}

fn write_once(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizgate configuration

# Default tracing filter; RUST_LOG takes precedence.
log_filter = "quizgate=info"

[review]
# Questions scoring below this are rejected.
min_quality_score = 0.4
# Valid questions at or above this skip human review.
auto_approve_score = 0.6
"#;

const SAMPLE_QUESTIONS: &str = r#"[
  {
    "questionText": "What is the primary function of mitochondria in a cell?",
    "options": [
      {"id": "A", "text": "Protein synthesis"},
      {"id": "B", "text": "ATP production"},
      {"id": "C", "text": "Cell division"},
      {"id": "D", "text": "DNA replication"}
    ],
    "correctAnswer": "B",
    "explanation": "Mitochondria are the site of cellular respiration, where most ATP production happens.",
    "difficulty": "easy"
  },
  {
    "questionText": "Which of these is not an organelle",
    "options": [
      {"id": "A", "text": "Nucleus"},
      {"id": "B", "text": "Ribosome"},
      {"id": "C", "text": "Nucleus"},
      {"id": "D", "text": "All of the above"}
    ],
    "correctAnswer": "D",
    "explanation": "Short."
  }
]
"#;
