//! quizgate configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::review::ReviewThresholds;

/// Top-level quizgate configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizgateConfig {
    /// Cut-offs for the staged question review.
    #[serde(default)]
    pub review: ReviewThresholds,
    /// Default tracing filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    "quizgate=info".to_string()
}

impl Default for QuizgateConfig {
    fn default() -> Self {
        Self {
            review: ReviewThresholds::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl QuizgateConfig {
    /// Reject thresholds that could never produce a sensible verdict.
    pub fn check(&self) -> Result<()> {
        let ReviewThresholds {
            min_quality_score,
            auto_approve_score,
        } = self.review;
        for (name, value) in [
            ("min_quality_score", min_quality_score),
            ("auto_approve_score", auto_approve_score),
        ] {
            if !(0.0..=1.0).contains(&value) {
                anyhow::bail!("review.{name} must be within [0, 1], got {value}");
            }
        }
        if auto_approve_score < min_quality_score {
            anyhow::bail!(
                "review.auto_approve_score ({auto_approve_score}) must not be below \
                 review.min_quality_score ({min_quality_score})"
            );
        }
        Ok(())
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizgate.toml` in the current directory
/// 2. `~/.config/quizgate/config.toml`
///
/// Environment variable overrides: `QUIZGATE_MIN_QUALITY_SCORE`,
/// `QUIZGATE_AUTO_APPROVE_SCORE`, `QUIZGATE_LOG`.
pub fn load_config() -> Result<QuizgateConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizgateConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => [Some(PathBuf::from("quizgate.toml")), global_config_path()]
            .into_iter()
            .flatten()
            .find(|p| p.exists()),
    };

    let config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizgateConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizgateConfig::default(),
    };

    let config = apply_overrides(config, |key| std::env::var(key).ok())?;
    config.check()?;
    Ok(config)
}

fn apply_overrides(
    mut config: QuizgateConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<QuizgateConfig> {
    if let Some(raw) = lookup("QUIZGATE_MIN_QUALITY_SCORE") {
        config.review.min_quality_score = raw
            .trim()
            .parse()
            .with_context(|| format!("invalid QUIZGATE_MIN_QUALITY_SCORE: {raw:?}"))?;
    }
    if let Some(raw) = lookup("QUIZGATE_AUTO_APPROVE_SCORE") {
        config.review.auto_approve_score = raw
            .trim()
            .parse()
            .with_context(|| format!("invalid QUIZGATE_AUTO_APPROVE_SCORE: {raw:?}"))?;
    }
    if let Some(filter) = lookup("QUIZGATE_LOG") {
        config.log_filter = filter;
    }
    Ok(config)
}

fn global_config_path() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(|h| {
        PathBuf::from(h)
            .join(".config")
            .join("quizgate")
            .join("config.toml")
    })
}
