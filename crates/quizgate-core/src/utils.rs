//! Small shared helpers used by the presentation layer and services alike.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use uuid::Uuid;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Generate a random identifier in hyphenated UUID v4 form.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Replace every character outside `[a-z0-9.-]` (either case) with `_`, then
/// lower-case the result.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Permissive `local@domain.tld` shape check. Not RFC 5322; meant as a
/// first-line hint only.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

/// Suspend the current task for at least `ms` milliseconds.
pub async fn sleep(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_uuid_v4() {
        let id = generate_id();
        assert_eq!(id.len(), 36);
        let parsed = Uuid::parse_str(&id).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert_ne!(generate_id(), id);
    }

    #[test]
    fn sanitize_replaces_and_lowercases() {
        assert_eq!(sanitize_filename("My Notes (v2).PDF"), "my_notes__v2_.pdf");
        assert_eq!(sanitize_filename("chapter-1.pdf"), "chapter-1.pdf");
        assert_eq!(sanitize_filename("../etc/passwd"), ".._etc_passwd");
        assert_eq!(sanitize_filename("résumé.pdf"), "r_sum_.pdf");
        assert_eq!(sanitize_filename(""), "");
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("first.last+tag@sub.example.co.uk"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("ada example@example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ada@@example.com"));
        assert!(!is_valid_email(""));
    }

    #[tokio::test(start_paused = true)]
    async fn sleep_waits_at_least_the_requested_time() {
        let start = tokio::time::Instant::now();
        sleep(250).await;
        assert!(start.elapsed() >= Duration::from_millis(250));
    }
}
