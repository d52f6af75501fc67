//! Shared utility functions

/// Maximum slug length in characters.
pub const MAX_SLUG_LENGTH: usize = 100;

/// Reserved slugs that cannot be used for orgs, teams, or posts.
///
/// These are system-reserved paths that could conflict with API routes
/// or cause confusion in navigation.
pub const RESERVED_SLUGS: &[&str] = &["api", "auth", "new", "edit", "delete", "members", "settings"];

/// Generate a URL-friendly slug from a title or name.
///
/// # Examples
///
/// ```
/// use kb_server::util::slugify;
///
/// assert_eq!(slugify("Platform Engineering"), "platform-engineering");
/// assert_eq!(slugify("  Rust & Go!  "), "rust-go");
/// ```
#[must_use]
pub fn slugify(title: &str) -> String {
    let slug: String = title
        .to_lowercase()
        .chars()
        // Only keep ASCII alphanumeric characters
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.len() <= MAX_SLUG_LENGTH {
        slug
    } else {
        slug.chars().take(MAX_SLUG_LENGTH).collect()
    }
}

/// Check if slug is a reserved system path.
#[must_use]
pub fn is_reserved_slug(slug: &str) -> bool {
    RESERVED_SLUGS.contains(&slug)
}

/// Validate a client-supplied or generated slug.
///
/// Returns a human-readable reason when the slug is unusable.
pub fn validate_slug(slug: &str) -> Result<(), String> {
    if slug.is_empty() {
        return Err("Slug must not be empty".into());
    }
    if slug.len() > MAX_SLUG_LENGTH {
        return Err(format!("Slug must be at most {MAX_SLUG_LENGTH} characters"));
    }
    if is_reserved_slug(slug) {
        return Err(format!("Slug '{slug}' is reserved"));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        || slug.starts_with('-')
        || slug.ends_with('-')
    {
        return Err("Slug must be lowercase alphanumeric with inner dashes".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Platform Engineering"), "platform-engineering");
        assert_eq!(slugify("  Rust & Go!  "), "rust-go");
        assert_eq!(slugify("already-a-slug"), "already-a-slug");
        assert_eq!(slugify("Ünïcode Tïtle"), "n-code-t-tle");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_slugify_truncates() {
        let long = "x".repeat(300);
        assert_eq!(slugify(&long).len(), MAX_SLUG_LENGTH);
    }

    #[test]
    fn test_validate_slug() {
        assert!(validate_slug("platform-eng").is_ok());
        assert!(validate_slug("team42").is_ok());

        assert!(validate_slug("").is_err());
        assert!(validate_slug("api").is_err());
        assert!(validate_slug("Has-Caps").is_err());
        assert!(validate_slug("-leading").is_err());
        assert!(validate_slug("trailing-").is_err());
        assert!(validate_slug(&"x".repeat(101)).is_err());
    }
}
