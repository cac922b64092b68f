use std::collections::HashSet;

use url::Url;

use crate::error::AppError;

pub(crate) const MAX_IMAGE_DIMENSION: i32 = 20_000;
const MAX_URL_LENGTH: usize = 2048;
const MAX_TAGS: usize = 20;
const MAX_TAG_LENGTH: usize = 50;
pub(crate) const DEFAULT_ANNOTATION_COLOR: &str = "#ff3b30";

pub(crate) fn normalize_required_text(
    value: &str,
    field: &str,
    max_chars: usize,
) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError(format!("{field} is required")));
    }
    if trimmed.chars().count() > max_chars {
        return Err(AppError::ValidationError(format!(
            "{field} exceeds {max_chars} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trims the value; blank input becomes `None`.
pub(crate) fn normalize_optional_text(
    value: Option<String>,
    field: &str,
    max_chars: usize,
) -> Result<Option<String>, AppError> {
    match value {
        Some(value) if !value.trim().is_empty() => {
            normalize_required_text(&value, field, max_chars).map(Some)
        }
        _ => Ok(None),
    }
}

/// Blob-store reference. Only absolute http(s) URLs are stored.
pub(crate) fn validate_url(value: &str, field: &str) -> Result<String, AppError> {
    let url = normalize_required_text(value, field, MAX_URL_LENGTH)?;
    let invalid = || AppError::ValidationError(format!("{field} must be an absolute http(s) URL"));
    if url.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let parsed = Url::parse(&url).map_err(|_| invalid())?;
    let has_host = parsed.host_str().is_some_and(|host| !host.is_empty());
    if !matches!(parsed.scheme(), "http" | "https") || !has_host {
        return Err(invalid());
    }
    Ok(url)
}

pub(crate) fn validate_optional_url(
    value: Option<String>,
    field: &str,
) -> Result<Option<String>, AppError> {
    match value {
        Some(value) if !value.trim().is_empty() => validate_url(&value, field).map(Some),
        _ => Ok(None),
    }
}

pub(crate) fn validate_dimensions(width: i32, height: i32) -> Result<(), AppError> {
    let valid = |value: i32| (1..=MAX_IMAGE_DIMENSION).contains(&value);
    if !valid(width) || !valid(height) {
        return Err(AppError::ValidationError(format!(
            "width and height must be between 1 and {MAX_IMAGE_DIMENSION}"
        )));
    }
    Ok(())
}

pub(crate) fn normalize_tags(tags: Option<Vec<String>>) -> Result<Vec<String>, AppError> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for tag in tags.unwrap_or_default() {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.chars().count() > MAX_TAG_LENGTH {
            return Err(AppError::ValidationError(format!(
                "Tag exceeds {MAX_TAG_LENGTH} characters"
            )));
        }
        if seen.insert(trimmed.to_lowercase()) {
            result.push(trimmed.to_string());
        }
    }
    if result.len() > MAX_TAGS {
        return Err(AppError::ValidationError(format!(
            "Too many tags (max {MAX_TAGS})"
        )));
    }
    Ok(result)
}

/// `#rgb` or `#rrggbb`, stored lowercase.
pub(crate) fn normalize_color(color: Option<String>) -> Result<String, AppError> {
    let Some(color) = color.filter(|value| !value.trim().is_empty()) else {
        return Ok(DEFAULT_ANNOTATION_COLOR.to_string());
    };
    let color = color.trim().to_lowercase();
    let valid = color
        .strip_prefix('#')
        .filter(|hex| matches!(hex.len(), 3 | 6))
        .is_some_and(|hex| hex.chars().all(|ch| ch.is_ascii_hexdigit()));
    if !valid {
        return Err(AppError::ValidationError(
            "color must be a hex value like #ff3b30".to_string(),
        ));
    }
    Ok(color)
}

#[cfg(test)]
pub(crate) fn assert_validation_error<T: std::fmt::Debug>(
    result: Result<T, AppError>,
    expected: &str,
) {
    match result {
        Err(AppError::ValidationError(message)) => {
            assert!(
                message.contains(expected),
                "expected validation error containing '{expected}', got '{message}'"
            );
        }
        Err(other) => panic!("expected validation error, got {other:?}"),
        Ok(value) => panic!("expected error, got {value:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_is_trimmed() {
        let value = normalize_required_text("  Hero banner ", "title", 200).expect("valid");
        assert_eq!(value, "Hero banner");
    }

    #[test]
    fn required_text_rejects_blank_and_long() {
        assert_validation_error(normalize_required_text("   ", "title", 10), "title is required");
        assert_validation_error(
            normalize_required_text(&"a".repeat(11), "title", 10),
            "title exceeds 10 characters",
        );
    }

    #[test]
    fn optional_text_blank_becomes_none() {
        assert_eq!(
            normalize_optional_text(Some("  ".to_string()), "notes", 10).unwrap(),
            None
        );
        assert_eq!(normalize_optional_text(None, "notes", 10).unwrap(), None);
    }

    #[test]
    fn urls_must_be_absolute_http() {
        assert!(validate_url("https://cdn.example.com/a.png", "image_url").is_ok());
        assert_validation_error(validate_url("", "image_url"), "image_url is required");
        assert_validation_error(validate_url("ftp://x/a.png", "image_url"), "absolute http(s)");
        assert_validation_error(
            validate_url("https://cdn.example.com/a b.png", "image_url"),
            "absolute http(s)",
        );
    }

    #[test]
    fn urls_without_a_valid_host_are_rejected() {
        for bad in ["http://", "https://", "http://:::", "https://%%%/x", "mailto:a@b.c"] {
            assert_validation_error(validate_url(bad, "image_url"), "absolute http(s)");
        }
        assert_eq!(
            validate_optional_url(Some(" http://cdn.example.com/t.png ".to_string()), "thumbnail_url")
                .unwrap()
                .as_deref(),
            Some("http://cdn.example.com/t.png")
        );
    }

    #[test]
    fn dimensions_must_be_positive_and_bounded() {
        assert!(validate_dimensions(1440, 900).is_ok());
        assert_validation_error(validate_dimensions(0, 900), "width and height");
        assert_validation_error(
            validate_dimensions(1440, MAX_IMAGE_DIMENSION + 1),
            "width and height",
        );
    }

    #[test]
    fn tags_are_deduplicated_case_insensitively() {
        let tags = normalize_tags(Some(vec![
            "Mobile".to_string(),
            " mobile ".to_string(),
            "".to_string(),
            "Checkout".to_string(),
        ]))
        .expect("valid");
        assert_eq!(tags, vec!["Mobile".to_string(), "Checkout".to_string()]);
    }

    #[test]
    fn too_many_tags_rejected() {
        let tags = (0..=MAX_TAGS).map(|i| format!("tag-{i}")).collect();
        assert_validation_error(normalize_tags(Some(tags)), "Too many tags");
    }

    #[test]
    fn color_defaults_and_validates() {
        assert_eq!(normalize_color(None).unwrap(), DEFAULT_ANNOTATION_COLOR);
        assert_eq!(normalize_color(Some("#ABC".to_string())).unwrap(), "#abc");
        assert_eq!(
            normalize_color(Some("#00ff88".to_string())).unwrap(),
            "#00ff88"
        );
        assert_validation_error(normalize_color(Some("red".to_string())), "hex value");
        assert_validation_error(normalize_color(Some("#12345".to_string())), "hex value");
    }
}
