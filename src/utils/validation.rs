use crate::utils::error::{SplitError, Result};
use regex::Regex;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(SplitError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(SplitError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SplitError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// 檢查正規表達式可編譯，且至少包含 `min_groups` 個擷取群組
pub fn validate_pattern(field_name: &str, pattern: &str, min_groups: usize) -> Result<Regex> {
    let re = Regex::new(pattern).map_err(|e| SplitError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: pattern.to_string(),
        reason: format!("Invalid regular expression: {}", e),
    })?;

    // captures_len() counts the implicit whole-match group
    let groups = re.captures_len() - 1;
    if groups < min_groups {
        return Err(SplitError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: pattern.to_string(),
            reason: format!(
                "Expected at least {} capture groups, found {}",
                min_groups, groups
            ),
        });
    }

    Ok(re)
}

pub fn validate_month_names(field_name: &str, names: &[String]) -> Result<()> {
    if names.len() != 12 {
        return Err(SplitError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: names.join(","),
            reason: format!("Expected 12 month names, found {}", names.len()),
        });
    }

    for name in names {
        validate_non_empty_string(field_name, name)?;
        if name.contains(['/', '\\']) {
            return Err(SplitError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: name.clone(),
                reason: "Month names are used in file names and cannot contain path separators"
                    .to_string(),
            });
        }
    }

    Ok(())
}

/// 副檔名不含開頭的點，也不能含路徑分隔符
pub fn validate_extension(field_name: &str, extension: &str) -> Result<()> {
    validate_non_empty_string(field_name, extension)?;

    let reason = if extension.starts_with('.') {
        Some("Extension must be given without the leading dot")
    } else if extension.contains(['/', '\\']) {
        Some("Extension cannot contain path separators")
    } else if extension.chars().any(char::is_whitespace) {
        Some("Extension cannot contain whitespace")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(SplitError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: extension.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_extension() {
        assert!(validate_extension("naming.extension", "pdf").is_ok());
        assert!(validate_extension("naming.extension", "PDF").is_ok());

        for bad in ["", ".pdf", "a/b", "a\\b", "p df"] {
            assert!(
                matches!(
                    validate_extension("naming.extension", bad),
                    Err(SplitError::InvalidConfigValueError { .. })
                ),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("run.root", "./split-fiches-salaire").is_ok());
        assert!(validate_path("run.root", "").is_err());
        assert!(validate_path("run.root", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_pattern() {
        assert!(validate_pattern("markers.period_pattern", r"(\d{2})\.(\d{4})", 2).is_ok());
        assert!(validate_pattern("markers.period_pattern", r"\d{2}\.\d{4}", 2).is_err());
        assert!(validate_pattern("markers.period_pattern", r"(\d{2}", 0).is_err());
    }

    #[test]
    fn test_validate_month_names() {
        let twelve: Vec<String> = (1..=12).map(|m| format!("m{}", m)).collect();
        assert!(validate_month_names("naming.month_names", &twelve).is_ok());
        assert!(validate_month_names("naming.month_names", &twelve[..11]).is_err());

        let mut with_slash = twelve.clone();
        with_slash[3] = "a/b".to_string();
        assert!(validate_month_names("naming.month_names", &with_slash).is_err());
    }
}
