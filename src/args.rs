//! Model selection filter parsed from the worker's launch arguments.
//!
//! The batch-execution harness launches each worker with a set of additional
//! command line arguments whose names are not documented. A declarative parser
//! that must name every argument would break if those undocumented names
//! change, so the recognized flags are scanned out of the raw vector manually.

use crate::error::ScoreError;

/// Criteria used to select exactly one registered model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFilter {
    /// Registered model name. Required.
    pub name: String,
    /// Exact version to pin; latest matching version when absent.
    pub version: Option<String>,
    /// Tag key to filter on.
    pub tag_name: Option<String>,
    /// Tag value to filter on.
    pub tag_value: Option<String>,
}

impl ModelFilter {
    /// Scan the raw argument vector for the model selection flags.
    ///
    /// The value of a flag is the token immediately following its first
    /// occurrence. `--model_name` is mandatory; the other flags resolve to
    /// `None` when absent or blank.
    pub fn from_args(argv: &[String]) -> Result<Self, ScoreError> {
        let name = flag_value(argv, "--model_name").ok_or_else(|| {
            ScoreError::Configuration(
                "model name is required but no model name argument was passed".to_string(),
            )
        })?;

        let version = flag_value(argv, "--model_version").filter(|v| !v.trim().is_empty());
        let tag_name_raw = flag_value(argv, "--model_tag_name");
        let tag_name = tag_name_raw.clone().filter(|v| !v.trim().is_empty());

        // Note the asymmetry: tag_value is suppressed when tag_name's value
        // is blank, not when its own value is. A blank tag_name disables tag
        // filtering entirely, so a non-blank tag_value paired with it
        // resolves to None.
        let tag_name_blank = tag_name_raw.map_or(true, |v| v.trim().is_empty());
        let tag_value = if tag_name_blank {
            None
        } else {
            flag_value(argv, "--model_tag_value")
        };

        Ok(Self {
            name,
            version,
            tag_name,
            tag_value,
        })
    }

    /// True when both halves of the tag pair are usable for filtering.
    pub fn has_tag_pair(&self) -> bool {
        self.tag_name.is_some() && self.tag_value.is_some()
    }
}

/// Value of the first occurrence of `flag` in `argv`, if any.
fn flag_value(argv: &[String], flag: &str) -> Option<String> {
    argv.iter()
        .position(|token| token == flag)
        .and_then(|idx| argv.get(idx + 1))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_name_only() {
        let filter = ModelFilter::from_args(&argv(&["scorer", "--model_name", "churn"])).unwrap();
        assert_eq!(filter.name, "churn");
        assert_eq!(filter.version, None);
        assert_eq!(filter.tag_name, None);
        assert_eq!(filter.tag_value, None);
    }

    #[test]
    fn test_missing_name_is_configuration_error() {
        let err = ModelFilter::from_args(&argv(&["scorer", "--model_version", "3"])).unwrap_err();
        assert!(matches!(err, ScoreError::Configuration(_)));
    }

    #[test]
    fn test_full_filter() {
        let filter = ModelFilter::from_args(&argv(&[
            "scorer",
            "--model_name",
            "churn",
            "--model_version",
            "3",
            "--model_tag_name",
            "stage",
            "--model_tag_value",
            "prod",
        ]))
        .unwrap();
        assert_eq!(filter.version.as_deref(), Some("3"));
        assert_eq!(filter.tag_name.as_deref(), Some("stage"));
        assert_eq!(filter.tag_value.as_deref(), Some("prod"));
        assert!(filter.has_tag_pair());
    }

    #[test]
    fn test_blank_version_resolves_to_none() {
        let filter = ModelFilter::from_args(&argv(&[
            "scorer",
            "--model_name",
            "churn",
            "--model_version",
            "   ",
        ]))
        .unwrap();
        assert_eq!(filter.version, None);
    }

    // Pins the asymmetric blank check: tag_value is dropped because tag_name
    // is blank, even though tag_value itself is non-blank.
    #[test]
    fn test_blank_tag_name_suppresses_tag_value() {
        let filter = ModelFilter::from_args(&argv(&[
            "scorer",
            "--model_name",
            "churn",
            "--model_tag_name",
            "",
            "--model_tag_value",
            "v1",
        ]))
        .unwrap();
        assert_eq!(filter.tag_name, None);
        assert_eq!(filter.tag_value, None);
    }

    #[test]
    fn test_unrecognized_harness_flags_are_ignored() {
        let filter = ModelFilter::from_args(&argv(&[
            "scorer",
            "--output_action",
            "append_row",
            "--model_name",
            "churn",
            "--process_count_per_node",
            "2",
        ]))
        .unwrap();
        assert_eq!(filter.name, "churn");
    }

    #[test]
    fn test_first_occurrence_wins() {
        let filter = ModelFilter::from_args(&argv(&[
            "scorer",
            "--model_name",
            "first",
            "--model_name",
            "second",
        ]))
        .unwrap();
        assert_eq!(filter.name, "first");
    }

    #[test]
    fn test_trailing_flag_without_value_is_missing() {
        let err = ModelFilter::from_args(&argv(&["scorer", "--model_name"])).unwrap_err();
        assert!(matches!(err, ScoreError::Configuration(_)));
    }
}
