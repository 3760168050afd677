//! Environment contract validation.
//!
//! Generated projects ship a `.env.local.example` documenting the variables
//! a deployment must provide. This validator checks that every declared
//! variable name appears in that file.

use std::path::Path;

use crate::structure::ValidationResult;

/// Name of the environment example file at the project root.
pub const ENV_EXAMPLE_FILE: &str = ".env.local.example";

/// Checks that each expected variable name appears in the env example file.
///
/// A missing file passes only when nothing is expected. Presence is substring
/// containment over the raw file text, not `KEY=` line parsing: a name that is
/// a prefix of another declared name (API_KEY vs API_KEY_SECONDARY) will
/// match. This mirrors the upstream contract and is kept as-is.
pub fn validate_env_vars(path: &Path, expected_vars: &[String]) -> ValidationResult {
    let env_path = path.join(ENV_EXAMPLE_FILE);

    let content = match std::fs::read_to_string(&env_path) {
        Ok(content) => content,
        Err(_) => {
            // No contract file: nothing required means nothing to check.
            return ValidationResult {
                passed: expected_vars.is_empty(),
                expected: expected_vars.len(),
                found: 0,
                missing: expected_vars.to_vec(),
                extra: Vec::new(),
            };
        }
    };

    let missing: Vec<String> = expected_vars
        .iter()
        .filter(|var| !content.contains(var.as_str()))
        .cloned()
        .collect();
    let found = expected_vars.len() - missing.len();

    ValidationResult {
        passed: missing.is_empty(),
        expected: expected_vars.len(),
        found,
        missing,
        extra: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_env(root: &Path, content: &str) {
        std::fs::write(root.join(ENV_EXAMPLE_FILE), content).unwrap();
    }

    #[test]
    fn absent_file_passes_when_nothing_expected() {
        let temp = TempDir::new().unwrap();

        let result = validate_env_vars(temp.path(), &[]);

        assert!(result.passed);
        assert!(result.missing.is_empty());
    }

    #[test]
    fn absent_file_fails_with_all_vars_missing() {
        let temp = TempDir::new().unwrap();
        let expected = vec!["DATABASE_URL".to_string(), "API_KEY".to_string()];

        let result = validate_env_vars(temp.path(), &expected);

        assert!(!result.passed);
        assert_eq!(result.missing, expected);
        assert_eq!(result.found, 0);
    }

    #[test]
    fn omitted_variable_is_reported_missing() {
        let temp = TempDir::new().unwrap();
        write_env(temp.path(), "DATABASE_URL=postgres://localhost\n");

        let expected = vec!["DATABASE_URL".to_string(), "STRIPE_SECRET_KEY".to_string()];
        let result = validate_env_vars(temp.path(), &expected);

        assert!(!result.passed);
        assert_eq!(result.missing, vec!["STRIPE_SECRET_KEY"]);
        assert_eq!(result.found, 1);
    }

    #[test]
    fn all_variables_present_passes() {
        let temp = TempDir::new().unwrap();
        write_env(
            temp.path(),
            "# required\nDATABASE_URL=\nNEXT_PUBLIC_APP_URL=http://localhost:3000\n",
        );

        let expected = vec![
            "DATABASE_URL".to_string(),
            "NEXT_PUBLIC_APP_URL".to_string(),
        ];
        let result = validate_env_vars(temp.path(), &expected);

        assert!(result.passed);
        assert_eq!(result.found, 2);
    }

    #[test]
    fn containment_matches_prefix_of_longer_name() {
        // Known precision gap of the containment check, preserved on purpose.
        let temp = TempDir::new().unwrap();
        write_env(temp.path(), "API_KEY_SECONDARY=abc\n");

        let result = validate_env_vars(temp.path(), &["API_KEY".to_string()]);

        assert!(result.passed);
    }
}
