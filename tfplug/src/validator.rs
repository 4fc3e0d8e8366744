//! Attribute validators run against configuration values during validation.
//!
//! Validators only see known, non-null values; the schema skips null and
//! unknown values before calling them.

use crate::types::{AttributePath, Diagnostic, Dynamic};

pub trait Validator: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>);
}

pub struct StringLengthValidator {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl Validator for StringLengthValidator {
    fn description(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("string length must be between {} and {}", min, max),
            (Some(min), None) => format!("string length must be at least {}", min),
            (None, Some(max)) => format!("string length must be at most {}", max),
            (None, None) => "any string length".to_string(),
        }
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        let Some(s) = value.as_string() else {
            return;
        };
        let len = s.chars().count();

        if let Some(min) = self.min {
            if len < min {
                diagnostics.push(
                    Diagnostic::error(
                        format!("{} must have minimum length of {}", path, min),
                        format!("Got length {}", len),
                    )
                    .with_attribute(path.clone()),
                );
            }
        }
        if let Some(max) = self.max {
            if len > max {
                diagnostics.push(
                    Diagnostic::error(
                        format!("{} must have maximum length of {}", path, max),
                        format!("Got length {}", len),
                    )
                    .with_attribute(path.clone()),
                );
            }
        }
    }
}

/// Accepts only strings from a fixed set of values
pub struct OneOfValidator {
    pub values: Vec<String>,
    pub ignore_case: bool,
}

impl OneOfValidator {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            ignore_case: false,
        }
    }

    pub fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    fn matches(&self, value: &str) -> bool {
        self.values.iter().any(|allowed| {
            if self.ignore_case {
                allowed.eq_ignore_ascii_case(value)
            } else {
                allowed == value
            }
        })
    }
}

impl Validator for OneOfValidator {
    fn description(&self) -> String {
        format!("value must be one of: {}", self.values.join(", "))
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        let Some(s) = value.as_string() else {
            return;
        };

        if !self.matches(s) {
            diagnostics.push(
                Diagnostic::error(
                    format!("Invalid value for {}", path),
                    format!("Got '{}', {}", s, self.description()),
                )
                .with_attribute(path.clone()),
            );
        }
    }
}

pub struct ListLengthValidator {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl Validator for ListLengthValidator {
    fn description(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("list must have between {} and {} items", min, max),
            (Some(min), None) => format!("list must have at least {} items", min),
            (None, Some(max)) => format!("list must have at most {} items", max),
            (None, None) => "any number of items".to_string(),
        }
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        let Some(items) = value.as_list() else {
            return;
        };

        if let Some(min) = self.min {
            if items.len() < min {
                diagnostics.push(
                    Diagnostic::error(
                        format!("{} must have at least {} items", path, min),
                        format!("Got {} items", items.len()),
                    )
                    .with_attribute(path.clone()),
                );
            }
        }
        if let Some(max) = self.max {
            if items.len() > max {
                diagnostics.push(
                    Diagnostic::error(
                        format!("{} must have at most {} items", path, max),
                        format!("Got {} items", items.len()),
                    )
                    .with_attribute(path.clone()),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_length_validator_accepts_valid_length() {
        let validator = StringLengthValidator {
            min: Some(3),
            max: Some(10),
        };

        let mut diags = Vec::new();
        validator.validate(
            &Dynamic::String("hello".to_string()),
            &AttributePath::new("test_field"),
            &mut diags,
        );

        assert!(diags.is_empty());
    }

    #[test]
    fn string_length_validator_rejects_empty() {
        let validator = StringLengthValidator {
            min: Some(1),
            max: None,
        };

        let mut diags = Vec::new();
        validator.validate(&Dynamic::from(""), &AttributePath::new("name"), &mut diags);

        assert_eq!(diags.len(), 1);
        assert!(diags[0].summary.contains("name must have minimum length of 1"));
        assert_eq!(diags[0].attribute, Some(AttributePath::new("name")));
    }

    #[test]
    fn one_of_validator_rejects_unlisted_value() {
        let validator = OneOfValidator::new(["blue", "red"]);

        let mut diags = Vec::new();
        validator.validate(&Dynamic::from("blue"), &AttributePath::new("color"), &mut diags);
        assert!(diags.is_empty());

        validator.validate(&Dynamic::from("Blue"), &AttributePath::new("color"), &mut diags);
        validator.validate(&Dynamic::from("pink"), &AttributePath::new("color"), &mut diags);
        assert_eq!(diags.len(), 2);
        assert!(diags[1].detail.contains("blue, red"));
    }

    #[test]
    fn one_of_validator_can_ignore_case() {
        let validator = OneOfValidator::new(["blue", "red"]).ignore_case();

        let mut diags = Vec::new();
        validator.validate(&Dynamic::from("Blue"), &AttributePath::new("color"), &mut diags);
        validator.validate(&Dynamic::from("RED"), &AttributePath::new("color"), &mut diags);
        assert!(diags.is_empty());
    }

    #[test]
    fn list_length_validator_enforces_minimum() {
        let validator = ListLengthValidator {
            min: Some(1),
            max: None,
        };

        let mut diags = Vec::new();
        validator.validate(
            &Dynamic::List(vec![]),
            &AttributePath::new("apitokens"),
            &mut diags,
        );
        assert_eq!(diags.len(), 1);
        assert!(diags[0].summary.contains("at least 1 items"));

        let mut diags = Vec::new();
        validator.validate(
            &Dynamic::List(vec![Dynamic::from("tok")]),
            &AttributePath::new("apitokens"),
            &mut diags,
        );
        assert!(diags.is_empty());
    }

    #[test]
    fn validators_ignore_other_types() {
        let validator = ListLengthValidator {
            min: Some(1),
            max: None,
        };

        let mut diags = Vec::new();
        validator.validate(&Dynamic::Number(1.0), &AttributePath::new("x"), &mut diags);
        assert!(diags.is_empty());
    }
}
