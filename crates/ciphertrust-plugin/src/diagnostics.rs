//! Diagnostics reported back to Terraform

use std::fmt::Display;

use crate::error::ProviderError;
use crate::proto;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
    pub attribute: Option<Vec<String>>,
}

impl Diagnostic {
    pub fn to_proto(&self) -> proto::Diagnostic {
        let severity = match self.severity {
            Severity::Error => proto::diagnostic::Severity::Error,
            Severity::Warning => proto::diagnostic::Severity::Warning,
        };
        let attribute = self.attribute.as_ref().map(|names| attribute_path(names));

        proto::Diagnostic {
            severity: severity as i32,
            summary: self.summary.clone(),
            detail: self.detail.clone(),
            attribute,
        }
    }
}

impl From<ProviderError> for Diagnostic {
    fn from(err: ProviderError) -> Self {
        Diagnostic {
            severity: Severity::Error,
            summary: err.summary,
            detail: err.detail,
            attribute: err.attribute,
        }
    }
}

/// Build an attribute path made of nested attribute names
pub fn attribute_path(names: &[String]) -> proto::AttributePath {
    proto::AttributePath {
        steps: names
            .iter()
            .map(|name| proto::attribute_path::Step {
                selector: Some(proto::attribute_path::step::Selector::AttributeName(
                    name.clone(),
                )),
            })
            .collect(),
    }
}

/// Accumulated diagnostics for one RPC
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.0.push(Diagnostic {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        });
    }

    pub fn attribute_error(
        &mut self,
        path: Vec<String>,
        summary: impl Into<String>,
        detail: impl Into<String>,
    ) {
        self.0.push(Diagnostic {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
            attribute: Some(path),
        });
    }

    pub fn warning(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.0.push(Diagnostic {
            severity: Severity::Warning,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        });
    }

    pub fn has_errors(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn into_proto(self) -> Vec<proto::Diagnostic> {
        self.0.iter().map(Diagnostic::to_proto).collect()
    }
}

impl From<ProviderError> for Diagnostics {
    fn from(err: ProviderError) -> Self {
        Diagnostics(vec![err.into()])
    }
}

/// Turn any displayable error into a [`ProviderError`] with a summary
pub trait ResultExt<T> {
    fn or_diagnostic(self, summary: &str) -> Result<T, ProviderError>;
}

impl<T, E: Display> ResultExt<T> for Result<T, E> {
    fn or_diagnostic(self, summary: &str) -> Result<T, ProviderError> {
        self.map_err(|e| ProviderError::new(summary, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_errors() {
        let mut diags = Diagnostics::new();
        assert!(diags.is_empty());

        diags.warning("Deprecated", "use something else");
        assert!(!diags.has_errors());

        diags.error("Invalid", "bad value");
        assert!(diags.has_errors());
        assert_eq!(diags.iter().count(), 2);
    }

    #[test]
    fn test_to_proto_carries_attribute_path() {
        let mut diags = Diagnostics::new();
        diags.attribute_error(
            vec!["database_backup_params".to_string(), "scope".to_string()],
            "Invalid scope",
            "must be one of: system, domain",
        );

        let protos = diags.into_proto();
        assert_eq!(protos.len(), 1);
        assert_eq!(protos[0].severity, proto::diagnostic::Severity::Error as i32);
        let steps = &protos[0].attribute.as_ref().unwrap().steps;
        assert_eq!(steps.len(), 2);
        assert_eq!(
            steps[1].selector,
            Some(proto::attribute_path::step::Selector::AttributeName(
                "scope".to_string()
            ))
        );
    }

    #[test]
    fn test_or_diagnostic() {
        let result: Result<(), String> = Err("status 500".to_string());
        let err = result.or_diagnostic("Error reading key").unwrap_err();
        assert_eq!(err.summary, "Error reading key");
        assert_eq!(err.detail, "status 500");
    }
}
