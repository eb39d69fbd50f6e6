//! Docstring compliance checks.
//!
//! Every discovered function is checked against the same rule set and all
//! violations are collected in a single pass, so a start-up failure or a
//! `check` run reports everything at once.

use crate::docstring::ParsedDocstring;
use crate::function::{FunctionRecord, ReturnKind};
use serde::Serialize;
use std::fmt;

/// A documentation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// The doc comment is absent or blank.
    MissingDocstring,
    /// No summary text precedes the first section.
    EmptySummary,
    /// A required parameter has no description.
    MissingParameterDescription,
    /// A description names a parameter the function does not declare.
    StaleParameterDescription,
    /// The function returns a value but documents no return.
    MissingReturnDescription,
    /// A section repeats or a parameter bullet cannot be read.
    MalformedStructure,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MissingDocstring => "missing-docstring",
            Self::EmptySummary => "empty-summary",
            Self::MissingParameterDescription => "missing-parameter-description",
            Self::StaleParameterDescription => "stale-parameter-description",
            Self::MissingReturnDescription => "missing-return-description",
            Self::MalformedStructure => "malformed-structure",
        };
        f.write_str(name)
    }
}

/// One rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Function the violation belongs to.
    pub function: String,
    /// The rule broken.
    pub rule: Rule,
    /// Parameter concerned, for parameter rules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
    /// Human-readable detail.
    pub detail: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.function, self.rule, self.detail)
    }
}

/// All violations found across a set of functions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    violations: Vec<Violation>,
    checked: usize,
}

impl ValidationReport {
    /// Number of violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// True when no violations were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// True when no violations were found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.is_empty()
    }

    /// Number of functions checked.
    #[must_use]
    pub fn checked(&self) -> usize {
        self.checked
    }

    /// All violations in check order.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Violations belonging to `function`.
    pub fn for_function<'a>(&'a self, function: &'a str) -> impl Iterator<Item = &'a Violation> {
        self.violations.iter().filter(move |v| v.function == function)
    }

    /// Whether `function` passed every rule.
    #[must_use]
    pub fn passes(&self, function: &str) -> bool {
        self.for_function(function).next().is_none()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  - {violation}")?;
        }
        Ok(())
    }
}

/// Checks one function's doc comment against every rule.
#[must_use]
pub fn validate_function(record: &FunctionRecord) -> Vec<Violation> {
    let name = record.name();
    let violation = |rule, parameter: Option<&str>, detail: String| Violation {
        function: name.to_string(),
        rule,
        parameter: parameter.map(str::to_string),
        detail,
    };

    if record.docstring().trim().is_empty() {
        return vec![violation(
            Rule::MissingDocstring,
            None,
            format!("function `{name}` is missing a docstring"),
        )];
    }

    let (parsed, issues) = ParsedDocstring::parse_checked(record.docstring());
    let mut violations: Vec<Violation> = issues
        .into_iter()
        .map(|issue| violation(Rule::MalformedStructure, None, issue.to_string()))
        .collect();

    if parsed.summary.is_empty() {
        violations.push(violation(
            Rule::EmptySummary,
            None,
            "no summary before the first section".to_string(),
        ));
    }

    let Some(signature) = record.signature() else {
        return violations;
    };

    for param in signature.params.iter().filter(|p| p.is_required()) {
        if parsed.description_for(&param.name).is_none() {
            violations.push(violation(
                Rule::MissingParameterDescription,
                Some(&param.name),
                format!("parameter `{}` is not documented", param.name),
            ));
        }
    }

    for described in parsed.parameters.keys() {
        if signature.param(described).is_none() {
            violations.push(violation(
                Rule::StaleParameterDescription,
                Some(described),
                format!("documented parameter `{described}` does not exist"),
            ));
        }
    }

    if signature.returns == ReturnKind::Value && parsed.returns.is_empty() {
        violations.push(violation(
            Rule::MissingReturnDescription,
            None,
            "return value is not documented".to_string(),
        ));
    }

    violations
}

/// Checks every record and aggregates the result.
#[must_use]
pub fn validate_all<'a>(records: impl IntoIterator<Item = &'a FunctionRecord>) -> ValidationReport {
    let mut report = ValidationReport::default();
    for record in records {
        report.checked += 1;
        report.violations.extend(validate_function(record));
    }
    report
}
