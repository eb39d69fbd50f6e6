//! Markdown docstring parsing.
//!
//! Docstrings are line-oriented markdown. Text before the first header is the
//! summary; recognized headers open the parameters, returns and attribution
//! sections; any other header opens an extra section kept verbatim.
//!
//! ```text
//! Calculates the future value of an investment.
//!
//! ### Args:
//! - **present_value**: The amount invested today.
//! - **annual_rate**: Annual rate of return, as a percentage.
//!
//! ### Returns:
//! The value of the investment after `years`.
//!
//! ### Sources:
//! - https://www.investopedia.com/terms/f/futurevalue.asp
//! ```
//!
//! Parameter entries are bullets shaped `**name**: text`, `**name:** text`,
//! `` `name`: text `` or `name: text`. Indented lines that follow an entry
//! continue it until the next bullet or blank line.

use crate::error::MalformedDocstring;
use crate::function::Signature;
use indexmap::IndexMap;
use serde::Serialize;

/// A section with an unrecognized header, preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocSection {
    /// Header title without `#` markers or trailing colon.
    pub title: String,
    /// Section body, trimmed.
    pub body: String,
}

/// Structured view of a docstring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedDocstring {
    /// Free text before the first header.
    pub summary: String,
    /// Parameter descriptions keyed by name, in documented order.
    pub parameters: IndexMap<String, String>,
    /// Return description, whitespace-normalized.
    pub returns: String,
    /// Source or credit text.
    pub attribution: Option<String>,
    /// Unrecognized sections in document order.
    pub extra_sections: Vec<DocSection>,
    /// The docstring as written.
    #[serde(skip)]
    pub raw: String,
    #[serde(skip)]
    has_parameters_section: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionKind {
    Parameters,
    Returns,
    Attribution,
    Other,
}

impl SectionKind {
    fn classify(title: &str) -> Self {
        match title.to_ascii_lowercase().as_str() {
            "args" | "arguments" | "parameters" | "params" => Self::Parameters,
            "returns" | "return" => Self::Returns,
            "source" | "sources" | "attribution" | "credit" | "credits" | "reference"
            | "references" => Self::Attribution,
            _ => Self::Other,
        }
    }
}

struct RawSection<'a> {
    kind: SectionKind,
    title: String,
    lines: Vec<&'a str>,
}

impl ParsedDocstring {
    /// Parses a docstring, ignoring structural problems.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        parse_sections(raw).0
    }

    /// Parses a docstring and returns every structural problem found along
    /// the way (repeated sections, malformed parameter bullets).
    pub(crate) fn parse_checked(raw: &str) -> (Self, Vec<MalformedDocstring>) {
        parse_sections(raw)
    }

    /// Parses a docstring and enforces the structure `signature` requires.
    ///
    /// Fails when the docstring is blank, when a recognized section repeats,
    /// when a parameter bullet is malformed, or when the signature has
    /// required parameters but no parameters section exists.
    pub fn parse_for(raw: &str, signature: &Signature) -> Result<Self, MalformedDocstring> {
        if raw.trim().is_empty() {
            return Err(MalformedDocstring::Missing);
        }

        let (parsed, issues) = parse_sections(raw);
        if let Some(issue) = issues.into_iter().next() {
            return Err(issue);
        }

        let required: Vec<String> = signature.required_names().map(str::to_string).collect();
        if !parsed.has_parameters_section && !required.is_empty() {
            return Err(MalformedDocstring::MissingParametersSection {
                parameters: required,
            });
        }

        Ok(parsed)
    }

    /// The description documented for `name`.
    #[must_use]
    pub fn description_for(&self, name: &str) -> Option<&str> {
        self.parameters
            .get(name)
            .map(String::as_str)
            .filter(|d| !d.is_empty())
    }

    /// Whether a parameters section header was present.
    #[must_use]
    pub fn has_parameters_section(&self) -> bool {
        self.has_parameters_section
    }
}

/// Collapses runs of whitespace into single spaces.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_sections(raw: &str) -> (ParsedDocstring, Vec<MalformedDocstring>) {
    let lines = dedent(raw);
    let mut summary = Vec::new();
    let mut sections: Vec<RawSection<'_>> = Vec::new();
    let mut in_fence = false;

    for line in lines {
        let trimmed = line.trim();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
        }

        if !in_fence && let Some(title) = header_title(trimmed) {
            sections.push(RawSection {
                kind: SectionKind::classify(&title),
                title,
                lines: Vec::new(),
            });
            continue;
        }

        match sections.last_mut() {
            Some(section) => section.lines.push(line),
            None => summary.push(line),
        }
    }

    let mut parsed = ParsedDocstring {
        summary: summary.join("\n").trim().to_string(),
        raw: raw.to_string(),
        ..ParsedDocstring::default()
    };
    let mut issues = Vec::new();
    let mut seen: Vec<SectionKind> = Vec::new();

    for section in sections {
        if section.kind != SectionKind::Other {
            if seen.contains(&section.kind) {
                issues.push(MalformedDocstring::DuplicateSection(section.title.clone()));
            }
            seen.push(section.kind);
        }

        match section.kind {
            SectionKind::Parameters => {
                parsed.has_parameters_section = true;
                parse_parameters(&section.lines, &mut parsed.parameters, &mut issues);
            }
            SectionKind::Returns => {
                if parsed.returns.is_empty() {
                    parsed.returns = normalize_whitespace(&section.lines.join("\n"));
                }
            }
            SectionKind::Attribution => {
                let body = section.lines.join("\n").trim().to_string();
                if !body.is_empty() {
                    parsed.attribution = Some(match parsed.attribution.take() {
                        Some(existing) => format!("{existing}\n{body}"),
                        None => body,
                    });
                }
            }
            SectionKind::Other => parsed.extra_sections.push(DocSection {
                title: section.title,
                body: section.lines.join("\n").trim().to_string(),
            }),
        }
    }

    (parsed, issues)
}

/// Strips the first line's leading whitespace and the common indentation of
/// the remaining lines.
fn dedent(raw: &str) -> Vec<&str> {
    let mut lines = raw.lines();
    let Some(first) = lines.next() else {
        return Vec::new();
    };
    let rest: Vec<&str> = lines.collect();

    let indent = rest
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    core::iter::once(first.trim_start())
        .chain(rest.into_iter().map(|l| {
            if l.trim().is_empty() {
                ""
            } else {
                l.get(indent..).unwrap_or(l).trim_end()
            }
        }))
        .collect()
}

fn header_title(trimmed: &str) -> Option<String> {
    let rest = trimmed.trim_start_matches('#');
    if rest.len() == trimmed.len() || !(rest.is_empty() || rest.starts_with(' ')) {
        return None;
    }
    let title = rest.trim().trim_end_matches(':').trim();
    if title.is_empty() {
        return None;
    }
    Some(title.to_string())
}

fn parse_parameters(
    lines: &[&str],
    out: &mut IndexMap<String, String>,
    issues: &mut Vec<MalformedDocstring>,
) {
    let mut current: Option<(String, Vec<String>)> = None;

    let mut flush = |current: &mut Option<(String, Vec<String>)>| {
        if let Some((name, parts)) = current.take() {
            out.insert(name, normalize_whitespace(&parts.join(" ")));
        }
    };

    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            flush(&mut current);
            continue;
        }

        if let Some(rest) = strip_bullet(trimmed) {
            flush(&mut current);
            match parse_entry(rest) {
                Some((name, description)) => current = Some((name, vec![description])),
                None => issues.push(MalformedDocstring::MalformedEntry {
                    line: trimmed.to_string(),
                }),
            }
            continue;
        }

        if let Some((_, parts)) = current.as_mut() {
            parts.push(trimmed.to_string());
        }
    }

    flush(&mut current);
}

fn strip_bullet(trimmed: &str) -> Option<&str> {
    ["- ", "* ", "+ "]
        .iter()
        .find_map(|bullet| trimmed.strip_prefix(bullet))
        .map(str::trim)
}

fn parse_entry(rest: &str) -> Option<(String, String)> {
    let (name, tail) = if let Some(after) = rest.strip_prefix("**") {
        let end = after.find("**")?;
        let (name, tail) = (&after[..end], &after[end + 2..]);
        match name.strip_suffix(':') {
            Some(name) => (name.trim(), tail),
            None => (name.trim(), tail.trim_start().strip_prefix(':')?),
        }
    } else if let Some(after) = rest.strip_prefix('`') {
        let end = after.find('`')?;
        (&after[..end], after[end + 1..].trim_start().strip_prefix(':')?)
    } else {
        let (name, tail) = rest.split_once(':')?;
        (name.trim(), tail)
    };

    is_identifier(name).then(|| (name.to_string(), tail.trim().to_string()))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
