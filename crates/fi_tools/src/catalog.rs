//! The tool catalog.
//!
//! A [`Catalog`] is built once at start-up by running discovery, docstring
//! validation and schema generation over one module of a [`Library`]. It is
//! immutable afterwards and shared by reference (typically `Arc<Catalog>`)
//! between the dispatcher, the resource provider and the protocol server.
//!
//! # Usage
//!
//! ```ignore
//! use fi_tools::{Catalog, CatalogOptions, Library};
//!
//! let library = Library::new().with_module(fi_calc::fi::module());
//! let catalog = Catalog::build(&library, CatalogOptions::new("fi").with_tool_prefix("fi_"))?;
//! for tool in catalog.tools() {
//!     println!("{}", tool.name);
//! }
//! ```

use crate::discovery::{DiscoveryOptions, Exclusion, Library};
use crate::docstring::ParsedDocstring;
use crate::error::{CatalogError, SchemaError};
use crate::function::FunctionRecord;
use crate::param::UnknownArguments;
use crate::schema::{SchemaOptions, ToolSchema, generate_schema};
use crate::validation::{Rule, ValidationReport, validate_all};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How functions with incomplete documentation are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocPolicy {
    /// Leave them out of the tool catalog, with a warning.
    #[default]
    Exclude,
    /// Expose them with placeholder descriptions.
    Degrade,
    /// Refuse to build the catalog.
    Strict,
}

impl FromStr for DocPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exclude" => Ok(Self::Exclude),
            "degrade" => Ok(Self::Degrade),
            "strict" => Ok(Self::Strict),
            other => Err(format!(
                "expected `exclude`, `degrade` or `strict`, got `{other}`"
            )),
        }
    }
}

/// Settings for [`Catalog::build`].
#[derive(Debug, Clone)]
pub struct CatalogOptions {
    /// Name of the module to expose.
    pub module: String,
    /// Prepended to function names to form tool names.
    pub tool_prefix: String,
    /// Treatment of incompletely documented functions.
    pub doc_policy: DocPolicy,
    /// Treatment of undeclared arguments at call time.
    pub unknown_arguments: UnknownArguments,
    /// Function names never exposed, on top of the module's own list.
    pub denylist: Vec<String>,
}

impl CatalogOptions {
    /// Default options for `module`.
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            tool_prefix: String::new(),
            doc_policy: DocPolicy::default(),
            unknown_arguments: UnknownArguments::default(),
            denylist: Vec::new(),
        }
    }

    /// Sets the tool-name prefix.
    #[must_use]
    pub fn with_tool_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.tool_prefix = prefix.into();
        self
    }

    /// Sets the documentation policy.
    #[must_use]
    pub fn with_doc_policy(mut self, policy: DocPolicy) -> Self {
        self.doc_policy = policy;
        self
    }

    /// Sets the unknown-argument policy.
    #[must_use]
    pub fn with_unknown_arguments(mut self, policy: UnknownArguments) -> Self {
        self.unknown_arguments = policy;
        self
    }

    /// Adds names to the denylist.
    #[must_use]
    pub fn with_denylist<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.denylist.extend(names.into_iter().map(Into::into));
        self
    }
}

/// Why a discovered function has no tool.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Discovery excluded it.
    Excluded(Exclusion),
    /// The docstring broke these rules.
    Undocumented(Vec<Rule>),
    /// No schema could be generated.
    Schema(SchemaError),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Excluded(exclusion) => write!(f, "excluded ({exclusion:?})"),
            Self::Undocumented(rules) => {
                let rules: Vec<_> = rules.iter().map(ToString::to_string).collect();
                write!(f, "incomplete documentation ({})", rules.join(", "))
            }
            Self::Schema(err) => write!(f, "{err}"),
        }
    }
}

/// One exposed tool.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    /// The generated schema.
    pub schema: ToolSchema,
    /// The backing function.
    pub record: FunctionRecord,
    /// The function's parsed docstring.
    pub docs: ParsedDocstring,
}

/// Immutable set of tool schemas and documentation.
#[derive(Debug, Clone)]
pub struct Catalog {
    options: CatalogOptions,
    entries: IndexMap<String, CatalogEntry>,
    documentation: IndexMap<String, String>,
    skipped: Vec<(String, SkipReason)>,
    report: ValidationReport,
}

impl Catalog {
    /// Runs discovery, validation and schema generation.
    ///
    /// # Errors
    ///
    /// Fails when discovery fails, when [`DocPolicy::Strict`] finds any
    /// documentation problem, or when no tool survives.
    pub fn build(library: &Library, options: CatalogOptions) -> Result<Self, CatalogError> {
        let discovery_options = DiscoveryOptions::default().with_denylist(options.denylist.clone());
        let discovery = library.discover(&options.module, &discovery_options)?;

        let report = validate_all(discovery.eligible());
        if options.doc_policy == DocPolicy::Strict && !report.is_clean() {
            return Err(CatalogError::Validation(report));
        }

        let schema_options = SchemaOptions {
            tool_prefix: options.tool_prefix.clone(),
        };
        let mut entries = IndexMap::new();
        let mut documentation = IndexMap::new();
        let mut skipped: Vec<(String, SkipReason)> = discovery
            .excluded()
            .iter()
            .map(|(record, reason)| (record.name().to_string(), SkipReason::Excluded(*reason)))
            .collect();

        for record in discovery.eligible() {
            let name = record.name();
            documentation.insert(name.to_string(), record.docstring().to_string());

            if !report.passes(name) && options.doc_policy == DocPolicy::Exclude {
                let rules: Vec<Rule> = report.for_function(name).map(|v| v.rule).collect();
                tracing::warn!(function = name, ?rules, "excluding undocumented function");
                skipped.push((name.to_string(), SkipReason::Undocumented(rules)));
                continue;
            }

            // Structural problems are already in the report; what remains
            // here has passed validation or runs under `Degrade`.
            let docs = record
                .signature()
                .and_then(|signature| ParsedDocstring::parse_for(record.docstring(), signature).ok())
                .unwrap_or_else(|| ParsedDocstring::parse(record.docstring()));

            match generate_schema(record, &docs, &schema_options) {
                Ok(schema) => {
                    if schema.degraded {
                        tracing::warn!(tool = %schema.name, "exposing tool with placeholder documentation");
                    }
                    entries.insert(
                        schema.name.clone(),
                        CatalogEntry {
                            schema,
                            record: record.clone(),
                            docs,
                        },
                    );
                }
                Err(err) => {
                    tracing::error!(function = name, error = %err, "schema generation failed");
                    skipped.push((name.to_string(), SkipReason::Schema(err)));
                }
            }
        }

        if entries.is_empty() {
            return Err(CatalogError::Empty {
                module: options.module,
            });
        }

        skipped.sort_by(|(a, _), (b, _)| a.cmp(b));

        let catalog = Self {
            options,
            entries,
            documentation,
            skipped,
            report,
        };
        catalog.log_summary();
        Ok(catalog)
    }

    fn log_summary(&self) {
        tracing::info!(
            module = %self.options.module,
            tools = self.entries.len(),
            skipped = self.skipped.len(),
            "tool catalog built"
        );
        for schema in self.tools() {
            let params: Vec<String> = schema
                .parameters
                .iter()
                .map(|p| {
                    if p.required {
                        p.name.clone()
                    } else {
                        format!("{}?", p.name)
                    }
                })
                .collect();
            tracing::debug!(tool = %schema.name, params = %params.join(", "), "registered tool");
        }
        for (name, reason) in &self.skipped {
            tracing::debug!(function = %name, %reason, "no tool generated");
        }
    }

    /// Options the catalog was built with.
    #[must_use]
    pub fn options(&self) -> &CatalogOptions {
        &self.options
    }

    /// Looks up a tool by its (prefixed) name.
    #[must_use]
    pub fn get(&self, tool_name: &str) -> Option<&CatalogEntry> {
        self.entries.get(tool_name)
    }

    /// Returns whether a tool with the given name exists.
    #[must_use]
    pub fn has(&self, tool_name: &str) -> bool {
        self.entries.contains_key(tool_name)
    }

    /// All tool schemas, sorted by function name.
    pub fn tools(&self) -> impl Iterator<Item = &ToolSchema> {
        self.entries.values().map(|entry| &entry.schema)
    }

    /// Number of tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the catalog has no tools; never the case for a built catalog.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Raw docstring of a discovered function, by function name.
    #[must_use]
    pub fn documentation(&self, function: &str) -> Option<&str> {
        self.documentation.get(function).map(String::as_str)
    }

    /// All documented functions as `(name, docstring)`, sorted by name.
    pub fn documented_functions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.documentation
            .iter()
            .map(|(name, doc)| (name.as_str(), doc.as_str()))
    }

    /// Discovered functions that have no tool, sorted by name.
    #[must_use]
    pub fn skipped(&self) -> &[(String, SkipReason)] {
        &self.skipped
    }

    /// The docstring validation report for all eligible functions.
    #[must_use]
    pub fn report(&self) -> &ValidationReport {
        &self.report
    }
}
