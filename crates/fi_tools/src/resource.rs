//! Help resources.
//!
//! Every discovered function's docstring is addressable as
//! `fi://help/{function_name}`; `fi://help/all` concatenates all of them.

use crate::catalog::Catalog;
use crate::error::ResourceError;
use serde::Serialize;
use std::sync::Arc;

/// URI prefix shared by all help resources.
pub const HELP_URI_PREFIX: &str = "fi://help/";

/// Name of the combined help resource.
pub const ALL: &str = "all";

/// Listing entry for one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    /// Resource URI.
    pub uri: String,
    /// Human-readable name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// MIME type of the content.
    pub mime_type: String,
}

/// Title-cases a snake_case function name, upper-casing the `FI` abbreviation.
///
/// `coast_fi_number` becomes `Coast FI Number`.
#[must_use]
pub fn display_name(function: &str) -> String {
    function
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            if word.eq_ignore_ascii_case("fi") {
                "FI".to_string()
            } else {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Serves documentation out of a [`Catalog`].
#[derive(Debug, Clone)]
pub struct ResourceProvider {
    catalog: Arc<Catalog>,
}

impl ResourceProvider {
    /// Creates a provider over `catalog`.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// Help text for one function: a title heading followed by the
    /// docstring verbatim.
    pub fn get_documentation(&self, function: &str) -> Result<String, ResourceError> {
        let doc = self
            .catalog
            .documentation(function)
            .ok_or_else(|| ResourceError::NotFound(function.to_string()))?;
        Ok(format!("# {}\n\n{}", display_name(function), doc.trim()))
    }

    /// Help text for every function, sorted by name.
    #[must_use]
    pub fn all_documentation(&self) -> String {
        let mut functions: Vec<_> = self.catalog.documented_functions().collect();
        functions.sort_by(|(a, _), (b, _)| a.cmp(b));
        functions
            .into_iter()
            .map(|(name, doc)| format!("## {}\n\n{}", display_name(name), doc.trim()))
            .collect::<Vec<_>>()
            .join("\n\n---\n\n")
    }

    /// Resolves a `fi://help/...` URI.
    pub fn read(&self, uri: &str) -> Result<String, ResourceError> {
        let name = uri
            .strip_prefix(HELP_URI_PREFIX)
            .filter(|name| !name.is_empty() && !name.contains('/'))
            .ok_or_else(|| ResourceError::InvalidUri(uri.to_string()))?;
        if name == ALL {
            Ok(self.all_documentation())
        } else {
            self.get_documentation(name)
        }
    }

    /// One descriptor per documented function, then the combined entry.
    #[must_use]
    pub fn list(&self) -> Vec<ResourceDescriptor> {
        let mut descriptors: Vec<ResourceDescriptor> = self
            .catalog
            .documented_functions()
            .map(|(name, _)| ResourceDescriptor {
                uri: format!("{HELP_URI_PREFIX}{name}"),
                name: display_name(name),
                description: format!("Documentation for {name}"),
                mime_type: "text/markdown".to_string(),
            })
            .collect();
        descriptors.sort_by(|a, b| a.uri.cmp(&b.uri));
        descriptors.push(ResourceDescriptor {
            uri: format!("{HELP_URI_PREFIX}{ALL}"),
            name: "All Functions".to_string(),
            description: "Documentation for all available functions".to_string(),
            mime_type: "text/markdown".to_string(),
        });
        descriptors
    }
}
