//! Function discovery over registered modules.

use crate::error::DiscoveryError;
use crate::function::{FunctionRecord, Module, Visibility};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;

/// Why a function is not tool-eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Exclusion {
    /// Not `pub`, or the name starts with `_`.
    Private,
    /// Listed as an internal helper.
    Denylisted,
    /// The signature could not be described.
    Undescribed,
}

/// Caller-supplied discovery settings.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// Extra function names to exclude, on top of the module's own list.
    pub denylist: Vec<String>,
}

impl DiscoveryOptions {
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

/// Result of discovering one module.
#[derive(Debug, Clone)]
pub struct Discovery {
    module: String,
    eligible: Vec<FunctionRecord>,
    excluded: Vec<(FunctionRecord, Exclusion)>,
}

impl Discovery {
    /// Module name.
    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Tool-eligible records, sorted by name.
    #[must_use]
    pub fn eligible(&self) -> &[FunctionRecord] {
        &self.eligible
    }

    /// Excluded records with their reason, sorted by name.
    #[must_use]
    pub fn excluded(&self) -> &[(FunctionRecord, Exclusion)] {
        &self.excluded
    }

    /// Looks up an eligible record.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FunctionRecord> {
        self.eligible.iter().find(|r| r.name() == name)
    }
}

/// Registry of target modules.
#[derive(Debug, Clone, Default)]
pub struct Library {
    modules: IndexMap<String, Module>,
}

impl Library {
    /// An empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module, replacing any module of the same name.
    #[must_use]
    pub fn with_module(mut self, module: Module) -> Self {
        self.modules.insert(module.name().to_string(), module);
        self
    }

    /// Looks up a module by name.
    #[must_use]
    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }

    /// Registered module names in registration order.
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    /// Enumerates the tool-eligible functions of `module_name`.
    ///
    /// # Errors
    ///
    /// Fails if the module is not registered, declares a name twice, or has
    /// no eligible function left after exclusions.
    pub fn discover(
        &self,
        module_name: &str,
        options: &DiscoveryOptions,
    ) -> Result<Discovery, DiscoveryError> {
        let module = self
            .modules
            .get(module_name)
            .ok_or_else(|| DiscoveryError::ModuleNotFound {
                name: module_name.to_string(),
                available: self.module_names().collect::<Vec<_>>().join(", "),
            })?;

        let mut seen = HashSet::new();
        let mut eligible = Vec::new();
        let mut excluded = Vec::new();

        for record in module.functions() {
            if !seen.insert(record.name()) {
                return Err(DiscoveryError::DuplicateFunction {
                    module: module_name.to_string(),
                    name: record.name().to_string(),
                });
            }

            match exclusion_for(record, module, options) {
                Some(reason) => {
                    tracing::debug!(function = record.name(), ?reason, "function excluded");
                    excluded.push((record.clone(), reason));
                }
                None => eligible.push(record.clone()),
            }
        }

        if eligible.is_empty() {
            return Err(DiscoveryError::NoEligibleFunctions {
                module: module_name.to_string(),
            });
        }

        eligible.sort_by(|a, b| a.name().cmp(b.name()));
        excluded.sort_by(|(a, _), (b, _)| a.name().cmp(b.name()));

        tracing::debug!(
            module = module_name,
            eligible = eligible.len(),
            excluded = excluded.len(),
            "discovery complete"
        );

        Ok(Discovery {
            module: module_name.to_string(),
            eligible,
            excluded,
        })
    }
}

fn exclusion_for(
    record: &FunctionRecord,
    module: &Module,
    options: &DiscoveryOptions,
) -> Option<Exclusion> {
    let name = record.name();
    if record.visibility() == Visibility::Private || name.starts_with('_') {
        Some(Exclusion::Private)
    } else if module.denylist().iter().any(|d| d == name)
        || options.denylist.iter().any(|d| d == name)
    {
        Some(Exclusion::Denylisted)
    } else if record.signature().is_none() {
        Some(Exclusion::Undescribed)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExecutionError;
    use crate::function::{ReturnKind, ReturnValue, Signature};
    use crate::types::NativeValue;

    fn noop(_: Vec<NativeValue>) -> Result<ReturnValue, ExecutionError> {
        Ok(ReturnValue::Null)
    }

    fn public(name: &str) -> FunctionRecord {
        FunctionRecord::new(
            name,
            "Doc.",
            Signature {
                params: Vec::new(),
                returns: ReturnKind::Value,
            },
            noop,
        )
    }

    fn library() -> Library {
        Library::new().with_module(
            Module::new("calc")
                .function(public("zeta"))
                .function(public("alpha"))
                .function(public("_hidden"))
                .function(public("round_to"))
                .function(FunctionRecord::opaque("helper", Visibility::Private, ""))
                .function(FunctionRecord::opaque("generic", Visibility::Public, "Doc."))
                .exclude("round_to"),
        )
    }

    #[test]
    fn eligible_functions_are_sorted() {
        let discovery = library().discover("calc", &DiscoveryOptions::default()).unwrap();
        let names: Vec<_> = discovery.eligible().iter().map(FunctionRecord::name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn exclusions_carry_reasons() {
        let discovery = library().discover("calc", &DiscoveryOptions::default()).unwrap();
        let excluded: Vec<_> = discovery
            .excluded()
            .iter()
            .map(|(r, reason)| (r.name(), *reason))
            .collect();
        assert_eq!(
            excluded,
            vec![
                ("_hidden", Exclusion::Private),
                ("generic", Exclusion::Undescribed),
                ("helper", Exclusion::Private),
                ("round_to", Exclusion::Denylisted),
            ]
        );
    }

    #[test]
    fn options_extend_the_denylist() {
        let options = DiscoveryOptions::default().with_denylist(["zeta"]);
        let discovery = library().discover("calc", &options).unwrap();
        assert!(discovery.get("zeta").is_none());
        assert!(discovery.get("alpha").is_some());
    }

    #[test]
    fn unknown_module_lists_available() {
        let err = library().discover("nope", &DiscoveryOptions::default()).unwrap_err();
        assert_eq!(
            err,
            DiscoveryError::ModuleNotFound {
                name: "nope".into(),
                available: "calc".into()
            }
        );
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let lib = Library::new().with_module(
            Module::new("dup").function(public("a")).function(public("a")),
        );
        let err = lib.discover("dup", &DiscoveryOptions::default()).unwrap_err();
        assert!(matches!(err, DiscoveryError::DuplicateFunction { .. }));
    }

    #[test]
    fn module_with_nothing_eligible_is_an_error() {
        let lib = Library::new().with_module(Module::new("empty").function(public("_x")));
        let err = lib.discover("empty", &DiscoveryOptions::default()).unwrap_err();
        assert_eq!(
            err,
            DiscoveryError::NoEligibleFunctions {
                module: "empty".into()
            }
        );
    }
}
