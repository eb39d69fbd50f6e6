//! Integration tests for the `fi_tools` crate.

use fi_tools::{
    Catalog, CatalogError, CatalogOptions, DocPolicy, Dispatcher, Exclusion, FailureKind,
    InvocationRequest, InvocationResult, Library, ParsedDocstring, ResourceError,
    ResourceProvider, ReturnKind, Rule, SkipReason, UnknownArguments, Visibility, fi_module,
};
use serde_json::json;
use std::sync::Arc;

#[fi_module(exclude(round_to))]
pub mod sample {
    use serde::Serialize;

    /// Principal and interest parts of a grown balance.
    #[derive(Debug, Serialize)]
    pub struct Breakdown {
        /// Amount originally invested.
        pub principal: f64,
        /// Growth on top of the principal.
        pub interest: f64,
    }

    /// An amount in cents; not representable in a tool schema.
    pub struct Money(pub i64);

    /// Calculates the future value of a present amount.
    ///
    /// ### Args:
    /// - **present_value**: The amount invested today.
    /// - **annual_rate**: Annual rate of return,
    ///   as a percentage.
    /// - **periods_per_year**: Compounding periods per year.
    /// - **years**: Number of years invested.
    ///
    /// ### Returns:
    /// The value at the end of the term.
    pub fn future_value(present_value: f64, annual_rate: f64, periods_per_year: u32, years: f64) -> f64 {
        let periods = f64::from(periods_per_year);
        grow(present_value, annual_rate / 100.0 / periods, periods * years)
    }

    /// Splits one year of growth into principal and interest.
    ///
    /// ### Args:
    /// - **principal**: Starting balance.
    /// - **rate**: Annual rate as a decimal.
    ///
    /// ### Returns:
    /// The principal and interest components.
    pub fn breakdown(principal: f64, rate: f64) -> Breakdown {
        Breakdown {
            principal,
            interest: principal * rate,
        }
    }

    /// Divides two numbers.
    ///
    /// ### Args:
    /// - **numerator**: Dividend.
    /// - **denominator**: Divisor.
    ///
    /// ### Returns:
    /// The quotient.
    pub fn checked_divide(numerator: f64, denominator: f64) -> Result<f64, String> {
        if denominator == 0.0 {
            return Err("division by zero".to_string());
        }
        Ok(numerator / denominator)
    }

    /// Compounds a balance at 6% for a number of years.
    ///
    /// ### Args:
    /// - **principal**: Starting balance.
    /// - **frequency**: How often interest compounds.
    /// - **years**: Number of years.
    ///
    /// ### Returns:
    /// The compounded balance.
    pub fn compound(
        principal: f64,
        #[choices("annual", "monthly")]
        #[default(String::from("annual"))]
        frequency: String,
        #[default(1)] years: u32,
    ) -> f64 {
        let periods = if frequency == "monthly" { 12.0 } else { 1.0 };
        grow(principal, 0.06 / periods, periods * f64::from(years))
    }

    /// Sums a list of values.
    ///
    /// ### Args:
    /// - **values**: Values to add up.
    /// - **scale**: Optional multiplier.
    /// - **negate**: Whether to flip the sign.
    ///
    /// ### Returns:
    /// The (scaled) total.
    pub fn total(values: Vec<f64>, scale: Option<f64>, negate: bool) -> f64 {
        let sum: f64 = values.iter().sum::<f64>() * scale.unwrap_or(1.0);
        if negate { -sum } else { sum }
    }

    /// Always fails.
    ///
    /// ### Args:
    /// - **reason**: Panic message.
    ///
    /// ### Returns:
    /// Nothing, ever.
    pub fn explode(reason: String) -> f64 {
        panic!("{reason}")
    }

    /// Raises a value to a power.
    ///
    /// ### Args:
    /// - **x**: The base.
    ///
    /// ### Returns:
    /// `x` to the power `n`.
    pub fn undocumented_param(x: f64, n: i32) -> f64 {
        x.powi(n)
    }

    pub fn no_docs(x: f64) -> f64 {
        x
    }

    /// Spends money.
    ///
    /// ### Args:
    /// - **amount**: Amount to spend.
    ///
    /// ### Returns:
    /// Remaining cents.
    pub fn spend(amount: Money) -> i64 {
        -amount.0
    }

    /// Rounds to a number of decimal places.
    ///
    /// ### Args:
    /// - **value**: Value to round.
    /// - **places**: Decimal places.
    ///
    /// ### Returns:
    /// The rounded value.
    pub fn round_to(value: f64, places: i32) -> f64 {
        let factor = 10f64.powi(places);
        (value * factor).round() / factor
    }

    /// Converts anything numeric.
    ///
    /// ### Args:
    /// - **x**: Input.
    ///
    /// ### Returns:
    /// The input as `f64`.
    pub fn generic<T: Into<f64>>(x: T) -> f64 {
        x.into()
    }

    /// Internal by convention.
    pub fn _internal() -> f64 {
        0.0
    }

    fn grow(amount: f64, rate: f64, periods: f64) -> f64 {
        amount * (1.0 + rate).powf(periods)
    }
}

#[fi_module]
pub mod arithmetic {
    /// Adds two numbers.
    ///
    /// ### Args:
    /// - **a**: First addend.
    /// - **b**: Second addend.
    /// - see the notes below
    ///
    /// ### Returns:
    /// The sum.
    pub fn add(a: f64, b: f64) -> f64 {
        a + b
    }

    /// Subtracts one number from another.
    ///
    /// ### Args:
    /// - **a**: Minuend.
    /// - **b**: Subtrahend.
    /// - see the notes below
    ///
    /// ### Returns:
    /// The difference.
    pub fn sub(a: f64, b: f64) -> f64 {
        a - b
    }

    /// Divides two numbers without checking the divisor.
    ///
    /// ### Args:
    /// - **a**: Dividend.
    /// - **b**: Divisor.
    ///
    /// ### Returns:
    /// The quotient.
    pub fn div(a: f64, b: f64) -> f64 {
        a / b
    }
}

fn arithmetic_catalog(policy: DocPolicy) -> Result<Catalog, CatalogError> {
    Catalog::build(
        &Library::new().with_module(arithmetic::module()),
        CatalogOptions::new("arithmetic").with_doc_policy(policy),
    )
}

fn library() -> Library {
    Library::new().with_module(sample::module())
}

fn catalog(options: CatalogOptions) -> Arc<Catalog> {
    Arc::new(Catalog::build(&library(), options).unwrap())
}

fn dispatcher() -> Dispatcher {
    Dispatcher::new(catalog(CatalogOptions::new("sample")))
}

fn failure_kind(result: &InvocationResult) -> FailureKind {
    result.failure().map(|f| f.kind).unwrap()
}

// ─────────────────────────────────────────────────────────────────────
// 1. #[fi_module] descriptor table
// ─────────────────────────────────────────────────────────────────────

#[test]
fn module_records_every_function() {
    let module = sample::module();
    assert_eq!(module.name(), "sample");
    assert_eq!(module.functions().len(), 13);
    assert_eq!(module.denylist(), ["round_to".to_string()]);
}

#[test]
fn module_records_visibility_and_signatures() {
    let module = sample::module();
    let find = |name: &str| {
        module
            .functions()
            .iter()
            .find(|r| r.name() == name)
            .unwrap()
    };

    let grow = find("grow");
    assert_eq!(grow.visibility(), Visibility::Private);
    assert!(grow.signature().is_none());

    assert!(find("generic").signature().is_none());

    let compound = find("compound").signature().unwrap();
    assert_eq!(compound.returns, ReturnKind::Value);
    let required: Vec<_> = compound.required_names().collect();
    assert_eq!(required, vec!["principal"]);
}

#[test]
fn doc_comments_keep_markdown_structure() {
    let module = sample::module();
    let record = module
        .functions()
        .iter()
        .find(|r| r.name() == "future_value")
        .unwrap();
    let parsed = ParsedDocstring::parse_for(record.docstring(), record.signature().unwrap()).unwrap();
    assert_eq!(parsed.summary, "Calculates the future value of a present amount.");
    assert_eq!(
        parsed.description_for("annual_rate"),
        Some("Annual rate of return, as a percentage.")
    );
    assert_eq!(parsed.returns, "The value at the end of the term.");
}

// ─────────────────────────────────────────────────────────────────────
// 2. Discovery
// ─────────────────────────────────────────────────────────────────────

#[test]
fn discovery_excludes_private_denylisted_and_undescribed() {
    let discovery = library()
        .discover("sample", &fi_tools::DiscoveryOptions::default())
        .unwrap();
    let excluded: Vec<_> = discovery
        .excluded()
        .iter()
        .map(|(r, reason)| (r.name(), *reason))
        .collect();
    assert_eq!(
        excluded,
        vec![
            ("_internal", Exclusion::Private),
            ("generic", Exclusion::Undescribed),
            ("grow", Exclusion::Private),
            ("round_to", Exclusion::Denylisted),
        ]
    );
    assert_eq!(discovery.eligible().len(), 9);
}

// ─────────────────────────────────────────────────────────────────────
// 3. Catalog and documentation policy
// ─────────────────────────────────────────────────────────────────────

#[test]
fn default_policy_excludes_incomplete_docs_and_bad_types() {
    let catalog = catalog(CatalogOptions::new("sample"));
    let names: Vec<_> = catalog.tools().map(|t| t.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "breakdown",
            "checked_divide",
            "compound",
            "explode",
            "future_value",
            "total"
        ]
    );

    let reason = |name: &str| {
        catalog
            .skipped()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, r)| r.clone())
            .unwrap()
    };
    assert_eq!(
        reason("undocumented_param"),
        SkipReason::Undocumented(vec![Rule::MissingParameterDescription])
    );
    assert_eq!(
        reason("no_docs"),
        SkipReason::Undocumented(vec![Rule::MissingDocstring])
    );
    assert!(matches!(reason("spend"), SkipReason::Schema(_)));
    assert_eq!(reason("generic"), SkipReason::Excluded(Exclusion::Undescribed));
}

#[test]
fn report_names_the_undocumented_parameter() {
    let catalog = catalog(CatalogOptions::new("sample"));
    let violations: Vec<_> = catalog.report().for_function("undocumented_param").collect();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].parameter.as_deref(), Some("n"));
}

#[test]
fn degrade_policy_exposes_placeholders() {
    let catalog = catalog(CatalogOptions::new("sample").with_doc_policy(DocPolicy::Degrade));
    assert_eq!(catalog.len(), 8);

    let tool = &catalog.get("undocumented_param").unwrap().schema;
    assert!(tool.degraded);
    assert_eq!(tool.parameters[1].description, "Parameter: n");

    let bare = &catalog.get("no_docs").unwrap().schema;
    assert_eq!(bare.description, "No documentation available.");
}

#[test]
fn strict_policy_reports_every_violation() {
    let err = Catalog::build(
        &library(),
        CatalogOptions::new("sample").with_doc_policy(DocPolicy::Strict),
    )
    .unwrap_err();
    match err {
        CatalogError::Validation(report) => {
            assert_eq!(report.len(), 2);
            assert!(!report.passes("no_docs"));
            assert!(!report.passes("undocumented_param"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn malformed_entries_are_reported_by_validation() {
    let module = arithmetic::module();
    let report = fi_tools::validate_all(module.functions());
    assert_eq!(report.checked(), 3);
    assert!(!report.passes("add"));
    assert!(!report.passes("sub"));
    assert!(report.passes("div"));
    assert!(
        report
            .violations()
            .iter()
            .all(|v| v.rule == Rule::MalformedStructure)
    );
}

#[test]
fn malformed_entries_follow_each_policy() {
    let excluded = arithmetic_catalog(DocPolicy::Exclude).unwrap();
    let names: Vec<_> = excluded.tools().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["div"]);
    assert_eq!(
        excluded.skipped(),
        [
            (
                "add".to_string(),
                SkipReason::Undocumented(vec![Rule::MalformedStructure])
            ),
            (
                "sub".to_string(),
                SkipReason::Undocumented(vec![Rule::MalformedStructure])
            ),
        ]
    );
    assert_eq!(excluded.report().len(), 2);

    let degraded = arithmetic_catalog(DocPolicy::Degrade).unwrap();
    assert_eq!(degraded.len(), 3);
    let add = &degraded.get("add").unwrap().schema;
    assert_eq!(add.parameters[0].description, "First addend.");
    assert_eq!(add.required().collect::<Vec<_>>(), vec!["a", "b"]);

    match arithmetic_catalog(DocPolicy::Strict).unwrap_err() {
        CatalogError::Validation(report) => {
            assert_eq!(report.len(), 2);
            assert!(!report.passes("add"));
            assert!(!report.passes("sub"));
            let text = report.to_string();
            assert!(text.contains("add [malformed-structure]"));
            assert!(text.contains("sub [malformed-structure]"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_module_fails_catalog_construction() {
    let err = Catalog::build(&library(), CatalogOptions::new("missing")).unwrap_err();
    assert!(matches!(err, CatalogError::Discovery(_)));
}

#[test]
fn input_schema_matches_signature() {
    let catalog = catalog(CatalogOptions::new("sample"));
    let schema = catalog.get("compound").unwrap().schema.input_schema().clone();
    assert_eq!(
        schema,
        json!({
            "type": "object",
            "properties": {
                "principal": {"type": "number", "description": "Starting balance."},
                "frequency": {
                    "type": "string",
                    "enum": ["annual", "monthly"],
                    "description": "How often interest compounds.",
                    "default": "annual"
                },
                "years": {"type": "integer", "description": "Number of years.", "default": 1}
            },
            "required": ["principal"],
            "additionalProperties": false
        })
    );
}

#[test]
fn prefix_applies_to_listing_and_dispatch() {
    let catalog = catalog(CatalogOptions::new("sample").with_tool_prefix("fi_"));
    assert!(catalog.tools().all(|t| t.name.starts_with("fi_")));

    let dispatcher = Dispatcher::new(catalog);
    let ok = dispatcher.invoke("fi_breakdown", &json!({"principal": 100, "rate": 0.1}));
    assert!(ok.is_success());
    let missing = dispatcher.invoke("breakdown", &json!({"principal": 100, "rate": 0.1}));
    assert_eq!(failure_kind(&missing), FailureKind::UnknownTool);
}

// ─────────────────────────────────────────────────────────────────────
// 4. Dispatch
// ─────────────────────────────────────────────────────────────────────

#[test]
fn future_value_grows_money() {
    let result = dispatcher().invoke(
        "future_value",
        &json!({"present_value": 1000, "annual_rate": 7, "periods_per_year": 12, "years": 10}),
    );
    let InvocationResult::Success(value) = result else {
        panic!("expected success, got {result:?}");
    };
    assert!(value.as_f64().unwrap() > 1000.0);
}

#[test]
fn missing_arguments_are_all_named() {
    let result = dispatcher().invoke("future_value", &json!({"present_value": 1000}));
    let failure = result.failure().unwrap();
    assert_eq!(failure.kind, FailureKind::MissingArgument);
    assert!(failure.message.contains("annual_rate"));
    assert!(failure.message.contains("periods_per_year"));
    assert!(failure.message.contains("years"));
}

#[test]
fn conversion_errors_name_the_parameter() {
    let result = dispatcher().invoke("breakdown", &json!({"principal": 100, "rate": "four percent"}));
    let failure = result.failure().unwrap();
    assert_eq!(failure.kind, FailureKind::ConversionError);
    assert!(failure.message.contains("rate"));
}

#[test]
fn unknown_arguments_follow_configuration() {
    let args = json!({"principal": 100, "rate": 0.1, "extra": true});
    assert_eq!(
        failure_kind(&dispatcher().invoke("breakdown", &args)),
        FailureKind::UnknownArgument
    );

    let lenient = Dispatcher::new(catalog(
        CatalogOptions::new("sample").with_unknown_arguments(UnknownArguments::Ignore),
    ));
    assert!(lenient.invoke("breakdown", &args).is_success());
}

#[test]
fn structured_results_serialize() {
    let result = dispatcher().invoke("breakdown", &json!({"principal": 100, "rate": 0.5}));
    assert_eq!(
        result,
        InvocationResult::Success(json!({"principal": 100.0, "interest": 50.0}))
    );
}

#[test]
fn defaults_and_choices_apply() {
    let dispatcher = dispatcher();
    let annual = dispatcher.invoke("compound", &json!({"principal": 100}));
    assert_eq!(annual, InvocationResult::Success(json!(106.0)));

    let bad = dispatcher.invoke("compound", &json!({"principal": 100, "frequency": "daily"}));
    assert_eq!(failure_kind(&bad), FailureKind::ConversionError);
}

#[test]
fn lists_optionals_and_booleans_convert() {
    let result = dispatcher().invoke(
        "total",
        &json!({"values": [1, 2.5, "3"], "scale": null, "negate": "TRUE"}),
    );
    assert_eq!(result, InvocationResult::Success(json!(-6.5)));
}

#[test]
fn function_errors_keep_their_message() {
    let result = dispatcher().invoke("checked_divide", &json!({"numerator": 1, "denominator": 0}));
    let failure = result.failure().unwrap();
    assert_eq!(failure.kind, FailureKind::ExecutionError);
    assert_eq!(failure.message, "division by zero");
}

#[test]
fn non_finite_results_are_execution_errors() {
    let dispatcher = Dispatcher::new(Arc::new(arithmetic_catalog(DocPolicy::Exclude).unwrap()));
    let result = dispatcher.invoke("div", &json!({"a": 1, "b": 0}));
    let failure = result.failure().unwrap();
    assert_eq!(failure.kind, FailureKind::ExecutionError);
    assert_eq!(failure.message, "result is not a finite number");

    let ok = dispatcher.invoke("div", &json!({"a": 1, "b": 4}));
    assert_eq!(ok, InvocationResult::Success(json!(0.25)));
}

#[test]
fn panics_become_execution_errors() {
    let result = dispatcher().invoke("explode", &json!({"reason": "boom"}));
    let failure = result.failure().unwrap();
    assert_eq!(failure.kind, FailureKind::ExecutionError);
    assert_eq!(failure.message, "boom");
}

#[test]
fn excluded_functions_are_not_invocable() {
    let dispatcher = dispatcher();
    for name in ["round_to", "grow", "generic", "spend", "_internal"] {
        let result = dispatcher.dispatch(&InvocationRequest::new(name, json!({})));
        assert_eq!(failure_kind(&result), FailureKind::UnknownTool, "{name}");
    }
}

// ─────────────────────────────────────────────────────────────────────
// 5. Help resources
// ─────────────────────────────────────────────────────────────────────

#[test]
fn documentation_has_title_and_verbatim_body() {
    let provider = ResourceProvider::new(catalog(CatalogOptions::new("sample")));
    let doc = provider.get_documentation("future_value").unwrap();
    assert!(doc.starts_with("# Future Value\n\nCalculates the future value"));
    assert!(doc.contains("- **periods_per_year**: Compounding periods per year."));
    assert!(doc.contains("  as a percentage."));
}

#[test]
fn documentation_covers_functions_without_tools() {
    let provider = ResourceProvider::new(catalog(CatalogOptions::new("sample")));
    assert!(provider.read("fi://help/undocumented_param").is_ok());
    assert_eq!(
        provider.read("fi://help/grow"),
        Err(ResourceError::NotFound("grow".into()))
    );
    assert_eq!(
        provider.read("https://example.com"),
        Err(ResourceError::InvalidUri("https://example.com".into()))
    );
}

#[test]
fn all_resource_lists_every_function_sorted() {
    let provider = ResourceProvider::new(catalog(CatalogOptions::new("sample")));
    let all = provider.read("fi://help/all").unwrap();
    let breakdown = all.find("## Breakdown").unwrap();
    let total = all.find("## Total").unwrap();
    assert!(breakdown < total);
    assert!(all.contains("\n\n---\n\n"));

    let listed = provider.list();
    assert_eq!(listed.len(), 10);
    assert_eq!(listed.last().unwrap().uri, "fi://help/all");
}
