//! Procedural macros for the fi_tools function catalog.
//!
//! Provides `#[fi_module]`, which turns an inline module of plain functions
//! into a static descriptor table that `fi_tools` discovers at start-up.

mod common;
mod crate_path;
mod module;

use proc_macro::TokenStream;

/// Generates a `module()` descriptor table for an inline module.
///
/// Every `fn` item in the module is recorded with its name, visibility and
/// doc comment. Public functions whose signature can be described (no
/// generics, `impl Trait`, `async`, `unsafe` or receivers) also record their
/// parameter types, defaults, return kind and an invoker.
///
/// # Module Arguments
///
/// - `exclude(a, b)` — internal helpers that are never exposed as tools
/// - `name = "..."` — module name used for discovery (defaults to the ident)
///
/// # Parameter Attributes
///
/// - `#[default(expr)]` — makes the parameter optional; `expr` must have the
///   parameter's type
/// - `#[choices("a", "b")]` — restricts a `String` parameter to a fixed set
///
/// # Example
///
/// ```ignore
/// use fi_tools::fi_module;
///
/// #[fi_module(exclude(round_to))]
/// pub mod calc {
///     /// Grows an amount at a fixed rate.
///     ///
///     /// ### Args:
///     /// - **amount**: Starting amount.
///     /// - **years**: Number of years.
///     ///
///     /// ### Returns:
///     /// The grown amount.
///     pub fn grow(amount: f64, #[default(10)] years: u32) -> f64 {
///         round_to(amount * 1.07_f64.powi(years as i32), 2)
///     }
///
///     pub fn round_to(value: f64, places: i32) -> f64 {
///         let factor = 10f64.powi(places);
///         (value * factor).round() / factor
///     }
/// }
///
/// let module = calc::module();
/// ```
#[proc_macro_attribute]
pub fn fi_module(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut args = module::ModuleArgs::default();
    let parser = syn::meta::parser(|meta| args.parse(meta));
    syn::parse_macro_input!(attr with parser);

    let input = syn::parse_macro_input!(item as syn::ItemMod);
    module::generate_module(&args, input).into()
}
