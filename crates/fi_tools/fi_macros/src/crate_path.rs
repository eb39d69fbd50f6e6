//! Locating `fi_tools` from the crate that expands `#[fi_module]`.

use proc_macro_crate::{FoundCrate, crate_name};
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::Ident;

const TOOLS: &str = "fi_tools";

/// Crates that re-export `fi_tools` under its own name, nearest first.
const REEXPORTERS: [&str; 2] = ["fi_internal", "fi_mcp"];

/// Path generated code uses to reach `fi_tools`.
///
/// A direct (possibly renamed) dependency wins. Inside `fi_tools` itself the
/// `extern crate self as fi_tools` alias makes the plain name resolve.
/// Otherwise the first re-exporting dependency found is used; if there is
/// none, the plain name is emitted and rustc reports the missing dependency.
pub(crate) fn tools_path() -> TokenStream {
    match crate_name(TOOLS) {
        Ok(FoundCrate::Name(found)) => {
            let ident = ident(&found);
            return quote!(::#ident);
        }
        Ok(FoundCrate::Itself) => {
            let ident = ident(TOOLS);
            return quote!(#ident);
        }
        Err(_) => {}
    }

    let tools = ident(TOOLS);
    REEXPORTERS
        .iter()
        .find_map(|reexporter| match crate_name(reexporter) {
            Ok(FoundCrate::Name(found)) => {
                let root = ident(&found);
                Some(quote!(::#root::#tools))
            }
            _ => None,
        })
        .unwrap_or_else(|| quote!(#tools))
}

fn ident(name: &str) -> Ident {
    Ident::new(name, Span::call_site())
}
