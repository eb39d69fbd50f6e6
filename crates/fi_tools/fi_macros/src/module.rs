//! Code generation for `#[fi_module]`.

use crate::common::{
    ParamInfo, ReturnShape, extract_doc_comments, is_param_marker, native_type_tokens,
    parse_param, undescribable_reason,
};
use crate::crate_path::tools_path;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{FnArg, Item, ItemFn, ItemMod, LitStr, Visibility};

/// Arguments accepted by `#[fi_module(...)]`.
#[derive(Default)]
pub(crate) struct ModuleArgs {
    /// Overrides the module name used for discovery.
    pub name: Option<String>,
    /// Internal helpers never exposed as tools.
    pub exclude: Vec<String>,
}

impl ModuleArgs {
    pub(crate) fn parse(&mut self, meta: syn::meta::ParseNestedMeta<'_>) -> syn::Result<()> {
        if meta.path.is_ident("name") {
            let name: LitStr = meta.value()?.parse()?;
            self.name = Some(name.value());
            Ok(())
        } else if meta.path.is_ident("exclude") {
            meta.parse_nested_meta(|inner| {
                let ident = inner
                    .path
                    .get_ident()
                    .ok_or_else(|| inner.error("expected a function name"))?;
                self.exclude.push(ident.to_string());
                Ok(())
            })
        } else {
            Err(meta.error("unsupported fi_module property; expected `name` or `exclude`"))
        }
    }
}

/// Expands `#[fi_module]` on an inline module.
pub(crate) fn generate_module(args: &ModuleArgs, mut input: ItemMod) -> TokenStream {
    let Some((_, items)) = input.content.as_mut() else {
        return syn::Error::new_spanned(
            &input.ident,
            "#[fi_module] requires an inline module (`mod name { ... }`)",
        )
        .to_compile_error();
    };

    let pt = tools_path();
    let module_name = args
        .name
        .clone()
        .unwrap_or_else(|| input.ident.to_string());

    let mut records = Vec::new();
    let mut invokers = Vec::new();

    for item in items.iter_mut() {
        let Item::Fn(func) = item else {
            continue;
        };

        match describe_function(func, &pt) {
            Ok((record, invoker)) => {
                records.push(record);
                invokers.extend(invoker);
            }
            Err(err) => return err.to_compile_error(),
        }

        strip_param_markers(func);
    }

    for name in &args.exclude {
        if !items
            .iter()
            .any(|item| matches!(item, Item::Fn(f) if f.sig.ident == name))
        {
            return syn::Error::new_spanned(
                &input.ident,
                format!("excluded function `{name}` is not declared in this module"),
            )
            .to_compile_error();
        }
    }

    let excludes = &args.exclude;
    let generated: Vec<Item> = vec![
        syn::parse_quote! {
            /// Descriptor table of every function in this module.
            pub fn module() -> #pt::Module {
                #pt::Module::new(#module_name)
                    #( .function(#records) )*
                    #( .exclude(#excludes) )*
            }
        },
    ];

    items.extend(generated);
    for invoker in invokers {
        items.push(Item::Verbatim(invoker));
    }

    quote! { #input }
}

/// Builds the record expression and, for describable public functions, the
/// invoker item.
fn describe_function(
    func: &ItemFn,
    pt: &TokenStream,
) -> syn::Result<(TokenStream, Option<TokenStream>)> {
    let name = func.sig.ident.to_string();
    let doc = extract_doc_comments(&func.attrs);
    let is_public = matches!(func.vis, Visibility::Public(_));

    if !is_public || undescribable_reason(&func.sig).is_some() {
        let visibility = if is_public {
            quote! { #pt::Visibility::Public }
        } else {
            quote! { #pt::Visibility::Private }
        };
        return Ok((
            quote! { #pt::FunctionRecord::opaque(#name, #visibility, #doc) },
            None,
        ));
    }

    let mut params = Vec::new();
    for input in &func.sig.inputs {
        if let FnArg::Typed(pat_type) = input
            && let Some(param) = parse_param(pat_type)?
        {
            params.push(param);
        }
    }

    let mut all_supported = true;
    let specs: Vec<TokenStream> = params
        .iter()
        .map(|param| {
            let param_name = param.name.to_string();
            let (ty_tokens, supported) = match &param.choices {
                Some(choices) => (quote! { #pt::NativeType::choice([#(#choices),*]) }, true),
                None => native_type_tokens(&param.ty, pt),
            };
            all_supported &= supported;

            match (&param.default_expr, supported) {
                (Some(default_expr), true) => {
                    let ty = &param.ty;
                    quote! {
                        #pt::ParamSpec::with_default(#param_name, #ty_tokens, {
                            let __value: #ty = #default_expr;
                            #pt::IntoNative::into_native(__value)
                        })
                    }
                }
                _ => quote! { #pt::ParamSpec::new(#param_name, #ty_tokens) },
            }
        })
        .collect();

    let shape = ReturnShape::of(&func.sig.output);
    let returns = if shape.has_value() {
        quote! { #pt::ReturnKind::Value }
    } else {
        quote! { #pt::ReturnKind::Nothing }
    };

    let invoker_ident = format_ident!("__fi_invoke_{}", func.sig.ident);
    let body = if all_supported {
        invoker_body(&func.sig.ident, &params, &shape, pt)
    } else {
        let message = format!("`{name}` has parameters of unsupported types");
        quote! {
            let _ = __args;
            ::core::result::Result::Err(#pt::ExecutionError::new(#message))
        }
    };

    let invoker = quote! {
        #[doc(hidden)]
        fn #invoker_ident(
            __args: ::std::vec::Vec<#pt::NativeValue>,
        ) -> ::core::result::Result<#pt::ReturnValue, #pt::ExecutionError> {
            #body
        }
    };

    let record = quote! {
        #pt::FunctionRecord::new(
            #name,
            #doc,
            #pt::Signature {
                params: ::std::vec![#(#specs),*],
                returns: #returns,
            },
            #invoker_ident,
        )
    };

    Ok((record, Some(invoker)))
}

fn invoker_body(
    fn_ident: &syn::Ident,
    params: &[ParamInfo],
    shape: &ReturnShape,
    pt: &TokenStream,
) -> TokenStream {
    let extractions = params.iter().map(|param| {
        let ident = &param.name;
        let ty = &param.ty;
        let name = ident.to_string();
        quote! {
            let #ident: #ty = #pt::function::next_arg(&mut __args, #name)?;
        }
    });
    let call_args = params.iter().map(|param| &param.name);
    let call = quote! { #fn_ident(#(#call_args),*) };

    let result_handling = match shape {
        ReturnShape::Unit => quote! {
            #call;
            ::core::result::Result::Ok(#pt::ReturnValue::Null)
        },
        ReturnShape::UnitResult => quote! {
            match #call {
                ::core::result::Result::Ok(()) => ::core::result::Result::Ok(#pt::ReturnValue::Null),
                ::core::result::Result::Err(__err) => ::core::result::Result::Err(
                    #pt::ExecutionError::new(::std::string::ToString::to_string(&__err)),
                ),
            }
        },
        ReturnShape::Result => quote! {
            match #call {
                ::core::result::Result::Ok(__value) => #pt::function::serialize_output(&__value),
                ::core::result::Result::Err(__err) => ::core::result::Result::Err(
                    #pt::ExecutionError::new(::std::string::ToString::to_string(&__err)),
                ),
            }
        },
        ReturnShape::Value => quote! {
            let __value = #call;
            #pt::function::serialize_output(&__value)
        },
    };

    let preamble = if params.is_empty() {
        quote! { let _ = __args; }
    } else {
        quote! { let mut __args = ::std::iter::IntoIterator::into_iter(__args); }
    };

    quote! {
        #preamble
        #(#extractions)*
        #result_handling
    }
}

/// Removes `#[default]` and `#[choices]` from parameters so the emitted
/// function compiles.
fn strip_param_markers(func: &mut ItemFn) {
    for input in &mut func.sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            pat_type.attrs.retain(|attr| !is_param_marker(attr));
        }
    }
}
