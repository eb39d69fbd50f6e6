//! Shared utilities for function-table code generation.

use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::punctuated::Punctuated;
use syn::{
    Attribute, Expr, ExprLit, FnArg, GenericArgument, Lit, LitStr, Meta, Pat, PatType,
    PathArguments, ReturnType, Signature, Token, Type,
};

/// Extracts doc comment text from attributes.
///
/// Exactly one leading space is stripped from each line so markdown
/// indentation (continuation lines, nested lists) survives.
pub(crate) fn extract_doc_comments(attrs: &[Attribute]) -> String {
    let mut docs = Vec::new();

    for attr in attrs {
        if attr.path().is_ident("doc")
            && let Meta::NameValue(meta) = &attr.meta
            && let Expr::Lit(ExprLit {
                lit: Lit::Str(lit_str),
                ..
            }) = &meta.value
        {
            let value = lit_str.value();
            for line in value.lines() {
                let line = line.strip_prefix(' ').unwrap_or(line);
                docs.push(line.trim_end().to_string());
            }
        }
    }

    docs.join("\n").trim().to_string()
}

/// Checks whether a signature can be described as a flat, synchronous
/// function of named parameters.
///
/// Returns the reason when it cannot; such functions are recorded as opaque.
pub(crate) fn undescribable_reason(sig: &Signature) -> Option<&'static str> {
    if sig.asyncness.is_some() {
        return Some("async functions are not supported");
    }
    if sig.unsafety.is_some() {
        return Some("unsafe functions are not supported");
    }
    if sig.abi.is_some() {
        return Some("extern functions are not supported");
    }
    if !sig.generics.params.is_empty() {
        return Some("generic functions are not supported");
    }
    if sig.variadic.is_some() {
        return Some("variadic functions are not supported");
    }

    for input in &sig.inputs {
        match input {
            FnArg::Receiver(_) => return Some("methods are not supported"),
            FnArg::Typed(pat_type) => {
                if !matches!(&*pat_type.pat, Pat::Ident(ident) if ident.subpat.is_none()) {
                    return Some("parameters must be plain identifiers");
                }
                if contains_impl_trait(&pat_type.ty) {
                    return Some("`impl Trait` parameters are not supported");
                }
            }
        }
    }

    if let ReturnType::Type(_, ty) = &sig.output
        && contains_impl_trait(ty)
    {
        return Some("`impl Trait` return types are not supported");
    }

    None
}

fn contains_impl_trait(ty: &Type) -> bool {
    match ty {
        Type::ImplTrait(_) => true,
        Type::Reference(r) => contains_impl_trait(&r.elem),
        Type::Paren(p) => contains_impl_trait(&p.elem),
        Type::Group(g) => contains_impl_trait(&g.elem),
        Type::Slice(s) => contains_impl_trait(&s.elem),
        Type::Array(a) => contains_impl_trait(&a.elem),
        Type::Tuple(t) => t.elems.iter().any(contains_impl_trait),
        Type::Path(p) => p.path.segments.iter().any(|segment| {
            matches!(&segment.arguments, PathArguments::AngleBracketed(args)
                if args.args.iter().any(|arg| matches!(arg, GenericArgument::Type(t) if contains_impl_trait(t))))
        }),
        _ => false,
    }
}

/// Parsed information about a single function parameter.
#[derive(Debug, Clone)]
pub(crate) struct ParamInfo {
    /// Parameter name.
    pub name: syn::Ident,
    /// Parameter type.
    pub ty: Type,
    /// Default value expression from `#[default(expr)]`.
    pub default_expr: Option<TokenStream>,
    /// Allowed values from `#[choices("a", "b")]`.
    pub choices: Option<Vec<String>>,
}

/// Parses a typed function parameter into a [`ParamInfo`].
pub(crate) fn parse_param(pat_type: &PatType) -> syn::Result<Option<ParamInfo>> {
    let Pat::Ident(pat_ident) = &*pat_type.pat else {
        return Ok(None);
    };

    Ok(Some(ParamInfo {
        name: pat_ident.ident.clone(),
        ty: (*pat_type.ty).clone(),
        default_expr: extract_default_expr(&pat_type.attrs)?,
        choices: extract_choices(&pat_type.attrs)?,
    }))
}

/// Whether an attribute is one of the parameter markers this macro consumes.
pub(crate) fn is_param_marker(attr: &Attribute) -> bool {
    attr.path().is_ident("default") || attr.path().is_ident("choices")
}

/// Extracts the default value from `#[default(expr)]`.
fn extract_default_expr(attrs: &[Attribute]) -> syn::Result<Option<TokenStream>> {
    for attr in attrs {
        if attr.path().is_ident("default") {
            return attr.parse_args::<TokenStream>().map(Some);
        }
    }
    Ok(None)
}

/// Extracts the allowed values from `#[choices("a", "b")]`.
fn extract_choices(attrs: &[Attribute]) -> syn::Result<Option<Vec<String>>> {
    for attr in attrs {
        if attr.path().is_ident("choices") {
            let list =
                attr.parse_args_with(Punctuated::<LitStr, Token![,]>::parse_terminated)?;
            return Ok(Some(list.iter().map(LitStr::value).collect()));
        }
    }
    Ok(None)
}

/// Extracts `T` from `Wrapper<T>` when the last path segment is `wrapper`.
fn unwrap_generic_inner<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    if let Type::Path(type_path) = ty
        && type_path.qself.is_none()
        && let Some(segment) = type_path.path.segments.last()
        && segment.ident == wrapper
        && let PathArguments::AngleBracketed(args) = &segment.arguments
        && args.args.len() == 1
        && let GenericArgument::Type(inner) = &args.args[0]
    {
        Some(inner)
    } else {
        None
    }
}

/// Maps a Rust type to a `NativeType` constructor expression.
///
/// Returns the expression and whether the type is fully supported.
pub(crate) fn native_type_tokens(ty: &Type, pt: &TokenStream) -> (TokenStream, bool) {
    if let Some(inner) = unwrap_generic_inner(ty, "Option") {
        let (inner, supported) = native_type_tokens(inner, pt);
        return (quote! { #pt::NativeType::optional(#inner) }, supported);
    }
    if let Some(inner) = unwrap_generic_inner(ty, "Vec") {
        let (inner, supported) = native_type_tokens(inner, pt);
        return (quote! { #pt::NativeType::list(#inner) }, supported);
    }

    let scalar = match ty {
        Type::Path(type_path) if type_path.qself.is_none() => type_path
            .path
            .get_ident()
            .map(ToString::to_string)
            .or_else(|| {
                type_path
                    .path
                    .segments
                    .last()
                    .filter(|s| s.ident == "String" && s.arguments.is_empty())
                    .map(|s| s.ident.to_string())
            }),
        _ => None,
    };

    let mapped = match scalar.as_deref() {
        Some(
            "i8" | "i16" | "i32" | "i64" | "isize" | "u8" | "u16" | "u32" | "u64" | "usize",
        ) => Some(quote! { #pt::NativeType::Integer }),
        Some("f32" | "f64") => Some(quote! { #pt::NativeType::Number }),
        Some("String") => Some(quote! { #pt::NativeType::String }),
        Some("bool") => Some(quote! { #pt::NativeType::Boolean }),
        _ => None,
    };

    match mapped {
        Some(tokens) => (tokens, true),
        None => {
            let name = type_name(ty);
            (
                quote! { #pt::NativeType::Unsupported(::std::string::String::from(#name)) },
                false,
            )
        }
    }
}

/// Renders a type the way it is written in source, without token spacing.
pub(crate) fn type_name(ty: &Type) -> String {
    ty.to_token_stream()
        .to_string()
        .replace(" < ", "<")
        .replace(" <", "<")
        .replace("< ", "<")
        .replace(" >", ">")
        .replace(" ,", ",")
        .replace("& ", "&")
        .replace(" :: ", "::")
}

/// How a function's return value is handled by its invoker.
pub(crate) enum ReturnShape {
    /// `()` or no return type.
    Unit,
    /// `Result<(), E>`.
    UnitResult,
    /// `Result<T, E>`.
    Result,
    /// Any other `T`.
    Value,
}

impl ReturnShape {
    pub(crate) fn of(output: &ReturnType) -> Self {
        let ReturnType::Type(_, ty) = output else {
            return Self::Unit;
        };
        if is_unit(ty) {
            return Self::Unit;
        }
        if let Type::Path(type_path) = ty.as_ref()
            && let Some(segment) = type_path.path.segments.last()
            && segment.ident == "Result"
        {
            let ok_is_unit = matches!(&segment.arguments, PathArguments::AngleBracketed(args)
                if matches!(args.args.first(), Some(GenericArgument::Type(ok)) if is_unit(ok)));
            return if ok_is_unit {
                Self::UnitResult
            } else {
                Self::Result
            };
        }
        Self::Value
    }

    /// Whether the function produces a value worth documenting.
    pub(crate) fn has_value(&self) -> bool {
        matches!(self, Self::Result | Self::Value)
    }
}

fn is_unit(ty: &Type) -> bool {
    matches!(ty, Type::Tuple(tuple) if tuple.elems.is_empty())
}
