//! Mapping between native parameter types and protocol schema types.
//!
//! [`NativeType`] is the closed vocabulary of parameter types a target function
//! may declare. It maps to a JSON Schema fragment with [`native_to_schema`],
//! and raw protocol values decode into a [`NativeValue`] with
//! [`schema_value_to_native`]. The [`FromNative`] and [`IntoNative`] traits
//! connect [`NativeValue`] to concrete Rust types for invocation and defaults.

use crate::error::{ConversionError, UnsupportedType};
use serde::Serialize;
use serde_json::{Value, json};

/// A parameter type as declared by a target function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum NativeType {
    /// Any Rust integer type.
    Integer,
    /// `f32` or `f64`.
    Number,
    /// `String`.
    String,
    /// `bool`.
    Boolean,
    /// `Option<T>`. Maps to `T` and makes the parameter optional.
    Optional(Box<NativeType>),
    /// `Vec<T>`.
    List(Box<NativeType>),
    /// A `String` restricted to a closed set of values.
    Choice(Vec<String>),
    /// A type with no schema representation, as written in the signature.
    Unsupported(String),
}

impl NativeType {
    /// `Option<inner>`.
    #[must_use]
    pub fn optional(inner: NativeType) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// `Vec<inner>`.
    #[must_use]
    pub fn list(inner: NativeType) -> Self {
        Self::List(Box::new(inner))
    }

    /// A string parameter limited to `choices`.
    pub fn choice<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Choice(choices.into_iter().map(Into::into).collect())
    }

    /// Whether the type is `Option<T>`.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    /// The first unsupported type nested anywhere inside this type.
    #[must_use]
    pub fn unsupported(&self) -> Option<&str> {
        match self {
            Self::Unsupported(name) => Some(name),
            Self::Optional(inner) | Self::List(inner) => inner.unsupported(),
            _ => None,
        }
    }
}

impl core::fmt::Display for NativeType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Integer => f.write_str("integer"),
            Self::Number => f.write_str("number"),
            Self::String => f.write_str("string"),
            Self::Boolean => f.write_str("boolean"),
            Self::Optional(inner) => write!(f, "optional {inner}"),
            Self::List(inner) => write!(f, "array of {inner}"),
            Self::Choice(choices) => write!(f, "one of [{}]", choices.join(", ")),
            Self::Unsupported(name) => f.write_str(name),
        }
    }
}

/// A decoded argument value, ready to hand to a target function.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    /// Absent optional value.
    Null,
    /// Integer value.
    Integer(i64),
    /// Floating-point value.
    Number(f64),
    /// String value (also used for choices).
    String(String),
    /// Boolean value.
    Boolean(bool),
    /// List value.
    List(Vec<NativeValue>),
}

impl NativeValue {
    /// Renders the value in its protocol representation.
    ///
    /// Non-finite numbers have no JSON form and render as `null`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Integer(i) => Value::from(*i),
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::String(s) => Value::String(s.clone()),
            Self::Boolean(b) => Value::Bool(*b),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Boolean(_) => "boolean",
            Self::List(_) => "array",
        }
    }
}

/// Maps a native type to its JSON Schema fragment.
///
/// `Optional(T)` maps to the schema of `T`; optionality is expressed by the
/// parameter's `required` flag, not by the type.
pub fn native_to_schema(ty: &NativeType) -> Result<Value, UnsupportedType> {
    Ok(match ty {
        NativeType::Integer => json!({ "type": "integer" }),
        NativeType::Number => json!({ "type": "number" }),
        NativeType::String => json!({ "type": "string" }),
        NativeType::Boolean => json!({ "type": "boolean" }),
        NativeType::Optional(inner) => native_to_schema(inner)?,
        NativeType::List(inner) => json!({ "type": "array", "items": native_to_schema(inner)? }),
        NativeType::Choice(choices) => json!({ "type": "string", "enum": choices }),
        NativeType::Unsupported(name) => {
            return Err(UnsupportedType {
                type_name: name.clone(),
            });
        }
    })
}

/// Decodes a raw protocol value into the native representation of `ty`.
///
/// Ambiguous input is rejected rather than guessed at: integer parameters
/// refuse fractional values and booleans accept only `true`/`false`.
pub fn schema_value_to_native(value: &Value, ty: &NativeType) -> Result<NativeValue, ConversionError> {
    match ty {
        NativeType::Integer => decode_integer(value).map(NativeValue::Integer),
        NativeType::Number => decode_number(value).map(NativeValue::Number),
        NativeType::String => match value {
            Value::String(s) => Ok(NativeValue::String(s.clone())),
            other => Err(ConversionError::mismatch("string", other)),
        },
        NativeType::Boolean => decode_boolean(value).map(NativeValue::Boolean),
        NativeType::Optional(inner) => {
            if value.is_null() {
                Ok(NativeValue::Null)
            } else {
                schema_value_to_native(value, inner)
            }
        }
        NativeType::List(inner) => match value {
            Value::Array(items) => items
                .iter()
                .map(|item| schema_value_to_native(item, inner))
                .collect::<Result<Vec<_>, _>>()
                .map(NativeValue::List),
            other => Err(ConversionError::mismatch("array", other)),
        },
        NativeType::Choice(choices) => match value {
            Value::String(s) if choices.iter().any(|c| c == s) => Ok(NativeValue::String(s.clone())),
            Value::String(s) => Err(ConversionError::InvalidChoice {
                value: s.clone(),
                choices: choices.clone(),
            }),
            other => Err(ConversionError::mismatch("string", other)),
        },
        NativeType::Unsupported(name) => Err(UnsupportedType {
            type_name: name.clone(),
        }
        .into()),
    }
}

fn decode_integer(value: &Value) -> Result<i64, ConversionError> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            if n.is_u64() {
                return Err(ConversionError::OutOfRange {
                    value: n.to_string(),
                    target: "i64",
                });
            }
            integral(n.as_f64().ok_or(ConversionError::NotFinite)?)
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                return Ok(i);
            }
            match trimmed.parse::<f64>() {
                Ok(f) => integral(f),
                Err(_) => Err(ConversionError::mismatch("integer", value)),
            }
        }
        other => Err(ConversionError::mismatch("integer", other)),
    }
}

fn integral(f: f64) -> Result<i64, ConversionError> {
    if !f.is_finite() {
        return Err(ConversionError::NotFinite);
    }
    if f.fract() != 0.0 {
        return Err(ConversionError::Fractional(f));
    }
    if f < i64::MIN as f64 || f >= i64::MAX as f64 {
        return Err(ConversionError::OutOfRange {
            value: f.to_string(),
            target: "i64",
        });
    }
    Ok(f as i64)
}

fn decode_number(value: &Value) -> Result<f64, ConversionError> {
    let number = match value {
        Value::Number(n) => n.as_f64().ok_or(ConversionError::NotFinite)?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ConversionError::mismatch("number", value))?,
        other => return Err(ConversionError::mismatch("number", other)),
    };
    if number.is_finite() {
        Ok(number)
    } else {
        Err(ConversionError::NotFinite)
    }
}

fn decode_boolean(value: &Value) -> Result<bool, ConversionError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s.trim().eq_ignore_ascii_case("true") => Ok(true),
        Value::String(s) if s.trim().eq_ignore_ascii_case("false") => Ok(false),
        other => Err(ConversionError::mismatch("boolean", other)),
    }
}

// ─────────────────────────────────────────────────────────────────────
// Native value <-> Rust type
// ─────────────────────────────────────────────────────────────────────

/// Extracts a Rust value from a decoded [`NativeValue`].
///
/// Implemented for every Rust type `#[fi_module]` maps to a supported
/// [`NativeType`].
pub trait FromNative: Sized {
    /// Converts the native value, failing on a variant or range mismatch.
    fn from_native(value: NativeValue) -> Result<Self, ConversionError>;
}

/// Converts a Rust value into a [`NativeValue`], used for declared defaults.
pub trait IntoNative {
    /// Performs the conversion.
    fn into_native(self) -> NativeValue;
}

fn wrong_variant(expected: &str, found: &NativeValue) -> ConversionError {
    ConversionError::TypeMismatch {
        expected: expected.to_string(),
        found: found.kind().to_string(),
    }
}

macro_rules! integer_native {
    ($($t:ty),*) => {
        $(
            impl FromNative for $t {
                fn from_native(value: NativeValue) -> Result<Self, ConversionError> {
                    match value {
                        NativeValue::Integer(i) => <$t>::try_from(i).map_err(|_| {
                            ConversionError::OutOfRange {
                                value: i.to_string(),
                                target: stringify!($t),
                            }
                        }),
                        other => Err(wrong_variant("integer", &other)),
                    }
                }
            }

            impl IntoNative for $t {
                fn into_native(self) -> NativeValue {
                    match i64::try_from(self) {
                        Ok(i) => NativeValue::Integer(i),
                        Err(_) => NativeValue::Number(self as f64),
                    }
                }
            }
        )*
    };
}

integer_native!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FromNative for f64 {
    fn from_native(value: NativeValue) -> Result<Self, ConversionError> {
        match value {
            NativeValue::Number(n) => Ok(n),
            NativeValue::Integer(i) => Ok(i as f64),
            other => Err(wrong_variant("number", &other)),
        }
    }
}

impl FromNative for f32 {
    fn from_native(value: NativeValue) -> Result<Self, ConversionError> {
        let wide = f64::from_native(value)?;
        let narrow = wide as f32;
        if narrow.is_finite() {
            Ok(narrow)
        } else {
            Err(ConversionError::OutOfRange {
                value: wide.to_string(),
                target: "f32",
            })
        }
    }
}

impl IntoNative for f64 {
    fn into_native(self) -> NativeValue {
        NativeValue::Number(self)
    }
}

impl IntoNative for f32 {
    fn into_native(self) -> NativeValue {
        NativeValue::Number(f64::from(self))
    }
}

impl FromNative for String {
    fn from_native(value: NativeValue) -> Result<Self, ConversionError> {
        match value {
            NativeValue::String(s) => Ok(s),
            other => Err(wrong_variant("string", &other)),
        }
    }
}

impl IntoNative for String {
    fn into_native(self) -> NativeValue {
        NativeValue::String(self)
    }
}

impl IntoNative for &str {
    fn into_native(self) -> NativeValue {
        NativeValue::String(self.to_string())
    }
}

impl FromNative for bool {
    fn from_native(value: NativeValue) -> Result<Self, ConversionError> {
        match value {
            NativeValue::Boolean(b) => Ok(b),
            other => Err(wrong_variant("boolean", &other)),
        }
    }
}

impl IntoNative for bool {
    fn into_native(self) -> NativeValue {
        NativeValue::Boolean(self)
    }
}

impl<T: FromNative> FromNative for Option<T> {
    fn from_native(value: NativeValue) -> Result<Self, ConversionError> {
        match value {
            NativeValue::Null => Ok(None),
            other => T::from_native(other).map(Some),
        }
    }
}

impl<T: IntoNative> IntoNative for Option<T> {
    fn into_native(self) -> NativeValue {
        self.map_or(NativeValue::Null, IntoNative::into_native)
    }
}

impl<T: FromNative> FromNative for Vec<T> {
    fn from_native(value: NativeValue) -> Result<Self, ConversionError> {
        match value {
            NativeValue::List(items) => items.into_iter().map(T::from_native).collect(),
            other => Err(wrong_variant("array", &other)),
        }
    }
}

impl<T: IntoNative> IntoNative for Vec<T> {
    fn into_native(self) -> NativeValue {
        NativeValue::List(self.into_iter().map(IntoNative::into_native).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_schemas() {
        assert_eq!(native_to_schema(&NativeType::Integer).unwrap(), json!({"type": "integer"}));
        assert_eq!(native_to_schema(&NativeType::Number).unwrap(), json!({"type": "number"}));
        assert_eq!(native_to_schema(&NativeType::String).unwrap(), json!({"type": "string"}));
        assert_eq!(native_to_schema(&NativeType::Boolean).unwrap(), json!({"type": "boolean"}));
    }

    #[test]
    fn optional_maps_to_inner_schema() {
        let ty = NativeType::optional(NativeType::Number);
        assert_eq!(native_to_schema(&ty).unwrap(), json!({"type": "number"}));
    }

    #[test]
    fn composite_schemas() {
        let list = NativeType::list(NativeType::Number);
        assert_eq!(
            native_to_schema(&list).unwrap(),
            json!({"type": "array", "items": {"type": "number"}})
        );

        let choice = NativeType::choice(["monthly", "annually"]);
        assert_eq!(
            native_to_schema(&choice).unwrap(),
            json!({"type": "string", "enum": ["monthly", "annually"]})
        );
    }

    #[test]
    fn unsupported_type_fails_schema() {
        let ty = NativeType::list(NativeType::Unsupported("Money".into()));
        let err = native_to_schema(&ty).unwrap_err();
        assert_eq!(err.type_name, "Money");
        assert_eq!(ty.unsupported(), Some("Money"));
    }

    #[test]
    fn integer_rejects_fractional_input() {
        let err = schema_value_to_native(&json!(2.5), &NativeType::Integer).unwrap_err();
        assert_eq!(err, ConversionError::Fractional(2.5));

        let err = schema_value_to_native(&json!("2.5"), &NativeType::Integer).unwrap_err();
        assert_eq!(err, ConversionError::Fractional(2.5));
    }

    #[test]
    fn integer_accepts_integral_forms() {
        for raw in [json!(65), json!(65.0), json!("65"), json!(" 65 ")] {
            assert_eq!(
                schema_value_to_native(&raw, &NativeType::Integer).unwrap(),
                NativeValue::Integer(65),
                "input {raw}"
            );
        }
    }

    #[test]
    fn integer_rejects_booleans_and_words() {
        assert!(schema_value_to_native(&json!(true), &NativeType::Integer).is_err());
        assert!(schema_value_to_native(&json!("sixty"), &NativeType::Integer).is_err());
    }

    #[test]
    fn number_widens_integers() {
        assert_eq!(
            schema_value_to_native(&json!(7), &NativeType::Number).unwrap(),
            NativeValue::Number(7.0)
        );
        assert_eq!(
            schema_value_to_native(&json!("0.04"), &NativeType::Number).unwrap(),
            NativeValue::Number(0.04)
        );
    }

    #[test]
    fn number_rejects_words_and_non_finite() {
        let err = schema_value_to_native(&json!("four percent"), &NativeType::Number).unwrap_err();
        assert!(matches!(err, ConversionError::TypeMismatch { .. }));
        assert_eq!(
            schema_value_to_native(&json!("inf"), &NativeType::Number).unwrap_err(),
            ConversionError::NotFinite
        );
    }

    #[test]
    fn boolean_accepts_canonical_forms_only() {
        assert_eq!(
            schema_value_to_native(&json!(true), &NativeType::Boolean).unwrap(),
            NativeValue::Boolean(true)
        );
        assert_eq!(
            schema_value_to_native(&json!("False"), &NativeType::Boolean).unwrap(),
            NativeValue::Boolean(false)
        );
        for raw in [json!(1), json!(0), json!("yes"), json!("1"), json!(null)] {
            assert!(
                schema_value_to_native(&raw, &NativeType::Boolean).is_err(),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn string_is_strict() {
        assert!(schema_value_to_native(&json!(5), &NativeType::String).is_err());
    }

    #[test]
    fn choice_rejects_values_outside_set() {
        let ty = NativeType::choice(["monthly", "annually"]);
        let err = schema_value_to_native(&json!("weekly"), &ty).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidChoice { .. }));
    }

    #[test]
    fn list_reports_element_errors() {
        let ty = NativeType::list(NativeType::Number);
        assert_eq!(
            schema_value_to_native(&json!([1, "2.5"]), &ty).unwrap(),
            NativeValue::List(vec![NativeValue::Number(1.0), NativeValue::Number(2.5)])
        );
        assert!(schema_value_to_native(&json!([1, "x"]), &ty).is_err());
    }

    #[test]
    fn from_native_checks_ranges() {
        assert_eq!(u8::from_native(NativeValue::Integer(200)).unwrap(), 200);
        assert!(u8::from_native(NativeValue::Integer(300)).is_err());
        assert!(u32::from_native(NativeValue::Integer(-1)).is_err());
        assert_eq!(f64::from_native(NativeValue::Integer(3)).unwrap(), 3.0);
        assert_eq!(
            Option::<f64>::from_native(NativeValue::Null).unwrap(),
            None
        );
        assert_eq!(
            Vec::<i32>::from_native(NativeValue::List(vec![NativeValue::Integer(1)])).unwrap(),
            vec![1]
        );
    }

    #[test]
    fn into_native_defaults() {
        assert_eq!(4u32.into_native(), NativeValue::Integer(4));
        assert_eq!(0.5f64.into_native(), NativeValue::Number(0.5));
        assert_eq!("annually".into_native(), NativeValue::String("annually".into()));
        assert_eq!(None::<f64>.into_native(), NativeValue::Null);
    }

    mod round_trip {
        use super::*;
        use proptest::prelude::*;

        fn arb_scalar() -> impl Strategy<Value = (NativeType, NativeValue)> {
            prop_oneof![
                any::<i64>().prop_map(|i| (NativeType::Integer, NativeValue::Integer(i))),
                (-1.0e12f64..1.0e12).prop_map(|n| (NativeType::Number, NativeValue::Number(n))),
                ".*".prop_map(|s: String| (NativeType::String, NativeValue::String(s))),
                any::<bool>().prop_map(|b| (NativeType::Boolean, NativeValue::Boolean(b))),
                prop::sample::select(vec!["monthly", "quarterly", "annually"]).prop_map(|c| (
                    NativeType::choice(["monthly", "quarterly", "annually"]),
                    NativeValue::String(c.to_string())
                )),
            ]
        }

        fn arb_typed() -> impl Strategy<Value = (NativeType, NativeValue)> {
            arb_scalar().prop_recursive(3, 24, 4, |inner| {
                prop_oneof![
                    inner
                        .clone()
                        .prop_map(|(ty, value)| (NativeType::optional(ty), value)),
                    inner
                        .clone()
                        .prop_map(|(ty, _)| (NativeType::optional(ty), NativeValue::Null)),
                    (inner, 0..4usize).prop_map(|((ty, value), len)| (
                        NativeType::list(ty),
                        NativeValue::List(vec![value; len])
                    )),
                ]
            })
        }

        proptest! {
            #[test]
            fn decode_inverts_render((ty, value) in arb_typed()) {
                let raw = value.to_json();
                let decoded = schema_value_to_native(&raw, &ty).unwrap();
                prop_assert_eq!(decoded, value);
            }

            #[test]
            fn every_supported_type_has_a_schema((ty, _value) in arb_typed()) {
                prop_assert!(native_to_schema(&ty).is_ok());
            }
        }
    }
}
