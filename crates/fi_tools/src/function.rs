//! Static descriptors for target library functions.
//!
//! A [`Module`] is the table `#[fi_module]` generates for one inline Rust
//! module: one [`FunctionRecord`] per `fn` item, public or not. Records are
//! built once and never mutated; the invoker is a plain function pointer into
//! the library.

use crate::error::ExecutionError;
use crate::types::{FromNative, NativeType, NativeValue};
use serde::{Serialize, ser};

/// Serialized return value of an invoked function.
pub type ReturnValue = serde_json::Value;

/// Entry point generated for each describable function.
///
/// Receives converted arguments in declaration order.
pub type Invoker = fn(Vec<NativeValue>) -> Result<ReturnValue, ExecutionError>;

/// Declared visibility of a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Declared `pub`.
    Public,
    /// Anything narrower than `pub`.
    Private,
}

/// What a function returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnKind {
    /// `()` or `Result<(), E>`.
    Nothing,
    /// Any other type.
    Value,
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    /// Parameter name.
    pub name: String,
    /// Declared type.
    pub ty: NativeType,
    /// Native default, for parameters declared with `#[default(..)]`.
    pub default: Option<NativeValue>,
}

impl ParamSpec {
    /// A parameter without a default.
    pub fn new(name: impl Into<String>, ty: NativeType) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
        }
    }

    /// A parameter with a native default.
    pub fn with_default(name: impl Into<String>, ty: NativeType, default: NativeValue) -> Self {
        Self {
            name: name.into(),
            ty,
            default: Some(default),
        }
    }

    /// Whether the caller must supply this parameter.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.default.is_none() && !self.ty.is_optional()
    }
}

/// A function's ordered parameters and return kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    /// Parameters in declaration order.
    pub params: Vec<ParamSpec>,
    /// Return kind.
    pub returns: ReturnKind,
}

impl Signature {
    /// Looks up a parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Names of parameters the caller must supply.
    pub fn required_names(&self) -> impl Iterator<Item = &str> {
        self.params
            .iter()
            .filter(|p| p.is_required())
            .map(|p| p.name.as_str())
    }
}

/// Identity and metadata of one library function.
#[derive(Clone)]
pub struct FunctionRecord {
    name: String,
    visibility: Visibility,
    docstring: String,
    signature: Option<Signature>,
    invoker: Option<Invoker>,
}

impl core::fmt::Debug for FunctionRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FunctionRecord")
            .field("name", &self.name)
            .field("visibility", &self.visibility)
            .field("signature", &self.signature)
            .field("invocable", &self.invoker.is_some())
            .finish_non_exhaustive()
    }
}

impl FunctionRecord {
    /// A public function with a known signature.
    pub fn new(
        name: impl Into<String>,
        docstring: impl Into<String>,
        signature: Signature,
        invoker: Invoker,
    ) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            docstring: docstring.into(),
            signature: Some(signature),
            invoker: Some(invoker),
        }
    }

    /// A function the macro could not describe, or one that is not public.
    pub fn opaque(
        name: impl Into<String>,
        visibility: Visibility,
        docstring: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            visibility,
            docstring: docstring.into(),
            signature: None,
            invoker: None,
        }
    }

    /// Function name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared visibility.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Raw doc-comment text.
    #[must_use]
    pub fn docstring(&self) -> &str {
        &self.docstring
    }

    /// Native signature, if describable.
    #[must_use]
    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    /// Calls the function with converted arguments.
    pub fn invoke(&self, args: Vec<NativeValue>) -> Result<ReturnValue, ExecutionError> {
        let invoker = self
            .invoker
            .ok_or_else(|| ExecutionError::new(format!("`{}` is not invocable", self.name)))?;
        invoker(args)
    }
}

/// The descriptor table for one target module.
#[derive(Debug, Clone)]
pub struct Module {
    name: String,
    functions: Vec<FunctionRecord>,
    denylist: Vec<String>,
}

impl Module {
    /// An empty module.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: Vec::new(),
            denylist: Vec::new(),
        }
    }

    /// Adds a function record.
    #[must_use]
    pub fn function(mut self, record: FunctionRecord) -> Self {
        self.functions.push(record);
        self
    }

    /// Marks a function as an internal helper that is never exposed as a tool.
    #[must_use]
    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.denylist.push(name.into());
        self
    }

    /// Module name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All records, in declaration order.
    #[must_use]
    pub fn functions(&self) -> &[FunctionRecord] {
        &self.functions
    }

    /// Names the module itself declares as internal.
    #[must_use]
    pub fn denylist(&self) -> &[String] {
        &self.denylist
    }
}

// ─────────────────────────────────────────────────────────────────────
// Helpers for macro-generated invokers
// ─────────────────────────────────────────────────────────────────────

/// Pops the next converted argument and extracts it as `T`.
#[doc(hidden)]
pub fn next_arg<T: FromNative>(
    args: &mut impl Iterator<Item = NativeValue>,
    name: &str,
) -> Result<T, ExecutionError> {
    let value = args
        .next()
        .ok_or_else(|| ExecutionError::new(format!("argument `{name}` was not supplied")))?;
    T::from_native(value)
        .map_err(|err| ExecutionError::new(format!("argument `{name}`: {err}")))
}

/// Serializes a function's return value.
///
/// JSON has no representation for infinities or NaN, so a result holding one
/// anywhere (including inside a struct) is an [`ExecutionError`] rather than
/// a silent `null`.
#[doc(hidden)]
pub fn serialize_output<T: Serialize>(value: &T) -> Result<ReturnValue, ExecutionError> {
    value
        .serialize(FiniteCheck)
        .map_err(|err| ExecutionError::new(err.to_string()))?;
    serde_json::to_value(value)
        .map_err(|err| ExecutionError::new(format!("failed to serialize result: {err}")))
}

/// Walks a value and fails on the first non-finite float.
#[derive(Clone, Copy)]
struct FiniteCheck;

impl FiniteCheck {
    fn number(v: f64) -> Result<(), serde_json::Error> {
        if v.is_finite() {
            Ok(())
        } else {
            Err(ser::Error::custom("result is not a finite number"))
        }
    }
}

impl ser::Serializer for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, _: bool) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_i8(self, _: i8) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_i16(self, _: i16) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_i32(self, _: i32) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_i64(self, _: i64) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_u8(self, _: u8) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_u16(self, _: u16) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_u32(self, _: u32) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_u64(self, _: u64) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_f32(self, v: f32) -> Result<(), Self::Error> {
        Self::number(f64::from(v))
    }
    fn serialize_f64(self, v: f64) -> Result<(), Self::Error> {
        Self::number(v)
    }
    fn serialize_char(self, _: char) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_str(self, _: &str) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_bytes(self, _: &[u8]) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_none(self) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<(), Self::Error> {
        value.serialize(self)
    }
    fn serialize_unit(self) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_unit_struct(self, _: &'static str) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_unit_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
    ) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        value.serialize(self)
    }
    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        value.serialize(self)
    }
    fn serialize_seq(self, _: Option<usize>) -> Result<Self, Self::Error> {
        Ok(self)
    }
    fn serialize_tuple(self, _: usize) -> Result<Self, Self::Error> {
        Ok(self)
    }
    fn serialize_tuple_struct(self, _: &'static str, _: usize) -> Result<Self, Self::Error> {
        Ok(self)
    }
    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self, Self::Error> {
        Ok(self)
    }
    fn serialize_map(self, _: Option<usize>) -> Result<Self, Self::Error> {
        Ok(self)
    }
    fn serialize_struct(self, _: &'static str, _: usize) -> Result<Self, Self::Error> {
        Ok(self)
    }
    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self, Self::Error> {
        Ok(self)
    }
}

impl ser::SerializeSeq for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        value.serialize(*self)
    }
    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl ser::SerializeTuple for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        value.serialize(*self)
    }
    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        value.serialize(*self)
    }
    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        value.serialize(*self)
    }
    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl ser::SerializeMap for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, _: &T) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        value.serialize(*self)
    }
    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl ser::SerializeStruct for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        value.serialize(*self)
    }
    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl ser::SerializeStructVariant for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        value.serialize(*self)
    }
    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}
