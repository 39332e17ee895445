//! Flattening of structs and string-keyed maps into `HashMap<String, String>`
//!
//! Values are routed through `serde_json::Value`, so any `Serialize` type can
//! be converted without hand-written field access. Structs and maps both end
//! up as JSON objects, so the input shape is read off the serializer first.

use crate::error::ConversionError;
use serde::ser::{self, Impossible, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use std::fmt;

/// Decimal places used when rendering floating point fields
const FLOAT_PRECISION: usize = 10;

/// Convert a struct or a string-keyed map into a map of rendered values
///
/// Struct fields must be numeric or strings: floats are rendered with ten
/// decimal places, integers in decimal, strings verbatim. Map values may be
/// of any type: scalars are rendered as plain text (`true`/`false` for
/// booleans), compound values as JSON.
///
/// # Errors
/// * `ConversionError::UnsupportedField` for a struct field of any other type
/// * `ConversionError::UnsupportedInput` if `value` is neither a struct nor a map
pub fn to_string_map<T>(value: &T) -> Result<HashMap<String, String>, ConversionError>
where
    T: Serialize + ?Sized,
{
    match shape_of(value) {
        Shape::Struct => struct_fields(into_object(value)?),
        Shape::Map => Ok(map_entries(into_object(value)?)),
        Shape::Other(kind) => Err(ConversionError::UnsupportedInput { kind }),
    }
}

fn struct_fields(fields: Map<String, Value>) -> Result<HashMap<String, String>, ConversionError> {
    fields
        .into_iter()
        .map(|(name, field)| {
            let rendered = match field {
                Value::Number(number) => render_number(&number),
                Value::String(text) => text,
                other => {
                    return Err(ConversionError::UnsupportedField {
                        field: name,
                        kind: kind_of(&other),
                    })
                }
            };
            Ok((name, rendered))
        })
        .collect()
}

fn map_entries(entries: Map<String, Value>) -> HashMap<String, String> {
    entries
        .into_iter()
        .map(|(key, value)| {
            let rendered = match value {
                Value::String(text) => text,
                Value::Number(number) => number.to_string(),
                Value::Bool(flag) => flag.to_string(),
                Value::Null => "<nil>".to_string(),
                compound => compound.to_string(),
            };
            (key, rendered)
        })
        .collect()
}

fn into_object<T>(value: &T) -> Result<Map<String, Value>, ConversionError>
where
    T: Serialize + ?Sized,
{
    match serde_json::to_value(value)
        .map_err(|e| ConversionError::Serialization(e.to_string()))?
    {
        Value::Object(map) => Ok(map),
        other => Err(ConversionError::UnsupportedInput {
            kind: kind_of(&other),
        }),
    }
}

fn render_number(number: &Number) -> String {
    if let Some(signed) = number.as_i64() {
        signed.to_string()
    } else if let Some(unsigned) = number.as_u64() {
        unsigned.to_string()
    } else {
        format!("{:.*}", FLOAT_PRECISION, number.as_f64().unwrap_or_default())
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "struct",
    }
}

/// Top-level shape of a serialized value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Struct,
    Map,
    Other(&'static str),
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Struct => f.write_str("struct"),
            Shape::Map => f.write_str("map"),
            Shape::Other(kind) => f.write_str(kind),
        }
    }
}

impl std::error::Error for Shape {}

impl ser::Error for Shape {
    fn custom<T: fmt::Display>(_msg: T) -> Self {
        Shape::Other("unserializable")
    }
}

fn shape_of<T>(value: &T) -> Shape
where
    T: Serialize + ?Sized,
{
    match value.serialize(ShapeDetector) {
        Ok(()) => Shape::Other("null"),
        Err(shape) => shape,
    }
}

/// Serializer that stops at the first call and reports it as a [`Shape`]
struct ShapeDetector;

type Rejected = Impossible<(), Shape>;

impl Serializer for ShapeDetector {
    type Ok = ();
    type Error = Shape;
    type SerializeSeq = Rejected;
    type SerializeTuple = Rejected;
    type SerializeTupleStruct = Rejected;
    type SerializeTupleVariant = Rejected;
    type SerializeMap = Rejected;
    type SerializeStruct = Rejected;
    type SerializeStructVariant = Rejected;

    fn serialize_bool(self, _v: bool) -> Result<(), Shape> {
        Err(Shape::Other("bool"))
    }

    fn serialize_i8(self, _v: i8) -> Result<(), Shape> {
        Err(Shape::Other("number"))
    }

    fn serialize_i16(self, _v: i16) -> Result<(), Shape> {
        Err(Shape::Other("number"))
    }

    fn serialize_i32(self, _v: i32) -> Result<(), Shape> {
        Err(Shape::Other("number"))
    }

    fn serialize_i64(self, _v: i64) -> Result<(), Shape> {
        Err(Shape::Other("number"))
    }

    fn serialize_u8(self, _v: u8) -> Result<(), Shape> {
        Err(Shape::Other("number"))
    }

    fn serialize_u16(self, _v: u16) -> Result<(), Shape> {
        Err(Shape::Other("number"))
    }

    fn serialize_u32(self, _v: u32) -> Result<(), Shape> {
        Err(Shape::Other("number"))
    }

    fn serialize_u64(self, _v: u64) -> Result<(), Shape> {
        Err(Shape::Other("number"))
    }

    fn serialize_f32(self, _v: f32) -> Result<(), Shape> {
        Err(Shape::Other("number"))
    }

    fn serialize_f64(self, _v: f64) -> Result<(), Shape> {
        Err(Shape::Other("number"))
    }

    fn serialize_char(self, _v: char) -> Result<(), Shape> {
        Err(Shape::Other("string"))
    }

    fn serialize_str(self, _v: &str) -> Result<(), Shape> {
        Err(Shape::Other("string"))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<(), Shape> {
        Err(Shape::Other("sequence"))
    }

    fn serialize_none(self) -> Result<(), Shape> {
        Err(Shape::Other("null"))
    }

    fn serialize_some<T>(self, value: &T) -> Result<(), Shape>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), Shape> {
        Err(Shape::Other("null"))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<(), Shape> {
        Err(Shape::Other("null"))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<(), Shape> {
        Err(Shape::Other("string"))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<(), Shape>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<(), Shape>
    where
        T: Serialize + ?Sized,
    {
        Err(Shape::Other("variant"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Rejected, Shape> {
        Err(Shape::Other("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Rejected, Shape> {
        Err(Shape::Other("sequence"))
    }

    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<Rejected, Shape> {
        Err(Shape::Other("sequence"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Rejected, Shape> {
        Err(Shape::Other("variant"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Rejected, Shape> {
        Err(Shape::Map)
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Rejected, Shape> {
        Err(Shape::Struct)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Rejected, Shape> {
        Err(Shape::Other("variant"))
    }
}
