//! # Self-describing values.
//!
//! [`Value`] is the payload exchanged with external processors and the
//! argument type of actions. It covers scalars, strings, byte buffers,
//! lists, string-keyed maps and n-dimensional numeric arrays ([`NdArray`]).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// Dynamically typed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum Value {
    /// Absent value.
    #[default]
    Nil,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Floating point number.
    Float(f64),
    /// UTF-8 string.
    Str(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Ordered list.
    List(Vec<Value>),
    /// String-keyed map.
    Map(BTreeMap<String, Value>),
    /// Numeric n-dimensional array.
    Array(NdArray),
    /// Error answer from a processor.
    Error(String),
}

impl Value {
    /// String contents, if this is a [`Value::Str`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric contents widened to `f64`, for scalar numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Int(v) => Some(v as f64),
            Value::UInt(v) => Some(v as f64),
            Value::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Array contents, if this is a [`Value::Array`].
    pub fn as_array(&self) -> Option<&NdArray> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// True for [`Value::Error`].
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<NdArray> for Value {
    fn from(v: NdArray) -> Self {
        Value::Array(v)
    }
}

/// Flat element storage of an [`NdArray`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArrayData {
    /// 32-bit floats.
    F32(Vec<f32>),
    /// 64-bit floats.
    F64(Vec<f64>),
    /// 32-bit signed integers.
    I32(Vec<i32>),
    /// 64-bit signed integers.
    I64(Vec<i64>),
    /// Bytes.
    U8(Vec<u8>),
}

impl ArrayData {
    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            ArrayData::F32(v) => v.len(),
            ArrayData::F64(v) => v.len(),
            ArrayData::I32(v) => v.len(),
            ArrayData::I64(v) => v.len(),
            ArrayData::U8(v) => v.len(),
        }
    }

    /// True if there are no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element type name.
    pub fn dtype(&self) -> &'static str {
        match self {
            ArrayData::F32(_) => "f32",
            ArrayData::F64(_) => "f64",
            ArrayData::I32(_) => "i32",
            ArrayData::I64(_) => "i64",
            ArrayData::U8(_) => "u8",
        }
    }
}

/// Row-major n-dimensional numeric array.
///
/// The product of `shape` always equals the number of elements, also for
/// arrays decoded off the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNdArray")]
pub struct NdArray {
    shape: Vec<usize>,
    data: ArrayData,
}

/// Unchecked wire form of [`NdArray`].
#[derive(Deserialize)]
struct RawNdArray {
    shape: Vec<usize>,
    data: ArrayData,
}

impl TryFrom<RawNdArray> for NdArray {
    type Error = BridgeError;

    fn try_from(raw: RawNdArray) -> Result<Self, Self::Error> {
        NdArray::new(raw.shape, raw.data)
    }
}

impl NdArray {
    /// Creates an array, checking that `shape` matches the element count.
    pub fn new(shape: Vec<usize>, data: ArrayData) -> Result<Self, BridgeError> {
        let Some(expected) = shape.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d)) else {
            return Err(BridgeError::ShapeOverflow { shape });
        };
        if expected != data.len() {
            return Err(BridgeError::Shape {
                shape,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// Dimensions.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Elements in row-major order.
    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    /// Consumes the array into shape and elements.
    pub fn into_parts(self) -> (Vec<usize>, ArrayData) {
        (self.shape, self.data)
    }
}
