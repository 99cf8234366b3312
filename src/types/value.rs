use crate::catalog::FieldType;
use crate::types::record::RecordRef;
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::fmt;
use std::fmt::Formatter;

#[derive(Clone, PartialEq, Eq, Hash)]
pub enum DataValue {
    Null,
    Boolean(bool),
    Int64(i64),
    Float64(OrderedFloat<f64>),
    Utf8(String),
    /// A nested message, or a whole stored record.
    Message(RecordRef),
}

impl DataValue {
    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    pub fn as_message(&self) -> Option<&RecordRef> {
        if let DataValue::Message(record) = self {
            Some(record)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        if let DataValue::Utf8(value) = self {
            Some(value)
        } else {
            None
        }
    }

    /// Compares two scalar values. `None` when either side is null or the
    /// types are incomparable.
    pub fn compare(&self, other: &DataValue) -> Option<Ordering> {
        match (self, other) {
            (DataValue::Boolean(v1), DataValue::Boolean(v2)) => Some(v1.cmp(v2)),
            (DataValue::Int64(v1), DataValue::Int64(v2)) => Some(v1.cmp(v2)),
            (DataValue::Float64(v1), DataValue::Float64(v2)) => Some(v1.cmp(v2)),
            (DataValue::Int64(v1), DataValue::Float64(v2)) => {
                OrderedFloat(*v1 as f64).partial_cmp(v2)
            }
            (DataValue::Float64(v1), DataValue::Int64(v2)) => {
                v1.partial_cmp(&OrderedFloat(*v2 as f64))
            }
            (DataValue::Utf8(v1), DataValue::Utf8(v2)) => Some(v1.cmp(v2)),
            _ => None,
        }
    }

    /// Whether a constant of this kind can be compared against a field of type `ty`.
    pub fn is_comparable_to(&self, ty: &FieldType) -> bool {
        matches!(
            (self, ty),
            (DataValue::Null, _)
                | (DataValue::Boolean(_), FieldType::Boolean)
                | (DataValue::Int64(_), FieldType::Int64 | FieldType::Float64)
                | (DataValue::Float64(_), FieldType::Int64 | FieldType::Float64)
                | (DataValue::Utf8(_), FieldType::String)
        )
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            DataValue::Null => "Null",
            DataValue::Boolean(_) => "Boolean",
            DataValue::Int64(_) => "Int64",
            DataValue::Float64(_) => "Float64",
            DataValue::Utf8(_) => "String",
            DataValue::Message(_) => "Message",
        }
    }
}

impl From<bool> for DataValue {
    fn from(value: bool) -> Self {
        DataValue::Boolean(value)
    }
}

impl From<i64> for DataValue {
    fn from(value: i64) -> Self {
        DataValue::Int64(value)
    }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        DataValue::Float64(OrderedFloat(value))
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::Utf8(value.to_string())
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        DataValue::Utf8(value)
    }
}

impl From<RecordRef> for DataValue {
    fn from(value: RecordRef) -> Self {
        DataValue::Message(value)
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            DataValue::Null => write!(f, "null"),
            DataValue::Boolean(value) => write!(f, "{}", value),
            DataValue::Int64(value) => write!(f, "{}", value),
            DataValue::Float64(value) => write!(f, "{}", value),
            DataValue::Utf8(value) => write!(f, "\"{}\"", value),
            DataValue::Message(record) => write!(f, "{}", record),
        }
    }
}

impl fmt::Debug for DataValue {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            DataValue::Null => write!(f, "null"),
            DataValue::Boolean(value) => write!(f, "Boolean({})", value),
            DataValue::Int64(value) => write!(f, "Int64({})", value),
            DataValue::Float64(value) => write!(f, "Float64({})", value),
            DataValue::Utf8(value) => write!(f, "Utf8({})", value),
            DataValue::Message(record) => write!(f, "Message({})", record),
        }
    }
}
