use crate::catalog::{FieldDescriptor, FieldLabel, FieldType, RecordDescriptorRef};
use crate::errors::PlannerError;
use crate::types::value::DataValue;
use itertools::Itertools;
use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Formatter;
use std::sync::Arc;

pub type RecordRef = Arc<Record>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldValue {
    Single(DataValue),
    Repeated(Vec<DataValue>),
}

macro_rules! single_field_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    FieldValue::Single(DataValue::from(value))
                }
            }
        )*
    };
}

single_field_value!(bool, i64, f64, &str, String, RecordRef);

impl From<DataValue> for FieldValue {
    fn from(value: DataValue) -> Self {
        FieldValue::Single(value)
    }
}

/// A structured value described by a [`RecordDescriptor`](crate::catalog::RecordDescriptor).
///
/// A field that was never set is *absent* and reads as `None`, which is not the
/// same thing as a repeated field holding zero elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    descriptor: RecordDescriptorRef,
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new<K: Into<String>>(
        descriptor: RecordDescriptorRef,
        fields: Vec<(K, FieldValue)>,
    ) -> Result<Self, PlannerError> {
        let mut record = Record {
            descriptor,
            fields: BTreeMap::new(),
        };
        for (name, value) in fields {
            record.set(name.into(), value)?;
        }

        Ok(record)
    }

    fn set(&mut self, name: String, value: FieldValue) -> Result<(), PlannerError> {
        let field = self.descriptor.field(&name).ok_or_else(|| {
            PlannerError::FieldNotFound(name.clone(), self.descriptor.name().to_string())
        })?;

        match (&value, field.label()) {
            (FieldValue::Repeated(values), FieldLabel::Repeated) => {
                for value in values {
                    Self::check_type(field, value)?;
                }
            }
            (FieldValue::Single(value), FieldLabel::Optional | FieldLabel::Required) => {
                Self::check_type(field, value)?;
            }
            (FieldValue::Single(_), FieldLabel::Repeated) => {
                return Err(PlannerError::RepeatedFieldNotAllowed(
                    name,
                    FieldLabel::Repeated,
                ))
            }
            (FieldValue::Repeated(_), _) => return Err(PlannerError::NotRepeatedField(name)),
        }
        self.fields.insert(name, value);

        Ok(())
    }

    fn check_type(field: &FieldDescriptor, value: &DataValue) -> Result<(), PlannerError> {
        let matched = match (field.field_type(), value) {
            (FieldType::Message(descriptor), DataValue::Message(record)) => {
                record.descriptor.name() == descriptor.name()
            }
            (FieldType::Message(_), DataValue::Null) => true,
            (FieldType::Message(_), _) => false,
            (ty, value) => value.is_comparable_to(ty),
        };
        if !matched {
            return Err(PlannerError::TypeMismatch {
                field: field.name().to_string(),
                expected: field.field_type().to_string(),
                actual: value.type_name().to_string(),
            });
        }

        Ok(())
    }

    pub fn descriptor(&self) -> &RecordDescriptorRef {
        &self.descriptor
    }

    pub fn record_type(&self) -> &str {
        self.descriptor.name()
    }

    /// Returns the value(s) of `field`, `None` when absent.
    pub fn get(&self, field: &FieldDescriptor) -> Option<&FieldValue> {
        self.get_by_name(field.name())
    }

    pub fn get_by_name(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn primary_key(&self) -> Option<&DataValue> {
        match self.get_by_name(self.descriptor.primary_key()?)? {
            FieldValue::Single(value) => Some(value),
            FieldValue::Repeated(_) => None,
        }
    }
}

/// Walks `path` through nested messages starting at `value`.
///
/// Absent fields and null messages read as `Null`. Paths are validated before
/// evaluation, so a repeated field in the middle of a path also reads as `Null`.
pub fn navigate(value: &DataValue, path: &[String]) -> DataValue {
    let mut current = value.clone();

    for name in path {
        current = match current.as_message().and_then(|record| record.get_by_name(name)) {
            Some(FieldValue::Single(value)) => value.clone(),
            Some(FieldValue::Repeated(_)) | None => return DataValue::Null,
        };
    }
    current
}

/// Like [`navigate`], but `None` when the message holding the last field of
/// `path` is itself missing. An empty path reads `value` as is.
pub fn navigate_field(value: &DataValue, path: &[String]) -> Option<DataValue> {
    let Some((last, prefix)) = path.split_last() else {
        return Some(value.clone());
    };
    let parent = navigate(value, prefix);

    Some(match parent.as_message()?.get_by_name(last) {
        Some(FieldValue::Single(value)) => value.clone(),
        Some(FieldValue::Repeated(_)) | None => DataValue::Null,
    })
}

/// Walks to the repeated field at the end of `path` and returns its elements.
///
/// `None` means the field (or one of the messages leading to it) is absent.
pub fn navigate_repeated(value: &DataValue, path: &[String]) -> Option<Vec<DataValue>> {
    let (last, prefix) = path.split_last()?;
    let parent = navigate(value, prefix);

    match parent.as_message()?.get_by_name(last)? {
        FieldValue::Repeated(values) => Some(values.clone()),
        FieldValue::Single(_) => None,
    }
}

/// Every value reachable through `path`, descending into each element of a
/// repeated field. Absent fields contribute nothing.
pub fn navigate_fan_out(value: &DataValue, path: &[String]) -> Vec<DataValue> {
    path.iter().fold(vec![value.clone()], |current, name| {
        current
            .iter()
            .filter_map(|value| value.as_message()?.get_by_name(name))
            .flat_map(|field_value| match field_value {
                FieldValue::Single(value) => vec![value.clone()],
                FieldValue::Repeated(values) => values.clone(),
            })
            .collect_vec()
    })
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Single(value) => write!(f, "{}", value),
            FieldValue::Repeated(values) => write!(f, "[{}]", values.iter().join(", ")),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {{{}}}",
            self.descriptor.name(),
            self.fields
                .iter()
                .map(|(name, value)| format!("{}: {}", name, value))
                .join(", ")
        )
    }
}
