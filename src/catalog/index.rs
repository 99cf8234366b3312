use crate::catalog::descriptor::{FieldLabel, RecordDescriptor};
use crate::errors::PlannerError;
use itertools::Itertools;
use std::sync::Arc;

pub type IndexRef = Arc<IndexDescriptor>;

/// A value index over a (possibly nested) field path of one record type.
///
/// An index whose path crosses a repeated field stores one entry per element,
/// so scanning it may return the same record more than once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexDescriptor {
    pub(crate) name: String,
    pub(crate) record_type: String,
    pub(crate) path: Vec<String>,
    pub(crate) fan_out: bool,
}

impl IndexDescriptor {
    /// Resolves `path` against `descriptor`. Every component but the last must be a
    /// message field, the last must be a scalar.
    pub fn new(
        name: impl Into<String>,
        descriptor: &RecordDescriptor,
        path: Vec<String>,
    ) -> Result<Self, PlannerError> {
        if path.is_empty() {
            return Err(PlannerError::FieldNotFound(
                String::new(),
                descriptor.name().to_string(),
            ));
        }
        let mut fan_out = false;
        let mut current = descriptor;

        for (i, field_name) in path.iter().enumerate() {
            let field = current.field(field_name).ok_or_else(|| {
                PlannerError::FieldNotFound(field_name.clone(), current.name().to_string())
            })?;
            fan_out |= field.label() == FieldLabel::Repeated;

            if i + 1 < path.len() {
                current = field.message_type()?;
            } else if field.field_type().is_message() {
                return Err(PlannerError::TypeMismatch {
                    field: field_name.clone(),
                    expected: "scalar".to_string(),
                    actual: field.field_type().to_string(),
                });
            }
        }

        Ok(IndexDescriptor {
            name: name.into(),
            record_type: descriptor.name().to_string(),
            path,
            fan_out,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn is_fan_out(&self) -> bool {
        self.fan_out
    }

    pub fn path_display(&self) -> String {
        self.path.iter().join(".")
    }
}
