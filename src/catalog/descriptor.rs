use crate::errors::PlannerError;
use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Formatter;
use std::sync::Arc;

pub type RecordDescriptorRef = Arc<RecordDescriptor>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldLabel {
    Optional,
    Required,
    Repeated,
}

/// The cardinality a caller expects when resolving a field by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Singular,
    Repeated,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Boolean,
    Int64,
    Float64,
    String,
    Message(RecordDescriptorRef),
}

impl FieldType {
    pub fn is_message(&self) -> bool {
        matches!(self, FieldType::Message(_))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Boolean => write!(f, "Boolean"),
            FieldType::Int64 => write!(f, "Int64"),
            FieldType::Float64 => write!(f, "Float64"),
            FieldType::String => write!(f, "String"),
            FieldType::Message(descriptor) => write!(f, "Message({})", descriptor.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    pub(crate) name: String,
    pub(crate) label: FieldLabel,
    pub(crate) ty: FieldType,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, label: FieldLabel, ty: FieldType) -> Self {
        FieldDescriptor {
            name: name.into(),
            label,
            ty,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> FieldLabel {
        self.label
    }

    pub fn field_type(&self) -> &FieldType {
        &self.ty
    }

    pub fn is_repeated(&self) -> bool {
        self.label == FieldLabel::Repeated
    }

    pub fn message_type(&self) -> Result<&RecordDescriptorRef, PlannerError> {
        match &self.ty {
            FieldType::Message(descriptor) => Ok(descriptor),
            _ => Err(PlannerError::NotMessageField(self.name.clone())),
        }
    }
}

/// Describes the shape of a record (or of a nested message inside one).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordDescriptor {
    pub(crate) name: String,
    /// Mapping from field names to positions in `fields`
    field_idxs: BTreeMap<String, usize>,
    fields: Vec<FieldDescriptor>,
    primary_key: Option<String>,
}

impl RecordDescriptor {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        let field_idxs = fields
            .iter()
            .enumerate()
            .map(|(i, field)| (field.name.clone(), i))
            .collect();

        RecordDescriptor {
            name: name.into(),
            field_idxs,
            fields,
            primary_key: None,
        }
    }

    pub fn with_primary_key(mut self, field_name: impl Into<String>) -> Self {
        self.primary_key = Some(field_name.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn primary_key(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.field_idxs.get(name).map(|i| &self.fields[*i])
    }

    /// Resolves `name` and checks that its label fits `expected`.
    pub fn resolve_field(
        &self,
        name: &str,
        expected: Cardinality,
    ) -> Result<&FieldDescriptor, PlannerError> {
        let field = self
            .field(name)
            .ok_or_else(|| PlannerError::FieldNotFound(name.to_string(), self.name.clone()))?;

        match (expected, field.label) {
            (Cardinality::Repeated, FieldLabel::Repeated) => Ok(field),
            (Cardinality::Repeated, _) => Err(PlannerError::NotRepeatedField(name.to_string())),
            (Cardinality::Singular, FieldLabel::Repeated) => Err(
                PlannerError::RepeatedFieldNotAllowed(name.to_string(), FieldLabel::Repeated),
            ),
            (Cardinality::Singular, _) => Ok(field),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::{Cardinality, FieldDescriptor, FieldLabel, FieldType, RecordDescriptor};
    use crate::errors::PlannerError;
    use std::sync::Arc;

    fn order_descriptor() -> RecordDescriptor {
        let tag = Arc::new(RecordDescriptor::new(
            "Tag",
            vec![FieldDescriptor::new(
                "name",
                FieldLabel::Optional,
                FieldType::String,
            )],
        ));

        RecordDescriptor::new(
            "Order",
            vec![
                FieldDescriptor::new("id", FieldLabel::Required, FieldType::Int64),
                FieldDescriptor::new("tags", FieldLabel::Repeated, FieldType::Message(tag)),
            ],
        )
        .with_primary_key("id")
    }

    #[test]
    fn test_resolve_field() -> Result<(), PlannerError> {
        let descriptor = order_descriptor();

        let tags = descriptor.resolve_field("tags", Cardinality::Repeated)?;
        assert_eq!(tags.message_type()?.name(), "Tag");
        assert_eq!(
            descriptor.resolve_field("id", Cardinality::Singular)?.label(),
            FieldLabel::Required
        );
        assert_eq!(descriptor.primary_key(), Some("id"));

        Ok(())
    }

    #[test]
    fn test_resolve_field_mismatch() {
        let descriptor = order_descriptor();

        assert_eq!(
            descriptor.resolve_field("id", Cardinality::Repeated),
            Err(PlannerError::NotRepeatedField("id".to_string()))
        );
        assert_eq!(
            descriptor.resolve_field("tags", Cardinality::Singular),
            Err(PlannerError::RepeatedFieldNotAllowed(
                "tags".to_string(),
                FieldLabel::Repeated
            ))
        );
        assert_eq!(
            descriptor.resolve_field("missing", Cardinality::Singular),
            Err(PlannerError::FieldNotFound(
                "missing".to_string(),
                "Order".to_string()
            ))
        );
        assert!(matches!(
            descriptor
                .resolve_field("id", Cardinality::Singular)
                .and_then(|field| field.message_type().cloned()),
            Err(PlannerError::NotMessageField(_))
        ));
    }
}
