use crate::catalog::descriptor::RecordDescriptorRef;
use crate::catalog::index::{IndexDescriptor, IndexRef};
use crate::errors::PlannerError;
use std::collections::BTreeMap;
use std::sync::Arc;

/// The set of record types (and their indexes) a store knows about.
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    record_types: BTreeMap<String, RecordDescriptorRef>,
    indexes: BTreeMap<String, Vec<IndexRef>>,
}

impl SchemaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_record_type(&mut self, descriptor: RecordDescriptorRef) -> Result<(), PlannerError> {
        if descriptor.primary_key().is_none() {
            return Err(PlannerError::PrimaryKeyNotFound(
                descriptor.name().to_string(),
            ));
        }
        self.record_types
            .insert(descriptor.name().to_string(), descriptor);

        Ok(())
    }

    pub fn add_index(
        &mut self,
        name: impl Into<String>,
        record_type: &str,
        path: Vec<String>,
    ) -> Result<IndexRef, PlannerError> {
        let descriptor = self.record_type(record_type)?;
        let index = Arc::new(IndexDescriptor::new(name, descriptor, path)?);

        self.indexes
            .entry(record_type.to_string())
            .or_default()
            .push(index.clone());

        Ok(index)
    }

    pub fn record_type(&self, name: &str) -> Result<&RecordDescriptorRef, PlannerError> {
        self.record_types
            .get(name)
            .ok_or_else(|| PlannerError::RecordTypeNotFound(name.to_string()))
    }

    pub fn record_type_names(&self) -> Vec<String> {
        self.record_types.keys().cloned().collect()
    }

    pub fn indexes(&self, record_type: &str) -> &[IndexRef] {
        self.indexes
            .get(record_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Finds an index whose key path is exactly `path`.
    pub fn index_on(&self, record_type: &str, path: &[String]) -> Option<&IndexRef> {
        self.indexes(record_type)
            .iter()
            .find(|index| index.path() == path)
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::{FieldDescriptor, FieldLabel, FieldType, RecordDescriptor, SchemaCatalog};
    use crate::errors::PlannerError;
    use std::sync::Arc;

    #[test]
    fn test_add_index() -> Result<(), PlannerError> {
        let tag = Arc::new(RecordDescriptor::new(
            "Tag",
            vec![FieldDescriptor::new("name", FieldLabel::Optional, FieldType::String)],
        ));
        let order = Arc::new(
            RecordDescriptor::new(
                "Order",
                vec![
                    FieldDescriptor::new("id", FieldLabel::Required, FieldType::Int64),
                    FieldDescriptor::new("status", FieldLabel::Optional, FieldType::String),
                    FieldDescriptor::new("tags", FieldLabel::Repeated, FieldType::Message(tag)),
                ],
            )
            .with_primary_key("id"),
        );
        let mut catalog = SchemaCatalog::new();
        catalog.add_record_type(order)?;

        let by_tag = catalog.add_index("by_tag", "Order", vec!["tags".into(), "name".into()])?;
        let by_status = catalog.add_index("by_status", "Order", vec!["status".into()])?;

        assert!(by_tag.is_fan_out());
        assert!(!by_status.is_fan_out());
        assert_eq!(catalog.indexes("Order").len(), 2);
        assert_eq!(catalog.record_type_names(), vec!["Order".to_string()]);
        assert_eq!(
            catalog
                .index_on("Order", &["status".to_string()])
                .map(|index| index.name()),
            Some("by_status")
        );
        assert!(matches!(
            catalog.add_index("bad", "Order", vec!["tags".into()]),
            Err(PlannerError::TypeMismatch { .. })
        ));
        assert!(matches!(
            catalog.add_index("bad", "Missing", vec!["id".into()]),
            Err(PlannerError::RecordTypeNotFound(_))
        ));

        Ok(())
    }
}
