use crate::optimizer::core::property::PlanProperty;
use crate::planner::RelationalExpression;
use std::collections::BTreeMap;

/// Physical members of one reference that agree on a set of properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanPartition {
    properties: BTreeMap<PlanProperty, bool>,
    plans: Vec<RelationalExpression>,
}

impl PlanPartition {
    pub fn new(properties: BTreeMap<PlanProperty, bool>, plans: Vec<RelationalExpression>) -> Self {
        PlanPartition { properties, plans }
    }

    pub fn properties(&self) -> &BTreeMap<PlanProperty, bool> {
        &self.properties
    }

    pub fn plans(&self) -> &[RelationalExpression] {
        &self.plans
    }

    /// `None` if the partition was not built over `property`.
    pub fn partition_property_value(&self, property: PlanProperty) -> Option<bool> {
        self.properties.get(&property).copied()
    }

    /// Whether the partition's value for `property` satisfies `predicate`.
    pub fn has_property(&self, property: PlanProperty, predicate: impl Fn(bool) -> bool) -> bool {
        self.partition_property_value(property)
            .map(predicate)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::{FieldDescriptor, FieldLabel, FieldType, IndexDescriptor, RecordDescriptor};
    use crate::errors::PlannerError;
    use crate::optimizer::core::memo::Memo;
    use crate::optimizer::core::property::PlanProperty;
    use crate::planner::operator::scan::{IndexScanOperator, ScanOperator};
    use crate::planner::operator::PhysicalOperator;
    use crate::planner::RelationalExpression;
    use crate::types::value::DataValue;
    use std::sync::Arc;

    #[test]
    fn test_partition_by_distinct() -> Result<(), PlannerError> {
        let tag = Arc::new(RecordDescriptor::new(
            "Tag",
            vec![FieldDescriptor::new("name", FieldLabel::Optional, FieldType::String)],
        ));
        let order = RecordDescriptor::new(
            "Order",
            vec![
                FieldDescriptor::new("id", FieldLabel::Required, FieldType::Int64),
                FieldDescriptor::new("tags", FieldLabel::Repeated, FieldType::Message(tag)),
            ],
        )
        .with_primary_key("id");
        let index = Arc::new(IndexDescriptor::new(
            "by_tag",
            &order,
            vec!["tags".to_string(), "name".to_string()],
        )?);

        let scan = RelationalExpression::Physical(PhysicalOperator::Scan(ScanOperator::new(
            vec!["Order".to_string()],
        )));
        let index_scan =
            RelationalExpression::Physical(PhysicalOperator::IndexScan(IndexScanOperator {
                index,
                key: DataValue::from("x"),
            }));
        let mut memo = Memo::new();
        let reference = memo.from_members(vec![scan.clone(), index_scan.clone()])?;

        let partitions = memo.partition_by(reference, &[PlanProperty::DistinctRecords])?;
        assert_eq!(partitions.len(), 2);
        assert_eq!(
            partitions[0].partition_property_value(PlanProperty::DistinctRecords),
            Some(false)
        );
        assert_eq!(partitions[0].plans(), &[index_scan]);
        assert!(partitions[1].has_property(PlanProperty::DistinctRecords, |distinct| distinct));
        assert_eq!(partitions[1].plans(), &[scan]);
        assert!(!partitions[1].has_property(PlanProperty::StoredRecord, |stored| stored));

        let stored = memo.partition_by(reference, &[PlanProperty::StoredRecord])?;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].plans().len(), 2);
        assert!(!memo.property_value(reference, PlanProperty::DistinctRecords)?);
        assert!(memo.property_value(reference, PlanProperty::StoredRecord)?);

        Ok(())
    }
}
