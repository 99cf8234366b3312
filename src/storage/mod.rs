pub mod memory;

use crate::catalog::IndexDescriptor;
use crate::errors::PlannerError;
use crate::expression::Comparison;
use crate::types::record::navigate_fan_out;
use crate::types::value::DataValue;
use crate::types::RecordRef;
use itertools::Itertools;
use std::iter;

pub trait Storage: Sync + Send + Clone + 'static {
    /// Stores `record`. Its primary key must be set and not yet stored for its type.
    fn insert(&self, record: RecordRef) -> Result<(), PlannerError>;

    /// Every stored record of `record_types`, type by type in insertion order.
    fn scan(&self, record_types: &[String]) -> Result<Vec<RecordRef>, PlannerError>;

    /// Removes and returns the record with `primary_key`, if stored.
    fn delete(
        &self,
        record_type: &str,
        primary_key: &DataValue,
    ) -> Result<Option<RecordRef>, PlannerError>;

    /// Records of the index's type, once per indexed value equal to `key`.
    fn index_scan(
        &self,
        index: &IndexDescriptor,
        key: &DataValue,
    ) -> Result<Vec<RecordRef>, PlannerError> {
        let equals = Comparison::equals(key.clone());

        Ok(self
            .scan(&[index.record_type().to_string()])?
            .into_iter()
            .flat_map(|record| {
                let hits = navigate_fan_out(&DataValue::Message(record.clone()), index.path())
                    .iter()
                    .filter(|value| equals.eval(value) == Some(true))
                    .count();

                iter::repeat(record).take(hits)
            })
            .collect_vec())
    }
}
