use crate::errors::PlannerError;
use crate::optimizer::core::memo::Memo;
use crate::planner::operator::PhysicalOperator;
use std::fmt;
use std::fmt::Formatter;

/// Boolean physical properties a plan may guarantee about the rows it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PlanProperty {
    /// No two rows share a primary key.
    DistinctRecords,
    /// Rows are whole records as read from storage.
    StoredRecord,
}

impl PlanProperty {
    /// Derives the property for one physical operator. Operators that pass rows
    /// through inherit it from the reference they range over.
    pub fn derive(&self, memo: &Memo, op: &PhysicalOperator) -> Result<bool, PlannerError> {
        match (self, op) {
            (_, PhysicalOperator::Scan(_)) => Ok(true),
            (PlanProperty::DistinctRecords, PhysicalOperator::IndexScan(op)) => {
                Ok(!op.index.is_fan_out())
            }
            (PlanProperty::StoredRecord, PhysicalOperator::IndexScan(_)) => Ok(true),
            (_, PhysicalOperator::Explode(_)) => Ok(false),
            (_, PhysicalOperator::Filter(op)) => memo.property_value(op.inner.reference(), *self),
            (PlanProperty::DistinctRecords, PhysicalOperator::UnorderedPrimaryKeyDistinct(_)) => {
                Ok(true)
            }
            (PlanProperty::StoredRecord, PhysicalOperator::UnorderedPrimaryKeyDistinct(op)) => {
                memo.property_value(op.inner.reference(), *self)
            }
            (PlanProperty::DistinctRecords, PhysicalOperator::Delete(op)) => {
                memo.property_value(op.inner.reference(), *self)
            }
            (PlanProperty::StoredRecord, PhysicalOperator::Delete(_)) => Ok(false),
        }
    }
}

impl fmt::Display for PlanProperty {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            PlanProperty::DistinctRecords => write!(f, "DistinctRecords"),
            PlanProperty::StoredRecord => write!(f, "StoredRecord"),
        }
    }
}
