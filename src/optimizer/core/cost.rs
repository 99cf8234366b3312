use crate::planner::operator::PhysicalOperator;
use crate::planner::predicate::BoundPredicate;

/// Orders physical alternatives when the final plan is extracted. The cost of a
/// plan is the sum of its operators' costs.
pub trait CostModel: Send + Sync {
    fn cost(&self, op: &PhysicalOperator) -> f64;
}

/// Fixed per-operator weights: lookups beat scans, and residual predicates
/// (which re-evaluate a declarative filter row by row) are expensive.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCostModel;

impl DefaultCostModel {
    fn predicate_cost(predicate: &BoundPredicate) -> f64 {
        match predicate {
            BoundPredicate::Value { .. } | BoundPredicate::RecordType { .. } => 1.0,
            BoundPredicate::Exists { .. } => 2.0,
            BoundPredicate::Residual(_) => 50.0,
            BoundPredicate::And(predicates) | BoundPredicate::Or(predicates) => {
                predicates.iter().map(Self::predicate_cost).sum()
            }
            BoundPredicate::Not(predicate) => Self::predicate_cost(predicate),
        }
    }
}

impl CostModel for DefaultCostModel {
    fn cost(&self, op: &PhysicalOperator) -> f64 {
        match op {
            PhysicalOperator::Scan(op) => 100.0 * op.record_types.len().max(1) as f64,
            PhysicalOperator::IndexScan(_) => 10.0,
            PhysicalOperator::Explode(_) => 5.0,
            PhysicalOperator::Filter(op) => {
                1.0 + op.predicates.iter().map(Self::predicate_cost).sum::<f64>()
            }
            PhysicalOperator::UnorderedPrimaryKeyDistinct(_) => 5.0,
            PhysicalOperator::Delete(_) => 1.0,
        }
    }
}
