pub mod cursor;
pub(crate) mod dml;
pub(crate) mod dql;

use crate::errors::PlannerError;
use crate::execution::dml::delete::Delete;
use crate::execution::dql::distinct::Distinct;
use crate::execution::dql::explode::Explode;
use crate::execution::dql::filter::Filter;
use crate::execution::dql::index_scan::IndexScan;
use crate::execution::dql::seq_scan::SeqScan;
use crate::planner::operator::PhysicalOperator;
use crate::planner::quantifier::CorrelationIdentifier;
use crate::planner::PhysicalPlan;
use crate::storage::Storage;
use crate::types::value::DataValue;
use ahash::HashMap;

/// Rows currently bound to the aliases of enclosing operators.
pub type Bindings = HashMap<CorrelationIdentifier, DataValue>;

pub trait Executor<S: Storage> {
    fn execute(self, storage: &S, bindings: &Bindings) -> Result<Vec<DataValue>, PlannerError>;
}

/// Runs `plan` to completion. Correlated operators (explodes, existential
/// sub-plans) read the rows of their outer aliases from `bindings`.
pub fn execute<S: Storage>(
    plan: &PhysicalPlan,
    storage: &S,
    bindings: &Bindings,
) -> Result<Vec<DataValue>, PlannerError> {
    let PhysicalPlan {
        operator,
        childrens,
    } = plan;

    match operator {
        PhysicalOperator::Scan(op) => SeqScan::from(op).execute(storage, bindings),
        PhysicalOperator::IndexScan(op) => IndexScan::from(op).execute(storage, bindings),
        PhysicalOperator::Explode(op) => Explode::from(op).execute(storage, bindings),
        PhysicalOperator::Filter(op) => {
            let (input, existentials) = childrens
                .split_first()
                .ok_or(PlannerError::MissingInput("Filter"))?;

            Filter::from((op, input, existentials)).execute(storage, bindings)
        }
        PhysicalOperator::UnorderedPrimaryKeyDistinct(_) => {
            let input = execute(first_child(childrens, "Distinct")?, storage, bindings)?;

            Distinct::from(input).execute(storage, bindings)
        }
        PhysicalOperator::Delete(op) => {
            let input = execute(first_child(childrens, "Delete")?, storage, bindings)?;

            Delete::from((op, input)).execute(storage, bindings)
        }
    }
}

fn first_child<'a>(
    childrens: &'a [PhysicalPlan],
    operator: &'static str,
) -> Result<&'a PhysicalPlan, PlannerError> {
    childrens.first().ok_or(PlannerError::MissingInput(operator))
}

pub(crate) fn bound<'a>(
    bindings: &'a Bindings,
    alias: &CorrelationIdentifier,
) -> Result<&'a DataValue, PlannerError> {
    bindings
        .get(alias)
        .ok_or_else(|| PlannerError::UnboundAlias(alias.to_string()))
}
