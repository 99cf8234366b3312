use crate::errors::PlannerError;
use crate::execution::{bound, Bindings, Executor};
use crate::planner::operator::explode::ExplodeOperator;
use crate::planner::quantifier::CorrelationIdentifier;
use crate::storage::Storage;
use crate::types::record::navigate_repeated;
use crate::types::value::DataValue;

pub(crate) struct Explode<'a> {
    source: CorrelationIdentifier,
    path: &'a [String],
}

impl<'a> From<&'a ExplodeOperator> for Explode<'a> {
    fn from(ExplodeOperator { source, path }: &'a ExplodeOperator) -> Self {
        Explode {
            source: *source,
            path,
        }
    }
}

impl<S: Storage> Executor<S> for Explode<'_> {
    fn execute(self, _: &S, bindings: &Bindings) -> Result<Vec<DataValue>, PlannerError> {
        let row = bound(bindings, &self.source)?;

        // an absent field explodes into no rows
        Ok(navigate_repeated(row, self.path).unwrap_or_default())
    }
}
