use crate::errors::PlannerError;
use crate::execution::{Bindings, Executor};
use crate::planner::operator::scan::ScanOperator;
use crate::storage::Storage;
use crate::types::value::DataValue;
use itertools::Itertools;

pub(crate) struct SeqScan<'a> {
    record_types: &'a [String],
}

impl<'a> From<&'a ScanOperator> for SeqScan<'a> {
    fn from(ScanOperator { record_types }: &'a ScanOperator) -> Self {
        SeqScan { record_types }
    }
}

impl<S: Storage> Executor<S> for SeqScan<'_> {
    fn execute(self, storage: &S, _: &Bindings) -> Result<Vec<DataValue>, PlannerError> {
        Ok(storage
            .scan(self.record_types)?
            .into_iter()
            .map(DataValue::Message)
            .collect_vec())
    }
}
