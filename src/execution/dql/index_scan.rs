use crate::catalog::IndexDescriptor;
use crate::errors::PlannerError;
use crate::execution::{Bindings, Executor};
use crate::planner::operator::scan::IndexScanOperator;
use crate::storage::Storage;
use crate::types::value::DataValue;
use itertools::Itertools;

pub(crate) struct IndexScan<'a> {
    index: &'a IndexDescriptor,
    key: &'a DataValue,
}

impl<'a> From<&'a IndexScanOperator> for IndexScan<'a> {
    fn from(IndexScanOperator { index, key }: &'a IndexScanOperator) -> Self {
        IndexScan { index, key }
    }
}

impl<S: Storage> Executor<S> for IndexScan<'_> {
    fn execute(self, storage: &S, _: &Bindings) -> Result<Vec<DataValue>, PlannerError> {
        Ok(storage
            .index_scan(self.index, self.key)?
            .into_iter()
            .map(DataValue::Message)
            .collect_vec())
    }
}
