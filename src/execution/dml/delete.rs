use crate::errors::PlannerError;
use crate::execution::{Bindings, Executor};
use crate::planner::operator::delete::DeleteOperator;
use crate::storage::Storage;
use crate::types::value::DataValue;

/// Removes every input record from storage and returns the removed ones.
pub(crate) struct Delete<'a> {
    record_type: &'a str,
    input: Vec<DataValue>,
}

impl<'a> From<(&'a DeleteOperator, Vec<DataValue>)> for Delete<'a> {
    fn from((DeleteOperator { record_type, .. }, input): (&'a DeleteOperator, Vec<DataValue>)) -> Self {
        Delete { record_type, input }
    }
}

impl<S: Storage> Executor<S> for Delete<'_> {
    fn execute(self, storage: &S, _: &Bindings) -> Result<Vec<DataValue>, PlannerError> {
        let Delete { record_type, input } = self;
        let mut deleted = Vec::new();

        for row in input {
            let Some(primary_key) = row.as_message().and_then(|record| record.primary_key())
            else {
                return Err(PlannerError::PrimaryKeyNotFound(record_type.to_string()));
            };
            if let Some(record) = storage.delete(record_type, primary_key)? {
                deleted.push(DataValue::Message(record));
            }
        }

        Ok(deleted)
    }
}
