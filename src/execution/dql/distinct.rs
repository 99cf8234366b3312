use crate::errors::PlannerError;
use crate::execution::{Bindings, Executor};
use crate::storage::Storage;
use crate::types::value::DataValue;
use ahash::HashSet;

/// Keeps the first row of every `(record type, primary key)`.
pub(crate) struct Distinct {
    input: Vec<DataValue>,
}

impl From<Vec<DataValue>> for Distinct {
    fn from(input: Vec<DataValue>) -> Self {
        Distinct { input }
    }
}

impl<S: Storage> Executor<S> for Distinct {
    fn execute(self, _: &S, _: &Bindings) -> Result<Vec<DataValue>, PlannerError> {
        let mut seen = HashSet::default();
        let mut output = Vec::with_capacity(self.input.len());

        for row in self.input {
            let record = row
                .as_message()
                .ok_or(PlannerError::UnsupportedOperation("distinct over non-record rows"))?;
            let primary_key = record
                .primary_key()
                .ok_or_else(|| PlannerError::PrimaryKeyNotFound(record.record_type().to_string()))?
                .clone();

            if seen.insert((record.record_type().to_string(), primary_key)) {
                output.push(row);
            }
        }

        Ok(output)
    }
}
