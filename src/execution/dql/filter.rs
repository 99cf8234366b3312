use crate::errors::PlannerError;
use crate::execution::{bound, execute, Bindings, Executor};
use crate::expression::evaluator::{and_all, or_any};
use crate::planner::operator::select::FilterOperator;
use crate::planner::predicate::BoundPredicate;
use crate::planner::quantifier::{CorrelationIdentifier, Quantifier};
use crate::planner::PhysicalPlan;
use crate::storage::Storage;
use crate::types::record::{navigate, navigate_field};
use crate::types::value::DataValue;
use ahash::HashMap;
use std::sync::Arc;

/// Nested-loop filter: binds each input row to the inner alias, runs every
/// existential sub-plan under that binding and keeps the row when all
/// predicates are true.
pub(crate) struct Filter<'a> {
    inner: &'a Quantifier,
    predicates: &'a [BoundPredicate],
    input: &'a PhysicalPlan,
    existentials: Vec<(CorrelationIdentifier, &'a PhysicalPlan)>,
}

impl<'a> From<(&'a FilterOperator, &'a PhysicalPlan, &'a [PhysicalPlan])> for Filter<'a> {
    fn from(
        (
            FilterOperator {
                inner,
                existentials,
                predicates,
            },
            input,
            plans,
        ): (&'a FilterOperator, &'a PhysicalPlan, &'a [PhysicalPlan]),
    ) -> Self {
        Filter {
            inner,
            predicates,
            input,
            existentials: existentials
                .iter()
                .map(Quantifier::alias)
                .zip(plans)
                .collect(),
        }
    }
}

impl<S: Storage> Executor<S> for Filter<'_> {
    fn execute(self, storage: &S, bindings: &Bindings) -> Result<Vec<DataValue>, PlannerError> {
        let mut output = Vec::new();

        for row in execute(self.input, storage, bindings)? {
            let mut row_bindings = bindings.clone();
            row_bindings.insert(self.inner.alias(), row);

            let mut exists = HashMap::default();
            for (alias, plan) in &self.existentials {
                exists.insert(*alias, !execute(plan, storage, &row_bindings)?.is_empty());
            }
            let passed = self
                .predicates
                .iter()
                .map(|predicate| eval_bound(predicate, &row_bindings, &exists))
                .collect::<Result<Vec<_>, _>>()?;

            if and_all(passed) == Some(true) {
                if let Some(row) = row_bindings.remove(&self.inner.alias()) {
                    output.push(row);
                }
            }
        }

        Ok(output)
    }
}

/// Three-valued evaluation of `predicate` against the bound rows. `exists`
/// holds the outcome of every existential sub-plan for the current row.
pub(crate) fn eval_bound(
    predicate: &BoundPredicate,
    bindings: &Bindings,
    exists: &HashMap<CorrelationIdentifier, bool>,
) -> Result<Option<bool>, PlannerError> {
    Ok(match predicate {
        BoundPredicate::Value { field, comparison } => {
            navigate_field(bound(bindings, &field.alias)?, &field.path)
                .and_then(|value| comparison.eval(&value))
        }
        BoundPredicate::And(predicates) => and_all(
            predicates
                .iter()
                .map(|predicate| eval_bound(predicate, bindings, exists))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        BoundPredicate::Or(predicates) => or_any(
            predicates
                .iter()
                .map(|predicate| eval_bound(predicate, bindings, exists))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        BoundPredicate::Not(predicate) => eval_bound(predicate, bindings, exists)?.map(|value| !value),
        BoundPredicate::Exists {
            existential,
            unknown_if_missing,
            ..
        } => {
            if let Some(container) = unknown_if_missing {
                let message = navigate(bound(bindings, &container.alias)?, &container.path);
                if message.as_message().is_none() {
                    return Ok(None);
                }
            }
            let produced = exists
                .get(existential)
                .ok_or_else(|| PlannerError::UnboundAlias(existential.to_string()))?;

            Some(*produced)
        }
        BoundPredicate::RecordType { alias, name } => Some(
            bound(bindings, alias)?
                .as_message()
                .is_some_and(|record| record.record_type() == name),
        ),
        BoundPredicate::Residual(compensation) => compensation.component().eval(
            bound(bindings, &compensation.alias)?
                .as_message()
                .map(Arc::as_ref),
        ),
    })
}

#[cfg(test)]
mod tests {
    use crate::errors::PlannerError;
    use crate::execution::dql::filter::eval_bound;
    use crate::execution::Bindings;
    use crate::expression::{Comparison, Predicate};
    use crate::planner::predicate::{BoundPredicate, Compensation, FieldPath};
    use crate::planner::quantifier::AliasGenerator;
    use crate::catalog::{FieldDescriptor, FieldLabel, FieldType, RecordDescriptor};
    use crate::types::value::DataValue;
    use crate::types::{FieldValue, Record};
    use ahash::HashMap;
    use std::sync::Arc;

    #[test]
    fn test_eval_bound() -> Result<(), PlannerError> {
        let detail = Arc::new(RecordDescriptor::new(
            "Detail",
            vec![FieldDescriptor::new("note", FieldLabel::Optional, FieldType::String)],
        ));
        let order = Arc::new(RecordDescriptor::new(
            "Order",
            vec![
                FieldDescriptor::new("status", FieldLabel::Optional, FieldType::String),
                FieldDescriptor::new("detail", FieldLabel::Optional, FieldType::Message(detail)),
            ],
        ));
        let record = Record::new(order, vec![("status", FieldValue::from("open"))])?;

        let mut aliases = AliasGenerator::default();
        let row = aliases.next_alias();
        let existential = aliases.next_alias();
        let mut bindings = Bindings::default();
        bindings.insert(row, DataValue::Message(Arc::new(record)));
        let exists = HashMap::from_iter([(existential, false)]);

        let status = BoundPredicate::Value {
            field: FieldPath::new(row, vec!["status".to_string()]),
            comparison: Comparison::equals("open"),
        };
        assert_eq!(eval_bound(&status, &bindings, &exists)?, Some(true));

        // the message holding `note` is missing
        let note = BoundPredicate::Value {
            field: FieldPath::new(row, vec!["detail".to_string(), "note".to_string()]),
            comparison: Comparison::equals("x"),
        };
        assert_eq!(eval_bound(&note, &bindings, &exists)?, None);
        assert_eq!(
            eval_bound(&BoundPredicate::Or(vec![note.clone(), status]), &bindings, &exists)?,
            Some(true)
        );

        let exists_in_detail = |unknown_if_missing| BoundPredicate::Exists {
            existential,
            unknown_if_missing,
            compensation: None,
        };
        assert_eq!(
            eval_bound(&exists_in_detail(None), &bindings, &exists)?,
            Some(false)
        );
        assert_eq!(
            eval_bound(
                &exists_in_detail(Some(FieldPath::new(row, vec!["detail".to_string()]))),
                &bindings,
                &exists
            )?,
            None
        );

        let record_type = BoundPredicate::RecordType {
            alias: row,
            name: "Order".to_string(),
        };
        assert_eq!(eval_bound(&record_type, &bindings, &exists)?, Some(true));

        let residual = BoundPredicate::Residual(Compensation::new(
            row,
            Predicate::field("status", Comparison::equals("closed")),
        ));
        assert_eq!(eval_bound(&residual, &bindings, &exists)?, Some(false));

        assert_eq!(
            eval_bound(&note, &Bindings::default(), &exists),
            Err(PlannerError::UnboundAlias(row.to_string()))
        );

        Ok(())
    }
}
