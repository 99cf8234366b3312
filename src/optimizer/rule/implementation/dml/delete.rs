use crate::errors::PlannerError;
use crate::optimizer::core::bindings::BindingKey;
use crate::optimizer::core::partition::PlanPartition;
use crate::optimizer::core::pattern::{
    any_plan_partition, delete_expression, filter_plan_partitions, for_each_quantifier_over_ref,
    plan_partitions, BindingMatcher, ExpressionMatcher,
};
use crate::optimizer::core::property::PlanProperty;
use crate::optimizer::core::rule::{CascadesRule, MatchPattern, RuleCall};
use crate::planner::operator::delete::{DeleteOperator, DistinctOperator};
use crate::planner::operator::{Operator, PhysicalOperator};
use crate::planner::quantifier::Quantifier;
use crate::planner::RelationalExpression;
use std::sync::LazyLock;

const DELETE: BindingKey<RelationalExpression> = BindingKey::new("delete");
const INNER: BindingKey<Quantifier> = BindingKey::new("inner");
const PARTITION: BindingKey<PlanPartition> = BindingKey::new("partition");

static DELETE_PATTERN: LazyLock<ExpressionMatcher> = LazyLock::new(|| {
    delete_expression(
        DELETE,
        for_each_quantifier_over_ref(
            INNER,
            plan_partitions(
                vec![PlanProperty::StoredRecord, PlanProperty::DistinctRecords],
                filter_plan_partitions(
                    |partition| partition.has_property(PlanProperty::StoredRecord, |stored| stored),
                    any_plan_partition(PARTITION),
                ),
            ),
        ),
    )
});

/// Deletes the records of every stored-record partition of the input. A
/// partition that may repeat a primary key is made distinct first.
pub struct DeleteImplementation;

impl MatchPattern for DeleteImplementation {
    fn pattern(&self) -> &dyn BindingMatcher<RelationalExpression> {
        &*DELETE_PATTERN
    }
}

impl CascadesRule for DeleteImplementation {
    fn name(&self) -> &'static str {
        "ImplementDelete"
    }

    fn on_match(
        &self,
        call: &mut RuleCall<'_>,
    ) -> Result<Vec<RelationalExpression>, PlannerError> {
        let RelationalExpression::Logical(Operator::Delete(delete)) = call.get(&DELETE)? else {
            return Ok(vec![]);
        };
        let record_type = delete.record_type.clone();
        let inner = call.get(&INNER)?.clone();
        let partition = call.get(&PARTITION)?.clone();

        let plans_ref = call.memoize_members_from_other(inner.reference(), partition.plans())?;
        let distinct_ref =
            if partition.has_property(PlanProperty::DistinctRecords, |distinct| distinct) {
                plans_ref
            } else {
                call.memoize_plan(RelationalExpression::Physical(
                    PhysicalOperator::UnorderedPrimaryKeyDistinct(DistinctOperator {
                        inner: inner.morph_physical(plans_ref),
                    }),
                ))
            };

        Ok(vec![RelationalExpression::Physical(PhysicalOperator::Delete(
            DeleteOperator {
                inner: inner.morph_physical(distinct_ref),
                record_type,
            },
        ))])
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::{
        FieldDescriptor, FieldLabel, FieldType, IndexDescriptor, RecordDescriptor,
    };
    use crate::errors::PlannerError;
    use crate::optimizer::cascades::batch::{CascadesBatch, CascadesBatchStrategy};
    use crate::optimizer::cascades::optimizer::CascadesOptimizer;
    use crate::optimizer::core::memo::{Memo, ReferenceId};
    use crate::optimizer::rule::implementation::ImplementationRuleImpl;
    use crate::planner::operator::delete::DeleteOperator;
    use crate::planner::operator::scan::{IndexScanOperator, ScanOperator};
    use crate::planner::operator::{Operator, PhysicalOperator};
    use crate::planner::quantifier::Quantifier;
    use crate::planner::RelationalExpression;
    use crate::types::value::DataValue;
    use std::sync::Arc;

    fn input_of(delete: &PhysicalOperator) -> ReferenceId {
        let PhysicalOperator::Delete(DeleteOperator { inner, .. }) = delete else {
            panic!("not a delete: {}", delete);
        };
        inner.reference()
    }

    #[test]
    fn test_distinct_only_where_needed() -> Result<(), PlannerError> {
        let tag = Arc::new(RecordDescriptor::new(
            "Tag",
            vec![FieldDescriptor::new("name", FieldLabel::Optional, FieldType::String)],
        ));
        let order = RecordDescriptor::new(
            "Order",
            vec![
                FieldDescriptor::new("id", FieldLabel::Required, FieldType::Int64),
                FieldDescriptor::new("tags", FieldLabel::Repeated, FieldType::Message(tag)),
            ],
        )
        .with_primary_key("id");
        let by_tag = Arc::new(IndexDescriptor::new(
            "by_tag",
            &order,
            vec!["tags".to_string(), "name".to_string()],
        )?);

        // A: distinct stored records, B: stored records with repeats
        let scan = RelationalExpression::Physical(PhysicalOperator::Scan(ScanOperator::new(
            vec!["Order".to_string()],
        )));
        let index_scan =
            RelationalExpression::Physical(PhysicalOperator::IndexScan(IndexScanOperator {
                index: by_tag,
                key: DataValue::from("x"),
            }));
        let mut memo = Memo::new();
        let input = memo.from_members(vec![scan.clone(), index_scan.clone()])?;
        let alias = memo.new_alias();
        let root = memo.initial_of(RelationalExpression::Logical(Operator::Delete(
            DeleteOperator {
                inner: Quantifier::for_each(alias, input),
                record_type: "Order".to_string(),
            },
        )));

        let mut optimizer = CascadesOptimizer::new(memo, root).batch(CascadesBatch::new(
            "implementation".to_string(),
            CascadesBatchStrategy::once_topdown(),
            vec![ImplementationRuleImpl::Delete.into()],
        ));
        assert!(optimizer.explore()?);
        let memo = optimizer.memo();

        let deletes = memo.physical_members(root)?.cloned().collect::<Vec<_>>();
        assert_eq!(deletes.len(), 2);

        let inputs = deletes
            .iter()
            .map(|delete| Ok(memo.members(input_of(delete))?.to_vec()))
            .collect::<Result<Vec<_>, PlannerError>>()?;
        let (wrapped, unwrapped): (Vec<_>, Vec<_>) = inputs.into_iter().partition(|members| {
            matches!(
                members.as_slice(),
                [RelationalExpression::Physical(
                    PhysicalOperator::UnorderedPrimaryKeyDistinct(_)
                )]
            )
        });

        // the scan partition is used as is
        assert_eq!(unwrapped, vec![vec![scan]]);
        assert_eq!(wrapped.len(), 1);
        let [RelationalExpression::Physical(PhysicalOperator::UnorderedPrimaryKeyDistinct(
            distinct,
        ))] = wrapped[0].as_slice()
        else {
            panic!("expected a distinct over the index scan: {:?}", wrapped[0]);
        };
        assert_eq!(memo.members(distinct.inner.reference())?, &[index_scan]);

        Ok(())
    }
}
