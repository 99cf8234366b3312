use crate::errors::PlannerError;
use crate::optimizer::core::bindings::BindingKey;
use crate::optimizer::core::partition::PlanPartition;
use crate::optimizer::core::pattern::{
    any_plan_partition, for_each_quantifier_over_ref, plan_partitions, simple_select_expression,
    BindingMatcher, ExpressionMatcher,
};
use crate::optimizer::core::rule::{CascadesRule, MatchPattern, RuleCall};
use crate::planner::operator::select::{FilterOperator, SelectOperator};
use crate::planner::operator::{Operator, PhysicalOperator};
use crate::planner::predicate::BoundPredicate;
use crate::planner::quantifier::Quantifier;
use crate::planner::RelationalExpression;
use itertools::Itertools;
use std::sync::LazyLock;

const SELECT: BindingKey<RelationalExpression> = BindingKey::new("select");
const INNER: BindingKey<Quantifier> = BindingKey::new("inner");
const PARTITION: BindingKey<PlanPartition> = BindingKey::new("partition");

static SELECT_PATTERN: LazyLock<ExpressionMatcher> = LazyLock::new(|| {
    simple_select_expression(
        SELECT,
        for_each_quantifier_over_ref(INNER, plan_partitions(vec![], any_plan_partition(PARTITION))),
    )
});

/// The bound select, its for-each quantifier and a reference holding the
/// physical plans the quantifier can range over.
fn bound_select(
    call: &mut RuleCall<'_>,
) -> Result<Option<(SelectOperator, Quantifier)>, PlannerError> {
    let RelationalExpression::Logical(Operator::Select(select)) = call.get(&SELECT)? else {
        return Ok(None);
    };
    let select = select.clone();
    let inner = call.get(&INNER)?.clone();
    if select.result != inner.alias() {
        return Ok(None);
    }
    let plans = call.get(&PARTITION)?.plans().to_vec();
    let reference = call.memoize_members_from_other(inner.reference(), &plans)?;

    Ok(Some((select, inner.morph_physical(reference))))
}

/// Filters the inner plans row by row, running every existential sub-plan
/// against each row.
pub struct SimpleSelectImplementation;

impl MatchPattern for SimpleSelectImplementation {
    fn pattern(&self) -> &dyn BindingMatcher<RelationalExpression> {
        &*SELECT_PATTERN
    }
}

impl CascadesRule for SimpleSelectImplementation {
    fn name(&self) -> &'static str {
        "ImplementSimpleSelect"
    }

    fn on_match(
        &self,
        call: &mut RuleCall<'_>,
    ) -> Result<Vec<RelationalExpression>, PlannerError> {
        let Some((select, inner)) = bound_select(call)? else {
            return Ok(vec![]);
        };

        Ok(vec![RelationalExpression::Physical(PhysicalOperator::Filter(
            FilterOperator {
                inner,
                existentials: select.existentials().cloned().collect_vec(),
                predicates: select.predicates,
            },
        ))])
    }
}

/// Replaces every existential test by its compensation, so the declarative
/// predicate is re-applied to each row and no sub-plan runs.
pub struct ResidualSelectImplementation;

impl MatchPattern for ResidualSelectImplementation {
    fn pattern(&self) -> &dyn BindingMatcher<RelationalExpression> {
        &*SELECT_PATTERN
    }
}

impl CascadesRule for ResidualSelectImplementation {
    fn name(&self) -> &'static str {
        "ImplementResidualSelect"
    }

    fn on_match(
        &self,
        call: &mut RuleCall<'_>,
    ) -> Result<Vec<RelationalExpression>, PlannerError> {
        let has_existentials = matches!(
            call.get(&SELECT)?,
            RelationalExpression::Logical(Operator::Select(select)) if select.has_existentials()
        );
        if !has_existentials {
            return Ok(vec![]);
        }
        let Some((select, inner)) = bound_select(call)? else {
            return Ok(vec![]);
        };
        let Some(predicates) = select
            .predicates
            .iter()
            .map(BoundPredicate::with_compensations)
            .collect::<Option<Vec<_>>>()
        else {
            return Ok(vec![]);
        };

        Ok(vec![RelationalExpression::Physical(PhysicalOperator::Filter(
            FilterOperator {
                inner,
                existentials: vec![],
                predicates,
            },
        ))])
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::{FieldDescriptor, FieldLabel, FieldType, RecordDescriptor};
    use crate::errors::PlannerError;
    use crate::expression::{Comparison, Predicate};
    use crate::optimizer::cascades::batch::{CascadesBatch, CascadesBatchStrategy};
    use crate::optimizer::cascades::optimizer::CascadesOptimizer;
    use crate::optimizer::core::memo::Memo;
    use crate::optimizer::rule::implementation::ImplementationRuleImpl;
    use crate::planner::operator::scan::ScanOperator;
    use crate::planner::operator::{Operator, PhysicalOperator};
    use crate::planner::predicate::BoundPredicate;
    use crate::planner::quantifier::Quantifier;
    use crate::planner::RelationalExpression;
    use std::sync::Arc;

    #[test]
    fn test_existential_and_residual_alternatives() -> Result<(), PlannerError> {
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
        let predicate = Predicate::one_of_them(
            "tags",
            Predicate::field("name", Comparison::equals("x")),
        );
        predicate.validate(&order)?;

        let mut memo = Memo::new();
        let scan = memo.initial_of(RelationalExpression::Logical(Operator::Scan(
            ScanOperator::new(vec!["Order".to_string()]),
        )));
        let base = Quantifier::for_each(memo.new_alias(), scan);
        let outer = base.clone();
        let expansion = predicate.expand(&base, &|| outer.clone(), &[], &mut memo);
        let select = expansion.build_simple_select_over_quantifier(base);
        let root = memo.initial_of(RelationalExpression::Logical(Operator::Select(select)));

        let mut optimizer = CascadesOptimizer::new(memo, root).batch(CascadesBatch::new(
            "implementation".to_string(),
            CascadesBatchStrategy::fix_point_topdown(10),
            vec![
                ImplementationRuleImpl::Scan.into(),
                ImplementationRuleImpl::Explode.into(),
                ImplementationRuleImpl::SimpleSelect.into(),
                ImplementationRuleImpl::ResidualSelect.into(),
            ],
        ));
        assert!(optimizer.explore()?);

        let filters = optimizer
            .memo()
            .physical_members(root)?
            .filter_map(|op| match op {
                PhysicalOperator::Filter(filter) => Some(filter.clone()),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(filters.len(), 2);

        let existential = &filters[0];
        assert_eq!(existential.existentials.len(), 1);
        assert!(matches!(
            existential.predicates[0],
            BoundPredicate::Exists { .. }
        ));
        let residual = &filters[1];
        assert!(residual.existentials.is_empty());
        assert!(matches!(
            residual.predicates[0],
            BoundPredicate::Residual(_)
        ));

        Ok(())
    }
}
