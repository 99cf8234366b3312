use crate::errors::PlannerError;
use crate::optimizer::core::bindings::BindingKey;
use crate::optimizer::core::pattern::{
    for_each_quantifier, for_each_quantifier_over_ref, members, simple_select_expression,
    BindingMatcher, ExpressionMatcher,
};
use crate::optimizer::core::rule::{CascadesRule, MatchPattern, RuleCall};
use crate::planner::operator::select::SelectOperator;
use crate::planner::operator::{AliasTranslation, Operator};
use crate::planner::quantifier::Quantifier;
use crate::planner::RelationalExpression;
use itertools::Itertools;
use std::sync::LazyLock;

const UPPER: BindingKey<RelationalExpression> = BindingKey::new("upper");
const OUTER: BindingKey<Quantifier> = BindingKey::new("outer");
const LOWER: BindingKey<RelationalExpression> = BindingKey::new("lower");
const INNER: BindingKey<Quantifier> = BindingKey::new("inner");

static MERGE_SELECTS_PATTERN: LazyLock<ExpressionMatcher> = LazyLock::new(|| {
    simple_select_expression(
        UPPER,
        for_each_quantifier_over_ref(
            OUTER,
            members(simple_select_expression(LOWER, for_each_quantifier(INNER))),
        ),
    )
});

/// Collapses a select ranging over a plain filtering select into one select
/// over the lower select's source. The lower predicates are rebased onto the
/// upper for-each alias.
pub struct MergeSelects;

impl MatchPattern for MergeSelects {
    fn pattern(&self) -> &dyn BindingMatcher<RelationalExpression> {
        &*MERGE_SELECTS_PATTERN
    }
}

impl CascadesRule for MergeSelects {
    fn name(&self) -> &'static str {
        "MergeSelects"
    }

    fn on_match(
        &self,
        call: &mut RuleCall<'_>,
    ) -> Result<Vec<RelationalExpression>, PlannerError> {
        let (
            RelationalExpression::Logical(Operator::Select(upper)),
            RelationalExpression::Logical(Operator::Select(lower)),
        ) = (call.get(&UPPER)?, call.get(&LOWER)?)
        else {
            return Ok(vec![]);
        };
        let outer = call.get(&OUTER)?;
        let inner = call.get(&INNER)?;

        if lower.has_existentials() || lower.result != inner.alias() {
            return Ok(vec![]);
        }
        let translation = AliasTranslation::from_iter([(inner.alias(), outer.alias())]);

        let quantifiers = [Quantifier::for_each(outer.alias(), inner.reference())]
            .into_iter()
            .chain(upper.existentials().cloned())
            .collect_vec();
        let predicates = lower
            .predicates
            .iter()
            .map(|predicate| predicate.rebase(&translation))
            .chain(upper.predicates.iter().cloned())
            .collect_vec();

        Ok(vec![RelationalExpression::Logical(Operator::Select(
            SelectOperator {
                quantifiers,
                predicates,
                result: upper.result,
            },
        ))])
    }
}
