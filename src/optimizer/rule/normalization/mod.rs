use crate::errors::PlannerError;
use crate::optimizer::core::pattern::BindingMatcher;
use crate::optimizer::core::rule::{CascadesRule, MatchPattern, RuleCall};
use crate::optimizer::rule::normalization::merge_selects::MergeSelects;
use crate::planner::RelationalExpression;

mod merge_selects;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NormalizationRuleImpl {
    MergeSelects,
}

impl MatchPattern for NormalizationRuleImpl {
    fn pattern(&self) -> &dyn BindingMatcher<RelationalExpression> {
        match self {
            NormalizationRuleImpl::MergeSelects => MergeSelects.pattern(),
        }
    }
}

impl CascadesRule for NormalizationRuleImpl {
    fn name(&self) -> &'static str {
        match self {
            NormalizationRuleImpl::MergeSelects => MergeSelects.name(),
        }
    }

    fn on_match(
        &self,
        call: &mut RuleCall<'_>,
    ) -> Result<Vec<RelationalExpression>, PlannerError> {
        match self {
            NormalizationRuleImpl::MergeSelects => MergeSelects.on_match(call),
        }
    }
}
