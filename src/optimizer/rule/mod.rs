use crate::errors::PlannerError;
use crate::optimizer::core::pattern::BindingMatcher;
use crate::optimizer::core::rule::{CascadesRule, MatchPattern, RuleCall};
use crate::optimizer::rule::implementation::ImplementationRuleImpl;
use crate::optimizer::rule::normalization::NormalizationRuleImpl;
use crate::planner::RelationalExpression;

pub mod implementation;
pub mod normalization;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RuleImpl {
    Normalization(NormalizationRuleImpl),
    Implementation(ImplementationRuleImpl),
}

impl MatchPattern for RuleImpl {
    fn pattern(&self) -> &dyn BindingMatcher<RelationalExpression> {
        match self {
            RuleImpl::Normalization(rule) => rule.pattern(),
            RuleImpl::Implementation(rule) => rule.pattern(),
        }
    }
}

impl CascadesRule for RuleImpl {
    fn name(&self) -> &'static str {
        match self {
            RuleImpl::Normalization(rule) => rule.name(),
            RuleImpl::Implementation(rule) => rule.name(),
        }
    }

    fn on_match(
        &self,
        call: &mut RuleCall<'_>,
    ) -> Result<Vec<RelationalExpression>, PlannerError> {
        match self {
            RuleImpl::Normalization(rule) => rule.on_match(call),
            RuleImpl::Implementation(rule) => rule.on_match(call),
        }
    }
}

impl From<NormalizationRuleImpl> for RuleImpl {
    fn from(rule: NormalizationRuleImpl) -> Self {
        RuleImpl::Normalization(rule)
    }
}

impl From<ImplementationRuleImpl> for RuleImpl {
    fn from(rule: ImplementationRuleImpl) -> Self {
        RuleImpl::Implementation(rule)
    }
}
