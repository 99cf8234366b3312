pub(crate) mod dml;
pub(crate) mod dql;
pub(crate) mod marcos;

use crate::errors::PlannerError;
use crate::optimizer::core::pattern::BindingMatcher;
use crate::optimizer::core::rule::{CascadesRule, MatchPattern, RuleCall};
use crate::optimizer::rule::implementation::dml::delete::DeleteImplementation;
use crate::optimizer::rule::implementation::dql::explode::ExplodeImplementation;
use crate::optimizer::rule::implementation::dql::index_scan::IndexScanImplementation;
use crate::optimizer::rule::implementation::dql::scan::ScanImplementation;
use crate::optimizer::rule::implementation::dql::select::{
    ResidualSelectImplementation, SimpleSelectImplementation,
};
use crate::planner::RelationalExpression;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ImplementationRuleImpl {
    // DQL
    Scan,
    IndexScan,
    Explode,
    SimpleSelect,
    ResidualSelect,
    // DML
    Delete,
}

impl MatchPattern for ImplementationRuleImpl {
    fn pattern(&self) -> &dyn BindingMatcher<RelationalExpression> {
        match self {
            ImplementationRuleImpl::Scan => ScanImplementation.pattern(),
            ImplementationRuleImpl::IndexScan => IndexScanImplementation.pattern(),
            ImplementationRuleImpl::Explode => ExplodeImplementation.pattern(),
            ImplementationRuleImpl::SimpleSelect => SimpleSelectImplementation.pattern(),
            ImplementationRuleImpl::ResidualSelect => ResidualSelectImplementation.pattern(),
            ImplementationRuleImpl::Delete => DeleteImplementation.pattern(),
        }
    }
}

impl CascadesRule for ImplementationRuleImpl {
    fn name(&self) -> &'static str {
        match self {
            ImplementationRuleImpl::Scan => ScanImplementation.name(),
            ImplementationRuleImpl::IndexScan => IndexScanImplementation.name(),
            ImplementationRuleImpl::Explode => ExplodeImplementation.name(),
            ImplementationRuleImpl::SimpleSelect => SimpleSelectImplementation.name(),
            ImplementationRuleImpl::ResidualSelect => ResidualSelectImplementation.name(),
            ImplementationRuleImpl::Delete => DeleteImplementation.name(),
        }
    }

    fn on_match(
        &self,
        call: &mut RuleCall<'_>,
    ) -> Result<Vec<RelationalExpression>, PlannerError> {
        match self {
            ImplementationRuleImpl::Scan => ScanImplementation.on_match(call),
            ImplementationRuleImpl::IndexScan => IndexScanImplementation.on_match(call),
            ImplementationRuleImpl::Explode => ExplodeImplementation.on_match(call),
            ImplementationRuleImpl::SimpleSelect => SimpleSelectImplementation.on_match(call),
            ImplementationRuleImpl::ResidualSelect => ResidualSelectImplementation.on_match(call),
            ImplementationRuleImpl::Delete => DeleteImplementation.on_match(call),
        }
    }
}

impl ImplementationRuleImpl {
    pub fn all() -> Vec<ImplementationRuleImpl> {
        vec![
            ImplementationRuleImpl::Scan,
            ImplementationRuleImpl::IndexScan,
            ImplementationRuleImpl::Explode,
            ImplementationRuleImpl::SimpleSelect,
            ImplementationRuleImpl::ResidualSelect,
            ImplementationRuleImpl::Delete,
        ]
    }
}
