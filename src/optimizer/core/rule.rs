use crate::catalog::IndexRef;
use crate::errors::PlannerError;
use crate::optimizer::core::bindings::{BindingKey, FromBindable, PlannerBindings};
use crate::optimizer::core::memo::{Memo, ReferenceId};
use crate::optimizer::core::pattern::BindingMatcher;
use crate::planner::quantifier::CorrelationIdentifier;
use crate::planner::RelationalExpression;

pub trait MatchPattern {
    fn pattern(&self) -> &dyn BindingMatcher<RelationalExpression>;
}

/// A rewrite fired on every member its pattern matches. Whatever `on_match`
/// returns is added to the reference the matched member lives in.
pub trait CascadesRule: MatchPattern {
    fn name(&self) -> &'static str;

    fn on_match(
        &self,
        call: &mut RuleCall<'_>,
    ) -> Result<Vec<RelationalExpression>, PlannerError>;
}

/// Everything one rule firing may look at or add to.
pub struct RuleCall<'a> {
    reference: ReferenceId,
    bindings: PlannerBindings,
    memo: &'a mut Memo,
    indexes: &'a [IndexRef],
}

impl<'a> RuleCall<'a> {
    pub fn new(
        reference: ReferenceId,
        bindings: PlannerBindings,
        memo: &'a mut Memo,
        indexes: &'a [IndexRef],
    ) -> Self {
        RuleCall {
            reference,
            bindings,
            memo,
            indexes,
        }
    }

    pub fn get<T: FromBindable>(&self, key: &BindingKey<T>) -> Result<&T, PlannerError> {
        self.bindings.get(key)
    }

    /// The reference holding the matched expression.
    pub fn reference(&self) -> ReferenceId {
        self.reference
    }

    pub fn memo(&self) -> &Memo {
        self.memo
    }

    pub fn indexes(&self) -> &[IndexRef] {
        self.indexes
    }

    pub fn new_alias(&mut self) -> CorrelationIdentifier {
        self.memo.new_alias()
    }

    /// A reference holding exactly `plans`, all of which must already be members
    /// of `reference`. Reuses an existing reference with that member set.
    pub fn memoize_members_from_other(
        &mut self,
        reference: ReferenceId,
        plans: &[RelationalExpression],
    ) -> Result<ReferenceId, PlannerError> {
        for plan in plans {
            if !self.memo.contains(reference, plan)? {
                return Err(PlannerError::ForeignMember(reference.index()));
            }
        }
        if let Some(id) = self.memo.find_reference_with_members(plans) {
            return Ok(id);
        }
        self.memo.from_members(plans.to_vec())
    }

    /// A reference holding `plan`: an existing one if it already contains an
    /// equivalent expression.
    pub fn memoize_plan(&mut self, plan: RelationalExpression) -> ReferenceId {
        self.memo.memoize(plan)
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::PlannerError;
    use crate::optimizer::core::bindings::PlannerBindings;
    use crate::optimizer::core::memo::Memo;
    use crate::optimizer::core::rule::RuleCall;
    use crate::planner::operator::explode::ExplodeOperator;
    use crate::planner::operator::scan::ScanOperator;
    use crate::planner::operator::PhysicalOperator;
    use crate::planner::RelationalExpression;

    #[test]
    fn test_memoize_members_from_other() -> Result<(), PlannerError> {
        let scan = RelationalExpression::Physical(PhysicalOperator::Scan(ScanOperator::new(
            vec!["Order".to_string()],
        )));
        let mut memo = Memo::new();
        let alias = memo.new_alias();
        let explode = RelationalExpression::Physical(PhysicalOperator::Explode(ExplodeOperator {
            source: alias,
            path: vec!["tags".to_string()],
        }));
        let scans = memo.initial_of(scan.clone());
        let both = memo.from_members(vec![scan.clone(), explode.clone()])?;

        let mut call = RuleCall::new(both, PlannerBindings::new(), &mut memo, &[]);
        assert_eq!(
            call.memoize_members_from_other(both, &[scan.clone()])?,
            scans
        );
        assert_eq!(
            call.memoize_members_from_other(scans, &[explode.clone()]),
            Err(PlannerError::ForeignMember(scans.index()))
        );
        let explodes = call.memoize_members_from_other(both, &[explode.clone()])?;
        assert_ne!(explodes, both);
        assert_eq!(call.memo().members(explodes)?, &[explode.clone()]);
        assert_eq!(call.memoize_plan(explode), explodes);

        Ok(())
    }
}
