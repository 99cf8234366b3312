/// Implements a logical operator by the physical operator of the same shape.
#[macro_export]
macro_rules! single_mapping {
    ($ty:ty, $name:expr, $pattern:expr, $key:expr, $variant:ident) => {
        impl MatchPattern for $ty {
            fn pattern(&self) -> &dyn BindingMatcher<RelationalExpression> {
                &*$pattern
            }
        }

        impl CascadesRule for $ty {
            fn name(&self) -> &'static str {
                $name
            }

            fn on_match(
                &self,
                call: &mut RuleCall<'_>,
            ) -> Result<Vec<RelationalExpression>, PlannerError> {
                match call.get(&$key)? {
                    RelationalExpression::Logical(Operator::$variant(op)) => Ok(vec![
                        RelationalExpression::Physical(PhysicalOperator::$variant(op.clone())),
                    ]),
                    _ => Ok(vec![]),
                }
            }
        }
    };
}
