use crate::errors::PlannerError;
use crate::optimizer::core::bindings::BindingKey;
use crate::optimizer::core::pattern::{explode_expression, BindingMatcher, ExpressionMatcher};
use crate::optimizer::core::rule::{CascadesRule, MatchPattern, RuleCall};
use crate::planner::operator::{Operator, PhysicalOperator};
use crate::planner::RelationalExpression;
use crate::single_mapping;
use std::sync::LazyLock;

const EXPLODE: BindingKey<RelationalExpression> = BindingKey::new("explode");

static EXPLODE_PATTERN: LazyLock<ExpressionMatcher> =
    LazyLock::new(|| explode_expression(EXPLODE));

pub struct ExplodeImplementation;

single_mapping!(
    ExplodeImplementation,
    "ImplementExplode",
    EXPLODE_PATTERN,
    EXPLODE,
    Explode
);
