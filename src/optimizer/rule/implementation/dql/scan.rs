use crate::errors::PlannerError;
use crate::optimizer::core::bindings::BindingKey;
use crate::optimizer::core::pattern::{scan_expression, BindingMatcher, ExpressionMatcher};
use crate::optimizer::core::rule::{CascadesRule, MatchPattern, RuleCall};
use crate::planner::operator::{Operator, PhysicalOperator};
use crate::planner::RelationalExpression;
use crate::single_mapping;
use std::sync::LazyLock;

const SCAN: BindingKey<RelationalExpression> = BindingKey::new("scan");

static SCAN_PATTERN: LazyLock<ExpressionMatcher> = LazyLock::new(|| scan_expression(SCAN));

pub struct ScanImplementation;

single_mapping!(ScanImplementation, "ImplementScan", SCAN_PATTERN, SCAN, Scan);
