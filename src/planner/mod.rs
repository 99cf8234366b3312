pub mod graph_expansion;
pub mod operator;
pub mod predicate;
pub mod quantifier;

use crate::planner::operator::{AliasTranslation, Operator, PhysicalOperator};
use crate::planner::quantifier::{CorrelationIdentifier, Quantifier};
use crate::util::hash_utils::{hash_node, stable_hash, PlanHashMode, PlanHashable};
use std::fmt;
use std::fmt::Formatter;

/// A member of a reference: either a logical operator still open to
/// exploration, or a physical operator that can be executed.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum RelationalExpression {
    Logical(Operator),
    Physical(PhysicalOperator),
}

impl RelationalExpression {
    pub fn is_physical(&self) -> bool {
        matches!(self, RelationalExpression::Physical(_))
    }

    pub fn quantifiers(&self) -> Vec<&Quantifier> {
        match self {
            RelationalExpression::Logical(op) => op.quantifiers(),
            RelationalExpression::Physical(op) => op.quantifiers(),
        }
    }

    pub(crate) fn rebase(&self, translation: &AliasTranslation) -> RelationalExpression {
        match self {
            RelationalExpression::Logical(op) => RelationalExpression::Logical(op.rebase(translation)),
            RelationalExpression::Physical(op) => {
                RelationalExpression::Physical(op.rebase(translation))
            }
        }
    }

    /// The same expression with its own quantifier aliases replaced by positional
    /// placeholders. Two expressions are equivalent iff their canonical forms are
    /// equal: same operator shape over the same references, modulo alias naming.
    /// Correlations to aliases bound outside the expression are kept as is.
    pub fn canonical(&self) -> RelationalExpression {
        let translation: AliasTranslation = self
            .quantifiers()
            .into_iter()
            .enumerate()
            .map(|(position, quantifier)| {
                (quantifier.alias, CorrelationIdentifier::placeholder(position))
            })
            .collect();

        if translation.is_empty() {
            self.clone()
        } else {
            self.rebase(&translation)
        }
    }

    pub fn semantic_equals(&self, other: &RelationalExpression) -> bool {
        self.canonical() == other.canonical()
    }
}

impl From<Operator> for RelationalExpression {
    fn from(op: Operator) -> Self {
        RelationalExpression::Logical(op)
    }
}

impl From<PhysicalOperator> for RelationalExpression {
    fn from(op: PhysicalOperator) -> Self {
        RelationalExpression::Physical(op)
    }
}

impl fmt::Display for RelationalExpression {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            RelationalExpression::Logical(op) => write!(f, "{}", op),
            RelationalExpression::Physical(op) => write!(f, "{}", op),
        }
    }
}

/// A fully chosen plan extracted from the memo. `childrens` line up with
/// `operator.quantifiers()`.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct PhysicalPlan {
    pub(crate) operator: PhysicalOperator,
    pub(crate) childrens: Vec<PhysicalPlan>,
}

impl PhysicalPlan {
    pub fn new(operator: PhysicalOperator, childrens: Vec<PhysicalPlan>) -> Self {
        PhysicalPlan {
            operator,
            childrens,
        }
    }

    pub fn operator(&self) -> &PhysicalOperator {
        &self.operator
    }

    pub fn childrens(&self) -> &[PhysicalPlan] {
        &self.childrens
    }

    pub fn explain(&self, indentation: usize) -> String {
        let mut result = format!("{:indent$}{}", "", self.operator, indent = indentation);

        for child in &self.childrens {
            result.push('\n');
            result.push_str(&child.explain(indentation + 2));
        }

        result
    }

    /// Pre-order list of operator names, handy for asserting plan shapes.
    pub fn operator_names(&self) -> Vec<&'static str> {
        fn collect(plan: &PhysicalPlan, names: &mut Vec<&'static str>) {
            names.push(match plan.operator {
                PhysicalOperator::Scan(_) => "Scan",
                PhysicalOperator::IndexScan(_) => "IndexScan",
                PhysicalOperator::Explode(_) => "Explode",
                PhysicalOperator::Filter(_) => "Filter",
                PhysicalOperator::UnorderedPrimaryKeyDistinct(_) => "UnorderedPrimaryKeyDistinct",
                PhysicalOperator::Delete(_) => "Delete",
            });
            for child in &plan.childrens {
                collect(child, names);
            }
        }
        let mut names = Vec::new();
        collect(self, &mut names);
        names
    }
}

impl PlanHashable for PhysicalPlan {
    fn plan_hash(&self, mode: PlanHashMode) -> u64 {
        let (kind, own) = match &self.operator {
            PhysicalOperator::Scan(op) => ("Scan", vec![stable_hash(&op.record_types)]),
            PhysicalOperator::IndexScan(op) => (
                "IndexScan",
                vec![stable_hash(op.index.name()), stable_hash(&op.key.to_string())],
            ),
            PhysicalOperator::Explode(op) => ("Explode", vec![stable_hash(&op.path)]),
            PhysicalOperator::Filter(op) => (
                "Filter",
                op.predicates
                    .iter()
                    .map(|predicate| predicate.plan_hash(mode))
                    .collect(),
            ),
            PhysicalOperator::UnorderedPrimaryKeyDistinct(_) => {
                ("UnorderedPrimaryKeyDistinct", vec![])
            }
            PhysicalOperator::Delete(op) => ("Delete", vec![stable_hash(&op.record_type)]),
        };

        hash_node(
            mode,
            kind,
            own.into_iter()
                .chain(self.childrens.iter().map(|child| child.plan_hash(mode))),
        )
    }
}

impl fmt::Display for PhysicalPlan {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.explain(0))
    }
}
