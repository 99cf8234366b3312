use crate::optimizer::rule::RuleImpl;

/// A batch of rules.
#[derive(Debug, Clone)]
pub struct CascadesBatch {
    pub name: String,
    pub strategy: CascadesBatchStrategy,
    pub rules: Vec<RuleImpl>,
}

impl CascadesBatch {
    pub fn new(name: String, strategy: CascadesBatchStrategy, rules: Vec<RuleImpl>) -> Self {
        Self {
            name,
            strategy,
            rules,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadesBatchStrategy {
    /// The maximum number of passes over the memo. A batch stops earlier once a
    /// pass adds no member to any reference (fixed point).
    pub max_iteration: usize,
    /// An order to visit the references in.
    pub match_order: MatchOrder,
}

impl CascadesBatchStrategy {
    pub fn once_topdown() -> Self {
        CascadesBatchStrategy {
            max_iteration: 1,
            match_order: MatchOrder::TopDown,
        }
    }

    pub fn fix_point_topdown(max_iteration: usize) -> Self {
        CascadesBatchStrategy {
            max_iteration,
            match_order: MatchOrder::TopDown,
        }
    }

    pub fn fix_point_bottomup(max_iteration: usize) -> Self {
        CascadesBatchStrategy {
            max_iteration,
            match_order: MatchOrder::BottomUp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOrder {
    /// A reference is visited before every reference its members range over.
    TopDown,
    /// A reference is visited after every reference its members range over.
    BottomUp,
}
