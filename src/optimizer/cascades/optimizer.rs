use crate::catalog::IndexRef;
use crate::errors::PlannerError;
use crate::optimizer::cascades::batch::{CascadesBatch, MatchOrder};
use crate::optimizer::core::cost::CostModel;
use crate::optimizer::core::memo::{Memo, ReferenceId};
use crate::optimizer::core::rule::{CascadesRule, MatchPattern, RuleCall};
use crate::planner::{PhysicalPlan, RelationalExpression};
use itertools::Itertools;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::{debug, trace, warn};

pub const DEFAULT_MAX_FIRINGS: usize = 10_000;

enum PassOutcome {
    Changed,
    FixedPoint,
    BudgetExhausted,
}

pub struct CascadesOptimizer {
    batches: Vec<CascadesBatch>,
    memo: Memo,
    root: ReferenceId,
    indexes: Vec<IndexRef>,
    max_firings: usize,
    firings: usize,
}

impl CascadesOptimizer {
    pub fn new(memo: Memo, root: ReferenceId) -> Self {
        Self {
            batches: vec![],
            memo,
            root,
            indexes: vec![],
            max_firings: DEFAULT_MAX_FIRINGS,
            firings: 0,
        }
    }

    pub fn batch(mut self, batch: CascadesBatch) -> Self {
        self.batches.push(batch);
        self
    }

    /// Value indexes `IndexScan` implementations may use.
    pub fn indexes(mut self, indexes: Vec<IndexRef>) -> Self {
        self.indexes = indexes;
        self
    }

    /// Upper bound on rule firings across all batches.
    pub fn max_firings(mut self, max_firings: usize) -> Self {
        self.max_firings = max_firings;
        self
    }

    pub fn memo(&self) -> &Memo {
        &self.memo
    }

    pub fn root(&self) -> ReferenceId {
        self.root
    }

    pub fn firings(&self) -> usize {
        self.firings
    }

    /// Runs every batch in order. Returns false if the firing budget ran out
    /// before the last batch finished.
    pub fn explore(&mut self) -> Result<bool, PlannerError> {
        let batches = self.batches.clone();

        for batch in batches {
            let mut iteration = 1usize;

            while iteration <= batch.strategy.max_iteration {
                match self.apply_batch(&batch)? {
                    PassOutcome::FixedPoint => {
                        debug!(
                            batch = batch.name.as_str(),
                            iteration, "reached fixed point"
                        );
                        break;
                    }
                    PassOutcome::Changed => (),
                    PassOutcome::BudgetExhausted => {
                        warn!(
                            batch = batch.name.as_str(),
                            firings = self.firings,
                            "exploration budget exhausted"
                        );
                        return Ok(false);
                    }
                }
                iteration += 1;
            }
        }

        Ok(true)
    }

    /// Explores, then extracts the cheapest physical plan of the root reference.
    /// An exhausted budget still yields a plan when the root has a physical member.
    pub fn find_best(&mut self, cost_model: &dyn CostModel) -> Result<PhysicalPlan, PlannerError> {
        self.explore()?;

        self.memo.best_plan(self.root, cost_model)
    }

    fn apply_batch(
        &mut self,
        CascadesBatch {
            rules, strategy, ..
        }: &CascadesBatch,
    ) -> Result<PassOutcome, PlannerError> {
        let before = self.memo.member_count();

        for id in self.references_in_order(strategy.match_order) {
            // members yielded while this pass runs are seen by the next one
            for member in self.memo.members_snapshot(id)? {
                for rule in rules {
                    if !self.apply_rule(rule, id, &member)? {
                        return Ok(PassOutcome::BudgetExhausted);
                    }
                }
            }
        }

        Ok(if self.memo.member_count() == before {
            PassOutcome::FixedPoint
        } else {
            PassOutcome::Changed
        })
    }

    /// Returns false when the firing budget does not allow another firing.
    fn apply_rule<R: CascadesRule + ?Sized>(
        &mut self,
        rule: &R,
        id: ReferenceId,
        member: &RelationalExpression,
    ) -> Result<bool, PlannerError> {
        let pattern = rule.pattern();
        let matches = pattern.bind_matches(&self.memo, member);
        if matches.is_empty() {
            return Ok(true);
        }
        let mut keys = Vec::new();
        pattern.keys(&mut keys);

        for bindings in matches {
            let missing = keys
                .iter()
                .filter(|key| !bindings.contains_key(key))
                .copied()
                .collect_vec();
            if !missing.is_empty() {
                return Err(PlannerError::IncompleteBindings {
                    rule: rule.name(),
                    missing,
                });
            }
            if self.firings >= self.max_firings {
                return Ok(false);
            }
            self.firings += 1;

            let mut call = RuleCall::new(id, bindings, &mut self.memo, &self.indexes);
            for expression in rule.on_match(&mut call)? {
                if self.memo.insert_or_find_equivalent(id, expression)? {
                    trace!(rule = rule.name(), reference = %id, "new member");
                }
            }
        }

        Ok(true)
    }

    fn references_in_order(&self, match_order: MatchOrder) -> Vec<ReferenceId> {
        let mut graph = DiGraphMap::<usize, ()>::new();

        for id in self.memo.reference_ids() {
            graph.add_node(id.index());
            for member in self.memo.members(id).into_iter().flatten() {
                for quantifier in member.quantifiers() {
                    graph.add_edge(id.index(), quantifier.reference().index(), ());
                }
            }
        }
        let mut order = toposort(&graph, None).unwrap_or_else(|_| graph.nodes().collect_vec());
        if match_order == MatchOrder::BottomUp {
            order.reverse();
        }

        order.into_iter().map(ReferenceId::new).collect_vec()
    }
}
