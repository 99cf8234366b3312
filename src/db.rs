use crate::catalog::{RecordDescriptorRef, SchemaCatalog};
use crate::errors::PlannerError;
use crate::execution::cursor::ResultCursor;
use crate::execution::{execute, Bindings};
use crate::expression::Predicate;
use crate::optimizer::cascades::batch::{CascadesBatch, CascadesBatchStrategy};
use crate::optimizer::cascades::optimizer::{CascadesOptimizer, DEFAULT_MAX_FIRINGS};
use crate::optimizer::core::cost::{CostModel, DefaultCostModel};
use crate::optimizer::core::memo::{Memo, ReferenceId};
use crate::optimizer::rule::implementation::ImplementationRuleImpl;
use crate::optimizer::rule::normalization::NormalizationRuleImpl;
use crate::optimizer::rule::RuleImpl;
use crate::planner::graph_expansion::GraphExpansion;
use crate::planner::operator::delete::DeleteOperator;
use crate::planner::operator::scan::ScanOperator;
use crate::planner::operator::select::SelectOperator;
use crate::planner::operator::Operator;
use crate::planner::predicate::BoundPredicate;
use crate::planner::quantifier::Quantifier;
use crate::planner::{PhysicalPlan, RelationalExpression};
use crate::storage::memory::InMemoryStorage;
use crate::storage::Storage;
use crate::types::RecordRef;
use crate::util::hash_utils::{PlanHashMode, PlanHashable};
use itertools::Itertools;
use std::sync::Arc;
use tracing::debug;

/// Knobs of one planning pass. Passed by value to every [`Database`] call,
/// never read from process-wide state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerConfig {
    exploration: CascadesBatchStrategy,
    implementation: CascadesBatchStrategy,
    max_firings: usize,
    plan_hash_mode: PlanHashMode,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            exploration: CascadesBatchStrategy::fix_point_topdown(10),
            implementation: CascadesBatchStrategy::fix_point_bottomup(10),
            max_firings: DEFAULT_MAX_FIRINGS,
            plan_hash_mode: PlanHashMode::default(),
        }
    }
}

impl PlannerConfig {
    pub fn exploration(mut self, strategy: CascadesBatchStrategy) -> Self {
        self.exploration = strategy;
        self
    }

    pub fn implementation(mut self, strategy: CascadesBatchStrategy) -> Self {
        self.implementation = strategy;
        self
    }

    pub fn max_firings(mut self, max_firings: usize) -> Self {
        self.max_firings = max_firings;
        self
    }

    pub fn plan_hash_mode(mut self, mode: PlanHashMode) -> Self {
        self.plan_hash_mode = mode;
        self
    }
}

/// Records of `record_type` on which `filter` holds. No filter means every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
    pub record_type: String,
    pub filter: Option<Predicate>,
}

impl RecordQuery {
    pub fn new(record_type: impl Into<String>) -> Self {
        RecordQuery {
            record_type: record_type.into(),
            filter: None,
        }
    }

    pub fn filter(mut self, filter: Predicate) -> Self {
        self.filter = Some(filter);
        self
    }
}

pub struct DataBaseBuilder {
    record_types: Vec<RecordDescriptorRef>,
    indexes: Vec<(String, String, Vec<String>)>,
    config: PlannerConfig,
    cost_model: Arc<dyn CostModel>,
}

impl Default for DataBaseBuilder {
    fn default() -> Self {
        DataBaseBuilder {
            record_types: vec![],
            indexes: vec![],
            config: PlannerConfig::default(),
            cost_model: Arc::new(DefaultCostModel),
        }
    }
}

impl DataBaseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_record_type(mut self, descriptor: RecordDescriptorRef) -> Self {
        self.record_types.push(descriptor);
        self
    }

    /// A value index over `path`, read from records of `record_type`.
    pub fn register_index(
        mut self,
        name: impl Into<String>,
        record_type: impl Into<String>,
        path: Vec<String>,
    ) -> Self {
        self.indexes.push((name.into(), record_type.into(), path));
        self
    }

    pub fn config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    /// Picks among the physical plans of a query. [`DefaultCostModel`] unless set.
    pub fn cost_model(mut self, cost_model: Arc<dyn CostModel>) -> Self {
        self.cost_model = cost_model;
        self
    }

    pub fn build(self) -> Result<Database<InMemoryStorage>, PlannerError> {
        self.build_with_storage(InMemoryStorage::new())
    }

    pub fn build_with_storage<S: Storage>(self, storage: S) -> Result<Database<S>, PlannerError> {
        let mut catalog = SchemaCatalog::new();

        for descriptor in self.record_types {
            catalog.add_record_type(descriptor)?;
        }
        for (name, record_type, path) in self.indexes {
            catalog.add_index(name, &record_type, path)?;
        }

        Ok(Database {
            storage,
            catalog,
            config: self.config,
            cost_model: self.cost_model,
        })
    }
}

pub struct Database<S: Storage> {
    pub(crate) storage: S,
    catalog: SchemaCatalog,
    config: PlannerConfig,
    cost_model: Arc<dyn CostModel>,
}

impl<S: Storage> Database<S> {
    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn insert(&self, record: RecordRef) -> Result<(), PlannerError> {
        self.catalog.record_type(record.record_type())?;

        self.storage.insert(record)
    }

    /// Records matching `query`.
    pub fn run(&self, query: &RecordQuery) -> Result<ResultCursor, PlannerError> {
        self.run_from(query, 0)
    }

    /// Records matching `query`, resuming after the first `position` of them.
    pub fn run_from(
        &self,
        query: &RecordQuery,
        position: usize,
    ) -> Result<ResultCursor, PlannerError> {
        let plan = self.build_plan(query, false)?;
        let rows = execute(&plan, &self.storage, &Bindings::default())?;

        Ok(ResultCursor::new(
            rows.into_iter().skip(position).collect_vec(),
            plan.plan_hash(self.config.plan_hash_mode),
        )
        .starting_at(position))
    }

    /// Deletes the records matching `query` and returns how many were removed.
    pub fn delete(&self, query: &RecordQuery) -> Result<usize, PlannerError> {
        let plan = self.build_plan(query, true)?;

        Ok(execute(&plan, &self.storage, &Bindings::default())?.len())
    }

    /// The chosen plan, one operator per line.
    pub fn explain(&self, query: &RecordQuery) -> Result<String, PlannerError> {
        Ok(self.build_plan(query, false)?.explain(0))
    }

    pub(crate) fn build_plan(
        &self,
        query: &RecordQuery,
        delete: bool,
    ) -> Result<PhysicalPlan, PlannerError> {
        let descriptor = self.catalog.record_type(&query.record_type)?;
        if let Some(filter) = &query.filter {
            filter.validate(descriptor)?;
        }

        let mut memo = Memo::new();
        let mut root = self.source_of(&mut memo, query);
        if delete {
            let inner = Quantifier::for_each(memo.new_alias(), root);

            root = memo.initial_of(RelationalExpression::Logical(Operator::Delete(
                DeleteOperator {
                    inner,
                    record_type: query.record_type.clone(),
                },
            )));
        }

        let mut optimizer = self.default_optimizer(memo, root, &query.record_type);
        let best_plan = optimizer.find_best(self.cost_model.as_ref())?;
        debug!(
            record_type = query.record_type.as_str(),
            firings = optimizer.firings(),
            "best plan:\n{}",
            best_plan
        );

        Ok(best_plan)
    }

    /// Seeds `memo` with the logical graph of `query`:
    ///
    /// Select q1 From [q1 over r1] Where <filter>
    ///   Select q0 From [q0 over r0] Where q0 IS <record type>
    ///     Scan [<every record type>]
    fn source_of(&self, memo: &mut Memo, query: &RecordQuery) -> ReferenceId {
        let scan = memo.initial_of(RelationalExpression::Logical(Operator::Scan(
            ScanOperator::new(self.catalog.record_type_names()),
        )));
        let stored = Quantifier::for_each(memo.new_alias(), scan);
        let typed = memo.initial_of(RelationalExpression::Logical(Operator::Select(
            SelectOperator {
                quantifiers: vec![stored.clone()],
                predicates: vec![BoundPredicate::RecordType {
                    alias: stored.alias(),
                    name: query.record_type.clone(),
                }],
                result: stored.alias(),
            },
        )));
        let Some(filter) = &query.filter else {
            return typed;
        };

        let base = Quantifier::for_each(memo.new_alias(), typed);
        let outer = base.clone();
        let expansion: GraphExpansion = filter.expand(&base, &|| outer.clone(), &[], memo);

        memo.initial_of(RelationalExpression::Logical(Operator::Select(
            expansion.build_simple_select_over_quantifier(base),
        )))
    }

    pub(crate) fn default_optimizer(
        &self,
        memo: Memo,
        root: ReferenceId,
        record_type: &str,
    ) -> CascadesOptimizer {
        CascadesOptimizer::new(memo, root)
            .indexes(self.catalog.indexes(record_type).to_vec())
            .max_firings(self.config.max_firings)
            .batch(CascadesBatch::new(
                "Merge Selects".to_string(),
                self.config.exploration,
                vec![NormalizationRuleImpl::MergeSelects.into()],
            ))
            .batch(CascadesBatch::new(
                "Implementation".to_string(),
                self.config.implementation,
                ImplementationRuleImpl::all()
                    .into_iter()
                    .map(RuleImpl::from)
                    .collect_vec(),
            ))
    }
}
