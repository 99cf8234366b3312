use crate::errors::PlannerError;
use crate::optimizer::core::cost::CostModel;
use crate::optimizer::core::partition::PlanPartition;
use crate::optimizer::core::property::PlanProperty;
use crate::planner::operator::PhysicalOperator;
use crate::planner::quantifier::{AliasGenerator, CorrelationIdentifier};
use crate::planner::{PhysicalPlan, RelationalExpression};
use ahash::{HashMap, HashMapExt, HashSet};
use itertools::Itertools;
use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Formatter;

/// Stable handle of a reference inside a [`Memo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReferenceId(usize);

impl ReferenceId {
    pub(crate) fn new(index: usize) -> Self {
        ReferenceId(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// A group of equivalent expressions. Members are only ever appended.
#[derive(Debug, Default)]
struct Reference {
    members: Vec<RelationalExpression>,
    canonicals: HashSet<RelationalExpression>,
}

/// The arena owning every reference of one optimization pass.
///
/// Equivalence is structural: two expressions are the same member when their
/// canonical forms (own aliases replaced by placeholders) are equal.
#[derive(Debug, Default)]
pub struct Memo {
    references: Vec<Reference>,
    /// canonical expression -> references holding it
    index: HashMap<RelationalExpression, Vec<ReferenceId>>,
    aliases: AliasGenerator,
}

impl Memo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_alias(&mut self) -> CorrelationIdentifier {
        self.aliases.next_alias()
    }

    pub fn reference_count(&self) -> usize {
        self.references.len()
    }

    pub fn member_count(&self) -> usize {
        self.references
            .iter()
            .map(|reference| reference.members.len())
            .sum()
    }

    pub fn reference_ids(&self) -> impl Iterator<Item = ReferenceId> {
        (0..self.references.len()).map(ReferenceId)
    }

    fn reference(&self, id: ReferenceId) -> Result<&Reference, PlannerError> {
        self.references
            .get(id.0)
            .ok_or(PlannerError::ReferenceNotFound(id.0))
    }

    /// A new reference seeded with `expression`.
    pub fn initial_of(&mut self, expression: RelationalExpression) -> ReferenceId {
        let id = ReferenceId(self.references.len());
        self.references.push(Reference::default());
        self.push_member(id, expression);
        id
    }

    /// A new reference holding `members`, deduplicated.
    pub fn from_members(
        &mut self,
        members: Vec<RelationalExpression>,
    ) -> Result<ReferenceId, PlannerError> {
        let mut members = members.into_iter();
        let first = members.next().ok_or(PlannerError::EmptyReference)?;
        let id = self.initial_of(first);

        for member in members {
            self.insert_or_find_equivalent(id, member)?;
        }
        Ok(id)
    }

    /// Adds `expression` to `id` unless an equivalent member is already there.
    /// Returns whether the reference grew.
    pub fn insert_or_find_equivalent(
        &mut self,
        id: ReferenceId,
        expression: RelationalExpression,
    ) -> Result<bool, PlannerError> {
        let canonical = expression.canonical();

        if self.reference(id)?.canonicals.contains(&canonical) {
            return Ok(false);
        }
        self.push_member(id, expression);

        Ok(true)
    }

    fn push_member(&mut self, id: ReferenceId, expression: RelationalExpression) {
        let canonical = expression.canonical();
        let reference = &mut self.references[id.0];

        reference.members.push(expression);
        reference.canonicals.insert(canonical.clone());
        self.index.entry(canonical).or_default().push(id);
    }

    /// Some reference already holding an equivalent of `expression`, or a new one.
    pub fn memoize(&mut self, expression: RelationalExpression) -> ReferenceId {
        match self.references_containing(&expression).first() {
            Some(id) => *id,
            None => self.initial_of(expression),
        }
    }

    pub fn contains(
        &self,
        id: ReferenceId,
        expression: &RelationalExpression,
    ) -> Result<bool, PlannerError> {
        Ok(self
            .reference(id)?
            .canonicals
            .contains(&expression.canonical()))
    }

    fn references_containing(&self, expression: &RelationalExpression) -> &[ReferenceId] {
        self.index
            .get(&expression.canonical())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The reference whose members are exactly `members`, if any.
    pub fn find_reference_with_members(
        &self,
        members: &[RelationalExpression],
    ) -> Option<ReferenceId> {
        let canonicals: HashSet<_> = members.iter().map(RelationalExpression::canonical).collect();
        let first = members.first()?;

        self.references_containing(first)
            .iter()
            .copied()
            .find(|id| self.references[id.0].canonicals == canonicals)
    }

    pub fn members(&self, id: ReferenceId) -> Result<&[RelationalExpression], PlannerError> {
        Ok(&self.reference(id)?.members)
    }

    /// An owned copy of the current members. Members added afterwards are not
    /// observed through it.
    pub fn members_snapshot(
        &self,
        id: ReferenceId,
    ) -> Result<Vec<RelationalExpression>, PlannerError> {
        Ok(self.members(id)?.to_vec())
    }

    pub fn physical_members(
        &self,
        id: ReferenceId,
    ) -> Result<impl Iterator<Item = &PhysicalOperator>, PlannerError> {
        Ok(self.members(id)?.iter().filter_map(|member| match member {
            RelationalExpression::Physical(op) => Some(op),
            RelationalExpression::Logical(_) => None,
        }))
    }

    /// True iff every physical member guarantees `property`. False when there
    /// are no physical members yet.
    pub fn property_value(
        &self,
        id: ReferenceId,
        property: PlanProperty,
    ) -> Result<bool, PlannerError> {
        let mut physical_members = self.physical_members(id)?.peekable();

        if physical_members.peek().is_none() {
            return Ok(false);
        }
        for op in physical_members {
            if !property.derive(self, op)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Groups the physical members of `id` by their values for `properties`.
    /// Computed from scratch on every call.
    pub fn partition_by(
        &self,
        id: ReferenceId,
        properties: &[PlanProperty],
    ) -> Result<Vec<PlanPartition>, PlannerError> {
        let mut groups: BTreeMap<Vec<bool>, Vec<RelationalExpression>> = BTreeMap::new();

        for op in self.physical_members(id)? {
            let values = properties
                .iter()
                .map(|property| property.derive(self, op))
                .collect::<Result<Vec<_>, _>>()?;

            groups
                .entry(values)
                .or_default()
                .push(RelationalExpression::Physical(op.clone()));
        }

        Ok(groups
            .into_iter()
            .map(|(values, plans)| {
                PlanPartition::new(properties.iter().copied().zip(values).collect(), plans)
            })
            .collect_vec())
    }

    /// Picks, for `root` and recursively for every reference its members range
    /// over, the physical member with the lowest cost.
    pub fn best_plan(
        &self,
        root: ReferenceId,
        cost_model: &dyn CostModel,
    ) -> Result<PhysicalPlan, PlannerError> {
        let mut best = HashMap::new();

        self.best_of(root, cost_model, &mut best)?
            .map(|(_, plan)| plan)
            .ok_or(PlannerError::NoPlanFound(root.0))
    }

    fn best_of(
        &self,
        id: ReferenceId,
        cost_model: &dyn CostModel,
        best: &mut HashMap<ReferenceId, Option<(f64, PhysicalPlan)>>,
    ) -> Result<Option<(f64, PhysicalPlan)>, PlannerError> {
        if let Some(result) = best.get(&id) {
            return Ok(result.clone());
        }
        // guards against cycles while this reference is being costed
        best.insert(id, None);

        let mut result: Option<(f64, PhysicalPlan)> = None;
        'members: for op in self.physical_members(id)? {
            let mut cost = cost_model.cost(op);
            let mut childrens = Vec::new();

            for quantifier in op.quantifiers() {
                match self.best_of(quantifier.reference(), cost_model, best)? {
                    Some((child_cost, child)) => {
                        cost += child_cost;
                        childrens.push(child);
                    }
                    None => continue 'members,
                }
            }
            if result.as_ref().map_or(true, |(best_cost, _)| cost < *best_cost) {
                result = Some((cost, PhysicalPlan::new(op.clone(), childrens)));
            }
        }
        best.insert(id, result.clone());

        Ok(result)
    }
}
