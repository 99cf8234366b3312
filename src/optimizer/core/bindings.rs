use crate::errors::PlannerError;
use crate::optimizer::core::partition::PlanPartition;
use crate::planner::quantifier::Quantifier;
use crate::planner::RelationalExpression;
use std::collections::BTreeMap;
use std::marker::PhantomData;

/// Anything a matcher can bind to a key.
#[derive(Debug, Clone, PartialEq)]
pub enum Bindable {
    Expression(RelationalExpression),
    Quantifier(Quantifier),
    Partition(PlanPartition),
}

/// Types that can be read back out of a [`Bindable`].
pub trait FromBindable: Sized {
    fn from_bindable(bindable: &Bindable) -> Option<&Self>;
}

impl FromBindable for RelationalExpression {
    fn from_bindable(bindable: &Bindable) -> Option<&Self> {
        match bindable {
            Bindable::Expression(expression) => Some(expression),
            _ => None,
        }
    }
}

impl FromBindable for Quantifier {
    fn from_bindable(bindable: &Bindable) -> Option<&Self> {
        match bindable {
            Bindable::Quantifier(quantifier) => Some(quantifier),
            _ => None,
        }
    }
}

impl FromBindable for PlanPartition {
    fn from_bindable(bindable: &Bindable) -> Option<&Self> {
        match bindable {
            Bindable::Partition(partition) => Some(partition),
            _ => None,
        }
    }
}

/// Typed name of a pattern variable.
#[derive(Debug)]
pub struct BindingKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> BindingKey<T> {
    pub const fn new(name: &'static str) -> Self {
        BindingKey {
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for BindingKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for BindingKey<T> {}

/// The result of one successful match: pattern variable -> bound value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlannerBindings {
    bindings: BTreeMap<&'static str, Bindable>,
}

impl PlannerBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of(key: &'static str, bindable: Bindable) -> Self {
        let mut bindings = Self::new();
        bindings.bindings.insert(key, bindable);
        bindings
    }

    pub fn merged_with(mut self, other: PlannerBindings) -> Self {
        self.bindings.extend(other.bindings);
        self
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.bindings.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.bindings.keys().copied()
    }

    pub fn get<T: FromBindable>(&self, key: &BindingKey<T>) -> Result<&T, PlannerError> {
        let bindable = self
            .bindings
            .get(key.name)
            .ok_or(PlannerError::NoSuchBinding(key.name))?;

        T::from_bindable(bindable).ok_or(PlannerError::BindingTypeMismatch(key.name))
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::PlannerError;
    use crate::optimizer::core::bindings::{Bindable, BindingKey, PlannerBindings};
    use crate::optimizer::core::memo::ReferenceId;
    use crate::planner::quantifier::{AliasGenerator, Quantifier};
    use crate::planner::RelationalExpression;

    const INNER: BindingKey<Quantifier> = BindingKey::new("inner");
    const INNER_AS_EXPRESSION: BindingKey<RelationalExpression> = BindingKey::new("inner");
    const MISSING: BindingKey<Quantifier> = BindingKey::new("missing");

    #[test]
    fn test_get() -> Result<(), PlannerError> {
        let quantifier =
            Quantifier::for_each(AliasGenerator::default().next_alias(), ReferenceId::new(0));
        let bindings = PlannerBindings::of("inner", Bindable::Quantifier(quantifier.clone()));

        assert_eq!(bindings.get(&INNER)?, &quantifier);
        assert_eq!(
            bindings.get(&MISSING),
            Err(PlannerError::NoSuchBinding("missing"))
        );
        assert_eq!(
            bindings.get(&INNER_AS_EXPRESSION),
            Err(PlannerError::BindingTypeMismatch("inner"))
        );

        Ok(())
    }
}
