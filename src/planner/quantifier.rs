use crate::optimizer::core::memo::ReferenceId;
use std::fmt;
use std::fmt::Formatter;

/// The name a quantifier binds its rows to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CorrelationIdentifier(u32);

impl CorrelationIdentifier {
    /// Positional stand-ins used when comparing expressions modulo their own aliases.
    pub(crate) fn placeholder(position: usize) -> Self {
        CorrelationIdentifier(u32::MAX - position as u32)
    }
}

impl fmt::Display for CorrelationIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0 > u32::MAX / 2 {
            write!(f, "_{}", u32::MAX - self.0)
        } else {
            write!(f, "q{}", self.0)
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct AliasGenerator {
    next: u32,
}

impl AliasGenerator {
    pub fn next_alias(&mut self) -> CorrelationIdentifier {
        let alias = CorrelationIdentifier(self.next);
        self.next += 1;
        alias
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuantifierKind {
    /// Iterates every row of the ranged-over reference.
    ForEach,
    /// True iff the ranged-over reference produces at least one row.
    Existential,
    /// A for-each over a reference that only holds physical plans.
    Physical,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Quantifier {
    pub(crate) alias: CorrelationIdentifier,
    pub(crate) kind: QuantifierKind,
    pub(crate) reference: ReferenceId,
}

impl Quantifier {
    pub fn for_each(alias: CorrelationIdentifier, reference: ReferenceId) -> Self {
        Quantifier {
            alias,
            kind: QuantifierKind::ForEach,
            reference,
        }
    }

    pub fn existential(alias: CorrelationIdentifier, reference: ReferenceId) -> Self {
        Quantifier {
            alias,
            kind: QuantifierKind::Existential,
            reference,
        }
    }

    pub fn physical(alias: CorrelationIdentifier, reference: ReferenceId) -> Self {
        Quantifier {
            alias,
            kind: QuantifierKind::Physical,
            reference,
        }
    }

    /// A physical quantifier keeping this quantifier's alias, ranging over `reference`.
    pub fn morph_physical(&self, reference: ReferenceId) -> Self {
        Quantifier::physical(self.alias, reference)
    }

    /// Same kind and alias, ranging over `reference`.
    pub fn with_reference(&self, reference: ReferenceId) -> Self {
        Quantifier {
            alias: self.alias,
            kind: self.kind,
            reference,
        }
    }

    pub fn alias(&self) -> CorrelationIdentifier {
        self.alias
    }

    pub fn kind(&self) -> QuantifierKind {
        self.kind
    }

    pub fn reference(&self) -> ReferenceId {
        self.reference
    }

    pub fn is_for_each(&self) -> bool {
        matches!(self.kind, QuantifierKind::ForEach | QuantifierKind::Physical)
    }

    pub fn is_existential(&self) -> bool {
        self.kind == QuantifierKind::Existential
    }
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            QuantifierKind::ForEach => "ForEach",
            QuantifierKind::Existential => "Existential",
            QuantifierKind::Physical => "Physical",
        };
        write!(f, "{}({} over {})", kind, self.alias, self.reference)
    }
}
