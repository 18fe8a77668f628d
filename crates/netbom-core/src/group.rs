//! Grouping of equivalent components
//!
//! Components that an [`Equivalence`] policy considers "the same part" are
//! collected into one [`ComponentGroup`]. Groups keep discovery order, and
//! members keep their input order, so a sorted input yields a sorted BOM.

use std::collections::HashSet;

use tracing::debug;

use crate::{BomError, Component};

/// Decides whether two components belong on the same BOM line
pub trait Equivalence {
    fn equivalent(&self, a: &Component, b: &Component) -> bool;
}

impl<F> Equivalence for F
where
    F: Fn(&Component, &Component) -> bool,
{
    fn equivalent(&self, a: &Component, b: &Component) -> bool {
        self(a, b)
    }
}

/// Value, part name, footprint and DNP flag must all match
#[derive(Clone, Copy, Debug, Default)]
pub struct PartEquivalence;

impl Equivalence for PartEquivalence {
    fn equivalent(&self, a: &Component, b: &Component) -> bool {
        a.equivalence_key() == b.equivalence_key()
    }
}

/// A non-empty, ordered set of equivalent components
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentGroup {
    members: Vec<Component>,
}

impl ComponentGroup {
    fn start(first: Component) -> Self {
        Self {
            members: vec![first],
        }
    }

    /// The first member; every other member is equivalent to it
    pub fn representative(&self) -> &Component {
        &self.members[0]
    }

    pub fn members(&self) -> &[Component] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Never true for a group built by grouping or `try_from`
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Reference designators in member order
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|c| c.reference.as_str())
    }

    /// First non-empty value of a field across the members
    pub fn first_non_empty<'a>(&'a self, field: impl Fn(&'a Component) -> &'a str) -> &'a str {
        self.members
            .iter()
            .map(field)
            .find(|v| !v.is_empty())
            .unwrap_or("")
    }
}

impl TryFrom<Vec<Component>> for ComponentGroup {
    type Error = BomError;

    fn try_from(members: Vec<Component>) -> Result<Self, Self::Error> {
        if members.is_empty() {
            return Err(BomError::EmptyGroup);
        }
        Ok(Self { members })
    }
}

/// Partition components into groups of equivalent parts.
///
/// Each component joins the first existing group whose representative the
/// policy accepts, otherwise it starts a new group. Reference designators
/// must be unique.
pub fn group_components<I, E>(components: I, policy: &E) -> Result<Vec<ComponentGroup>, BomError>
where
    I: IntoIterator<Item = Component>,
    E: Equivalence + ?Sized,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut groups: Vec<ComponentGroup> = Vec::new();
    let mut total = 0usize;

    for component in components {
        if !seen.insert(component.reference.clone()) {
            return Err(BomError::DuplicateReference(component.reference));
        }
        total += 1;

        match groups
            .iter_mut()
            .find(|g| policy.equivalent(g.representative(), &component))
        {
            Some(group) => group.members.push(component),
            None => groups.push(ComponentGroup::start(component)),
        }
    }

    debug!(components = total, groups = groups.len(), "grouped components");
    Ok(groups)
}
