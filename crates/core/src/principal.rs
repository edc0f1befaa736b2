//! Primary-address invariant engine.
//!
//! Every customer with at least one address has exactly one address flagged
//! `principal`. The principal flag on a request is advisory: the functions here
//! decide the flag an address actually gets and which siblings must change so
//! the invariant keeps holding. They never fail and never touch the store; the
//! registry applies their decisions.
//!
//! Ties are broken by the lowest address id, i.e. the oldest address.

use std::collections::BTreeMap;

use crate::models::Address;
use crate::types::{AddressId, CustomerId};

/// Where an address lands among its siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Flag the address gets, possibly overriding the request.
    pub principal: bool,
    /// Siblings that must lose their principal flag first.
    pub demote: Vec<AddressId>,
}

/// A single flag change produced by [`repair`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagChange {
    pub address: AddressId,
    pub principal: bool,
}

/// Decide the flag of a new address given the customer's existing addresses.
///
/// - no existing address: always principal
/// - principal requested: granted, every existing principal is demoted
/// - otherwise: not principal, nothing else changes
#[must_use]
pub fn place_new(existing: &[&Address], requested: bool) -> Placement {
    if existing.is_empty() {
        return Placement {
            principal: true,
            demote: Vec::new(),
        };
    }

    if requested {
        Placement {
            principal: true,
            demote: principals(existing),
        }
    } else {
        Placement {
            principal: false,
            demote: Vec::new(),
        }
    }
}

/// Decide the flag of an edited address given its siblings (the customer's
/// other addresses).
///
/// Requesting principal demotes every principal sibling. Giving it up is only
/// honoured when some sibling is already principal; otherwise the address stays
/// principal, which also covers a customer's lone address.
#[must_use]
pub fn place_existing(siblings: &[&Address], requested: bool) -> Placement {
    if requested {
        return Placement {
            principal: true,
            demote: principals(siblings),
        };
    }

    Placement {
        principal: !siblings.iter().any(|a| a.principal),
        demote: Vec::new(),
    }
}

/// Pick the address to promote after a deletion.
///
/// `remaining` are the customer's addresses left after the delete. Returns the
/// lowest id among them when none is principal, which happens exactly when the
/// deleted address was the principal one.
#[must_use]
pub fn successor(remaining: &[&Address]) -> Option<AddressId> {
    if remaining.iter().any(|a| a.principal) {
        return None;
    }
    remaining.iter().map(|a| a.id).min()
}

/// Flag changes that restore the invariant over an arbitrary set of addresses.
///
/// For each customer: with no principal the oldest address is promoted, with
/// several principals only the oldest of them keeps the flag. Used after bulk
/// loads, which bypass the per-operation rules.
#[must_use]
pub fn repair<'a>(addresses: impl IntoIterator<Item = &'a Address>) -> Vec<FlagChange> {
    let mut changes = Vec::new();

    for group in by_customer(addresses).into_values() {
        let mut flagged = group.iter().filter(|a| a.principal);
        match flagged.next() {
            None => {
                if let Some(oldest) = group.first() {
                    changes.push(FlagChange {
                        address: oldest.id,
                        principal: true,
                    });
                }
            }
            Some(_) => changes.extend(flagged.map(|a| FlagChange {
                address: a.id,
                principal: false,
            })),
        }
    }

    changes
}

/// Customers whose addresses break the invariant, in id order.
#[must_use]
pub fn violations<'a>(addresses: impl IntoIterator<Item = &'a Address>) -> Vec<CustomerId> {
    by_customer(addresses)
        .into_iter()
        .filter(|(_, group)| group.iter().filter(|a| a.principal).count() != 1)
        .map(|(customer, _)| customer)
        .collect()
}

fn principals(addresses: &[&Address]) -> Vec<AddressId> {
    addresses
        .iter()
        .filter(|a| a.principal)
        .map(|a| a.id)
        .collect()
}

/// Group addresses by customer, each group sorted by address id.
fn by_customer<'a>(
    addresses: impl IntoIterator<Item = &'a Address>,
) -> BTreeMap<CustomerId, Vec<&'a Address>> {
    let mut groups: BTreeMap<CustomerId, Vec<&Address>> = BTreeMap::new();
    for address in addresses {
        groups.entry(address.customer_id).or_default().push(address);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|a| a.id);
    }
    groups
}
