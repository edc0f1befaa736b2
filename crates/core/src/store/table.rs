//! A single in-memory table with auto-increment identity.

use std::collections::BTreeMap;
use std::fmt;

use super::{StoreError, TableName};

/// A row type that can live in a [`Table`].
pub trait Record: Clone {
    /// Identity type, ordered by insertion.
    type Id: Copy + Ord + fmt::Debug + fmt::Display + From<i32> + Into<i32>;

    /// Table this record belongs to, used in error messages.
    const TABLE: TableName;

    /// The record's identity.
    fn id(&self) -> Self::Id;

    /// Value that must be unique across the table, if any.
    fn unique_key(&self) -> Option<UniqueKey<'_>> {
        None
    }
}

/// A named value covered by a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniqueKey<'a> {
    pub field: &'static str,
    pub value: &'a str,
}

/// Rows keyed by identity.
///
/// Iteration and queries always return rows in ascending id order, which is
/// also insertion order. Identity values start at 1 and are never handed out
/// twice, even after deletion.
///
/// The counter is wider than the ids so it can sit one past `i32::MAX`; a
/// table in that state refuses further inserts.
#[derive(Debug, Clone)]
pub struct Table<R: Record> {
    rows: BTreeMap<R::Id, R>,
    next_id: i64,
}

impl<R: Record> Default for Table<R> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<R: Record> Table<R> {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Identity the next insert will receive.
    #[must_use]
    pub const fn next_id(&self) -> i64 {
        self.next_id
    }

    #[must_use]
    pub fn get(&self, id: R::Id) -> Option<&R> {
        self.rows.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: R::Id) -> bool {
        self.rows.contains_key(&id)
    }

    /// All rows in id order.
    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.rows.values()
    }

    /// Rows matching `predicate`, in id order.
    pub fn query(&self, predicate: impl Fn(&R) -> bool) -> Vec<&R> {
        self.rows.values().filter(|r| predicate(r)).collect()
    }

    /// First row (lowest id) matching `predicate`.
    pub fn find(&self, predicate: impl Fn(&R) -> bool) -> Option<&R> {
        self.rows.values().find(|r| predicate(r))
    }

    /// Insert a new row built from its assigned identity.
    ///
    /// `build` must return a record carrying the id it was given.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateKey`] if the record's unique key is
    /// already taken, [`StoreError::IdExhausted`] once every `i32` identity
    /// has been issued and [`StoreError::DuplicateId`] if the counter points
    /// at an existing row. The table and its identity counter are left
    /// unchanged on error.
    pub fn insert_with(&mut self, build: impl FnOnce(R::Id) -> R) -> Result<R::Id, StoreError> {
        let raw = i32::try_from(self.next_id)
            .map_err(|_| StoreError::IdExhausted { table: R::TABLE })?;
        let id = R::Id::from(raw);
        if self.rows.contains_key(&id) {
            return Err(StoreError::DuplicateId {
                table: R::TABLE,
                id: raw,
            });
        }

        let record = build(id);
        debug_assert!(record.id() == id, "record must carry its assigned id");

        self.check_unique(&record, None)?;
        self.rows.insert(id, record);
        self.next_id = i64::from(raw) + 1;
        Ok(id)
    }

    /// Apply `patch` to the row with the given id.
    ///
    /// The patch runs on a copy; the row is only replaced if the result still
    /// satisfies the uniqueness constraint. Patches must not change the id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id and
    /// [`StoreError::DuplicateKey`] if the patched row collides with another.
    pub fn update(&mut self, id: R::Id, patch: impl FnOnce(&mut R)) -> Result<(), StoreError> {
        let mut updated = self
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))?;
        patch(&mut updated);
        debug_assert!(updated.id() == id, "patches must not change the id");

        self.check_unique(&updated, Some(id))?;
        self.rows.insert(id, updated);
        Ok(())
    }

    /// Remove and return the row with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id.
    pub fn delete(&mut self, id: R::Id) -> Result<R, StoreError> {
        self.rows.remove(&id).ok_or_else(|| Self::not_found(id))
    }

    /// Build a table from existing rows, keeping their identities.
    ///
    /// The identity counter resumes after the highest loaded id, but never
    /// below `floor`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateId`] or [`StoreError::DuplicateKey`] if
    /// the rows conflict with each other.
    pub fn load(records: impl IntoIterator<Item = R>, floor: i64) -> Result<Self, StoreError> {
        let mut table = Self {
            rows: BTreeMap::new(),
            next_id: floor,
        };

        for record in records {
            let id = record.id();
            let raw: i32 = id.into();
            if table.rows.contains_key(&id) {
                return Err(StoreError::DuplicateId {
                    table: R::TABLE,
                    id: raw,
                });
            }
            table.check_unique(&record, None)?;
            table.next_id = table.next_id.max(i64::from(raw) + 1);
            table.rows.insert(id, record);
        }

        Ok(table)
    }

    fn check_unique(&self, record: &R, except: Option<R::Id>) -> Result<(), StoreError> {
        let Some(key) = record.unique_key() else {
            return Ok(());
        };

        let taken = self.rows.values().any(|other| {
            Some(other.id()) != except
                && other.unique_key().is_some_and(|k| k.value == key.value)
        });

        if taken {
            return Err(StoreError::DuplicateKey {
                table: R::TABLE,
                field: key.field,
                value: key.value.to_owned(),
            });
        }
        Ok(())
    }

    fn not_found(id: R::Id) -> StoreError {
        StoreError::NotFound {
            table: R::TABLE,
            id: id.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::types::UserId;

    fn user(id: UserId, username: &str) -> User {
        User {
            id,
            name: username.to_uppercase(),
            username: username.to_owned(),
            password: "pw".to_owned(),
        }
    }

    #[test]
    fn test_insert_assigns_increasing_ids() {
        let mut table = Table::new();
        let a = table.insert_with(|id| user(id, "ana")).unwrap();
        let b = table.insert_with(|id| user(id, "bia")).unwrap();

        assert_eq!(a, UserId::new(1));
        assert_eq!(b, UserId::new(2));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let mut table = Table::new();
        let a = table.insert_with(|id| user(id, "ana")).unwrap();
        table.delete(a).unwrap();
        let b = table.insert_with(|id| user(id, "bia")).unwrap();

        assert_eq!(b, UserId::new(2));
    }

    #[test]
    fn test_duplicate_insert_leaves_table_unchanged() {
        let mut table = Table::new();
        table.insert_with(|id| user(id, "ana")).unwrap();

        let err = table.insert_with(|id| user(id, "ana")).unwrap_err();
        assert_eq!(
            err,
            StoreError::DuplicateKey {
                table: TableName::Users,
                field: "usuario",
                value: "ana".to_owned(),
            }
        );
        assert_eq!(table.len(), 1);
        assert_eq!(table.next_id(), 2);
    }

    #[test]
    fn test_update_checks_uniqueness_against_others_only() {
        let mut table = Table::new();
        let a = table.insert_with(|id| user(id, "ana")).unwrap();
        table.insert_with(|id| user(id, "bia")).unwrap();

        table.update(a, |u| u.name = "Ana Maria".to_owned()).unwrap();
        assert_eq!(table.get(a).unwrap().name, "Ana Maria");

        let err = table.update(a, |u| u.username = "bia".to_owned()).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));
        assert_eq!(table.get(a).unwrap().username, "ana");
    }

    #[test]
    fn test_missing_ids() {
        let mut table: Table<User> = Table::new();
        assert!(matches!(
            table.update(UserId::new(9), |_| {}),
            Err(StoreError::NotFound { id: 9, .. })
        ));
        assert!(matches!(
            table.delete(UserId::new(9)),
            Err(StoreError::NotFound { id: 9, .. })
        ));
    }

    #[test]
    fn test_query_is_ordered_by_id() {
        let mut table = Table::new();
        for name in ["carla", "ana", "bia"] {
            table.insert_with(|id| user(id, name)).unwrap();
        }

        let names: Vec<_> = table
            .query(|u| u.username != "ana")
            .into_iter()
            .map(|u| u.username.as_str())
            .collect();
        assert_eq!(names, ["carla", "bia"]);
        assert_eq!(table.find(|_| true).unwrap().username, "carla");
    }

    #[test]
    fn test_load_keeps_ids_and_resumes_counter() {
        let table = Table::load(
            vec![user(UserId::new(7), "ana"), user(UserId::new(3), "bia")],
            1,
        )
        .unwrap();

        assert!(table.contains(UserId::new(7)));
        assert!(table.contains(UserId::new(3)));
        assert_eq!(table.next_id(), 8);

        let table = Table::load(vec![user(UserId::new(2), "ana")], 20).unwrap();
        assert_eq!(table.next_id(), 20);
    }

    #[test]
    fn test_load_accepts_highest_id_and_blocks_further_inserts() {
        let mut table = Table::load(vec![user(UserId::new(i32::MAX), "ana")], 1).unwrap();
        assert_eq!(table.next_id(), i64::from(i32::MAX) + 1);

        let err = table.insert_with(|id| user(id, "bia")).unwrap_err();
        assert_eq!(
            err,
            StoreError::IdExhausted {
                table: TableName::Users
            }
        );
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(UserId::new(i32::MAX)).unwrap().username, "ana");
    }

    #[test]
    fn test_insert_never_replaces_an_existing_row() {
        let mut table = Table::load(vec![user(UserId::new(5), "ana")], 1).unwrap();
        table.next_id = 5;

        let err = table.insert_with(|id| user(id, "bia")).unwrap_err();
        assert_eq!(
            err,
            StoreError::DuplicateId {
                table: TableName::Users,
                id: 5
            }
        );
        assert_eq!(table.get(UserId::new(5)).unwrap().username, "ana");
    }

    #[test]
    fn test_load_rejects_conflicts() {
        let duplicate_id = Table::load(
            vec![user(UserId::new(1), "ana"), user(UserId::new(1), "bia")],
            1,
        );
        assert!(matches!(
            duplicate_id,
            Err(StoreError::DuplicateId { id: 1, .. })
        ));

        let duplicate_key = Table::load(
            vec![user(UserId::new(1), "ana"), user(UserId::new(2), "ana")],
            1,
        );
        assert!(matches!(
            duplicate_key,
            Err(StoreError::DuplicateKey { .. })
        ));
    }
}
