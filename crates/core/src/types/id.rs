//! Newtype IDs for type-safe record references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different tables.

/// Define an `i32` identity newtype for one store table.
///
/// The generated type serializes as a bare number (the snapshot `id` and
/// `clienteId` fields), orders numerically and converts to and from `i32` so
/// the generic [`Table`](crate::store::Table) can hand out identities.
///
/// Ids order by value, which matches insertion order: a table never issues
/// an identity below one it already issued.
///
/// ```rust
/// use cadastro_core::{AddressId, CustomerId};
///
/// let customer_id = CustomerId::new(1);
/// let address_id = AddressId::new(1);
/// assert_eq!(customer_id.as_i32(), i32::from(address_id));
///
/// // Same number, different tables; this does not compile:
/// // let _: CustomerId = address_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Create a new ID from an i32 value.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Get the underlying i32 value.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(UserId);
define_id!(CustomerId);
define_id!(AddressId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_order_numerically() {
        assert!(AddressId::new(2) < AddressId::new(10));
        assert_eq!(CustomerId::new(7).max(CustomerId::new(3)), CustomerId::new(7));
    }

    #[test]
    fn test_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&CustomerId::new(42)).unwrap();
        assert_eq!(json, "42");

        let parsed: CustomerId = serde_json::from_str("42").unwrap();
        assert_eq!(parsed.as_i32(), 42);
    }

    #[test]
    fn test_display() {
        assert_eq!(UserId::new(5).to_string(), "5");
    }
}
