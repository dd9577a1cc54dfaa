//! Numeric identifiers.
//!
//! The catalog addresses products by integer id, and cart lines carry the
//! same id alongside an integer amount. Wrapping ids in their own type keeps
//! the two from being swapped at call sites.

/// Declare an `i32`-backed identifier type.
///
/// The generated type has:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`, so the id is a
///   bare JSON number on the wire and in storage
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_i32()`
/// - `From<i32>`, `Into<i32>` and `FromStr` implementations
///
/// # Example
///
/// ```rust
/// # use rocketshoes_core::define_id;
/// define_id!(ShoeId);
/// define_id!(SizeId);
///
/// let shoe_id = ShoeId::new(1);
/// let size_id = SizeId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: ShoeId = size_id;
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
            Hash,
            PartialOrd,
            Ord,
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

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse::<i32>().map(Self)
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

// Catalog products are addressed by numeric id
define_id!(ProductId);
