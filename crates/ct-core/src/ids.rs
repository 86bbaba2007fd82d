//! String-backed identifier wrappers.
//!
//! Simulation identifiers are opaque text (`"freight_FTL_17"`, `"4711#2"`).
//! Traffic classification works on substrings of the raw vehicle id, so ids
//! keep their original text instead of being interned to integers.
//!
//! All ids are `Clone + Ord + Hash` and implement `Borrow<str>`, so a
//! `HashMap<LinkId, _>` can be queried with a plain `&str`.

use std::borrow::Borrow;
use std::fmt;

/// Generate a typed id wrapper around an owned `String`.
macro_rules! string_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        $vis struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// `true` if the raw id text contains `pattern`.
            #[inline]
            pub fn contains(&self, pattern: &str) -> bool {
                self.0.contains(pattern)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id! {
    /// Id of a directed network link.
    pub struct LinkId;
}

string_id! {
    /// Id of a simulated vehicle.  Its text encodes the demand model that
    /// generated it (`goodsTraffic_`, `longDistanceFreight`, `FTL_kv`, ...).
    pub struct VehicleId;
}

string_id! {
    /// Id of a simulated person (driver agent).
    pub struct PersonId;
}
