//! Newtype domain identifiers.
//!
//! Every concept with an identity is a distinct newtype wrapping a `String`.
//! This prevents accidentally interchanging, for example, a [`WorkerId`] with
//! a [`CartId`] even though both are plain strings on the wire.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{PickError, Result};

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, parse(), as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is blank.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.trim().is_empty() { None } else { Some(Self(v)) }
            }

            /// Creates a new identifier, reporting a blank value as a validation
            /// failure on `field`.
            pub fn parse(value: impl Into<String>, field: &str) -> Result<Self> {
                Self::new(value).ok_or_else(|| PickError::validation(field, "must not be empty"))
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id! {
    /// Identifies a pick session.
    ///
    /// Generated by [`SessionId::generate`] when a session is created.
    SessionId
}

impl SessionId {
    /// Generates a fresh session id of the form `SESSION-1A2B3C4D`.
    pub fn generate() -> Self {
        let raw = Uuid::new_v4().simple().to_string();
        Self(format!("SESSION-{}", raw[..8].to_uppercase()))
    }
}

string_id! {
    /// Identifies the upstream task this session fulfils.
    TaskId
}

string_id! {
    /// Identifies the worker performing the picks.
    WorkerId
}

string_id! {
    /// Identifies the warehouse the session runs in.
    WarehouseId
}

string_id! {
    /// Identifies the cart (or tote set) picks are placed into.
    CartId
}

string_id! {
    /// Identifies a pick instruction; unique within a session.
    InstructionId
}

string_id! {
    /// Identifies the customer order an instruction belongs to.
    OrderId
}

string_id! {
    /// Stock keeping unit code of the item to pick.
    Sku
}
