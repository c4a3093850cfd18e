//! Strongly-typed identifiers for domain entities
//!
//! Store-assigned surrogate keys are wrapped in newtypes so a fund key can
//! never be passed where a NAV record key is expected. The external scheme
//! code gets its own type because it is the only key callers ever see.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

macro_rules! define_key {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw store-assigned key
            pub fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Returns the raw key value
            pub fn get(&self) -> i64 {
                self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(key: $name) -> i64 {
                key.0
            }
        }
    };
}

define_key!(FundKey, "FND");
define_key!(NavRecordKey, "NAV");

/// Error returned when a scheme code is not a valid integer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemeCodeError {
    #[error("scheme code is empty")]
    Empty,

    #[error("scheme code '{0}' is not an integer")]
    NotAnInteger(String),
}

/// External scheme code of a fund
///
/// This is the identifier callers use and the key the upstream source is
/// queried by. It displays as the bare number so it can be appended to a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemeCode(i64);

impl SchemeCode {
    pub fn new(code: i64) -> Self {
        Self(code)
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for SchemeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SchemeCode {
    type Err = SchemeCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(SchemeCodeError::Empty);
        }
        s.parse::<i64>()
            .map(Self)
            .map_err(|_| SchemeCodeError::NotAnInteger(s.to_string()))
    }
}

impl From<i64> for SchemeCode {
    fn from(code: i64) -> Self {
        Self(code)
    }
}
