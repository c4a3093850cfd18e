//! Fund metadata
//!
//! `FundMeta` is the descriptive part as it travels on the wire (upstream
//! payload and response body). `FundMetadata` is the persisted form that
//! carries the store-assigned key.

use serde::{Deserialize, Deserializer, Serialize};

use core_kernel::{FundKey, SchemeCode};

/// Descriptive attributes of one fund
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundMeta {
    /// Asset management company
    #[serde(default, deserialize_with = "null_as_default")]
    pub fund_house: String,
    /// e.g. "Open Ended Schemes"
    #[serde(default, deserialize_with = "null_as_default")]
    pub scheme_type: String,
    /// e.g. "Equity Scheme - Large Cap Fund"
    #[serde(default, deserialize_with = "null_as_default")]
    pub scheme_category: String,
    /// External identifier, unique across funds
    #[serde(default, deserialize_with = "null_as_default")]
    pub scheme_code: SchemeCode,
    #[serde(default, deserialize_with = "null_as_default")]
    pub scheme_name: String,
}

impl FundMeta {
    /// Creates fund metadata
    ///
    /// # Arguments
    ///
    /// * `scheme_code` - External scheme code
    /// * `scheme_name` - Display name of the scheme
    pub fn new(scheme_code: SchemeCode, scheme_name: impl Into<String>) -> Self {
        Self {
            scheme_code,
            scheme_name: scheme_name.into(),
            ..Default::default()
        }
    }

    /// Sets the fund house
    pub fn with_fund_house(mut self, fund_house: impl Into<String>) -> Self {
        self.fund_house = fund_house.into();
        self
    }

    /// Sets scheme type and category
    pub fn with_classification(
        mut self,
        scheme_type: impl Into<String>,
        scheme_category: impl Into<String>,
    ) -> Self {
        self.scheme_type = scheme_type.into();
        self.scheme_category = scheme_category.into();
        self
    }

    /// True when every field is at its zero value
    ///
    /// The upstream source answers unknown scheme codes with an empty `meta`
    /// object rather than an error status.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A fund row as stored, with its surrogate key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundMetadata {
    pub id: FundKey,
    pub meta: FundMeta,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_meta_object() {
        let meta: FundMeta = serde_json::from_str("{}").unwrap();
        assert!(meta.is_empty());
    }

    #[test]
    fn test_nulls_and_unknown_fields() {
        let meta: FundMeta = serde_json::from_str(
            r#"{"fund_house":"Axis Mutual Fund","scheme_type":null,"scheme_category":"Equity",
                "scheme_code":120503,"scheme_name":"Axis ELSS","isin_growth":"INF846K01EW2"}"#,
        )
        .unwrap();

        assert_eq!(meta.scheme_code, SchemeCode::new(120503));
        assert_eq!(meta.scheme_type, "");
        assert!(!meta.is_empty());
    }
}
