use serde::{Deserialize, Deserializer, Serialize};

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Body returned by endpoints that only acknowledge the request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

pub mod entry {
    use std::collections::HashMap;

    use chrono::NaiveDate;

    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct SplitInput {
        pub account_id: i32,
        pub duration: i32,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct LinkedItemInput {
        pub link_type_id: i32,
        pub value: String,
    }

    /// Query string of `GET /api/entries`. Both bounds are inclusive.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct EntryList {
        pub from: Option<NaiveDate>,
        pub to: Option<NaiveDate>,
    }

    /// Query string of `GET /api/entries/{id}/suggest-links`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct EntrySuggest {
        pub limit: Option<usize>,
    }

    /// Request body for creating an entry.
    ///
    /// `date` and `duration` are required; they are optional here so a
    /// missing value is reported as a bad request instead of a parse error.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct EntryNew {
        pub date: Option<NaiveDate>,
        pub duration: Option<i32>,
        #[serde(default)]
        pub description: String,
        #[serde(default)]
        pub notes: String,
        #[serde(default)]
        pub splits: Vec<SplitInput>,
        #[serde(default)]
        pub linked_items: Vec<LinkedItemInput>,
    }

    /// Partial update. Present collections replace the existing ones.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct EntryUpdate {
        pub date: Option<NaiveDate>,
        pub duration: Option<i32>,
        pub description: Option<String>,
        pub notes: Option<String>,
        pub splits: Option<Vec<SplitInput>>,
        pub linked_items: Option<Vec<LinkedItemInput>>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct EntryDuplicate {
        pub date: Option<NaiveDate>,
        #[serde(default)]
        pub link: bool,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct EntryLink {
        pub target_entry_id: Option<i32>,
        /// Shared field values to apply to the merged group, keyed by field
        /// name. Unknown keys are ignored.
        pub resolution: Option<HashMap<String, String>>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct EntryReorder {
        /// Entry to insert before; the moved entry goes last when absent.
        pub before_id: Option<i32>,
    }
}

pub mod account {
    use chrono::NaiveDate;

    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AccountList {
        #[serde(default)]
        pub include_inactive: bool,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AccountNew {
        pub number: Option<String>,
        #[serde(default)]
        pub description: String,
        #[serde(default)]
        pub project: String,
        pub opened_on: Option<NaiveDate>,
        pub closed_on: Option<NaiveDate>,
    }

    /// Partial update. An explicit `null` date clears it.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AccountUpdate {
        pub number: Option<String>,
        pub description: Option<String>,
        pub project: Option<String>,
        #[serde(
            default,
            deserialize_with = "double_option",
            skip_serializing_if = "Option::is_none"
        )]
        pub opened_on: Option<Option<NaiveDate>>,
        #[serde(
            default,
            deserialize_with = "double_option",
            skip_serializing_if = "Option::is_none"
        )]
        pub closed_on: Option<Option<NaiveDate>>,
        pub active: Option<bool>,
    }
}

pub mod link_type {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct LinkTypeNew {
        pub title: String,
        #[serde(default)]
        pub url_template: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct LinkTypeUpdate {
        pub title: Option<String>,
        pub url_template: Option<String>,
        pub position: Option<i32>,
    }
}
