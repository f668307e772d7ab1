//! Command structs for engine operations.
//!
//! These types group parameters for write operations (entries, accounts,
//! link types), keeping call sites readable and avoiding long argument lists.

use chrono::NaiveDate;

/// One account allocation of an entry, in display order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitInput {
    pub account_id: i32,
    pub duration: i32,
}

/// One external reference of an entry, in display order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkedItemInput {
    pub link_type_id: i32,
    pub value: String,
}

/// Create an entry.
#[derive(Clone, Debug)]
pub struct EntryNew {
    pub date: NaiveDate,
    pub duration: i32,
    pub description: String,
    pub notes: String,
    pub splits: Vec<SplitInput>,
    pub linked_items: Vec<LinkedItemInput>,
}

impl EntryNew {
    #[must_use]
    pub fn new(date: NaiveDate, duration: i32) -> Self {
        Self {
            date,
            duration,
            description: String::new(),
            notes: String::new(),
            splits: Vec::new(),
            linked_items: Vec::new(),
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    #[must_use]
    pub fn split(mut self, account_id: i32, duration: i32) -> Self {
        self.splits.push(SplitInput {
            account_id,
            duration,
        });
        self
    }

    #[must_use]
    pub fn linked_item(mut self, link_type_id: i32, value: impl Into<String>) -> Self {
        self.linked_items.push(LinkedItemInput {
            link_type_id,
            value: value.into(),
        });
        self
    }
}

/// Partial update of an entry.
///
/// `splits` and `linked_items` replace the whole collection when present.
#[derive(Clone, Debug, Default)]
pub struct EntryPatch {
    pub date: Option<NaiveDate>,
    pub duration: Option<i32>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub splits: Option<Vec<SplitInput>>,
    pub linked_items: Option<Vec<LinkedItemInput>>,
}

impl EntryPatch {
    #[must_use]
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    #[must_use]
    pub fn duration(mut self, duration: i32) -> Self {
        self.duration = Some(duration);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn splits(mut self, splits: Vec<SplitInput>) -> Self {
        self.splits = Some(splits);
        self
    }

    #[must_use]
    pub fn linked_items(mut self, linked_items: Vec<LinkedItemInput>) -> Self {
        self.linked_items = Some(linked_items);
        self
    }
}

/// Create an imputation account.
#[derive(Clone, Debug)]
pub struct AccountNew {
    pub number: String,
    pub description: String,
    pub project: String,
    pub opened_on: Option<NaiveDate>,
    pub closed_on: Option<NaiveDate>,
}

impl AccountNew {
    #[must_use]
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            description: String::new(),
            project: String::new(),
            opened_on: None,
            closed_on: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    #[must_use]
    pub fn opened_on(mut self, date: NaiveDate) -> Self {
        self.opened_on = Some(date);
        self
    }

    #[must_use]
    pub fn closed_on(mut self, date: NaiveDate) -> Self {
        self.closed_on = Some(date);
        self
    }
}

/// Partial update of an account. `Some(None)` clears an optional date.
#[derive(Clone, Debug, Default)]
pub struct AccountPatch {
    pub number: Option<String>,
    pub description: Option<String>,
    pub project: Option<String>,
    pub opened_on: Option<Option<NaiveDate>>,
    pub closed_on: Option<Option<NaiveDate>>,
    pub active: Option<bool>,
}

/// Create a link type; it is appended after the existing ones.
#[derive(Clone, Debug)]
pub struct LinkTypeNew {
    pub title: String,
    pub url_template: String,
}

#[derive(Clone, Debug, Default)]
pub struct LinkTypePatch {
    pub title: Option<String>,
    pub url_template: Option<String>,
    pub position: Option<i32>,
}
