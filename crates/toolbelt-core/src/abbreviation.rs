//! Static abbreviation tables and the lookup behind both expansion endpoints.

use toolbelt_proto::{AbbreviationRequest, ExpansionResponse};

use crate::ApiError;

/// Immutable, ordered code → expansion table.
#[derive(Debug)]
pub struct AbbreviationTable {
    label: &'static str,
    entries: &'static [(&'static str, &'static str)],
}

impl AbbreviationTable {
    pub const fn new(
        label: &'static str,
        entries: &'static [(&'static str, &'static str)],
    ) -> Self {
        Self { label, entries }
    }

    /// Human label used in miss messages, e.g. "Timezone".
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Exact match on an already-normalized code.
    pub fn get(&self, code: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == code)
            .map(|(_, v)| *v)
    }

    /// Codes in table order.
    pub fn codes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn entries(&self) -> &'static [(&'static str, &'static str)] {
        self.entries
    }

    pub fn expand(&self, req: &AbbreviationRequest) -> Result<ExpansionResponse, ApiError> {
        let code = req.abbreviation.to_uppercase();
        match self.get(&code) {
            Some(expansion) => Ok(ExpansionResponse::new(code, expansion)),
            None => {
                tracing::debug!(table = self.label, %code, "abbreviation lookup missed");
                Err(ApiError::AbbreviationNotFound {
                    label: self.label,
                    code,
                    available: self.codes().map(str::to_string).collect(),
                })
            }
        }
    }
}

pub static TIME_ZONES: AbbreviationTable = AbbreviationTable::new(
    "Timezone",
    &[
        ("MST", "Mountain Standard Time"),
        ("EST", "Eastern Standard Time"),
        ("PST", "Pacific Standard Time"),
        ("CST", "Central Standard Time"),
        ("GMT", "Greenwich Mean Time"),
    ],
);

pub static NEW_AGE: AbbreviationTable = AbbreviationTable::new(
    "New age",
    &[
        ("LOL", "Laugh Out Loud"),
        ("BRB", "Be Right Back"),
        ("OMG", "Oh My God"),
        ("IMHO", "In My Humble Opinion"),
        ("FOMO", "Fear Of Missing Out"),
    ],
);

/// Which table an endpoint reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    TimeZones,
    NewAge,
}

impl TableKind {
    pub fn table(self) -> &'static AbbreviationTable {
        match self {
            TableKind::TimeZones => &TIME_ZONES,
            TableKind::NewAge => &NEW_AGE,
        }
    }
}

pub fn expand(kind: TableKind, req: &AbbreviationRequest) -> Result<ExpansionResponse, ApiError> {
    kind.table().expand(req)
}
