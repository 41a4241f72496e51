//! Catalog records and the resolved paper under evaluation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A calendar month in `YYYY-MM` form, used as an equality filter on pubdate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PubMonth(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid publication month '{value}': expected YYYY-MM")]
pub struct PubMonthError {
    pub value: String,
}

impl PubMonth {
    /// Parse a strict `YYYY-MM` string.
    ///
    /// Month `00` is accepted: the catalog uses it for year-only records such
    /// as books and proceedings, and matches it literally in pubdate queries.
    pub fn parse(value: &str) -> Result<Self, PubMonthError> {
        let err = || PubMonthError {
            value: value.to_string(),
        };
        let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        let (year, month) = match (value.get(0..4), value.get(4..5), value.get(5..)) {
            (Some(y), Some("-"), Some(m)) if m.len() == 2 && digits(y) && digits(m) => (y, m),
            _ => return Err(err()),
        };
        let year: i32 = year.parse().map_err(|_| err())?;
        let month: u32 = month.parse().map_err(|_| err())?;
        if month > 12 {
            return Err(err());
        }
        NaiveDate::from_ymd_opt(year, month.max(1), 1).ok_or_else(err)?;
        Ok(Self(value.to_string()))
    }

    /// True for `YYYY-00`, a record dated only to the year.
    pub fn is_year_only(&self) -> bool {
        self.0.ends_with("-00")
    }

    /// Month part of a catalog pubdate such as `2022-11-00`.
    ///
    /// Catalog pubdates use day `00` when only the month is known, so only the
    /// leading `YYYY-MM` is read.
    pub fn from_pubdate(pubdate: &str) -> Result<Self, PubMonthError> {
        match pubdate.get(0..7) {
            Some(prefix) => Self::parse(prefix).map_err(|_| PubMonthError {
                value: pubdate.to_string(),
            }),
            None => Err(PubMonthError {
                value: pubdate.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PubMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PubMonth {
    type Error = PubMonthError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PubMonth> for String {
    fn from(m: PubMonth) -> Self {
        m.0
    }
}

/// A single-document lookup result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub citation_count: u32,
    /// Catalog pubdate, `YYYY-MM-DD` with `00` for unknown parts.
    pub pubdate: String,
    /// Authors in catalog order ("Last, First").
    pub authors: Vec<String>,
}

/// One member of a month page; only the citation count matters here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationRecord {
    pub citation_count: u32,
}

/// The paper being ranked, resolved from its catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetPaper {
    pub bib_code: String,
    pub citation_count: u32,
    pub pub_month: PubMonth,
    /// First author with all whitespace removed (`"Bellstedt,Sabine"`).
    pub first_author: String,
}

impl TargetPaper {
    pub fn from_document(bib_code: &str, doc: &DocumentRecord) -> Result<Self, PubMonthError> {
        let pub_month = PubMonth::from_pubdate(&doc.pubdate)?;
        let first_author = doc
            .authors
            .first()
            .map(|a| a.split_whitespace().collect::<String>())
            .unwrap_or_default();
        Ok(Self {
            bib_code: bib_code.to_string(),
            citation_count: doc.citation_count,
            pub_month,
            first_author,
        })
    }
}
