//! Deterministic in-memory catalog for tests and offline fixtures.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{Catalog, CatalogError, MonthQuery};
use crate::domain::{CitationRecord, DocumentRecord, SubRange};

/// A catalog backed by plain maps.
///
/// Month populations are stored as raw citation counts; `fetch_page` filters
/// them by the query's sub-range and truncates to the page cap, the way the
/// real service does. Every month query is recorded for later inspection.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    documents: HashMap<String, DocumentRecord>,
    months: HashMap<String, Vec<u32>>,
    libraries: HashMap<String, Vec<String>>,
    failing_ranges: Vec<(String, SubRange)>,
    queries: Mutex<Vec<MonthQuery>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(
        mut self,
        bib_code: &str,
        citation_count: u32,
        pubdate: &str,
        authors: &[&str],
    ) -> Self {
        self.documents.insert(
            bib_code.to_string(),
            DocumentRecord {
                citation_count,
                pubdate: pubdate.to_string(),
                authors: authors.iter().map(|a| a.to_string()).collect(),
            },
        );
        self
    }

    /// Citation counts of every refereed paper published in `month` (`YYYY-MM`).
    pub fn with_month(mut self, month: &str, counts: Vec<u32>) -> Self {
        self.months.insert(month.to_string(), counts);
        self
    }

    pub fn with_library(mut self, collection_id: &str, bib_codes: &[&str]) -> Self {
        self.libraries.insert(
            collection_id.to_string(),
            bib_codes.iter().map(|b| b.to_string()).collect(),
        );
        self
    }

    /// Make `fetch_page` fail for this month and sub-range.
    pub fn failing_on(mut self, month: &str, range: SubRange) -> Self {
        self.failing_ranges.push((month.to_string(), range));
        self
    }

    /// Month queries issued so far, in call order.
    pub fn queries(&self) -> Vec<MonthQuery> {
        self.queries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Catalog for InMemoryCatalog {
    fn name(&self) -> &str {
        "in_memory"
    }

    fn lookup_document(&self, bib_code: &str) -> Result<DocumentRecord, CatalogError> {
        self.documents
            .get(bib_code)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound {
                bib_code: bib_code.to_string(),
            })
    }

    fn fetch_page(&self, query: &MonthQuery) -> Result<Vec<CitationRecord>, CatalogError> {
        if let Ok(mut log) = self.queries.lock() {
            log.push(query.clone());
        }

        let month = query.pub_month.as_str();
        if self
            .failing_ranges
            .iter()
            .any(|(m, r)| m == month && *r == query.range)
        {
            return Err(CatalogError::NetworkUnreachable(format!(
                "injected failure for {month} citations {}",
                query.range
            )));
        }

        let counts = match self.months.get(month) {
            Some(counts) => counts,
            None => return Ok(Vec::new()),
        };

        Ok(counts
            .iter()
            .filter(|&&c| query.range.contains(c))
            .take(query.page_cap)
            .map(|&citation_count| CitationRecord { citation_count })
            .collect())
    }

    fn resolve_bib_codes(
        &self,
        collection_id: &str,
        page_cap: usize,
    ) -> Result<Vec<String>, CatalogError> {
        self.libraries
            .get(collection_id)
            .map(|codes| codes.iter().take(page_cap).cloned().collect())
            .ok_or_else(|| CatalogError::LibraryNotFound {
                collection_id: collection_id.to_string(),
            })
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ASTRONOMY_COLLECTION;
    use crate::domain::PubMonth;

    fn query(lo: u32, hi: u32, cap: usize) -> MonthQuery {
        MonthQuery {
            pub_month: PubMonth::parse("2020-05").unwrap(),
            range: SubRange::new(lo, hi),
            collection: ASTRONOMY_COLLECTION.into(),
            refereed: true,
            page_cap: cap,
        }
    }

    #[test]
    fn page_respects_range_and_cap() {
        let cat = InMemoryCatalog::new().with_month("2020-05", vec![0, 1, 1, 1, 5]);
        assert_eq!(cat.fetch_page(&query(1, 1, 10)).unwrap().len(), 3);
        assert_eq!(cat.fetch_page(&query(1, 1, 2)).unwrap().len(), 2);
        assert_eq!(cat.fetch_page(&query(2, 4, 10)).unwrap().len(), 0);
        assert_eq!(cat.queries().len(), 3);
    }

    #[test]
    fn unknown_month_is_an_empty_page() {
        let cat = InMemoryCatalog::new();
        assert!(cat.fetch_page(&query(0, 10, 10)).unwrap().is_empty());
    }

    #[test]
    fn missing_document_and_library() {
        let cat = InMemoryCatalog::new();
        assert!(matches!(
            cat.lookup_document("nope"),
            Err(CatalogError::NotFound { .. })
        ));
        assert!(matches!(
            cat.resolve_bib_codes("lib", 10),
            Err(CatalogError::LibraryNotFound { .. })
        ));
    }

    #[test]
    fn library_keeps_order_and_duplicates() {
        let cat = InMemoryCatalog::new().with_library("lib", &["b", "a", "b"]);
        assert_eq!(cat.resolve_bib_codes("lib", 10).unwrap(), vec!["b", "a", "b"]);
        assert_eq!(cat.resolve_bib_codes("lib", 2).unwrap(), vec!["b", "a"]);
    }

    #[test]
    fn injected_failure_is_transport() {
        let cat = InMemoryCatalog::new()
            .with_month("2020-05", vec![1])
            .failing_on("2020-05", SubRange::new(1, 1));
        let err = cat.fetch_page(&query(1, 1, 10)).unwrap_err();
        assert!(err.is_transport());
    }
}
