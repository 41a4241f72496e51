//! Seeded synthetic catalog for offline dry runs.
//!
//! Every document, month population, and library is derived from the seed and
//! the requested key, so repeated calls agree with each other. Citation counts
//! follow a Pareto-like tail: about a quarter of papers are uncited and a few
//! percent collect hundreds of citations.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Catalog, CatalogError, MonthQuery};
use crate::domain::{CitationRecord, DocumentRecord};

const JOURNALS: [&str; 5] = ["MNRAS", "ApJ", "A&A", "AJ", "PASA"];
const SURNAMES: [&str; 8] = [
    "Bellstedt, Sabine",
    "Robotham, Aaron",
    "Driver, Simon",
    "Thorne, Jessica",
    "Lagos, Claudia",
    "Davies, Luke",
    "Bravo, Matias",
    "Cook, Robin",
];
const MAX_SYNTHETIC_CITATIONS: u32 = 50_000;

/// Deterministic catalog generating plausible astronomy citation data.
#[derive(Debug, Clone)]
pub struct SyntheticCatalog {
    seed: u64,
    min_month_papers: usize,
    max_month_papers: usize,
}

impl SyntheticCatalog {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            min_month_papers: 1200,
            max_month_papers: 2400,
        }
    }

    /// Override the per-month population size range (inclusive).
    pub fn with_month_size(mut self, min: usize, max: usize) -> Self {
        self.min_month_papers = min.min(max);
        self.max_month_papers = max.max(min);
        self
    }

    fn rng_for(&self, key: &str) -> StdRng {
        // FNV-1a over the key, folded into the seed.
        let hash = key.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |h, b| {
            (h ^ u64::from(b)).wrapping_mul(0x0000_0100_0000_01b3)
        });
        StdRng::seed_from_u64(self.seed ^ hash)
    }

    fn draw_citations(rng: &mut StdRng) -> u32 {
        const ALPHA: f64 = 1.3;
        const SCALE: f64 = 4.0;
        // gen::<f64>() is in [0, 1); flip to (0, 1] so the power stays finite.
        let u = 1.0 - rng.gen::<f64>();
        let c = SCALE * (u.powf(-1.0 / ALPHA) - 1.0);
        (c.floor() as u32).min(MAX_SYNTHETIC_CITATIONS)
    }

    /// The full population for a month, before any range filter or cap.
    pub fn month_population(&self, month: &str) -> Vec<u32> {
        let mut rng = self.rng_for(&format!("month:{month}"));
        let n = rng.gen_range(self.min_month_papers..=self.max_month_papers);
        (0..n).map(|_| Self::draw_citations(&mut rng)).collect()
    }
}

impl Catalog for SyntheticCatalog {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn lookup_document(&self, bib_code: &str) -> Result<DocumentRecord, CatalogError> {
        if bib_code.trim().is_empty() {
            return Err(CatalogError::NotFound {
                bib_code: bib_code.to_string(),
            });
        }
        let mut rng = self.rng_for(&format!("doc:{bib_code}"));
        let year = bib_code
            .get(0..4)
            .and_then(|y| y.parse::<u32>().ok())
            .filter(|y| (1990..=2030).contains(y))
            .unwrap_or_else(|| rng.gen_range(2010..=2024));
        let month = rng.gen_range(1..=12u32);
        let n_authors = rng.gen_range(1..=5usize);
        let authors = (0..n_authors)
            .map(|_| SURNAMES[rng.gen_range(0..SURNAMES.len())].to_string())
            .collect();

        Ok(DocumentRecord {
            citation_count: Self::draw_citations(&mut rng),
            pubdate: format!("{year}-{month:02}-00"),
            authors,
        })
    }

    fn fetch_page(&self, query: &MonthQuery) -> Result<Vec<CitationRecord>, CatalogError> {
        Ok(self
            .month_population(query.pub_month.as_str())
            .into_iter()
            .filter(|&c| query.range.contains(c))
            .take(query.page_cap)
            .map(|citation_count| CitationRecord { citation_count })
            .collect())
    }

    fn resolve_bib_codes(
        &self,
        collection_id: &str,
        page_cap: usize,
    ) -> Result<Vec<String>, CatalogError> {
        let mut rng = self.rng_for(&format!("library:{collection_id}"));
        let n = rng.gen_range(5..=25usize).min(page_cap);
        Ok((0..n)
            .map(|_| {
                let year = rng.gen_range(2012..=2024u32);
                let journal = JOURNALS[rng.gen_range(0..JOURNALS.len())];
                let volume = rng.gen_range(100..=999u32);
                let page = rng.gen_range(1..=9999u32);
                let initial = (b'A' + rng.gen_range(0..26u8)) as char;
                format!("{year}{journal:.<5}{volume:.>4}.{page:.>4}{initial}")
            })
            .collect())
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ASTRONOMY_COLLECTION;
    use crate::domain::{PubMonth, SubRange};

    #[test]
    fn same_seed_same_data() {
        let a = SyntheticCatalog::new(7);
        let b = SyntheticCatalog::new(7);
        assert_eq!(a.month_population("2021-03"), b.month_population("2021-03"));
        assert_eq!(
            a.lookup_document("2021MNRAS.500.1234B").unwrap(),
            b.lookup_document("2021MNRAS.500.1234B").unwrap()
        );
    }

    #[test]
    fn population_size_within_bounds() {
        let cat = SyntheticCatalog::new(1).with_month_size(50, 60);
        let pop = cat.month_population("2019-07");
        assert!((50..=60).contains(&pop.len()));
    }

    #[test]
    fn lookup_uses_bibcode_year() {
        let doc = SyntheticCatalog::new(3).lookup_document("2018ApJ...861...12X").unwrap();
        assert!(doc.pubdate.starts_with("2018-"));
        assert!(!doc.authors.is_empty());
    }

    #[test]
    fn pages_are_filtered_and_capped() {
        let cat = SyntheticCatalog::new(11);
        let q = MonthQuery {
            pub_month: PubMonth::parse("2020-02").unwrap(),
            range: SubRange::new(0, 0),
            collection: ASTRONOMY_COLLECTION.into(),
            refereed: true,
            page_cap: 10,
        };
        let page = cat.fetch_page(&q).unwrap();
        assert_eq!(page.len(), 10);
        assert!(page.iter().all(|r| r.citation_count == 0));
    }

    #[test]
    fn library_bibcodes_are_nineteen_chars() {
        let codes = SyntheticCatalog::new(5).resolve_bib_codes("demo", 1000).unwrap();
        assert!(codes.len() >= 5);
        for code in codes {
            assert_eq!(code.len(), 19, "bad bibcode {code}");
        }
    }
}
