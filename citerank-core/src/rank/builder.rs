//! Distribution builder: one range-bounded catalog query per sub-range.

use crate::catalog::{Catalog, MonthQuery};
use crate::domain::{CitationDistribution, PubMonth, SubRange};
use crate::error::RankError;

use super::RankSettings;

/// A month's assembled citation distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionBuild {
    pub pub_month: PubMonth,
    pub distribution: CitationDistribution,
    /// Records returned per sub-range, in bound order.
    pub page_sizes: Vec<(SubRange, usize)>,
    /// Sub-ranges whose page came back at the cap. When non-empty the
    /// distribution is only a lower bound.
    pub truncated: Vec<SubRange>,
}

impl DistributionBuild {
    pub fn is_possibly_truncated(&self) -> bool {
        !self.truncated.is_empty()
    }
}

/// Fetch every sub-range of `settings.bounds` for `pub_month` and concatenate
/// the citation counts.
///
/// A page holding `page_cap` records may have been cut short by the catalog,
/// so its sub-range is recorded in `truncated` and logged; the build still
/// succeeds. Any fetch failure aborts the whole build and names the failing
/// sub-range.
pub fn build_distribution(
    catalog: &dyn Catalog,
    pub_month: &PubMonth,
    settings: &RankSettings,
) -> Result<DistributionBuild, RankError> {
    settings.validate()?;

    let ranges = settings.bounds.sub_ranges();
    let mut distribution = CitationDistribution::new();
    let mut page_sizes = Vec::with_capacity(ranges.len());
    let mut truncated = Vec::new();

    for range in ranges {
        let query = MonthQuery {
            pub_month: pub_month.clone(),
            range,
            collection: settings.collection.clone(),
            refereed: settings.refereed,
            page_cap: settings.page_cap,
        };

        let page = catalog
            .fetch_page(&query)
            .map_err(|e| RankError::page_failed(pub_month.as_str(), range, e))?;

        tracing::debug!(
            catalog = catalog.name(),
            month = %pub_month,
            range = %range,
            returned = page.len(),
            "fetched citation sub-range"
        );

        if page.len() >= settings.page_cap {
            tracing::warn!(
                month = %pub_month,
                range = %range,
                page_cap = settings.page_cap,
                "query limit reached in citation range; add a bound to split it"
            );
            truncated.push(range);
        }

        page_sizes.push((range, page.len()));
        distribution.extend(page.into_iter().map(|r| r.citation_count));
    }

    Ok(DistributionBuild {
        pub_month: pub_month.clone(),
        distribution,
        page_sizes,
        truncated,
    })
}
