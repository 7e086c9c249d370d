use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::filter::FilteredView;

// ---------------------------------------------------------------------------
// Square footage vs. year built
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SizePoint {
    pub year_built: i32,
    pub square_footage: f64,
}

/// Scatter points for records with a known size, in view order.
pub fn square_footage_by_year(view: &FilteredView<'_>) -> Vec<SizePoint> {
    view.iter()
        .filter_map(|r| {
            Some(SizePoint {
                year_built: r.year_built,
                square_footage: r.square_footage?,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Average property tax by year
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyTax {
    /// Tax year as written in the source mapping.
    pub year: String,
    pub average: f64,
    /// Records that contributed to the average.
    pub properties: usize,
}

/// Orders integer years numerically ahead of any non-numeric key.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TaxYear(String);

impl TaxYear {
    fn numeric(&self) -> Option<i64> {
        self.0.trim().parse().ok()
    }
}

impl PartialOrd for TaxYear {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TaxYear {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

/// Mean of `propertyTaxes[year].total` per year over the records that have
/// an entry for that year. Records without the year don't count as zero, and
/// years nobody reports are absent. Entries without a numeric `total` are
/// skipped.
pub fn average_tax_by_year(view: &FilteredView<'_>) -> Vec<YearlyTax> {
    let mut sums: BTreeMap<TaxYear, (f64, usize)> = BTreeMap::new();
    let mut skipped = 0usize;

    for record in view.iter() {
        for (year, entry) in &record.property_taxes {
            let total = entry
                .as_mapping()
                .and_then(|m| m.get("total"))
                .and_then(|t| t.as_f64())
                .filter(|t| t.is_finite());
            match total {
                Some(total) => {
                    let slot = sums.entry(TaxYear(year.clone())).or_insert((0.0, 0));
                    slot.0 += total;
                    slot.1 += 1;
                }
                None => skipped += 1,
            }
        }
    }
    if skipped > 0 {
        log::debug!("{skipped} tax entries without a numeric total were skipped");
    }

    // entries only exist once a total was added, so n > 0
    sums.into_iter()
        .map(|(year, (sum, n))| YearlyTax {
            year: year.0,
            average: sum / n as f64,
            properties: n,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::literal::parse_mapping;
    use crate::data::model::PropertyRecord;
    use crate::views::test_support::dataset;

    fn taxed(literal: &str) -> PropertyRecord {
        let mut r = PropertyRecord::new("Condo");
        r.property_taxes = parse_mapping(literal);
        r
    }

    #[test]
    fn averages_only_over_reporting_records() {
        let ds = dataset(vec![
            taxed("{'2022': {'year': 2022, 'total': 4000}, '2023': {'total': 5000}}"),
            taxed("{'2023': {'total': 7000.5}}"),
            taxed("{}"),
        ]);
        let averages = average_tax_by_year(&ds.view());
        assert_eq!(
            averages,
            vec![
                YearlyTax {
                    year: "2022".into(),
                    average: 4000.0,
                    properties: 1
                },
                YearlyTax {
                    year: "2023".into(),
                    average: 6000.25,
                    properties: 2
                },
            ]
        );
    }

    #[test]
    fn years_without_numeric_totals_are_omitted() {
        let ds = dataset(vec![
            taxed("{'2019': {'year': 2019}, '2020': 'n/a', '2021': {'total': None}}"),
            taxed("{'2024': {'total': 10}}"),
        ]);
        let averages = average_tax_by_year(&ds.view());
        assert_eq!(averages.len(), 1);
        assert_eq!(averages[0].year, "2024");
        assert!(averages.iter().all(|t| t.average.is_finite()));
    }

    #[test]
    fn numeric_years_sort_numerically() {
        let ds = dataset(vec![taxed(
            "{'999': {'total': 1}, '2001': {'total': 2}, 'later': {'total': 3}}",
        )]);
        let years: Vec<String> = average_tax_by_year(&ds.view())
            .into_iter()
            .map(|t| t.year)
            .collect();
        assert_eq!(years, vec!["999", "2001", "later"]);
    }

    #[test]
    fn scatter_skips_unknown_sizes() {
        let mut a = PropertyRecord::new("Condo");
        a.year_built = 1990;
        a.square_footage = Some(1450.0);
        let b = PropertyRecord::new("Condo");
        let ds = dataset(vec![a, b]);
        assert_eq!(
            square_footage_by_year(&ds.view()),
            vec![SizePoint {
                year_built: 1990,
                square_footage: 1450.0
            }]
        );
    }

    #[test]
    fn empty_view_gives_empty_charts() {
        let view = FilteredView::default();
        assert!(square_footage_by_year(&view).is_empty());
        assert!(average_tax_by_year(&view).is_empty());
    }
}
