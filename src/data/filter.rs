use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use serde::Serialize;

use super::model::{HousingDataset, PropertyRecord};

// ---------------------------------------------------------------------------
// Slider bounds
// ---------------------------------------------------------------------------

pub const BEDROOM_BOUNDS: RangeInclusive<u32> = 0..=10;
pub const BATHROOM_BOUNDS: RangeInclusive<f64> = 0.0..=10.0;
pub const YEAR_BOUNDS: RangeInclusive<i32> = 1600..=2025;

// ---------------------------------------------------------------------------
// FilterCriteria
// ---------------------------------------------------------------------------

/// One interaction's worth of filter settings. All ranges are inclusive and
/// kept inside the bounds above; an inverted range matches nothing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterCriteria {
    /// Property types to keep. Empty means nothing is kept.
    pub selected_types: BTreeSet<String>,
    pub bedrooms: RangeInclusive<u32>,
    pub bathrooms: RangeInclusive<f64>,
    pub years: RangeInclusive<i32>,
}

impl FilterCriteria {
    /// Every type in the dataset, full ranges.
    pub fn all(dataset: &HousingDataset) -> Self {
        Self::for_types(dataset.property_types.iter().cloned())
    }

    /// The given types, full ranges.
    pub fn for_types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterCriteria {
            selected_types: types.into_iter().map(Into::into).collect(),
            bedrooms: BEDROOM_BOUNDS,
            bathrooms: BATHROOM_BOUNDS,
            years: YEAR_BOUNDS,
        }
    }

    pub fn with_bedrooms(mut self, lo: u32, hi: u32) -> Self {
        self.set_bedrooms(lo, hi);
        self
    }

    pub fn with_bathrooms(mut self, lo: f64, hi: f64) -> Self {
        self.set_bathrooms(lo, hi);
        self
    }

    pub fn with_years(mut self, lo: i32, hi: i32) -> Self {
        self.set_years(lo, hi);
        self
    }

    pub fn set_bedrooms(&mut self, lo: u32, hi: u32) {
        let (min, max) = (*BEDROOM_BOUNDS.start(), *BEDROOM_BOUNDS.end());
        self.bedrooms = lo.clamp(min, max)..=hi.clamp(min, max);
    }

    /// NaN bounds collapse to the nearest slider edge.
    pub fn set_bathrooms(&mut self, lo: f64, hi: f64) {
        let (min, max) = (*BATHROOM_BOUNDS.start(), *BATHROOM_BOUNDS.end());
        let clamp = |v: f64, fallback: f64| if v.is_nan() { fallback } else { v.clamp(min, max) };
        self.bathrooms = clamp(lo, min)..=clamp(hi, max);
    }

    pub fn set_years(&mut self, lo: i32, hi: i32) {
        let (min, max) = (*YEAR_BOUNDS.start(), *YEAR_BOUNDS.end());
        self.years = lo.clamp(min, max)..=hi.clamp(min, max);
    }

    /// Whether a single record passes every predicate.
    pub fn matches(&self, record: &PropertyRecord) -> bool {
        self.selected_types.contains(&record.property_type)
            && self.bedrooms.contains(&record.bedrooms)
            && self.bathrooms.contains(&record.bathrooms)
            && self.years.contains(&record.year_built)
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Return indices of records that pass the criteria, in dataset order.
pub fn filtered_indices(dataset: &HousingDataset, criteria: &FilterCriteria) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| criteria.matches(r))
        .map(|(i, _)| i)
        .collect()
}

/// The records of a dataset that passed a filter. Borrowed, never mutated.
#[derive(Debug, Clone, Default)]
pub struct FilteredView<'a> {
    records: Vec<&'a PropertyRecord>,
}

impl<'a> FilteredView<'a> {
    pub fn new(records: Vec<&'a PropertyRecord>) -> Self {
        FilteredView { records }
    }

    /// Build a view from dataset row indices, e.g. cached `filtered_indices`.
    pub fn from_indices(dataset: &'a HousingDataset, indices: &[usize]) -> Self {
        FilteredView {
            records: indices
                .iter()
                .filter_map(|&i| dataset.records.get(i))
                .collect(),
        }
    }

    /// Narrow this view further. Applying the same criteria twice is a no-op.
    pub fn filter(&self, criteria: &FilterCriteria) -> FilteredView<'a> {
        FilteredView {
            records: self
                .records
                .iter()
                .copied()
                .filter(|r| criteria.matches(r))
                .collect(),
        }
    }

    pub fn records(&self) -> &[&'a PropertyRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a PropertyRecord> + '_ {
        self.records.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl HousingDataset {
    /// Every record, unfiltered.
    pub fn view(&self) -> FilteredView<'_> {
        FilteredView::new(self.records.iter().collect())
    }

    pub fn filter(&self, criteria: &FilterCriteria) -> FilteredView<'_> {
        self.view().filter(criteria)
    }
}
