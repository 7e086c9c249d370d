use serde::Serialize;

use super::{type_counts, TypeCount};
use crate::data::filter::FilteredView;
use crate::data::model::UNKNOWN_YEAR_BUILT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

/// Headline numbers for the raw-data page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    /// `None` when the view is empty.
    pub year_range: Option<YearRange>,
    /// Records carrying the unknown-year placeholder.
    pub unknown_year_built: usize,
    pub type_counts: Vec<TypeCount>,
}

pub fn summary(view: &FilteredView<'_>) -> Summary {
    let year_range = view.iter().map(|r| r.year_built).fold(None, |acc, y| {
        Some(match acc {
            None => YearRange { min: y, max: y },
            Some(YearRange { min, max }) => YearRange {
                min: min.min(y),
                max: max.max(y),
            },
        })
    });

    Summary {
        total: view.len(),
        year_range,
        unknown_year_built: view
            .iter()
            .filter(|r| r.year_built == UNKNOWN_YEAR_BUILT)
            .count(),
        type_counts: type_counts(view),
    }
}
