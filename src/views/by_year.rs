use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::data::filter::FilteredView;
use crate::error::ViewError;

/// Window used when the caller has no preference.
pub const DEFAULT_WINDOW: u32 = 50;

/// Properties per (year built, type) over the trailing window of years.
///
/// Every year from `first_year` to `last_year` is present and every year maps
/// every type of the whole view, zero where nothing was built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct YearTypeCounts {
    pub window: u32,
    /// Types of the whole filtered view, sorted.
    pub types: Vec<String>,
    pub counts: BTreeMap<i32, BTreeMap<String, usize>>,
}

impl YearTypeCounts {
    pub fn first_year(&self) -> Option<i32> {
        self.counts.keys().next().copied()
    }

    pub fn last_year(&self) -> Option<i32> {
        self.counts.keys().next_back().copied()
    }
}

fn year_bounds(view: &FilteredView<'_>) -> Option<(i32, i32)> {
    let min = view.iter().map(|r| r.year_built).min()?;
    let max = view.iter().map(|r| r.year_built).max()?;
    Some((min, max))
}

/// Largest window the view supports: the span of its years, but at least 1
/// so single-year data can still be charted. `None` for an empty view.
/// Cleaned years lie in `PLAUSIBLE_YEARS_BUILT`, so the span stays small.
pub fn max_window(view: &FilteredView<'_>) -> Option<u32> {
    let (min, max) = year_bounds(view)?;
    let span = (i64::from(max) - i64::from(min)).max(1);
    Some(u32::try_from(span).unwrap_or(u32::MAX))
}

/// [`DEFAULT_WINDOW`] capped to what the view supports.
pub fn default_window(view: &FilteredView<'_>) -> u32 {
    max_window(view).map_or(DEFAULT_WINDOW, |max| DEFAULT_WINDOW.min(max))
}

/// Count properties built in the last `window` years of the view, i.e. with
/// `yearBuilt >= max(yearBuilt) - window`.
pub fn year_type_counts(view: &FilteredView<'_>, window: u32) -> Result<YearTypeCounts, ViewError> {
    let Some((_, last)) = year_bounds(view) else {
        return Ok(YearTypeCounts {
            window,
            ..Default::default()
        });
    };
    let max = max_window(view).unwrap_or(1);
    if window == 0 || window > max {
        return Err(ViewError::WindowOutOfRange { window, max });
    }

    // window <= span, so the threshold never drops below the earliest year
    let first = (i64::from(last) - i64::from(window)) as i32;

    let types: BTreeSet<&str> = view.iter().map(|r| r.property_type.as_str()).collect();
    let empty_row: BTreeMap<String, usize> = types.iter().map(|t| (t.to_string(), 0)).collect();

    let mut counts: BTreeMap<i32, BTreeMap<String, usize>> =
        (first..=last).map(|year| (year, empty_row.clone())).collect();

    for record in view.iter().filter(|r| r.year_built >= first) {
        if let Some(count) = counts
            .get_mut(&record.year_built)
            .and_then(|row| row.get_mut(&record.property_type))
        {
            *count += 1;
        }
    }

    log::debug!(
        "year/type counts for {first}..={last}: {} years x {} types",
        counts.len(),
        types.len()
    );

    Ok(YearTypeCounts {
        window,
        types: types.into_iter().map(str::to_string).collect(),
        counts,
    })
}
