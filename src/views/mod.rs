/// Derived views: pure aggregations over a [`FilteredView`], one per page.
///
/// ```text
///   FilteredView ──┬─► summary       totals, year range, per-type counts
///                  ├─► distribution  type shares + pie label layout
///                  ├─► by_year       year × type counts over a window
///                  ├─► rooms         bedroom / bathroom histograms
///                  ├─► charts        sqft scatter, average tax by year
///                  └─► geo           map coordinates
/// ```
///
/// None of them fail on an empty view; they return empty structures instead.

pub mod by_year;
pub mod charts;
pub mod distribution;
pub mod geo;
pub mod rooms;
pub mod summary;

use std::collections::HashMap;

use serde::Serialize;

use crate::data::filter::FilteredView;

/// Number of records of one property type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeCount {
    pub property_type: String,
    pub count: usize,
}

/// Records per property type, most common first. Ties keep the order in
/// which the types first appear in the view.
pub fn type_counts(view: &FilteredView<'_>) -> Vec<TypeCount> {
    let mut position: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<TypeCount> = Vec::new();

    for record in view.iter() {
        let kind = record.property_type.as_str();
        match position.get(kind) {
            Some(&i) => counts[i].count += 1,
            None => {
                position.insert(kind, counts.len());
                counts.push(TypeCount {
                    property_type: kind.to_string(),
                    count: 1,
                });
            }
        }
    }

    // stable: equal counts stay in first-seen order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}
