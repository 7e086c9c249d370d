use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::filter::FilteredView;

/// How many records share one value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueCount<T> {
    pub value: T,
    pub count: usize,
}

/// Records per bedroom count, ascending by bedrooms.
pub fn bedroom_counts(view: &FilteredView<'_>) -> Vec<ValueCount<u32>> {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for record in view.iter() {
        *counts.entry(record.bedrooms).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(value, count)| ValueCount { value, count })
        .collect()
}

/// Records per bathroom count, ascending by bathrooms.
pub fn bathroom_counts(view: &FilteredView<'_>) -> Vec<ValueCount<f64>> {
    let mut values: Vec<f64> = view.iter().map(|r| r.bathrooms).collect();
    values.sort_by(f64::total_cmp);

    let mut counts: Vec<ValueCount<f64>> = Vec::new();
    for value in values {
        match counts.last_mut() {
            Some(last) if last.value == value => last.count += 1,
            _ => counts.push(ValueCount { value, count: 1 }),
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::PropertyRecord;
    use crate::views::test_support::dataset;

    fn rooms(bedrooms: u32, bathrooms: f64) -> PropertyRecord {
        let mut r = PropertyRecord::new("Condo");
        r.bedrooms = bedrooms;
        r.bathrooms = bathrooms;
        r
    }

    #[test]
    fn counts_are_sorted_by_value_not_frequency() {
        let ds = dataset(vec![
            rooms(3, 2.0),
            rooms(1, 1.5),
            rooms(3, 2.0),
            rooms(3, 1.0),
            rooms(0, 2.0),
        ]);
        let view = ds.view();

        let beds: Vec<(u32, usize)> = bedroom_counts(&view)
            .iter()
            .map(|c| (c.value, c.count))
            .collect();
        assert_eq!(beds, vec![(0, 1), (1, 1), (3, 3)]);

        let baths: Vec<(f64, usize)> = bathroom_counts(&view)
            .iter()
            .map(|c| (c.value, c.count))
            .collect();
        assert_eq!(baths, vec![(1.0, 1), (1.5, 1), (2.0, 3)]);
    }

    #[test]
    fn empty_view_gives_no_counts() {
        let view = FilteredView::default();
        assert!(bedroom_counts(&view).is_empty());
        assert!(bathroom_counts(&view).is_empty());
    }
}
