use std::path::{Path, PathBuf};

use crate::data::filter::{filtered_indices, FilterCriteria, FilteredView};
use crate::data::loader::load_and_clean;
use crate::data::model::HousingDataset;
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Explorer session state
// ---------------------------------------------------------------------------

/// One exploration session: the loaded table plus the current filter.
/// The dataset is never mutated; `reload` swaps in a fresh one.
#[derive(Debug, Clone)]
pub struct ExplorerState {
    dataset: HousingDataset,

    /// File the dataset came from, used by `reload`.
    source: PathBuf,

    criteria: FilterCriteria,

    /// Indices of records passing `criteria` (cached).
    visible_indices: Vec<usize>,
}

impl ExplorerState {
    /// Start a session over an already loaded dataset with nothing filtered.
    pub fn new(dataset: HousingDataset, source: impl Into<PathBuf>) -> Self {
        let criteria = FilterCriteria::all(&dataset);
        let mut state = ExplorerState {
            dataset,
            source: source.into(),
            criteria,
            visible_indices: Vec::new(),
        };
        state.refilter();
        state
    }

    /// Load `path` and start a session over it.
    pub fn open(path: &Path) -> Result<Self, LoadError> {
        Ok(Self::new(load_and_clean(path)?, path))
    }

    /// Re-read the source file. Types that disappeared are dropped from the
    /// selection; new ones are selected. On error the old data stays.
    pub fn reload(&mut self) -> Result<(), LoadError> {
        let dataset = load_and_clean(&self.source)?;
        let previous = &self.dataset.property_types;
        let kept: Vec<String> = dataset
            .property_types
            .iter()
            .filter(|t| !previous.contains(*t) || self.criteria.selected_types.contains(*t))
            .cloned()
            .collect();
        self.criteria.selected_types = kept.into_iter().collect();
        self.dataset = dataset;
        self.refilter();
        Ok(())
    }

    pub fn dataset(&self) -> &HousingDataset {
        &self.dataset
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Records passing the current filter.
    pub fn view(&self) -> FilteredView<'_> {
        FilteredView::from_indices(&self.dataset, &self.visible_indices)
    }

    /// Replace the whole filter.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.refilter();
    }

    /// Toggle a single property type in the selection.
    pub fn toggle_type(&mut self, property_type: &str) {
        let selected = &mut self.criteria.selected_types;
        if !selected.remove(property_type) {
            selected.insert(property_type.to_string());
        }
        self.refilter();
    }

    pub fn select_all_types(&mut self) {
        self.criteria.selected_types = self.dataset.property_types.clone();
        self.refilter();
    }

    pub fn select_no_types(&mut self) {
        self.criteria.selected_types.clear();
        self.refilter();
    }

    pub fn set_bedrooms(&mut self, lo: u32, hi: u32) {
        self.criteria.set_bedrooms(lo, hi);
        self.refilter();
    }

    pub fn set_bathrooms(&mut self, lo: f64, hi: f64) {
        self.criteria.set_bathrooms(lo, hi);
        self.refilter();
    }

    pub fn set_years(&mut self, lo: i32, hi: i32) {
        self.criteria.set_years(lo, hi);
        self.refilter();
    }

    /// Recompute `visible_indices` after a filter change.
    fn refilter(&mut self) {
        self.visible_indices = filtered_indices(&self.dataset, &self.criteria);
        log::debug!(
            "{} of {} properties match",
            self.visible_indices.len(),
            self.dataset.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TABLE: &str = "propertyType,bedrooms,bathrooms,yearBuilt\n\
                         Condo,2,1,1985\n\
                         Single Family,4,2.5,1920\n\
                         Condo,1,1,2010\n";

    fn write_table(file: &tempfile::NamedTempFile, content: &str) {
        file.as_file().set_len(0).unwrap();
        let mut handle = file.reopen().unwrap();
        handle.write_all(content.as_bytes()).unwrap();
    }

    fn session() -> (tempfile::NamedTempFile, ExplorerState) {
        let file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write_table(&file, TABLE);
        let state = ExplorerState::open(file.path()).unwrap();
        (file, state)
    }

    #[test]
    fn starts_unfiltered() {
        let (_file, state) = session();
        assert_eq!(state.view().len(), 3);
        assert_eq!(state.criteria().selected_types.len(), 2);
    }

    #[test]
    fn filter_changes_recompute_view() {
        let (_file, mut state) = session();
        state.toggle_type("Single Family");
        assert_eq!(state.view().len(), 2);
        state.set_bedrooms(2, 10);
        assert_eq!(state.view().len(), 1);
        state.select_no_types();
        assert!(state.view().is_empty());
        state.select_all_types();
        state.set_years(1600, 2025);
        state.set_bathrooms(2.0, 10.0);
        assert_eq!(state.view().len(), 1);
        assert_eq!(state.view().records()[0].property_type, "Single Family");
    }

    #[test]
    fn toggle_twice_restores_selection() {
        let (_file, mut state) = session();
        state.toggle_type("Condo");
        state.toggle_type("Condo");
        assert_eq!(state.view().len(), 3);
    }

    #[test]
    fn reload_picks_up_new_rows_and_keeps_deselection() {
        let (file, mut state) = session();
        state.toggle_type("Single Family");

        write_table(&file, &format!("{TABLE}Townhouse,3,2,2001\nSingle Family,3,2,1950\n"));
        state.reload().unwrap();

        assert_eq!(state.dataset().len(), 5);
        let kinds: Vec<&str> = state.view().iter().map(|r| r.property_type.as_str()).collect();
        assert_eq!(kinds, vec!["Condo", "Condo", "Townhouse"]);
    }

    #[test]
    fn failed_reload_keeps_old_data() {
        let (file, mut state) = session();
        let path = file.path().to_path_buf();
        drop(file);
        assert!(matches!(state.reload(), Err(LoadError::FileNotFound { .. })));
        assert_eq!(state.dataset().len(), 3);
        assert_eq!(state.source(), path.as_path());
    }
}
