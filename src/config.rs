use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::data::filter::{FilterCriteria, BATHROOM_BOUNDS, BEDROOM_BOUNDS, YEAR_BOUNDS};
use crate::data::model::HousingDataset;

/// Explore a municipal housing table: filter it and print chart-ready views
/// as JSON.
#[derive(Debug, Clone, Parser)]
#[command(name = "housing-explorer", version, about)]
pub struct Config {
    /// Property table (CSV, or TSV by extension)
    #[arg(long, env = "HOUSING_DATA", default_value = "table.csv")]
    pub data: PathBuf,

    /// Optional notes shown on the `notes` page
    #[arg(long, env = "HOUSING_NOTES", default_value = "todo.md")]
    pub notes: PathBuf,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Page to render (default: summary)
    #[command(subcommand)]
    pub page: Option<Page>,
}

impl Config {
    pub fn page(&self) -> Page {
        self.page.clone().unwrap_or(Page::Summary)
    }
}

/// Sidebar filters. Values outside the slider bounds are clamped.
#[derive(Debug, Clone, Args)]
pub struct FilterArgs {
    /// Property type to keep; repeat for several. All types when omitted.
    #[arg(long = "type", value_name = "TYPE", global = true)]
    pub types: Vec<String>,

    /// Keep no property types at all
    #[arg(long, conflicts_with = "types", global = true)]
    pub no_types: bool,

    #[arg(long, global = true, default_value_t = *BEDROOM_BOUNDS.start())]
    pub min_bedrooms: u32,

    #[arg(long, global = true, default_value_t = *BEDROOM_BOUNDS.end())]
    pub max_bedrooms: u32,

    #[arg(long, global = true, default_value_t = *BATHROOM_BOUNDS.start())]
    pub min_bathrooms: f64,

    #[arg(long, global = true, default_value_t = *BATHROOM_BOUNDS.end())]
    pub max_bathrooms: f64,

    #[arg(long, global = true, default_value_t = *YEAR_BOUNDS.start())]
    pub min_year: i32,

    #[arg(long, global = true, default_value_t = *YEAR_BOUNDS.end())]
    pub max_year: i32,
}

impl FilterArgs {
    pub fn criteria(&self, dataset: &HousingDataset) -> FilterCriteria {
        let base = if self.no_types {
            FilterCriteria::for_types(Vec::<String>::new())
        } else if self.types.is_empty() {
            FilterCriteria::all(dataset)
        } else {
            for t in self.types.iter().filter(|t| !dataset.property_types.contains(*t)) {
                log::warn!("property type '{t}' does not occur in the data");
            }
            FilterCriteria::for_types(self.types.iter().cloned())
        };
        base.with_bedrooms(self.min_bedrooms, self.max_bedrooms)
            .with_bathrooms(self.min_bathrooms, self.max_bathrooms)
            .with_years(self.min_year, self.max_year)
    }
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Page {
    /// Totals, year range and per-type counts
    Summary,
    /// Property type shares with pie label layout
    Pie,
    /// Properties per year and type over the last N years
    ByYear {
        /// Number of most recent years (default: 50, capped to the data)
        #[arg(long)]
        window: Option<u32>,
    },
    /// Bedroom and bathroom histograms
    Rooms,
    /// Square footage against year built
    Sqft,
    /// Average property tax per tax year
    Taxes,
    /// Coordinates for the map
    Map,
    /// Contents of the notes file
    Notes,
    /// Write the filtered table as CSV
    Export {
        #[arg(long)]
        out: PathBuf,
    },
}
