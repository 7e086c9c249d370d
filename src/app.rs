use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::json;

use crate::config::{Config, Page};
use crate::data::loader::write_csv;
use crate::notes::read_notes;
use crate::state::ExplorerState;
use crate::views::{by_year, charts, distribution, geo, rooms, summary};

// ---------------------------------------------------------------------------
// Headless explorer
// ---------------------------------------------------------------------------

pub struct ExplorerApp {
    pub state: ExplorerState,
    pub notes_path: PathBuf,
}

impl ExplorerApp {
    /// Load the configured table and apply the configured filters. A missing
    /// or unparseable table is fatal.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut state = ExplorerState::open(&config.data)
            .with_context(|| format!("cannot start without {}", config.data.display()))?;
        let criteria = config.filter.criteria(state.dataset());
        state.set_criteria(criteria);

        Ok(ExplorerApp {
            state,
            notes_path: config.notes.clone(),
        })
    }

    /// Render one page to `out`. Views are printed as pretty JSON.
    pub fn render<W: Write>(&self, page: &Page, mut out: W) -> Result<()> {
        let view = self.state.view();
        log::debug!("rendering {page:?} over {} properties", view.len());

        let body = match page {
            Page::Summary => serde_json::to_value(summary::summary(&view))?,
            Page::Pie => {
                let dist = distribution::type_distribution(&view);
                json!({ "labels": dist.pie_layout(), "distribution": dist })
            }
            Page::ByYear { window } => {
                let window = window.unwrap_or_else(|| by_year::default_window(&view));
                serde_json::to_value(by_year::year_type_counts(&view, window)?)?
            }
            Page::Rooms => json!({
                "bedrooms": rooms::bedroom_counts(&view),
                "bathrooms": rooms::bathroom_counts(&view),
            }),
            Page::Sqft => serde_json::to_value(charts::square_footage_by_year(&view))?,
            Page::Taxes => serde_json::to_value(charts::average_tax_by_year(&view))?,
            Page::Map => {
                let points = geo::geo_points(&view);
                json!({ "center": points.center(), "points": points.points, "dropped": points.dropped })
            }
            Page::Notes => serde_json::to_value(read_notes(&self.notes_path))?,
            Page::Export { out: path } => {
                let file = File::create(path)
                    .with_context(|| format!("creating {}", path.display()))?;
                write_csv(&self.state.dataset().columns, view.iter(), file)
                    .with_context(|| format!("writing {}", path.display()))?;
                log::info!("exported {} properties to {}", view.len(), path.display());
                json!({ "exported": view.len(), "path": path.display().to_string() })
            }
        };

        serde_json::to_writer_pretty(&mut out, &body)?;
        writeln!(out)?;
        Ok(())
    }
}

/// Load, filter, and print the configured page to stdout.
pub fn run(config: &Config) -> Result<()> {
    let app = ExplorerApp::from_config(config)?;
    let stdout = std::io::stdout();
    app.render(&config.page(), stdout.lock())
}
