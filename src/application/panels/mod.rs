// Panel renderers - pure functions from a snapshot to UI fragments
pub mod chart;
pub mod format;
pub mod gauge;
pub mod machine;
pub mod status;

use crate::domain::cache::LastValueCache;
use crate::domain::catalog::Catalog;
use crate::domain::fragment::Dashboard;
use crate::domain::layout::Layout;
use crate::domain::series::Snapshot;

/// Static inputs shared by every renderer
#[derive(Debug, Clone)]
pub struct Panels {
    pub layout: Layout,
    pub catalog: Catalog,
    pub mode: String,
    pub window_secs: f64,
}

impl Panels {
    pub fn render(&self, snapshot: &Snapshot, cache: &LastValueCache) -> Dashboard {
        Dashboard {
            chart: chart::render_chart(snapshot, &self.catalog, &self.layout.plot, self.window_secs),
            side_bar: status::render_status_boxes(snapshot, cache, &self.catalog, &self.layout.side_bar),
            bottom_bar: gauge::render_gauges(
                snapshot,
                &self.catalog,
                self.layout.bottom_bar_for(&self.mode),
            ),
            machine_status: machine::render_machine_status(snapshot),
        }
    }
}
