// Time-series chart panel
use crate::domain::catalog::Catalog;
use crate::domain::fragment::{Axis, ChartPanel, Trace};
use crate::domain::layout::PlotConfig;
use crate::domain::series::Snapshot;

/// One trace per plotted series against a shared `[-window_secs, 0]` axis.
/// Y-axis titles and ranges come from metadata so the scale never jumps
/// between ticks.
pub fn render_chart(
    snapshot: &Snapshot,
    catalog: &Catalog,
    plots: &[PlotConfig],
    window_secs: f64,
) -> ChartPanel {
    let traces = plots
        .iter()
        .map(|plot| {
            let (x, y) = snapshot
                .get(&plot.id)
                .map(|series| (series.times(), series.values()))
                .unwrap_or_default();

            let y_axis = match catalog.measurement(&plot.id) {
                Ok(meta) => Axis {
                    title: Some(meta.title()),
                    range: Some(meta.range),
                },
                Err(_) => Axis {
                    title: Some(plot.id.clone()),
                    range: None,
                },
            };

            Trace {
                series: plot.id.clone(),
                color: plot.color.clone(),
                fill_color: plot.fill_color.clone(),
                x,
                y,
                y_axis,
            }
        })
        .collect();

    ChartPanel {
        x_axis: Axis {
            title: Some("time [s]".to_string()),
            range: Some([-window_secs, 0.0]),
        },
        traces,
    }
}
