// Gauge indicators for user-set parameters
use crate::domain::catalog::Catalog;
use crate::domain::fragment::Gauge;
use crate::domain::series::{SeriesId, Snapshot};

pub fn render_gauges(snapshot: &Snapshot, catalog: &Catalog, ids: &[SeriesId]) -> Vec<Gauge> {
    ids.iter()
        .map(|id| {
            let value = snapshot.last(id).map(|s| s.value);

            match catalog.parameter(id) {
                Ok(meta) => {
                    let bound = |key: &Option<SeriesId>| {
                        key.as_deref().and_then(|k| snapshot.last(k)).map(|s| s.value)
                    };
                    let band = match (bound(&meta.min_key), bound(&meta.max_key)) {
                        (Some(lo), Some(hi)) => Some([lo.min(hi), lo.max(hi)]),
                        _ => None,
                    };

                    Gauge {
                        series: id.clone(),
                        title: meta.title(),
                        value,
                        scale: Some(meta.total_range),
                        band,
                    }
                }
                Err(_) => Gauge {
                    series: id.clone(),
                    title: id.clone(),
                    value,
                    scale: None,
                    band: None,
                },
            }
        })
        .collect()
}
