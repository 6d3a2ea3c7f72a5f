// Numeric status boxes with alarm thresholds
use super::format::{scaled, significant};
use crate::domain::alarm::{AlarmSetting, AlarmTrigger};
use crate::domain::cache::LastValueCache;
use crate::domain::catalog::{Catalog, MeasurementMeta};
use crate::domain::fragment::{Label, StatusBox, Tone};
use crate::domain::series::{SeriesId, Snapshot};

const DIGITS: usize = 3;
const NO_VALUE: &str = "--";

pub fn render_status_boxes(
    snapshot: &Snapshot,
    cache: &LastValueCache,
    catalog: &Catalog,
    ids: &[SeriesId],
) -> Vec<StatusBox> {
    ids.iter()
        .map(|id| render_status_box(snapshot, cache, catalog.measurement(id).ok(), id))
        .collect()
}

fn render_status_box(
    snapshot: &Snapshot,
    cache: &LastValueCache,
    meta: Option<&MeasurementMeta>,
    id: &str,
) -> StatusBox {
    let (current, stale) = match snapshot.last(id) {
        Some(sample) => (Some(sample.value), false),
        None => (cache.value(id), cache.value(id).is_some()),
    };

    let setting = related_value(cache, meta.and_then(|m| m.alarm_set_key.as_deref()))
        .and_then(AlarmSetting::from_code)
        .unwrap_or_default();
    let trigger = related_value(cache, meta.and_then(|m| m.alarm_triggered_key.as_deref()))
        .and_then(AlarmTrigger::from_code)
        .unwrap_or_default();

    let low_limit = if setting.shows_low() {
        related_value(cache, meta.and_then(|m| m.low_alarm_key.as_deref())).map(|v| {
            Label::new(
                format!("lower limit: {}", significant(v, DIGITS)),
                tone(trigger == AlarmTrigger::Low),
            )
        })
    } else {
        None
    };
    let high_limit = if setting.shows_high() {
        related_value(cache, meta.and_then(|m| m.high_alarm_key.as_deref())).map(|v| {
            Label::new(
                format!("upper limit: {}", significant(v, DIGITS)),
                tone(trigger == AlarmTrigger::High),
            )
        })
    } else {
        None
    };

    let value_text = match (current, meta) {
        (Some(v), Some(meta)) => scaled(v, meta.range, DIGITS),
        (Some(v), None) => significant(v, DIGITS),
        (None, _) => NO_VALUE.to_string(),
    };

    let series = snapshot.get(id);

    StatusBox {
        series: id.to_string(),
        title: meta.map(MeasurementMeta::title).unwrap_or_else(|| id.to_string()),
        value: Label::new(value_text, tone(trigger != AlarmTrigger::None)),
        stale,
        low_limit,
        high_limit,
        mean: series.and_then(|s| s.mean()).map(|v| significant(v, DIGITS)),
        max: series.and_then(|s| s.max()).map(|v| significant(v, DIGITS)),
    }
}

fn related_value(cache: &LastValueCache, key: Option<&str>) -> Option<f64> {
    key.and_then(|k| cache.value(k))
}

fn tone(alert: bool) -> Tone {
    if alert { Tone::Alert } else { Tone::Normal }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::{Sample, SeriesSnapshot};
    use std::collections::HashMap;

    fn meta(name: &str, suffix: &str, range: [f64; 2]) -> MeasurementMeta {
        MeasurementMeta {
            display_name: name.to_string(),
            unit: "mBar".to_string(),
            range,
            min_key: None,
            max_key: None,
            low_alarm_key: Some(format!("LA{suffix}")),
            high_alarm_key: Some(format!("HA{suffix}")),
            alarm_set_key: Some(format!("SA{suffix}")),
            alarm_triggered_key: Some(format!("TA{suffix}")),
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(
            HashMap::from([
                ("DMpeep".to_string(), meta("PEEP", "peep", [0.0, 60.0])),
                ("DMflow".to_string(), meta("Flow", "flow", [-400.0, 400.0])),
            ]),
            HashMap::new(),
        )
    }

    fn snapshot(entries: &[(&str, &[(f64, f64)])]) -> Snapshot {
        entries
            .iter()
            .map(|(id, samples)| {
                let samples = samples.iter().map(|&(t, v)| Sample::new(t, v)).collect();
                (id.to_string(), SeriesSnapshot::new(samples))
            })
            .collect()
    }

    fn cache_of(snapshot: &Snapshot) -> LastValueCache {
        let mut cache = LastValueCache::new();
        cache.update(snapshot);
        cache
    }

    fn render(snapshot: &Snapshot, cache: &LastValueCache, id: &str) -> StatusBox {
        render_status_boxes(snapshot, cache, &catalog(), &[id.to_string()]).remove(0)
    }

    #[test]
    fn test_value_mean_and_max() {
        let snapshot = snapshot(&[("DMflow", &[(-2.0, 10.0), (-1.0, 12.0), (0.0, 14.0)])]);
        let status = render(&snapshot, &cache_of(&snapshot), "DMflow");

        assert_eq!(status.title, "Flow [mBar]");
        assert_eq!(status.value, Label::new("14".to_string(), Tone::Normal));
        assert_eq!(status.mean.as_deref(), Some("12"));
        assert_eq!(status.max.as_deref(), Some("14"));
        assert!(!status.stale);
        assert_eq!(status.low_limit, None);
        assert_eq!(status.high_limit, None);
    }

    #[test]
    fn test_high_alarm_setting_shows_upper_limit_only() {
        let snapshot = snapshot(&[
            ("DMpeep", &[(-0.1, 5.0)]),
            ("SApeep", &[(-0.1, 2.0)]),
            ("HApeep", &[(-0.1, 40.0)]),
            ("LApeep", &[(-0.1, 3.0)]),
        ]);
        let status = render(&snapshot, &cache_of(&snapshot), "DMpeep");

        assert_eq!(status.high_limit, Some(Label::new("upper limit: 40".to_string(), Tone::Normal)));
        assert_eq!(status.low_limit, None);
    }

    #[test]
    fn test_both_setting_with_missing_threshold_leaves_placeholder() {
        let snapshot = snapshot(&[("DMpeep", &[(-0.1, 5.0)]), ("SApeep", &[(-0.1, 3.0)]), ("LApeep", &[(-0.1, 2.5)])]);
        let status = render(&snapshot, &cache_of(&snapshot), "DMpeep");

        assert_eq!(status.low_limit, Some(Label::new("lower limit: 2.5".to_string(), Tone::Normal)));
        assert_eq!(status.high_limit, None);
    }

    #[test]
    fn test_missing_or_unknown_setting_defaults_to_none() {
        let snapshot = snapshot(&[("DMpeep", &[(-0.1, 5.0)]), ("LApeep", &[(-0.1, 2.0)]), ("HApeep", &[(-0.1, 40.0)])]);
        let status = render(&snapshot, &cache_of(&snapshot), "DMpeep");
        assert_eq!((status.low_limit, status.high_limit), (None, None));

        let mut with_bad_code = snapshot.clone();
        with_bad_code.insert("SApeep".to_string(), SeriesSnapshot::new(vec![Sample::new(-0.1, 9.0)]));
        let status = render(&with_bad_code, &cache_of(&with_bad_code), "DMpeep");
        assert_eq!((status.low_limit, status.high_limit), (None, None));
    }

    #[test]
    fn test_triggered_low_highlights_value_and_lower_limit() {
        let snapshot = snapshot(&[
            ("DMpeep", &[(-0.1, 1.5)]),
            ("SApeep", &[(-0.1, 3.0)]),
            ("LApeep", &[(-0.1, 2.0)]),
            ("HApeep", &[(-0.1, 40.0)]),
            ("TApeep", &[(-0.1, 1.0)]),
        ]);
        let status = render(&snapshot, &cache_of(&snapshot), "DMpeep");

        assert_eq!(status.value.tone, Tone::Alert);
        assert_eq!(status.low_limit.map(|l| l.tone), Some(Tone::Alert));
        assert_eq!(status.high_limit.map(|l| l.tone), Some(Tone::Normal));
    }

    #[test]
    fn test_triggered_without_configured_threshold() {
        let snapshot = snapshot(&[("DMpeep", &[(-0.1, 50.0)]), ("TApeep", &[(-0.1, 2.0)])]);
        let status = render(&snapshot, &cache_of(&snapshot), "DMpeep");

        assert_eq!(status.value.tone, Tone::Alert);
        assert_eq!(status.high_limit, None);
    }

    #[test]
    fn test_empty_window_falls_back_to_cached_value() {
        let earlier = snapshot(&[("DMpeep", &[(-0.1, 5.0)])]);
        let cache = cache_of(&earlier);
        let now = snapshot(&[("DMpeep", &[])]);

        let status = render(&now, &cache, "DMpeep");
        assert_eq!(status.value.text, "5.0");
        assert!(status.stale);
        assert_eq!(status.mean, None);
        assert_eq!(status.max, None);
    }

    #[test]
    fn test_never_seen_series_renders_placeholder() {
        let status = render(&Snapshot::new(), &LastValueCache::new(), "DMtvol");
        assert_eq!(status.title, "DMtvol");
        assert_eq!(status.value.text, "--");
        assert!(!status.stale);
    }
}
