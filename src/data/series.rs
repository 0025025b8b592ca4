//! Chart-ready series built from fetched streams.

use instrument_types::ValueStream;
use serde::Serialize;

/// One line on the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    /// The stream's identifier string, verbatim.
    pub label: String,
    /// `(timestamp_ms, value)` in the order the store returned them.
    pub data: Vec<(f64, f64)>,
}

impl ChartSeries {
    /// Convert one stream. Samples without a numeric value are not plotted.
    pub fn from_stream(stream: &ValueStream) -> Self {
        Self {
            label: stream.variable.clone(),
            data: stream
                .value
                .iter()
                .filter_map(|v| v.double_value.map(|d| (v.timestamp as f64, d)))
                .collect(),
        }
    }
}

/// Convert every stream of a Get response, preserving order.
pub fn series_from_streams(streams: &[ValueStream]) -> Vec<ChartSeries> {
    streams.iter().map(ChartSeries::from_stream).collect()
}

/// Smallest and largest timestamp across all series.
pub fn time_extent(series: &[ChartSeries]) -> Option<(f64, f64)> {
    let mut points = series.iter().flat_map(|s| s.data.iter().map(|(t, _)| *t));
    let first = points.next()?;
    Some(points.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t))))
}

/// Largest value across all series, ignoring NaN.
pub fn value_max(series: &[ChartSeries]) -> Option<f64> {
    series
        .iter()
        .flat_map(|s| s.data.iter().map(|(_, v)| *v))
        .filter(|v| !v.is_nan())
        .reduce(f64::max)
}

/// Round to one decimal place.
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Format an octets-per-second value as a bit rate.
///
/// The value is multiplied by 8, then scaled by powers of 1024:
/// below 1024 is `bps`, then `Kbps`, `Mbps` and `Gbps`.
pub fn format_bps(octets_per_sec: f64) -> String {
    const K: f64 = 1024.0;
    let bits = octets_per_sec * 8.0;
    if bits < K {
        format!("{}bps", round1(bits))
    } else if bits < K * K {
        format!("{}Kbps", round1(bits / K))
    } else if bits < K * K * K {
        format!("{}Mbps", round1(bits / K / K))
    } else {
        format!("{}Gbps", round1(bits / K / K / K))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use instrument_types::Value;

    fn stream(variable: &str, points: &[(u64, f64)]) -> ValueStream {
        ValueStream {
            variable: variable.to_string(),
            value: points.iter().map(|&(t, v)| Value::double(t, v)).collect(),
        }
    }

    #[test]
    fn series_keep_order_and_labels() {
        let streams = vec![
            stream("m{hostname=a,interface=x}", &[(2000, 5.0), (1000, 7.0)]),
            stream("m{hostname=a,interface=y}", &[(1000, 1.0), (2000, 2.0)]),
        ];

        let series = series_from_streams(&streams);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].label, "m{hostname=a,interface=x}");
        assert_eq!(series[0].data, vec![(2000.0, 5.0), (1000.0, 7.0)]);
        assert_eq!(series[1].label, "m{hostname=a,interface=y}");
        assert_eq!(series[1].data, vec![(1000.0, 1.0), (2000.0, 2.0)]);
    }

    #[test]
    fn string_samples_are_skipped() {
        let mut s = stream("m", &[(1000, 1.0)]);
        s.value.push(Value {
            timestamp: 2000,
            string_value: Some("up".to_string()),
            ..Default::default()
        });
        assert_eq!(ChartSeries::from_stream(&s).data.len(), 1);
    }

    #[test]
    fn extent_spans_all_series() {
        let series = series_from_streams(&[
            stream("a", &[(3000, 1.0), (5000, 9.0)]),
            stream("b", &[(1000, 4.0)]),
        ]);
        assert_eq!(time_extent(&series), Some((1000.0, 5000.0)));
        assert_eq!(value_max(&series), Some(9.0));
        assert_eq!(time_extent(&[]), None);
    }

    #[test]
    fn bps_units() {
        assert_eq!(format_bps(0.0), "0bps");
        assert_eq!(format_bps(100.0), "800bps");
        assert_eq!(format_bps(128.0), "1Kbps");
        assert_eq!(format_bps(1920.0), "15Kbps");
        assert_eq!(format_bps(131_072.0), "1Mbps");
        assert_eq!(format_bps(134_217_728.0), "1Gbps");
    }

    #[test]
    fn bps_rounds_to_one_decimal() {
        assert_eq!(format_bps(200.0), "1.6Kbps");
        assert_eq!(format_bps(0.1), "0.8bps");
    }
}
