use std::collections::VecDeque;

use crate::telemetry::TelemetrySample;

pub type SeriesPoints = Vec<[f64; 2]>;

/// One chart series per sample field, x is the position in the live window.
/// Missing values are plotted as 0.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LiveSeries {
    pub speed: SeriesPoints,
    pub throttle: SeriesPoints,
    pub brake: SeriesPoints,
    pub gear: SeriesPoints,
    pub rpm: SeriesPoints,
}

impl LiveSeries {
    pub fn from_snapshot(snapshot: &VecDeque<TelemetrySample>) -> Self {
        let mut series = Self {
            speed: Vec::with_capacity(snapshot.len()),
            throttle: Vec::with_capacity(snapshot.len()),
            brake: Vec::with_capacity(snapshot.len()),
            gear: Vec::with_capacity(snapshot.len()),
            rpm: Vec::with_capacity(snapshot.len()),
        };

        for (idx, sample) in snapshot.iter().enumerate() {
            let x = idx as f64;
            series.speed.push([x, sample.speed_or_zero() as f64]);
            series.throttle.push([x, sample.throttle_or_zero() as f64]);
            series.brake.push([x, sample.brake_or_zero() as f64]);
            series.gear.push([x, sample.gear_or_neutral() as f64]);
            series.rpm.push([x, sample.rpm_or_zero() as f64]);
        }
        series
    }

    pub fn len(&self) -> usize {
        self.speed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speed.is_empty()
    }
}

/// The stat cards shown above the live charts, taken from the newest sample.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveReadout {
    pub speed: String,
    pub throttle: String,
    pub brake: String,
    pub gear: String,
    pub rpm: String,
}

impl LiveReadout {
    pub fn from_sample(sample: Option<&TelemetrySample>) -> Self {
        let empty = TelemetrySample::default();
        let sample = sample.unwrap_or(&empty);
        Self {
            speed: format!("{:.1}", sample.speed_or_zero()),
            throttle: format!("{:.0}", sample.throttle_or_zero()),
            brake: format!("{:.0}", sample.brake_or_zero()),
            gear: sample.gear_or_neutral().to_string(),
            rpm: format!("{:.0}", sample.rpm_or_zero()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_throttle_renders_zero() {
        let sample: TelemetrySample = serde_json::from_str(r#"{"speed": 200}"#).unwrap();
        let snapshot = VecDeque::from(vec![sample]);
        let series = LiveSeries::from_snapshot(&snapshot);

        assert_eq!(series.speed, vec![[0., 200.]]);
        assert_eq!(series.throttle, vec![[0., 0.]]);
        assert_eq!(series.brake, vec![[0., 0.]]);
        assert_eq!(series.rpm, vec![[0., 0.]]);
    }

    #[test]
    fn test_series_are_indexed_by_position() {
        let snapshot: VecDeque<TelemetrySample> = (0..3)
            .map(|i| TelemetrySample {
                speed: Some(100. + i as f32),
                gear: Some(i - 1),
                ..Default::default()
            })
            .collect();
        let series = LiveSeries::from_snapshot(&snapshot);

        assert_eq!(series.len(), 3);
        assert_eq!(series.speed, vec![[0., 100.], [1., 101.], [2., 102.]]);
        assert_eq!(series.gear, vec![[0., -1.], [1., 0.], [2., 1.]]);
    }

    #[test]
    fn test_readout_formats_newest_sample() {
        let sample = TelemetrySample {
            speed: Some(212.46),
            throttle: Some(99.6),
            brake: None,
            gear: Some(5),
            rpm: Some(7421.3),
        };
        let readout = LiveReadout::from_sample(Some(&sample));
        assert_eq!(readout.speed, "212.5");
        assert_eq!(readout.throttle, "100");
        assert_eq!(readout.brake, "0");
        assert_eq!(readout.gear, "5");
        assert_eq!(readout.rpm, "7421");
    }

    #[test]
    fn test_readout_without_samples_is_zero() {
        let readout = LiveReadout::from_sample(None);
        assert_eq!(readout.speed, "0.0");
        assert_eq!(readout.gear, "0");
    }
}
