// Chart and table rows derived from backend payloads

use itertools::Itertools;

use crate::api::{Lap, LapComparison, SessionAnalysis};
use crate::live::SeriesPoints;

use super::format::{format_lap_time, format_top_speed, sector_label};

pub const SECTOR_KEYS: [&str; 3] = ["sector_1", "sector_2", "sector_3"];

/// Lap time per lap number. Laps without a time are left out; personal bests are
/// repeated in their own series so they can be highlighted.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LapTimeSeries {
    pub lap_times: SeriesPoints,
    pub personal_bests: SeriesPoints,
}

impl LapTimeSeries {
    pub fn from_laps(laps: &[Lap]) -> Self {
        let mut series = Self::default();
        for lap in laps {
            let Some(lap_time) = lap.lap_time.filter(|t| t.is_finite()) else {
                continue;
            };
            let point = [lap.lap_number as f64, lap_time];
            series.lap_times.push(point);
            if lap.is_personal_best {
                series.personal_bests.push(point);
            }
        }
        series
    }

    /// Tooltip for a lap, e.g. `Lap 4: 1:42.310 (PB)`.
    pub fn label(lap: &Lap) -> String {
        format!(
            "Lap {}: {}{}",
            lap.lap_number,
            format_lap_time(lap.lap_time),
            if lap.is_personal_best { " (PB)" } else { "" }
        )
    }
}

/// Best and average time of sectors 1 to 3; missing values are 0.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SectorBars {
    pub best: [f64; 3],
    pub average: [f64; 3],
}

impl SectorBars {
    pub fn from_analysis(analysis: &SessionAnalysis) -> Option<Self> {
        let sectors = analysis.sector_analysis.as_ref()?;
        let mut bars = Self::default();
        for (idx, key) in SECTOR_KEYS.iter().enumerate() {
            if let Some(stats) = sectors.get(*key) {
                bars.best[idx] = stats.best_time.unwrap_or(0.);
                bars.average[idx] = stats.average_time.unwrap_or(0.);
            }
        }
        Some(bars)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectorDetailRow {
    pub label: String,
    pub best: String,
    pub average: String,
    pub worst: String,
}

pub fn sector_details(analysis: &SessionAnalysis) -> Vec<SectorDetailRow> {
    analysis
        .sector_analysis
        .iter()
        .flatten()
        .map(|(key, stats)| SectorDetailRow {
            label: sector_label(key),
            best: format_lap_time(stats.best_time),
            average: format_lap_time(stats.average_time),
            worst: format_lap_time(stats.worst_time),
        })
        .collect_vec()
}

#[derive(Debug, Clone, PartialEq)]
pub struct LapRow {
    pub lap_number: u32,
    pub lap_time: String,
    pub sectors: [String; 3],
    pub top_speed: String,
    pub is_personal_best: bool,
    pub is_valid: bool,
    pub is_selected: bool,
}

pub fn lap_rows(laps: &[Lap], selected: &[crate::api::RecordId]) -> Vec<LapRow> {
    laps.iter()
        .map(|lap| LapRow {
            lap_number: lap.lap_number,
            lap_time: format_lap_time(lap.lap_time),
            sectors: lap.sector_times().map(format_lap_time),
            top_speed: format_top_speed(lap.top_speed),
            is_personal_best: lap.is_personal_best,
            is_valid: lap.is_valid,
            is_selected: selected.contains(&lap.id),
        })
        .collect_vec()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub username: String,
    pub lap_number: u32,
    pub lap_time: String,
    pub sectors: [String; 3],
    pub top_speed: String,
    pub is_fastest: bool,
}

pub fn comparison_rows(comparison: &LapComparison) -> Vec<ComparisonRow> {
    comparison
        .laps
        .iter()
        .map(|lap| ComparisonRow {
            username: lap.username.clone(),
            lap_number: lap.lap_number,
            lap_time: format_lap_time(lap.lap_time),
            sectors: [0, 1, 2].map(|idx| {
                if lap.sectors.get(idx).is_some() {
                    format_lap_time(lap.sector_time(idx))
                } else {
                    "N/A".to_string()
                }
            }),
            top_speed: format_top_speed(lap.top_speed),
            is_fastest: comparison.analysis.fastest_lap.as_ref() == Some(&lap.id),
        })
        .collect_vec()
}

/// `(sector label, fastest driver, time)` for every compared sector.
pub fn sector_leaders(comparison: &LapComparison) -> Vec<(String, String, String)> {
    comparison
        .analysis
        .sector_comparison
        .iter()
        .map(|(key, leader)| {
            (
                sector_label(key),
                leader.fastest.username.clone(),
                format_lap_time(leader.fastest.time),
            )
        })
        .collect_vec()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::api::{
        ComparedLap, ComparedSector, ComparisonAnalysis, RecordId, SectorLeader,
        SectorLeaderEntry, SectorStats,
    };

    fn lap(id: i64, lap_number: u32, lap_time: Option<f64>, is_personal_best: bool) -> Lap {
        Lap {
            id: RecordId::from(id),
            lap_number,
            lap_time,
            is_personal_best,
            ..Default::default()
        }
    }

    #[test]
    fn test_lap_time_series_highlights_personal_best() {
        let laps = vec![
            lap(1, 1, Some(95.2), false),
            lap(2, 2, None, false),
            lap(3, 3, Some(93.1), true),
        ];
        let series = LapTimeSeries::from_laps(&laps);
        assert_eq!(series.lap_times, vec![[1., 95.2], [3., 93.1]]);
        assert_eq!(series.personal_bests, vec![[3., 93.1]]);
        assert_eq!(LapTimeSeries::label(&laps[2]), "Lap 3: 1:33.100 (PB)");
    }

    #[test]
    fn test_sector_bars_zero_fill() {
        let mut sectors = BTreeMap::new();
        sectors.insert(
            "sector_1".to_string(),
            SectorStats {
                best_time: Some(30.5),
                average_time: Some(31.),
                worst_time: Some(33.),
            },
        );
        sectors.insert(
            "sector_3".to_string(),
            SectorStats {
                best_time: None,
                average_time: Some(28.),
                worst_time: None,
            },
        );
        let analysis = SessionAnalysis {
            sector_analysis: Some(sectors),
            ..Default::default()
        };

        let bars = SectorBars::from_analysis(&analysis).unwrap();
        assert_eq!(bars.best, [30.5, 0., 0.]);
        assert_eq!(bars.average, [31., 0., 28.]);

        let details = sector_details(&analysis);
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].label, "SECTOR 1");
        assert_eq!(details[1].worst, "--:--:---");
    }

    #[test]
    fn test_no_sector_analysis() {
        let analysis = SessionAnalysis::default();
        assert!(SectorBars::from_analysis(&analysis).is_none());
        assert!(sector_details(&analysis).is_empty());
    }

    #[test]
    fn test_lap_rows_mark_selection() {
        let laps = vec![lap(1, 1, Some(95.2), false), lap(2, 2, Some(94.), true)];
        let rows = lap_rows(&laps, &[RecordId::from(2)]);
        assert!(!rows[0].is_selected);
        assert!(rows[1].is_selected);
        assert_eq!(rows[0].sectors[0], "--:--:---");
        assert_eq!(rows[1].top_speed, "N/A");
    }

    #[test]
    fn test_comparison_rows() {
        let mut sector_comparison = BTreeMap::new();
        sector_comparison.insert(
            "sector_2".to_string(),
            SectorLeader {
                fastest: SectorLeaderEntry {
                    username: "bia".to_string(),
                    time: Some(40.25),
                },
            },
        );
        let comparison = LapComparison {
            laps: vec![
                ComparedLap {
                    id: RecordId::from(10),
                    username: "ana".to_string(),
                    lap_number: 2,
                    lap_time: Some(100.),
                    sectors: vec![ComparedSector {
                        sector_time: Some(33.),
                    }],
                    top_speed: Some(250.),
                },
                ComparedLap {
                    id: RecordId::from(11),
                    username: "bia".to_string(),
                    lap_number: 5,
                    lap_time: Some(99.5),
                    sectors: Vec::new(),
                    top_speed: None,
                },
            ],
            analysis: ComparisonAnalysis {
                fastest_lap: Some(RecordId::from(11)),
                sector_comparison,
            },
        };

        let rows = comparison_rows(&comparison);
        assert_eq!(rows[0].sectors[0], "0:33.000");
        assert_eq!(rows[0].sectors[1], "N/A");
        assert!(!rows[0].is_fastest);
        assert!(rows[1].is_fastest);

        assert_eq!(
            sector_leaders(&comparison),
            vec![(
                "SECTOR 2".to_string(),
                "bia".to_string(),
                "0:40.250".to_string()
            )]
        );
    }
}
