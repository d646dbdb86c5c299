// Gauge and trend geometry
// Plain data in, plain data out; the terminal UI draws from these values

use crate::bmi::Category;
use crate::db::HistoryRecord;
use chrono::NaiveDateTime;

// ============================================================================
// GAUGE
// ============================================================================

/// Lowest BMI shown on the gauge
pub const GAUGE_MIN: f64 = 16.0;
/// Highest BMI shown on the gauge
pub const GAUGE_MAX: f64 = 40.0;

/// Segment boundaries, one more than the number of segments
const GAUGE_STOPS: [f64; 5] = [GAUGE_MIN, 18.5, 25.0, 30.0, GAUGE_MAX];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentColor {
    Red,
    Yellow,
    Green,
    Orange,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeSegment {
    pub start: f64,
    pub end: f64,
    pub category: Category,
    pub color: SegmentColor,
    pub label: &'static str,
}

impl GaugeSegment {
    /// Angles in degrees; 90 is the top of the half circle, -90 the right end
    pub fn start_angle(&self) -> f64 {
        angle_for(self.start)
    }

    pub fn end_angle(&self) -> f64 {
        angle_for(self.end)
    }

    pub fn span(&self) -> f64 {
        self.end - self.start
    }
}

/// The four colored bands, low to high
pub fn gauge_segments() -> [GaugeSegment; 4] {
    let colors = [
        SegmentColor::Red,
        SegmentColor::Yellow,
        SegmentColor::Green,
        SegmentColor::Orange,
    ];
    let labels = ["Underweight", "Normal", "Overweight", "Obesity"];

    std::array::from_fn(|i| GaugeSegment {
        start: GAUGE_STOPS[i],
        end: GAUGE_STOPS[i + 1],
        category: Category::ALL[i],
        color: colors[i],
        label: labels[i],
    })
}

fn angle_for(bmi: f64) -> f64 {
    90.0 - (bmi - GAUGE_MIN) * 180.0 / (GAUGE_MAX - GAUGE_MIN)
}

/// Needle angle in degrees for a BMI, clamped to the drawn scale
pub fn needle_angle(bmi: f64) -> f64 {
    angle_for(clamp_to_gauge(bmi))
}

/// Needle position along the scale, 0.0 at GAUGE_MIN and 1.0 at GAUGE_MAX
pub fn needle_fraction(bmi: f64) -> f64 {
    (clamp_to_gauge(bmi) - GAUGE_MIN) / (GAUGE_MAX - GAUGE_MIN)
}

/// Column (0-based) of the needle on a horizontal gauge `width` cells wide
pub fn needle_column(bmi: f64, width: u16) -> u16 {
    if width == 0 {
        return 0;
    }
    let last = f64::from(width - 1);
    (needle_fraction(bmi) * last).round() as u16
}

fn clamp_to_gauge(bmi: f64) -> f64 {
    if bmi.is_nan() {
        GAUGE_MIN
    } else {
        bmi.clamp(GAUGE_MIN, GAUGE_MAX)
    }
}

// ============================================================================
// TREND
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub timestamp: NaiveDateTime,
    pub bmi: f64,
}

/// Records re-sorted by time (ties keep id order)
pub fn trend_points(records: &[HistoryRecord]) -> Vec<TrendPoint> {
    let mut sorted: Vec<&HistoryRecord> = records.iter().collect();
    sorted.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));

    sorted
        .into_iter()
        .map(|r| TrendPoint {
            timestamp: r.timestamp,
            bmi: r.bmi,
        })
        .collect()
}

/// (unix seconds, bmi) pairs for plotting
pub fn trend_series(points: &[TrendPoint]) -> Vec<(f64, f64)> {
    points
        .iter()
        .map(|p| (p.timestamp.and_utc().timestamp() as f64, p.bmi))
        .collect()
}

/// Axis bounds as ([x_min, x_max], [y_min, y_max]) with a little headroom on y
pub fn trend_bounds(series: &[(f64, f64)]) -> Option<([f64; 2], [f64; 2])> {
    let first = series.first()?;

    let (mut x_min, mut x_max) = (first.0, first.0);
    let (mut y_min, mut y_max) = (first.1, first.1);
    for &(x, y) in series {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    // A single point (or all points at one instant) still needs a non-empty range
    if x_max <= x_min {
        x_min -= 60.0;
        x_max += 60.0;
    }

    Some(([x_min, x_max], [(y_min - 1.0).floor(), (y_max + 1.0).ceil()]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(id: i64, day: u32, bmi: f64) -> HistoryRecord {
        HistoryRecord {
            id,
            timestamp: NaiveDate::from_ymd_opt(2024, 5, day)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            name: "t".to_string(),
            weight: 70.0,
            height: 1.75,
            bmi,
            category: crate::bmi::classify(bmi).label().to_string(),
        }
    }

    #[test]
    fn test_segments_cover_scale_in_order() {
        let segments = gauge_segments();

        assert_eq!(segments[0].start, GAUGE_MIN);
        assert_eq!(segments[3].end, GAUGE_MAX);
        assert!(segments.windows(2).all(|w| w[0].end == w[1].start));
        assert_eq!(segments[1].category, Category::NormalWeight);
        assert_eq!(segments[3].color, SegmentColor::Orange);
    }

    #[test]
    fn test_needle_angle_spans_half_circle() {
        assert_eq!(needle_angle(GAUGE_MIN), 90.0);
        assert_eq!(needle_angle(28.0), 0.0);
        assert_eq!(needle_angle(GAUGE_MAX), -90.0);

        // Out-of-scale values pin to the ends
        assert_eq!(needle_angle(10.0), 90.0);
        assert_eq!(needle_angle(55.0), -90.0);
    }

    #[test]
    fn test_needle_column() {
        assert_eq!(needle_column(GAUGE_MIN, 25), 0);
        assert_eq!(needle_column(28.0, 25), 12);
        assert_eq!(needle_column(GAUGE_MAX, 25), 24);
        assert_eq!(needle_column(22.0, 0), 0);
    }

    #[test]
    fn test_trend_points_sorted_by_time() {
        let records = vec![record(1, 3, 24.0), record(2, 1, 22.0), record(3, 2, 23.0)];

        let bmis: Vec<f64> = trend_points(&records).iter().map(|p| p.bmi).collect();
        assert_eq!(bmis, vec![22.0, 23.0, 24.0]);
    }

    #[test]
    fn test_trend_bounds() {
        assert!(trend_bounds(&[]).is_none());

        let points = trend_points(&[record(1, 1, 22.4), record(2, 2, 25.2)]);
        let series = trend_series(&points);
        let (x, y) = trend_bounds(&series).unwrap();

        assert!(x[0] < x[1]);
        assert_eq!(y, [21.0, 27.0]);

        let single = trend_series(&trend_points(&[record(1, 1, 20.0)]));
        let (x, _) = trend_bounds(&single).unwrap();
        assert!(x[0] < x[1], "single point needs a non-empty x range");
    }
}
