use crate::history::HistoryEntry;

/// Chart points (game number, score), oldest game first
pub fn score_points(entries: &[HistoryEntry]) -> Vec<(f64, f64)> {
    entries
        .iter()
        .rev()
        .enumerate()
        .map(|(i, e)| ((i + 1) as f64, e.result.score as f64))
        .collect()
}

/// Compute X (game count) and Y (score) bounds for the history chart
pub fn compute_chart_params(points: &[(f64, f64)]) -> (f64, f64) {
    let highest = points.iter().map(|&(_, s)| s).fold(0.0, f64::max);
    let games = points.last().map(|p| p.0).unwrap_or(1.0).max(1.0);
    (games, highest.max(1.0).ceil())
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_has_unit_bounds() {
        assert_eq!(compute_chart_params(&[]), (1.0, 1.0));
    }

    #[test]
    fn bounds_follow_points() {
        let points = [(1.0, 12.0), (2.0, 30.0), (3.0, 18.0)];
        assert_eq!(compute_chart_params(&points), (3.0, 30.0));
    }

    #[test]
    fn labels() {
        assert_eq!(format_label(4.0), "4");
        assert_eq!(format_label(17.25), "17.2");
    }
}
