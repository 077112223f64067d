use std::time::SystemTime;

/// Seconds between two instants, zero if the clock went backwards
pub fn elapsed_secs(start: SystemTime, end: SystemTime) -> f64 {
    end.duration_since(start).unwrap_or_default().as_secs_f64()
}

pub fn mean(data: &[f64]) -> Option<f64> {
    match data.len() {
        0 => None,
        count => Some(data.iter().sum::<f64>() / count as f64),
    }
}

/// Population standard deviation, used as a consistency measure for scores
pub fn std_dev(data: &[f64]) -> Option<f64> {
    let data_mean = mean(data)?;
    let variance = data
        .iter()
        .map(|value| {
            let diff = data_mean - *value;
            diff * diff
        })
        .sum::<f64>()
        / data.len() as f64;

    Some(variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_secs() {
        let start = SystemTime::now();
        let end = start + std::time::Duration::from_millis(1500);
        assert_eq!(elapsed_secs(start, end), 1.5);
        assert_eq!(elapsed_secs(end, start), 0.0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[6., 8., 4.]), Some(6.0));
        assert_eq!(mean(&[42.0]), Some(42.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_std_dev() {
        assert_eq!(std_dev(&[5.0, 5.0, 5.0]), Some(0.0));
        assert_eq!(std_dev(&[2., 4., 4., 4., 5., 5., 7., 9.]), Some(2.0));
        assert_eq!(std_dev(&[]), None);
    }
}
