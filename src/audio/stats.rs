//! Scalar summaries used when collapsing per-frame series into feature
//! columns. All three use population moments, matching the conventions
//! of the numeric stacks this tool's output is compared against.

pub fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

pub fn std_dev(values: &[f32]) -> f32 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|&x| (x - m).powi(2)).sum::<f32>() / values.len() as f32;
    variance.sqrt()
}

/// Third standardized moment. Zero for symmetric or degenerate input.
pub fn skewness(values: &[f32]) -> f32 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let n = values.len() as f32;
    let m2 = values.iter().map(|&x| (x - m).powi(2)).sum::<f32>() / n;
    if m2 <= f32::EPSILON {
        return 0.0;
    }
    let m3 = values.iter().map(|&x| (x - m).powi(3)).sum::<f32>() / n;
    m3 / m2.powf(1.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_simple_series() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0]), 2.5);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn std_dev_matches_population_formula() {
        // Population std of [2, 4, 4, 4, 5, 5, 7, 9] is exactly 2.
        let xs = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((std_dev(&xs) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn skewness_of_symmetric_series_is_zero() {
        let xs = [-2.0, -1.0, 0.0, 1.0, 2.0];
        assert!(skewness(&xs).abs() < 1e-6);
    }

    #[test]
    fn skewness_sign_follows_the_tail() {
        let right_tailed = [1.0, 1.0, 1.0, 1.0, 10.0];
        let left_tailed = [-10.0, 1.0, 1.0, 1.0, 1.0];
        assert!(skewness(&right_tailed) > 0.0);
        assert!(skewness(&left_tailed) < 0.0);
    }

    #[test]
    fn degenerate_inputs_summarize_to_zero() {
        assert_eq!(std_dev(&[3.0]), 0.0);
        assert_eq!(skewness(&[3.0]), 0.0);
        assert_eq!(skewness(&[5.0, 5.0, 5.0]), 0.0);
    }
}
