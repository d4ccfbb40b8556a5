use super::types::Prediction;
use crate::error::EstimateError;

/// Probability distribution over age classes, plus its expected value
#[derive(Debug, Clone, PartialEq)]
pub struct AgeDistribution {
    pub probabilities: Vec<f32>,
    pub expected_age: f64,
}

impl AgeDistribution {
    /// Expected age truncated toward zero.
    pub fn prediction(&self) -> Prediction {
        Prediction {
            age: self.expected_age.trunc() as u32,
        }
    }
}

/// Numerically stable softmax: the max logit is subtracted before
/// exponentiating.
pub fn softmax(logits: &[f32]) -> Result<Vec<f32>, EstimateError> {
    let max = logits
        .iter()
        .copied()
        .reduce(f32::max)
        .ok_or(EstimateError::EmptyLogits)?;

    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();

    let probabilities: Vec<f32> = exps.into_iter().map(|e| e / sum).collect();
    if let Some(index) = probabilities.iter().position(|p| !p.is_finite()) {
        return Err(EstimateError::NonFiniteProbability { index });
    }

    Ok(probabilities)
}

/// Expected class index, `sum(i * p[i])`.
pub fn expected_class(probabilities: &[f32]) -> f64 {
    probabilities
        .iter()
        .enumerate()
        .map(|(i, &p)| i as f64 * p as f64)
        .sum()
}

/// Turn raw model scores into a distribution and an age estimate.
pub fn aggregate(logits: &[f32]) -> Result<AgeDistribution, EstimateError> {
    let _span = tracing::debug_span!("aggregate", classes = logits.len()).entered();

    let probabilities = softmax(logits)?;
    let expected_age = expected_class(&probabilities);

    Ok(AgeDistribution {
        probabilities,
        expected_age,
    })
}
