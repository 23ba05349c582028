use crate::models::CorrelationEntry;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    StrongPositive,
    ModeratePositive,
    WeakPositive,
    WeakNegative,
    ModerateNegative,
    StrongNegative,
}

impl CorrelationStrength {
    /// Bands are checked top-down with strict `>`, so a boundary value lands
    /// in the weaker band (0.7 is moderate, -0.7 is strong negative). NaN
    /// fails every comparison and ends up strong negative.
    pub fn classify(score: f64) -> Self {
        if score > 0.7 {
            CorrelationStrength::StrongPositive
        } else if score > 0.3 {
            CorrelationStrength::ModeratePositive
        } else if score > 0.0 {
            CorrelationStrength::WeakPositive
        } else if score > -0.3 {
            CorrelationStrength::WeakNegative
        } else if score > -0.7 {
            CorrelationStrength::ModerateNegative
        } else {
            CorrelationStrength::StrongNegative
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CorrelationStrength::StrongPositive => "Strong Positive",
            CorrelationStrength::ModeratePositive => "Moderate Positive",
            CorrelationStrength::WeakPositive => "Weak Positive",
            CorrelationStrength::WeakNegative => "Weak Negative",
            CorrelationStrength::ModerateNegative => "Moderate Negative",
            CorrelationStrength::StrongNegative => "Strong Negative",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            CorrelationStrength::StrongPositive => "#15803d",
            CorrelationStrength::ModeratePositive => "#22c55e",
            CorrelationStrength::WeakPositive => "#86efac",
            CorrelationStrength::WeakNegative => "#fca5a5",
            CorrelationStrength::ModerateNegative => "#ef4444",
            CorrelationStrength::StrongNegative => "#b91c1c",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedCorrelation {
    pub label: String,
    pub score: f64,
    pub strength: CorrelationStrength,
    pub strength_label: &'static str,
    pub color: &'static str,
}

pub fn classify_all(entries: &[CorrelationEntry]) -> Vec<ClassifiedCorrelation> {
    entries
        .iter()
        .map(|entry| {
            let strength = CorrelationStrength::classify(entry.score);
            ClassifiedCorrelation {
                label: entry.label.clone(),
                score: entry.score,
                strength,
                strength_label: strength.label(),
                color: strength.color(),
            }
        })
        .collect()
}
