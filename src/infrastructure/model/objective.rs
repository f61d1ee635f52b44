use serde::{Deserialize, Serialize};

/// Learning objective, determines how per-group margins become one score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Objective {
    #[serde(rename = "reg:squarederror")]
    SquaredError,
    #[serde(rename = "binary:logistic")]
    BinaryLogistic,
    #[serde(rename = "binary:logitraw")]
    BinaryLogitRaw,
    #[serde(rename = "multi:softmax")]
    MultiSoftmax,
}

impl Objective {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SquaredError => "reg:squarederror",
            Self::BinaryLogistic => "binary:logistic",
            Self::BinaryLogitRaw => "binary:logitraw",
            Self::MultiSoftmax => "multi:softmax",
        }
    }

    pub fn is_multiclass(&self) -> bool {
        matches!(self, Self::MultiSoftmax)
    }

    /// Number of margin groups the booster must produce
    pub fn num_groups(&self, num_class: Option<usize>) -> Result<usize, String> {
        match (self.is_multiclass(), num_class) {
            (true, Some(n)) if n >= 2 => Ok(n),
            (true, _) => Err(format!("{} requires num_class >= 2", self.as_str())),
            (false, None) | (false, Some(1)) => Ok(1),
            (false, Some(n)) => Err(format!("{} does not accept num_class = {}", self.as_str(), n)),
        }
    }

    /// Collapse the margins of one row into its score
    pub fn transform(&self, margins: &[f64]) -> f64 {
        match self {
            Self::SquaredError | Self::BinaryLogitRaw => margins[0],
            Self::BinaryLogistic => sigmoid(margins[0]),
            Self::MultiSoftmax => argmax(margins) as f64,
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// First index of the largest margin, matching xgboost's tie-breaking
fn argmax(margins: &[f64]) -> usize {
    let mut best = 0;
    for (i, m) in margins.iter().enumerate().skip(1) {
        if *m > margins[best] {
            best = i;
        }
    }
    best
}
