//! Scale registry
//!
//! A scale is the numeric domain a metric's values live in. The built-in
//! scales are static; any other identifier found in stored data is kept
//! verbatim as [`ScaleKind::Custom`] and resolves to the Likert domain.

use serde::{Deserialize, Serialize};

/// Numeric domain of a scale: bounds, slider step and starting value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaleDefinition {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

impl ScaleDefinition {
    const LIKERT: ScaleDefinition = ScaleDefinition {
        min: 1.0,
        max: 5.0,
        step: 1.0,
        default: 3.0,
    };

    const BINARY: ScaleDefinition = ScaleDefinition {
        min: 0.0,
        max: 1.0,
        step: 1.0,
        default: 1.0,
    };

    const CONTINUOUS: ScaleDefinition = ScaleDefinition {
        min: 0.0,
        max: 100.0,
        step: 5.0,
        default: 50.0,
    };

    /// Whether `value` lies within `[min, max]`.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Every value a slider over this scale can produce, in ascending order.
    pub fn steps(&self) -> Vec<f64> {
        if self.step <= 0.0 {
            return vec![self.min];
        }
        let count = ((self.max - self.min) / self.step).floor() as usize;
        (0..=count)
            .map(|i| self.min + self.step * i as f64)
            .collect()
    }
}

/// Scale identifier as stored on a metric.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ScaleKind {
    /// 1-5 agreement scale (the original and default scale)
    #[default]
    Likert,
    /// Yes/no, stored as 0 or 1
    Binary,
    /// 0-100 in steps of 5
    Continuous,
    /// Identifier not known to this build
    Custom(String),
}

impl ScaleKind {
    /// Parse a scale identifier. Never fails: unknown ids become `Custom`.
    pub fn parse(id: &str) -> Self {
        match id {
            "likert" => ScaleKind::Likert,
            "binary" => ScaleKind::Binary,
            "continuous" => ScaleKind::Continuous,
            other => ScaleKind::Custom(other.to_string()),
        }
    }

    /// Returns the identifier used in storage and CSV files
    pub fn as_str(&self) -> &str {
        match self {
            ScaleKind::Likert => "likert",
            ScaleKind::Binary => "binary",
            ScaleKind::Continuous => "continuous",
            ScaleKind::Custom(id) => id,
        }
    }

    /// Numeric domain for this scale. Unknown scales get the Likert domain.
    pub fn resolve(&self) -> ScaleDefinition {
        match self {
            ScaleKind::Likert | ScaleKind::Custom(_) => ScaleDefinition::LIKERT,
            ScaleKind::Binary => ScaleDefinition::BINARY,
            ScaleKind::Continuous => ScaleDefinition::CONTINUOUS,
        }
    }

    /// Human-readable name. Unknown scales pass through verbatim.
    pub fn label(&self) -> &str {
        match self {
            ScaleKind::Likert => "Likert (1-5)",
            ScaleKind::Binary => "Yes/No (0-1)",
            ScaleKind::Continuous => "Continuous (0-100)",
            ScaleKind::Custom(id) => id,
        }
    }

    /// Whether this is one of the built-in scales
    pub fn is_builtin(&self) -> bool {
        !matches!(self, ScaleKind::Custom(_))
    }

    /// The built-in scales, in display order
    pub fn builtins() -> [ScaleKind; 3] {
        [ScaleKind::Likert, ScaleKind::Binary, ScaleKind::Continuous]
    }
}

impl From<String> for ScaleKind {
    fn from(id: String) -> Self {
        ScaleKind::parse(&id)
    }
}

impl From<ScaleKind> for String {
    fn from(kind: ScaleKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for ScaleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ScaleKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ScaleKind::parse(s))
    }
}

/// Resolve a raw scale identifier to its numeric domain.
pub fn resolve(scale_id: &str) -> ScaleDefinition {
    ScaleKind::parse(scale_id).resolve()
}

/// Display label for a raw scale identifier.
pub fn label(scale_id: &str) -> String {
    ScaleKind::parse(scale_id).label().to_string()
}
