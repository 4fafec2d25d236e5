use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::AppError;

/// Reviewer verdict on a single customer's classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Opinion {
    Agree,
    Disagree,
    NotSure,
}

impl Opinion {
    pub const ALL: [Opinion; 3] = [Opinion::Agree, Opinion::Disagree, Opinion::NotSure];

    pub fn key(self) -> &'static str {
        match self {
            Opinion::Agree => "agree",
            Opinion::Disagree => "disagree",
            Opinion::NotSure => "not_sure",
        }
    }

    /// Label shown in the grid and written to the output file.
    pub fn label(self) -> &'static str {
        match self {
            Opinion::Agree => "👍 Agree",
            Opinion::Disagree => "👎 Disagree",
            Opinion::NotSure => "🤷 Not sure",
        }
    }
}

impl fmt::Display for Opinion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Opinion {
    type Err = AppError;

    /// Accepts either the key or the exact label. Nothing else.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Opinion::ALL
            .into_iter()
            .find(|opinion| opinion.key() == value || opinion.label() == value)
            .ok_or_else(|| {
                AppError::ValidationError(format!(
                    "'{}' is not a valid opinion; expected one of: {}",
                    value,
                    Opinion::ALL
                        .iter()
                        .map(|o| o.label())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }
}
