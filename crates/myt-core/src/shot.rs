use std::fmt;
use std::str::FromStr;

use crate::error::{MytError, MytResult};
use crate::SHOW;

/// Length of a shot token, `a#_###`.
const TOKEN_LEN: usize = 6;

/// Shot identifier used in asset filenames, formatted `a#_###`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShotId {
    /// The bare token, e.g. `a1_002`
    pub name: String,
    /// Act character, e.g. `1`
    pub act: char,
    /// Three-digit shot number, e.g. `002`
    pub number: String,
    /// Show-prefixed name, e.g. `myt_a1_002`
    pub full: String,
}

impl ShotId {
    /// Parse a bare `a#_###` token.
    pub fn new(name: &str) -> MytResult<Self> {
        let chars: Vec<char> = name.chars().collect();
        let digits = chars.get(3..).unwrap_or_default();
        if digits.is_empty() || !digits.iter().all(|c| c.is_ascii_digit()) {
            return Err(MytError::invalid_filename(format!(
                "Name '{name}' must match pattern 'a#_###'"
            )));
        }

        Ok(Self {
            name: name.to_string(),
            act: chars[1],
            number: chars[3..chars.len().min(TOKEN_LEN)].iter().collect(),
            full: format!("{SHOW}_{name}"),
        })
    }

    /// Extract the shot from a filename such as `myt_a1_002_layout`.
    pub fn from_filename(filename: &str) -> MytResult<Self> {
        Self::from_filename_with_affix(filename, &format!("{SHOW}_"))
    }

    /// Extract the shot token following the first occurrence of `affix`.
    pub fn from_filename_with_affix(filename: &str, affix: &str) -> MytResult<Self> {
        let Some((_, rest)) = filename.split_once(affix) else {
            return Err(MytError::invalid_filename(format!(
                "Filename '{filename}' must match pattern '{affix}a#_###'"
            )));
        };
        let token: String = rest.chars().take(TOKEN_LEN).collect();
        Self::new(&token)
    }
}

impl FromStr for ShotId {
    type Err = MytError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for ShotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}
