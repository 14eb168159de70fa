//! Length, percentage and auto value types for CSS layout.
//!
//! [§ 6 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)
//!
//! Computed values reach layout with percentages still unresolved; they are
//! turned into [`Au`] used values once the containing block is known.

use std::fmt;
use std::str::FromStr;

use app_units::Au;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while parsing a CSS value string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// The string is not a `<length-percentage>`.
    #[error("invalid length '{0}': expected '<number>px', '<number>%' or '0'")]
    InvalidLength(String),
    /// The string is neither `auto` nor a `<length-percentage>`.
    #[error("invalid value '{0}': expected 'auto' or a length")]
    InvalidAutoOrLength(String),
}

/// [§ 4.2 Lengths](https://www.w3.org/TR/css-values-4/#lengths) and
/// [§ 4.3 Percentages](https://www.w3.org/TR/css-values-4/#percentages)
///
/// "A `<length-percentage>` value is a `<length>` or a `<percentage>`."
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LengthPercentage {
    /// An absolute length in CSS pixels.
    Px(f32),
    /// A percentage of some reference length (e.g. the containing block width).
    Percent(f32),
}

impl Default for LengthPercentage {
    fn default() -> Self {
        Self::ZERO
    }
}

impl LengthPercentage {
    /// `0px`.
    pub const ZERO: Self = Self::Px(0.0);

    /// [§ 6.1 Used Values](https://www.w3.org/TR/css-cascade-4/#used)
    ///
    /// Resolve against `reference`, the length a percentage refers to.
    #[must_use]
    pub fn resolve(self, reference: Au) -> Au {
        match self {
            Self::Px(px) => Au::from_f32_px(px),
            Self::Percent(percent) => reference.scale_by(percent / 100.0),
        }
    }

    /// Resolve against a reference that may not be known yet.
    ///
    /// Lengths always resolve; percentages need a definite reference.
    #[must_use]
    pub fn resolve_definite(self, reference: Option<Au>) -> Option<Au> {
        match self {
            Self::Px(px) => Some(Au::from_f32_px(px)),
            Self::Percent(_) => reference.map(|reference| self.resolve(reference)),
        }
    }

    /// Whether this value depends on a reference length.
    #[must_use]
    pub const fn is_percentage(self) -> bool {
        matches!(self, Self::Percent(_))
    }
}

impl FromStr for LengthPercentage {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || ValueError::InvalidLength(s.to_string());

        // [§ 4.2](https://www.w3.org/TR/css-values-4/#lengths)
        // "for zero lengths the unit identifier is optional"
        if trimmed == "0" {
            return Ok(Self::ZERO);
        }
        if let Some(number) = trimmed.strip_suffix("px") {
            return number.trim().parse().map(Self::Px).map_err(|_| invalid());
        }
        if let Some(number) = trimmed.strip_suffix('%') {
            return number.trim().parse().map(Self::Percent).map_err(|_| invalid());
        }
        Err(invalid())
    }
}

impl TryFrom<String> for LengthPercentage {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LengthPercentage> for String {
    fn from(value: LengthPercentage) -> Self {
        value.to_string()
    }
}

impl fmt::Display for LengthPercentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(px) => write!(f, "{px}px"),
            Self::Percent(percent) => write!(f, "{percent}%"),
        }
    }
}

/// [§ 4.4 Automatic values](https://www.w3.org/TR/CSS2/cascade.html#value-def-auto)
///
/// "Some properties can take the keyword 'auto' as a value. This keyword
/// allows the user agent to compute the value based on other properties."
///
/// For `min-*`/`max-*` sizes `Auto` stands for "no constraint" (`none`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AutoOr {
    /// The value is 'auto' and must be resolved during layout.
    #[default]
    Auto,
    /// The value is a specific length or percentage.
    Length(LengthPercentage),
}

impl AutoOr {
    /// A pixel length.
    #[must_use]
    pub const fn px(px: f32) -> Self {
        Self::Length(LengthPercentage::Px(px))
    }

    /// A percentage.
    #[must_use]
    pub const fn percent(percent: f32) -> Self {
        Self::Length(LengthPercentage::Percent(percent))
    }

    /// Check if the value is 'auto'.
    #[must_use]
    pub const fn is_auto(self) -> bool {
        matches!(self, Self::Auto)
    }

    /// The used value, or `None` for 'auto'.
    #[must_use]
    pub fn resolve(self, reference: Au) -> Option<Au> {
        match self {
            Self::Auto => None,
            Self::Length(length) => Some(length.resolve(reference)),
        }
    }

    /// The used value, or `default` for 'auto'.
    #[must_use]
    pub fn resolve_or(self, reference: Au, default: Au) -> Au {
        self.resolve(reference).unwrap_or(default)
    }
}

impl FromStr for AutoOr {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        s.parse()
            .map(Self::Length)
            .map_err(|_| ValueError::InvalidAutoOrLength(s.to_string()))
    }
}

impl TryFrom<String> for AutoOr {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AutoOr> for String {
    fn from(value: AutoOr) -> Self {
        match value {
            AutoOr::Auto => "auto".to_string(),
            AutoOr::Length(length) => length.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lengths() {
        assert_eq!("12px".parse::<LengthPercentage>(), Ok(LengthPercentage::Px(12.0)));
        assert_eq!(" 2.5px ".parse::<LengthPercentage>(), Ok(LengthPercentage::Px(2.5)));
        assert_eq!("50%".parse::<LengthPercentage>(), Ok(LengthPercentage::Percent(50.0)));
        assert_eq!("0".parse::<LengthPercentage>(), Ok(LengthPercentage::ZERO));
        assert_eq!(
            "12em".parse::<LengthPercentage>(),
            Err(ValueError::InvalidLength("12em".to_string()))
        );
    }

    #[test]
    fn test_parse_auto_or() {
        assert_eq!("auto".parse::<AutoOr>(), Ok(AutoOr::Auto));
        assert_eq!("AUTO".parse::<AutoOr>(), Ok(AutoOr::Auto));
        assert_eq!("10px".parse::<AutoOr>(), Ok(AutoOr::px(10.0)));
        assert!("none".parse::<AutoOr>().is_err());
    }

    #[test]
    fn test_resolve_percentage_against_reference() {
        let reference = Au::from_px(800);
        assert_eq!(AutoOr::percent(50.0).resolve(reference), Some(Au::from_px(400)));
        assert_eq!(AutoOr::px(30.0).resolve(reference), Some(Au::from_px(30)));
        assert_eq!(AutoOr::Auto.resolve(reference), None);
        assert_eq!(AutoOr::Auto.resolve_or(reference, Au(0)), Au(0));
    }

    #[test]
    fn test_percentage_needs_definite_reference() {
        assert_eq!(LengthPercentage::Percent(10.0).resolve_definite(None), None);
        assert_eq!(
            LengthPercentage::Px(4.0).resolve_definite(None),
            Some(Au::from_px(4))
        );
    }
}
