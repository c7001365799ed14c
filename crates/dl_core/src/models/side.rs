//! The two sides of a competitive match.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// One of the two sides in a match.
///
/// Upstream demo data carries sides as the acronyms `"CT"` and `"T"`; the
/// serde names preserve that vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "CT")]
    Ct,
    #[serde(rename = "T")]
    T,
}

impl Side {
    /// Parses the upstream side acronym, case-insensitively.
    pub fn from_acronym(acronym: &str) -> Result<Side> {
        match acronym.to_ascii_uppercase().as_str() {
            "CT" => Ok(Side::Ct),
            "T" => Ok(Side::T),
            _ => Err(AnalysisError::UnknownSide(acronym.to_string())),
        }
    }

    /// Parses an optional side acronym; `None` stays `None`.
    pub fn from_optional_acronym(acronym: Option<&str>) -> Result<Option<Side>> {
        acronym.map(Side::from_acronym).transpose()
    }

    /// The opposite side.
    pub fn invert(self) -> Side {
        match self {
            Side::Ct => Side::T,
            Side::T => Side::Ct,
        }
    }

    /// Which side performs a given bomb action: planting is T work,
    /// defusing is CT work.
    pub fn from_bomb_action(bomb_action: &str) -> Result<Side> {
        if bomb_action.contains("plant") {
            Ok(Side::T)
        } else if bomb_action.contains("defuse") {
            Ok(Side::Ct)
        } else {
            Err(AnalysisError::UnknownBombAction(bomb_action.to_string()))
        }
    }

    pub fn acronym(self) -> &'static str {
        match self {
            Side::Ct => "CT",
            Side::T => "T",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.acronym())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_acronym_case_insensitive() {
        assert_eq!(Side::from_acronym("CT").unwrap(), Side::Ct);
        assert_eq!(Side::from_acronym("ct").unwrap(), Side::Ct);
        assert_eq!(Side::from_acronym("T").unwrap(), Side::T);
        assert_eq!(Side::from_acronym("t").unwrap(), Side::T);
    }

    #[test]
    fn test_from_acronym_rejects_unknown() {
        assert!(Side::from_acronym("SPEC").is_err());
        assert!(Side::from_acronym("").is_err());
    }

    #[test]
    fn test_from_optional_acronym() {
        assert_eq!(Side::from_optional_acronym(None).unwrap(), None);
        assert_eq!(Side::from_optional_acronym(Some("T")).unwrap(), Some(Side::T));
        assert!(Side::from_optional_acronym(Some("nope")).is_err());
    }

    #[test]
    fn test_invert() {
        assert_eq!(Side::Ct.invert(), Side::T);
        assert_eq!(Side::T.invert(), Side::Ct);
    }

    #[test]
    fn test_from_bomb_action() {
        assert_eq!(Side::from_bomb_action("plant_begin").unwrap(), Side::T);
        assert_eq!(Side::from_bomb_action("plant_abort").unwrap(), Side::T);
        assert_eq!(Side::from_bomb_action("defuse_start").unwrap(), Side::Ct);
        assert!(Side::from_bomb_action("throw").is_err());
    }

    #[test]
    fn test_serde_uses_acronyms() {
        assert_eq!(serde_json::to_string(&Side::Ct).unwrap(), "\"CT\"");
        assert_eq!(serde_json::from_str::<Side>("\"T\"").unwrap(), Side::T);
    }
}
