use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// Oldest season year accepted for a recommendation run
pub const MIN_SEASON_YEAR: i32 = 1940;

/// An AniList airing season
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    /// Seasons in calendar order
    pub const ALL: [Season; 4] = [Season::Winter, Season::Spring, Season::Summer, Season::Fall];

    /// The enum value AniList expects in `MediaSeason` variables
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "WINTER",
            Season::Spring => "SPRING",
            Season::Summer => "SUMMER",
            Season::Fall => "FALL",
        }
    }
}

impl Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which part of a year a run looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonSelection {
    Single(Season),
    All,
}

impl SeasonSelection {
    /// Seasons to fetch, in enumeration order
    pub fn seasons(&self) -> Vec<Season> {
        match self {
            SeasonSelection::Single(season) => vec![*season],
            SeasonSelection::All => Season::ALL.to_vec(),
        }
    }
}

impl Display for SeasonSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeasonSelection::Single(season) => write!(f, "{}", season),
            SeasonSelection::All => write!(f, "ALL"),
        }
    }
}

impl FromStr for SeasonSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "WINTER" => Ok(SeasonSelection::Single(Season::Winter)),
            "SPRING" => Ok(SeasonSelection::Single(Season::Spring)),
            "SUMMER" => Ok(SeasonSelection::Single(Season::Summer)),
            "FALL" => Ok(SeasonSelection::Single(Season::Fall)),
            "ALL" => Ok(SeasonSelection::All),
            other => Err(format!(
                "unknown season '{}', expected Winter, Spring, Summer, Fall or All",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(
            "winter".parse::<SeasonSelection>(),
            Ok(SeasonSelection::Single(Season::Winter))
        );
        assert_eq!(
            " Fall ".parse::<SeasonSelection>(),
            Ok(SeasonSelection::Single(Season::Fall))
        );
        assert_eq!("all".parse::<SeasonSelection>(), Ok(SeasonSelection::All));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("autumn".parse::<SeasonSelection>().is_err());
        assert!("".parse::<SeasonSelection>().is_err());
    }

    #[test]
    fn test_all_seasons_in_calendar_order() {
        assert_eq!(
            SeasonSelection::All.seasons(),
            vec![Season::Winter, Season::Spring, Season::Summer, Season::Fall]
        );
        assert_eq!(
            SeasonSelection::Single(Season::Summer).seasons(),
            vec![Season::Summer]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(SeasonSelection::Single(Season::Spring).to_string(), "SPRING");
        assert_eq!(SeasonSelection::All.to_string(), "ALL");
    }

    #[test]
    fn test_season_serialization() {
        let json = serde_json::to_string(&Season::Summer).unwrap();
        assert_eq!(json, "\"SUMMER\"");
    }
}
