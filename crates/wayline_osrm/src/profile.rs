use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

/// Routing mode selecting the OSRM road graph.
#[derive(Deserialize, Serialize, Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    #[default]
    Driving,
    Walking,
    Cycling,
}

impl Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Profile::Driving => "driving",
                Profile::Walking => "walking",
                Profile::Cycling => "cycling",
            }
        )
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "driving" => Ok(Profile::Driving),
            "walking" | "foot" => Ok(Profile::Walking),
            "cycling" | "bike" => Ok(Profile::Cycling),
            other => Err(format!(
                "Unknown profile '{other}', expected driving, walking or cycling"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_osrm_path_segment() {
        assert_eq!(Profile::Driving.to_string(), "driving");
        assert_eq!(Profile::Walking.to_string(), "walking");
        assert_eq!(Profile::Cycling.to_string(), "cycling");
    }

    #[test]
    fn test_parse_names_and_aliases() {
        assert_eq!("driving".parse::<Profile>().unwrap(), Profile::Driving);
        assert_eq!("foot".parse::<Profile>().unwrap(), Profile::Walking);
        assert_eq!("bike".parse::<Profile>().unwrap(), Profile::Cycling);
        assert_eq!("Walking".parse::<Profile>().unwrap(), Profile::Walking);
        assert!("horseback".parse::<Profile>().is_err());
    }
}
