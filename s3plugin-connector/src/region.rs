//! Region names recognized by the connector

use std::str::FromStr;
use thiserror::Error;

const KNOWN_REGIONS: &[&str] = &[
    "af-south-1",
    "ap-east-1",
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-northeast-3",
    "ap-south-1",
    "ap-south-2",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-southeast-3",
    "ap-southeast-4",
    "ca-central-1",
    "ca-west-1",
    "cn-north-1",
    "cn-northwest-1",
    "eu-central-1",
    "eu-central-2",
    "eu-north-1",
    "eu-south-1",
    "eu-south-2",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "il-central-1",
    "me-central-1",
    "me-south-1",
    "sa-east-1",
    "us-east-1",
    "us-east-2",
    "us-gov-east-1",
    "us-gov-west-1",
    "us-iso-east-1",
    "us-iso-west-1",
    "us-isob-east-1",
    "us-west-1",
    "us-west-2",
];

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Cannot create region from value '{0}'")]
pub struct UnknownRegion(pub String);

/// A known region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region(&'static str);

impl Region {
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl FromStr for Region {
    type Err = UnknownRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        KNOWN_REGIONS
            .iter()
            .copied()
            .find(|known| *known == name)
            .map(Region)
            .ok_or_else(|| UnknownRegion(s.to_string()))
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_region() {
        let region: Region = "eu-west-2".parse().unwrap();
        assert_eq!(region.as_str(), "eu-west-2");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let region: Region = " us-east-1 ".parse().unwrap();
        assert_eq!(region.to_string(), "us-east-1");
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert!("US-EAST-1".parse::<Region>().is_err());
    }

    #[test]
    fn test_unknown_region() {
        let err = "mars-north-1".parse::<Region>().unwrap_err();
        assert_eq!(err, UnknownRegion("mars-north-1".to_string()));
        assert!(err.to_string().contains("mars-north-1"));
    }

    #[test]
    fn test_known_regions_are_unique() {
        let mut names = KNOWN_REGIONS.to_vec();
        let before = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), before);
    }
}
