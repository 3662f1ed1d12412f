use std::fmt;
use std::str::FromStr;

use crate::UnknownVariant;

/// Competitive title bucket, derived from a user's `max_rating`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Title {
    Newbie,
    Specialist,
    Expert,
    CandidateMaster,
    Master,
    Grandmaster,
    LegendaryGrandmaster,
}

impl Title {
    /// Title thresholds, highest first.
    const TIERS: [(i32, Title); 7] = [
        (2400, Title::LegendaryGrandmaster),
        (2100, Title::Grandmaster),
        (1900, Title::Master),
        (1600, Title::CandidateMaster),
        (1400, Title::Expert),
        (1200, Title::Specialist),
        (0, Title::Newbie),
    ];

    pub fn from_max_rating(max_rating: i32) -> Title {
        for (threshold, title) in Title::TIERS {
            if max_rating >= threshold {
                return title;
            }
        }
        Title::Newbie
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Title::Newbie => "Newbie",
            Title::Specialist => "Specialist",
            Title::Expert => "Expert",
            Title::CandidateMaster => "Candidate Master",
            Title::Master => "Master",
            Title::Grandmaster => "Grandmaster",
            Title::LegendaryGrandmaster => "Legendary Grandmaster",
        }
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Title {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Newbie" => Ok(Title::Newbie),
            "Specialist" => Ok(Title::Specialist),
            "Expert" => Ok(Title::Expert),
            "Candidate Master" => Ok(Title::CandidateMaster),
            "Master" => Ok(Title::Master),
            "Grandmaster" => Ok(Title::Grandmaster),
            "Legendary Grandmaster" => Ok(Title::LegendaryGrandmaster),
            other => Err(UnknownVariant {
                field: "title",
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_follow_rating_thresholds() {
        assert_eq!(Title::from_max_rating(0), Title::Newbie);
        assert_eq!(Title::from_max_rating(1199), Title::Newbie);
        assert_eq!(Title::from_max_rating(1200), Title::Specialist);
        assert_eq!(Title::from_max_rating(1400), Title::Expert);
        assert_eq!(Title::from_max_rating(1600), Title::CandidateMaster);
        assert_eq!(Title::from_max_rating(1900), Title::Master);
        assert_eq!(Title::from_max_rating(2100), Title::Grandmaster);
        assert_eq!(Title::from_max_rating(2399), Title::Grandmaster);
        assert_eq!(Title::from_max_rating(2400), Title::LegendaryGrandmaster);
        assert_eq!(Title::from_max_rating(3000), Title::LegendaryGrandmaster);
    }

    #[test]
    fn negative_rating_is_still_a_newbie() {
        assert_eq!(Title::from_max_rating(-50), Title::Newbie);
    }

    #[test]
    fn display_round_trips() {
        for title in [
            Title::Newbie,
            Title::Specialist,
            Title::Expert,
            Title::CandidateMaster,
            Title::Master,
            Title::Grandmaster,
            Title::LegendaryGrandmaster,
        ] {
            assert_eq!(title.to_string().parse::<Title>().unwrap(), title);
        }
    }
}
