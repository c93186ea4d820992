// Chat profile update payload and the option tables the shell offers.

use crate::error::ProfileError;
use serde::{Serialize, Serializer};

pub const QUEUE_TYPES: &[&str] = &[
    "RANKED_SOLO_5x5",
    "RANKED_FLEX_SR",
    "RANKED_FLEX_TT",
    "RANKED_TFT",
    "RANKED_TFT_TURBO",
    "RANKED_TFT_DOUBLE_UP",
];

pub const TIERS: &[&str] = &[
    "IRON",
    "BRONZE",
    "SILVER",
    "GOLD",
    "PLATINUM",
    "EMERALD",
    "DIAMOND",
    "MASTER",
    "GRANDMASTER",
    "CHALLENGER",
];

pub const DIVISIONS: &[&str] = &["I", "II", "III", "IV", "NA"];

pub const REWARD_LEVELS: &[&str] = &["0", "1", "2", "3"];

/// A partial update of the chat profile (`PUT /lol-chat/v1/me`). Fields left
/// as `None` are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub queue: Option<String>,
    pub tier: Option<String>,
    pub division: Option<String>,
    pub reward_level: Option<String>,
    pub wins: Option<u32>,
    pub status_message: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Check every set field against its option table.
    pub fn validate(&self) -> Result<(), ProfileError> {
        check("queue type", self.queue.as_deref(), QUEUE_TYPES)?;
        check("tier", self.tier.as_deref(), TIERS)?;
        check("division", self.division.as_deref(), DIVISIONS)?;
        check("reward level", self.reward_level.as_deref(), REWARD_LEVELS)?;
        Ok(())
    }
}

fn check(field: &'static str, value: Option<&str>, options: &[&str]) -> Result<(), ProfileError> {
    match value {
        Some(v) if !options.contains(&v) => Err(ProfileError::UnknownOption {
            field,
            value: v.to_string(),
        }),
        _ => Ok(()),
    }
}

// Wire shape: ranked fields live in the `lol` map, where the client expects
// every value as a string.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireProfile<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    status_message: Option<&'a str>,
    #[serde(skip_serializing_if = "WireRanked::is_empty")]
    lol: WireRanked<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRanked<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    ranked_league_queue: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ranked_league_tier: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ranked_league_division: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ranked_split_reward_level: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ranked_wins: Option<String>,
}

impl WireRanked<'_> {
    fn is_empty(&self) -> bool {
        self.ranked_league_queue.is_none()
            && self.ranked_league_tier.is_none()
            && self.ranked_league_division.is_none()
            && self.ranked_split_reward_level.is_none()
            && self.ranked_wins.is_none()
    }
}

impl Serialize for ProfileUpdate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireProfile {
            status_message: self.status_message.as_deref(),
            lol: WireRanked {
                ranked_league_queue: self.queue.as_deref(),
                ranked_league_tier: self.tier.as_deref(),
                ranked_league_division: self.division.as_deref(),
                ranked_split_reward_level: self.reward_level.as_deref(),
                ranked_wins: self.wins.map(|w| w.to_string()),
            },
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_only_update_sends_only_the_status() {
        let update = ProfileUpdate {
            status_message: Some("brb".into()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"statusMessage": "brb"}));
    }

    #[test]
    fn ranked_fields_go_into_the_lol_map_as_strings() {
        let update = ProfileUpdate {
            queue: Some("RANKED_SOLO_5x5".into()),
            tier: Some("CHALLENGER".into()),
            wins: Some(999),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({
                "lol": {
                    "rankedLeagueQueue": "RANKED_SOLO_5x5",
                    "rankedLeagueTier": "CHALLENGER",
                    "rankedWins": "999"
                }
            })
        );
    }

    #[test]
    fn empty_update_serializes_to_an_empty_object() {
        let update = ProfileUpdate::default();
        assert!(update.is_empty());
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({}));
    }

    #[test]
    fn validation_rejects_values_outside_the_tables() {
        let ok = ProfileUpdate {
            tier: Some("GOLD".into()),
            division: Some("IV".into()),
            reward_level: Some("2".into()),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let bad = ProfileUpdate {
            division: Some("V".into()),
            ..Default::default()
        };
        let err = bad.validate().unwrap_err();
        assert_eq!(err.to_string(), "`V` is not a valid division");
    }
}
