//! Tuning constants for a session.
//!
//! Every field has a default, so a config file only needs the values it
//! changes.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CatalogError};
use crate::fixed::{Amount, Seconds};
use crate::id::{JobTypeId, StoryId};
use crate::resource::Progression;

/// Largest starting money or duration a config may declare.
pub const MAX_CONFIG_VALUE: f64 = 1.0e9;

/// Session tuning. Loaded from `config.{ron,toml,json}` or defaulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// `iq + autonomy + generality` at or above this loses the game.
    pub agi_sum_lose: u32,
    /// Wonder at or above this wins the game.
    pub wonder_win: u32,
    /// Job type offered deterministically for the first completions.
    pub starter_job: JobTypeId,
    pub starter_duration: u32,
    /// Generation returns the starter while completions are below this.
    pub starter_completions: u64,
    pub web_scrape_job: JobTypeId,
    pub web_scrape_min_chapter: u32,
    /// Duration in seconds for job types without a range.
    pub default_duration: u32,
    /// Automatic generation stops at this many queued offers.
    pub queue_cap: usize,
    /// Seconds between automatic offers.
    pub offer_interval: u32,
    /// Interludes forming the escalating AGI warning, in display order.
    pub agi_warning_sequence: Vec<StoryId>,
    /// Job-count delay for warning interludes that declare none.
    pub agi_warning_delay: u32,
    /// Shared pool of rejection chains, handed out round-robin.
    pub default_rejections: Vec<Vec<String>>,
    pub starting: StartingState,
    pub seed: u64,
}

/// Resources and unlocks of a brand-new save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartingState {
    pub money: f64,
    pub data: u64,
    pub compute: u32,
    pub speed_bonus: u32,
    pub quality_bonus: u32,
    pub unlocked: Vec<JobTypeId>,
}

impl Default for StartingState {
    fn default() -> Self {
        Self {
            money: 48.0,
            data: 0,
            compute: 1,
            speed_bonus: 100,
            quality_bonus: 100,
            unlocked: vec![JobTypeId::new("imgclassifier")],
        }
    }
}

impl StartingState {
    pub fn progression(&self) -> Progression {
        Progression {
            money: Amount::checked_from_num(self.money)
                .unwrap_or(Amount::ZERO)
                .max(Amount::ZERO),
            data: self.data,
            compute: self.compute,
            speed_bonus: self.speed_bonus,
            quality_bonus: self.quality_bonus,
            ..Progression::default()
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            agi_sum_lose: 21,
            wonder_win: 5,
            starter_job: JobTypeId::new("imgclassifier"),
            starter_duration: 4,
            starter_completions: 2,
            web_scrape_job: JobTypeId::new("webscrape"),
            web_scrape_min_chapter: 3,
            default_duration: 20,
            queue_cap: 5,
            offer_interval: 10,
            agi_warning_sequence: Vec::new(),
            agi_warning_delay: 2,
            default_rejections: default_rejection_pool(),
            starting: StartingState::default(),
            seed: 0x5EED,
        }
    }
}

impl GameConfig {
    pub fn offer_interval(&self) -> Seconds {
        Seconds::from_num(self.offer_interval.max(1))
    }

    /// Check every id the config names against the catalog, and the numeric
    /// fields that seed balances and timers against [`MAX_CONFIG_VALUE`].
    pub fn validate(&self, catalog: &Catalog) -> Result<(), CatalogError> {
        let money = self.starting.money;
        if !money.is_finite() || !(0.0..=MAX_CONFIG_VALUE).contains(&money) {
            return Err(CatalogError::InvalidConfig {
                field: "starting.money",
                value: money.to_string(),
            });
        }
        for (field, secs) in [
            ("default_duration", self.default_duration),
            ("starter_duration", self.starter_duration),
        ] {
            if f64::from(secs) > MAX_CONFIG_VALUE {
                return Err(CatalogError::InvalidConfig {
                    field,
                    value: secs.to_string(),
                });
            }
        }
        catalog.validate_job_ids("starting unlocks", &self.starting.unlocked)?;
        catalog.validate_interlude_ids("agi warning sequence", &self.agi_warning_sequence)?;
        Ok(())
    }
}

fn default_rejection_pool() -> Vec<Vec<String>> {
    let chain = |lines: &[&str]| lines.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    vec![
        chain(&["Declined.", "Still declined.", "Please stop asking."]),
        chain(&["Not a good fit.", "Really not a good fit."]),
        chain(&["The client went with someone else."]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_balance_constants() {
        let c = GameConfig::default();
        assert_eq!(c.agi_sum_lose, 21);
        assert_eq!(c.wonder_win, 5);
        assert_eq!(c.starter_duration, 4);
        assert_eq!(c.starting.progression().money, Amount::from_num(48));
        assert_eq!(c.starting.progression().compute, 1);
        assert!(!c.default_rejections.is_empty());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let c: GameConfig = serde_json::from_str(r#"{"wonder_win": 3, "seed": 9}"#).unwrap();
        assert_eq!(c.wonder_win, 3);
        assert_eq!(c.seed, 9);
        assert_eq!(c.agi_sum_lose, 21);
        assert_eq!(c.starter_job.as_str(), "imgclassifier");
    }

    #[test]
    fn offer_interval_never_zero() {
        let c = GameConfig {
            offer_interval: 0,
            ..Default::default()
        };
        assert_eq!(c.offer_interval(), Seconds::from_num(1));
    }

    #[test]
    fn validate_rejects_out_of_range_numbers() {
        let catalog = crate::test_utils::fixture_catalog();
        assert!(GameConfig::default().validate(&catalog).is_ok());

        for money in [f64::NAN, f64::INFINITY, -1.0, 1.0e30] {
            let mut c = GameConfig::default();
            c.starting.money = money;
            assert!(matches!(
                c.validate(&catalog),
                Err(CatalogError::InvalidConfig { field: "starting.money", .. })
            ));
        }

        let c = GameConfig {
            default_duration: 3_000_000_000,
            ..Default::default()
        };
        assert!(matches!(
            c.validate(&catalog),
            Err(CatalogError::InvalidConfig { field: "default_duration", .. })
        ));

        let c = GameConfig {
            starter_duration: u32::MAX,
            ..Default::default()
        };
        assert!(matches!(
            c.validate(&catalog),
            Err(CatalogError::InvalidConfig { field: "starter_duration", .. })
        ));
    }

    #[test]
    fn unrepresentable_starting_money_starts_at_zero() {
        for money in [f64::NAN, 1.0e30] {
            let s = StartingState {
                money,
                ..Default::default()
            };
            assert_eq!(s.progression().money, Amount::ZERO);
        }
    }
}
