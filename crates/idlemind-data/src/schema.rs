//! Serde data file structs for game content.
//!
//! These structs define the on-disk format for job types, interludes and
//! chapters. Money and thresholds are plain `f64` and references are plain
//! strings; the loader validates and resolves them into core types.

use serde::Deserialize;

// ===========================================================================
// Shared
// ===========================================================================

/// A resource name in a data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceData {
    Money,
    Data,
    Compute,
    Iq,
    Autonomy,
    Generality,
    Wonder,
}

/// A cost entry: `(resource: money, amount: 50.0)`.
#[derive(Debug, Clone, Deserialize)]
pub struct CostData {
    pub resource: ResourceData,
    pub amount: f64,
}

/// A payout entry. The maximum is derived from `min`.
#[derive(Debug, Clone, Deserialize)]
pub struct PayoutData {
    pub resource: ResourceData,
    pub min: u64,
}

// ===========================================================================
// Job types
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryData {
    #[default]
    Standard,
    Onetime,
    Tool,
    Gameplay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    /// Set membership; needs `job`.
    Job,
    Money,
    Data,
    Compute,
    Iq,
    Autonomy,
    Generality,
    Wonder,
    /// Set membership; needs `job`.
    CompletedJob,
    /// Set membership; needs `job`.
    Choice,
}

/// A prerequisite or display condition.
#[derive(Debug, Clone, Deserialize)]
pub struct ConditionData {
    #[serde(rename = "type")]
    pub kind: ConditionKind,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub job: Option<String>,
}

/// A job type definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct JobData {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub chapters: Vec<u32>,
    #[serde(default)]
    pub prerequisites: Vec<ConditionData>,
    #[serde(default)]
    pub display_triggers: Option<Vec<ConditionData>>,
    #[serde(default)]
    pub unlock_cost: Vec<CostData>,
    #[serde(default)]
    pub run_cost: Vec<CostData>,
    #[serde(default)]
    pub payouts: Vec<PayoutData>,
    /// Inclusive `(min, max)` seconds.
    #[serde(default)]
    pub duration: Option<(u32, u32)>,
    #[serde(default)]
    pub category: CategoryData,
    #[serde(default)]
    pub acceptance_chance: Option<f64>,
    #[serde(default)]
    pub rejection_messages: Vec<String>,
    #[serde(default)]
    pub wonder: bool,
    #[serde(default)]
    pub bad_end: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

// ===========================================================================
// Interludes
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Money,
    Data,
    Iq,
    Autonomy,
    Generality,
    AgiSum,
    CompletedJob,
    UnlockedJob,
    JobRun,
    /// `value` seconds spent in `chapter`.
    ChapterTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TriggerData {
    #[serde(rename = "type")]
    pub kind: TriggerKind,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default)]
    pub chapter: Option<u32>,
}

/// An interlude definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct InterludeData {
    pub id: String,
    pub trigger: TriggerData,
    #[serde(default)]
    pub delay_jobs: Option<u32>,
}

// ===========================================================================
// Chapters
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdKind {
    Completions,
    Iq,
    Generality,
    Autonomy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThresholdData {
    #[serde(rename = "type")]
    pub kind: ThresholdKind,
    pub value: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceBonusData {
    pub choice: String,
    #[serde(default)]
    pub speed_bonus: u32,
    #[serde(default)]
    pub quality_bonus: u32,
    #[serde(default)]
    pub compute: u32,
}

/// A chapter definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct ChapterData {
    pub number: u32,
    pub story: String,
    pub threshold: ThresholdData,
    #[serde(default)]
    pub choice_bonuses: Vec<ChoiceBonusData>,
}

// ===========================================================================
// Tests
// ===========================================================================
