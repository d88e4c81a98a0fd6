//! Resolution pipeline: reads content files, resolves references, builds the
//! catalog.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and
//! deserialization helpers, plus [`load_game_data`] for a content directory
//! and [`default_game_data`] for the embedded pack.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use idlemind_core::catalog::{Catalog, CatalogBuilder, CatalogError, DurationRange, JobCategory, JobType};
use idlemind_core::chapter::{ChapterDef, ChapterThreshold, ChoiceBonus};
use idlemind_core::condition::Condition;
use idlemind_core::config::GameConfig;
use idlemind_core::fixed::{Fixed64, Seconds, f64_to_amount, f64_to_fixed64};
use idlemind_core::id::JobTypeId;
use idlemind_core::interlude::{InterludeDef, Trigger};
use idlemind_core::resource::{Cost, Payout, Resource};
use idlemind_core::session::GameSession;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::schema::*;

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during content loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A name reference could not be resolved.
    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    /// A duplicate name was found.
    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// A value is missing, negative or out of range.
    #[error("invalid value in {file} ({owner}): {detail}")]
    InvalidValue {
        file: PathBuf,
        owner: String,
        detail: String,
    },

    /// The resolved content failed catalog validation.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for a data file with the given base name.
///
/// Looks for `{base_name}.ron`, `{base_name}.toml`, and `{base_name}.json`.
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// more than one exists.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

/// Like [`find_data_file`], but returns an error if no file is found.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(file: &Path, detail: impl ToString) -> DataLoadError {
    DataLoadError::Parse {
        file: file.to_path_buf(),
        detail: detail.to_string(),
    }
}

/// Deserialize already-read content. `file` is only used in errors.
pub fn parse_str<T: DeserializeOwned>(content: &str, format: Format, file: &Path) -> Result<T, DataLoadError> {
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_error(file, e)),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_error(file, e)),
        Format::Toml => toml::from_str(content).map_err(|e| parse_error(file, e)),
    }
}

/// Deserialize a list from content. For TOML, extracts the array at
/// `toml_key` from the top-level table; RON and JSON hold a bare list.
pub fn parse_list<T: DeserializeOwned>(
    content: &str,
    format: Format,
    file: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    match format {
        Format::Ron | Format::Json => parse_str(content, format, file),
        Format::Toml => {
            let table: toml::Value = toml::from_str(content).map_err(|e| parse_error(file, e))?;
            let array = table
                .get(toml_key)
                .ok_or_else(|| parse_error(file, format!("missing key '{toml_key}' in TOML file")))?
                .clone();
            array
                .try_into()
                .map_err(|e: toml::de::Error| parse_error(file, e))
        }
    }
}

/// Read a file and deserialize it according to its extension.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    parse_str(&content, format, path)
}

/// Read a list file. See [`parse_list`].
pub fn deserialize_list<T: DeserializeOwned>(path: &Path, toml_key: &str) -> Result<Vec<T>, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    parse_list(&content, format, path, toml_key)
}

// ===========================================================================
// Name resolution helpers
// ===========================================================================

/// Look up a name in a map, returning an `UnresolvedRef` error if not found.
pub fn resolve_name<'a, V>(
    map: &'a HashMap<String, V>,
    name: &str,
    file: &Path,
    expected_kind: &'static str,
) -> Result<&'a V, DataLoadError> {
    map.get(name).ok_or_else(|| DataLoadError::UnresolvedRef {
        file: file.to_path_buf(),
        name: name.to_string(),
        expected_kind,
    })
}

/// Check whether a name already exists in a map, returning a
/// `DuplicateName` error if so.
pub fn check_duplicate<V>(map: &HashMap<String, V>, name: &str, file: &Path) -> Result<(), DataLoadError> {
    if map.contains_key(name) {
        Err(DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: name.to_string(),
        })
    } else {
        Ok(())
    }
}

// ===========================================================================
// Resolution
// ===========================================================================

/// Raw content plus the paths it came from, before resolution.
#[derive(Debug, Clone, Default)]
pub struct RawContent {
    pub jobs: Vec<JobData>,
    pub jobs_file: PathBuf,
    pub interludes: Vec<InterludeData>,
    pub interludes_file: PathBuf,
    pub chapters: Vec<ChapterData>,
    pub chapters_file: PathBuf,
    pub config: GameConfig,
}

/// A resolved, validated content pack.
#[derive(Debug, Clone)]
pub struct GameData {
    pub catalog: Catalog,
    pub config: GameConfig,
}

impl GameData {
    /// Start a new session on this content.
    pub fn new_session(self) -> GameSession {
        GameSession::new(Arc::new(self.catalog), self.config)
    }
}

/// Largest money amount or timer a content file may name.
const MAX_VALUE: f64 = 1.0e9;

struct Resolver<'a> {
    file: &'a Path,
    owner: String,
    jobs: &'a HashMap<String, usize>,
}

impl Resolver<'_> {
    fn invalid(&self, detail: impl Into<String>) -> DataLoadError {
        DataLoadError::InvalidValue {
            file: self.file.to_path_buf(),
            owner: self.owner.clone(),
            detail: detail.into(),
        }
    }

    fn whole<T: TryFrom<u64>>(&self, value: f64, what: &str) -> Result<T, DataLoadError> {
        if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
            return Err(self.invalid(format!("{what} must be a non-negative whole number, got {value}")));
        }
        T::try_from(value as u64).map_err(|_| self.invalid(format!("{what} {value} is out of range")))
    }

    fn non_negative(&self, value: f64, what: &str) -> Result<f64, DataLoadError> {
        if !value.is_finite() || value < 0.0 {
            return Err(self.invalid(format!("{what} must be non-negative, got {value}")));
        }
        if value > MAX_VALUE {
            return Err(self.invalid(format!("{what} {value} is out of range")));
        }
        Ok(value)
    }

    fn bounded<T>(&self, value: T, what: &str) -> Result<T, DataLoadError>
    where
        T: Copy + Into<u64> + std::fmt::Display,
    {
        if value.into() > MAX_VALUE as u64 {
            return Err(self.invalid(format!("{what} {value} is out of range")));
        }
        Ok(value)
    }

    fn job_ref(&self, job: &Option<String>, what: &str) -> Result<JobTypeId, DataLoadError> {
        let name = job
            .as_deref()
            .ok_or_else(|| self.invalid(format!("{what} needs a `job`")))?;
        resolve_name(self.jobs, name, self.file, "job type")?;
        Ok(JobTypeId::new(name))
    }

    fn condition(&self, data: &ConditionData) -> Result<Condition, DataLoadError> {
        let v = data.value;
        Ok(match data.kind {
            ConditionKind::Job => Condition::JobUnlocked(self.job_ref(&data.job, "job condition")?),
            ConditionKind::Money => Condition::Money(f64_to_amount(self.non_negative(v, "money")?)),
            ConditionKind::Data => Condition::Data(self.whole(v, "data")?),
            ConditionKind::Compute => Condition::Compute(self.whole(v, "compute")?),
            ConditionKind::Iq => Condition::Iq(self.whole(v, "iq")?),
            ConditionKind::Autonomy => Condition::Autonomy(self.whole(v, "autonomy")?),
            ConditionKind::Generality => Condition::Generality(self.whole(v, "generality")?),
            ConditionKind::Wonder => Condition::Wonder(self.whole(v, "wonder")?),
            ConditionKind::CompletedJob => {
                Condition::CompletedJob(self.job_ref(&data.job, "completed_job condition")?)
            }
            ConditionKind::Choice => Condition::Choice(self.job_ref(&data.job, "choice condition")?),
        })
    }

    fn trigger(&self, data: &TriggerData) -> Result<Trigger, DataLoadError> {
        let v = data.value;
        Ok(match data.kind {
            TriggerKind::Money => Trigger::Money(f64_to_amount(self.non_negative(v, "money")?)),
            TriggerKind::Data => Trigger::Data(self.whole(v, "data")?),
            TriggerKind::Iq => Trigger::Iq(self.whole(v, "iq")?),
            TriggerKind::Autonomy => Trigger::Autonomy(self.whole(v, "autonomy")?),
            TriggerKind::Generality => Trigger::Generality(self.whole(v, "generality")?),
            TriggerKind::AgiSum => Trigger::AgiSum(self.whole(v, "agi_sum")?),
            TriggerKind::CompletedJob => Trigger::CompletedJob(self.job_ref(&data.job, "completed_job trigger")?),
            TriggerKind::UnlockedJob => Trigger::UnlockedJob(self.job_ref(&data.job, "unlocked_job trigger")?),
            TriggerKind::JobRun => Trigger::JobRun(self.job_ref(&data.job, "job_run trigger")?),
            TriggerKind::ChapterTime => {
                let chapter = data
                    .chapter
                    .ok_or_else(|| self.invalid("chapter_time trigger needs a `chapter`"))?;
                let seconds: Seconds = f64_to_fixed64(self.non_negative(v, "seconds")?);
                Trigger::ChapterTime { chapter, seconds }
            }
        })
    }
}

fn resource(data: ResourceData) -> Resource {
    match data {
        ResourceData::Money => Resource::Money,
        ResourceData::Data => Resource::Data,
        ResourceData::Compute => Resource::Compute,
        ResourceData::Iq => Resource::Iq,
        ResourceData::Autonomy => Resource::Autonomy,
        ResourceData::Generality => Resource::Generality,
        ResourceData::Wonder => Resource::Wonder,
    }
}

fn category(data: CategoryData) -> JobCategory {
    match data {
        CategoryData::Standard => JobCategory::Standard,
        CategoryData::Onetime => JobCategory::Onetime,
        CategoryData::Tool => JobCategory::Tool,
        CategoryData::Gameplay => JobCategory::Gameplay,
    }
}

fn resolve_job(data: &JobData, r: &Resolver<'_>) -> Result<JobType, DataLoadError> {
    let costs = |list: &[CostData]| -> Result<Vec<Cost>, DataLoadError> {
        list.iter()
            .map(|c| {
                let amount = r.non_negative(c.amount, "cost amount")?;
                Ok(Cost {
                    resource: resource(c.resource),
                    amount: f64_to_amount(amount),
                })
            })
            .collect()
    };

    let mut job = JobType::new(data.id.clone(), data.name.clone());
    job.chapters = data.chapters.clone();
    job.prerequisites = data
        .prerequisites
        .iter()
        .map(|c| r.condition(c))
        .collect::<Result<_, _>>()?;
    job.display_triggers = data
        .display_triggers
        .as_ref()
        .map(|list| list.iter().map(|c| r.condition(c)).collect::<Result<Vec<_>, _>>())
        .transpose()?;
    job.unlock_cost = costs(&data.unlock_cost)?;
    job.run_cost = costs(&data.run_cost)?;
    job.payouts = data
        .payouts
        .iter()
        .map(|p| Ok(Payout::new(resource(p.resource), r.bounded(p.min, "payout min")?)))
        .collect::<Result<_, DataLoadError>>()?;
    job.duration = match data.duration {
        Some((min, max)) => {
            let min = r.bounded(min, "duration min")?;
            let max = r.bounded(max, "duration max")?;
            if min > max {
                return Err(r.invalid(format!("duration range ({min}, {max}) is inverted")));
            }
            Some(DurationRange { min, max })
        }
        None => None,
    };
    job.category = category(data.category);
    job.acceptance_chance = match data.acceptance_chance {
        Some(p) if !(0.0..=1.0).contains(&p) => {
            return Err(r.invalid(format!("acceptance_chance must be in [0, 1], got {p}")));
        }
        Some(p) => Some(Fixed64::from_num(p)),
        None => None,
    };
    job.rejection_messages = data.rejection_messages.clone();
    job.wonder = data.wonder;
    job.bad_end = data.bad_end.clone();
    job.icon = data.icon.clone();
    Ok(job)
}

fn resolve_chapter(data: &ChapterData) -> ChapterDef {
    let value = data.threshold.value;
    let as_stat = |v: u64| u32::try_from(v).unwrap_or(u32::MAX);
    let threshold = match data.threshold.kind {
        ThresholdKind::Completions => ChapterThreshold::Completions(value),
        ThresholdKind::Iq => ChapterThreshold::Iq(as_stat(value)),
        ThresholdKind::Generality => ChapterThreshold::Generality(as_stat(value)),
        ThresholdKind::Autonomy => ChapterThreshold::Autonomy(as_stat(value)),
    };
    let mut chapter = ChapterDef::new(data.number, data.story.clone(), threshold);
    chapter.choice_bonuses = data
        .choice_bonuses
        .iter()
        .map(|b| ChoiceBonus {
            choice: b.choice.clone(),
            speed_bonus: b.speed_bonus,
            quality_bonus: b.quality_bonus,
            compute: b.compute,
        })
        .collect();
    chapter
}

/// Resolve raw content into a validated catalog.
pub fn resolve(raw: RawContent) -> Result<GameData, DataLoadError> {
    let mut job_index: HashMap<String, usize> = HashMap::new();
    for (i, job) in raw.jobs.iter().enumerate() {
        check_duplicate(&job_index, &job.id, &raw.jobs_file)?;
        job_index.insert(job.id.clone(), i);
    }

    let mut builder = CatalogBuilder::new();
    for data in &raw.jobs {
        let resolver = Resolver {
            file: &raw.jobs_file,
            owner: format!("job type {}", data.id),
            jobs: &job_index,
        };
        builder.register_job(resolve_job(data, &resolver)?)?;
    }

    let mut interlude_index: HashMap<String, usize> = HashMap::new();
    for (i, data) in raw.interludes.iter().enumerate() {
        check_duplicate(&interlude_index, &data.id, &raw.interludes_file)?;
        interlude_index.insert(data.id.clone(), i);

        let resolver = Resolver {
            file: &raw.interludes_file,
            owner: format!("interlude {}", data.id),
            jobs: &job_index,
        };
        let mut def = InterludeDef::new(data.id.clone(), resolver.trigger(&data.trigger)?);
        def.delay_jobs = data.delay_jobs;
        builder.register_interlude(def)?;
    }

    for data in &raw.chapters {
        builder.register_chapter(resolve_chapter(data))?;
    }

    let catalog = builder.build()?;
    raw.config.validate(&catalog)?;
    info!(
        jobs = catalog.jobs().len(),
        interludes = catalog.interludes().len(),
        chapters = catalog.chapters().len(),
        "content loaded"
    );
    Ok(GameData {
        catalog,
        config: raw.config,
    })
}

// ===========================================================================
// Entry points
// ===========================================================================

/// Load a content directory. `jobs` is required; `interludes`, `chapters`
/// and `config` are optional.
pub fn load_game_data(dir: &Path) -> Result<GameData, DataLoadError> {
    let jobs_file = require_data_file(dir, "jobs")?;
    let jobs = deserialize_list(&jobs_file, "jobs")?;

    let (interludes, interludes_file) = match find_data_file(dir, "interludes")? {
        Some(path) => (deserialize_list(&path, "interludes")?, path),
        None => (Vec::new(), PathBuf::new()),
    };
    let (chapters, chapters_file) = match find_data_file(dir, "chapters")? {
        Some(path) => (deserialize_list(&path, "chapters")?, path),
        None => (Vec::new(), PathBuf::new()),
    };
    let config = match find_data_file(dir, "config")? {
        Some(path) => deserialize_file(&path)?,
        None => GameConfig::default(),
    };

    resolve(RawContent {
        jobs,
        jobs_file,
        interludes,
        interludes_file,
        chapters,
        chapters_file,
        config,
    })
}

const DEFAULT_JOBS: &str = include_str!("../content/jobs.ron");
const DEFAULT_INTERLUDES: &str = include_str!("../content/interludes.ron");
const DEFAULT_CHAPTERS: &str = include_str!("../content/chapters.ron");
const DEFAULT_CONFIG: &str = include_str!("../content/config.ron");

/// The content pack shipped with the crate.
pub fn default_game_data() -> Result<GameData, DataLoadError> {
    let jobs_file = PathBuf::from("<default>/jobs.ron");
    let interludes_file = PathBuf::from("<default>/interludes.ron");
    let chapters_file = PathBuf::from("<default>/chapters.ron");
    let config_file = PathBuf::from("<default>/config.ron");

    resolve(RawContent {
        jobs: parse_list(DEFAULT_JOBS, Format::Ron, &jobs_file, "jobs")?,
        interludes: parse_list(DEFAULT_INTERLUDES, Format::Ron, &interludes_file, "interludes")?,
        chapters: parse_list(DEFAULT_CHAPTERS, Format::Ron, &chapters_file, "chapters")?,
        config: parse_str(DEFAULT_CONFIG, Format::Ron, &config_file)?,
        jobs_file,
        interludes_file,
        chapters_file,
    })
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use idlemind_core::fixed::Amount;
    use std::fs;

    /// Create a temporary directory with a unique name for test isolation.
    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "idlemind_data_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Clean up a test directory.
    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    const JOBS_RON: &str = r#"[
        (id: "imgclassifier", name: "Image Classifier",
         payouts: [(resource: money, min: 4)], duration: Some((4, 6))),
        (id: "sentiment", name: "Sentiment",
         prerequisites: [(type: job, job: Some("imgclassifier")), (type: money, value: 60.0)],
         unlock_cost: [(resource: money, amount: 50.0)]),
    ]"#;

    // -----------------------------------------------------------------------
    // detect_format / find_data_file
    // -----------------------------------------------------------------------

    #[test]
    fn detect_format_by_extension() {
        assert_eq!(detect_format(Path::new("jobs.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("jobs.toml")).unwrap(), Format::Toml);
        assert_eq!(detect_format(Path::new("jobs.json")).unwrap(), Format::Json);
        assert!(matches!(
            detect_format(Path::new("jobs.yaml")),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            detect_format(Path::new("jobs")),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn find_data_file_found_and_missing() {
        let dir = make_test_dir("find");
        assert_eq!(find_data_file(&dir, "jobs").unwrap(), None);
        fs::write(dir.join("jobs.json"), "[]").unwrap();
        assert_eq!(find_data_file(&dir, "jobs").unwrap(), Some(dir.join("jobs.json")));
        cleanup(&dir);
    }

    #[test]
    fn find_data_file_conflict() {
        let dir = make_test_dir("find_conflict");
        fs::write(dir.join("jobs.ron"), "[]").unwrap();
        fs::write(dir.join("jobs.json"), "[]").unwrap();

        let result = find_data_file(&dir, "jobs");
        assert!(matches!(result, Err(DataLoadError::ConflictingFormats { .. })));

        cleanup(&dir);
    }

    #[test]
    fn require_data_file_missing() {
        let dir = make_test_dir("require_missing");
        let result = require_data_file(&dir, "jobs");
        assert!(matches!(result, Err(DataLoadError::MissingRequired { ref file, .. }) if file == "jobs"));
        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // deserialize
    // -----------------------------------------------------------------------

    #[test]
    fn deserialize_list_toml_missing_key() {
        let dir = make_test_dir("list_toml_missing");
        let path = dir.join("jobs.toml");
        fs::write(&path, r#"foo = "bar""#).unwrap();

        let result: Result<Vec<JobData>, _> = deserialize_list(&path, "jobs");
        assert!(matches!(result, Err(DataLoadError::Parse { .. })));

        cleanup(&dir);
    }

    #[test]
    fn deserialize_file_parse_error() {
        let dir = make_test_dir("parse_err");
        let path = dir.join("jobs.ron");
        fs::write(&path, "this is not valid RON {{{").unwrap();

        let result: Result<Vec<JobData>, _> = deserialize_file(&path);
        assert!(matches!(result, Err(DataLoadError::Parse { .. })));

        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // load_game_data
    // -----------------------------------------------------------------------

    #[test]
    fn load_jobs_only_uses_default_config() {
        let dir = make_test_dir("jobs_only");
        fs::write(dir.join("jobs.ron"), JOBS_RON).unwrap();

        let data = load_game_data(&dir).unwrap();
        assert_eq!(data.catalog.jobs().len(), 2);
        assert!(data.catalog.interludes().is_empty());
        assert_eq!(data.config.agi_sum_lose, 21);

        let sentiment = data.catalog.job(&JobTypeId::new("sentiment")).unwrap();
        assert_eq!(sentiment.prerequisites[1], Condition::Money(Amount::from_num(60)));
        assert_eq!(sentiment.unlock_cost[0].amount, Amount::from_num(50));

        cleanup(&dir);
    }

    #[test]
    fn load_missing_jobs_fails() {
        let dir = make_test_dir("no_jobs");
        fs::write(dir.join("chapters.ron"), "[]").unwrap();
        assert!(matches!(
            load_game_data(&dir),
            Err(DataLoadError::MissingRequired { .. })
        ));
        cleanup(&dir);
    }

    #[test]
    fn load_mixed_formats() {
        let dir = make_test_dir("mixed");
        fs::write(dir.join("jobs.ron"), JOBS_RON).unwrap();
        fs::write(
            dir.join("interludes.json"),
            r#"[{"id": "rich", "trigger": {"type": "money", "value": 100}},
                {"id": "first_sentiment", "trigger": {"type": "job_run", "job": "sentiment"}, "delay_jobs": 2}]"#,
        )
        .unwrap();
        fs::write(
            dir.join("chapters.toml"),
            r#"
[[chapters]]
number = 1
story = "chapter_1"
threshold = { type = "completions", value = 0 }

[[chapters]]
number = 2
story = "chapter_2"
threshold = { type = "completions", value = 10 }
choice_bonuses = [{ choice = "speed", speed_bonus = 50 }]
"#,
        )
        .unwrap();
        fs::write(dir.join("config.json"), r#"{"queue_cap": 3, "seed": 7}"#).unwrap();

        let data = load_game_data(&dir).unwrap();
        assert_eq!(data.catalog.interludes().len(), 2);
        assert_eq!(data.catalog.interludes()[1].delay_jobs, Some(2));
        assert_eq!(data.catalog.chapters().len(), 2);
        assert_eq!(data.catalog.chapter(2).unwrap().choice_bonuses[0].speed_bonus, 50);
        assert_eq!(data.config.queue_cap, 3);
        assert_eq!(data.config.seed, 7);

        cleanup(&dir);
    }

    #[test]
    fn unresolved_job_reference() {
        let dir = make_test_dir("unresolved");
        fs::write(
            dir.join("jobs.json"),
            r#"[{"id": "a", "name": "A", "prerequisites": [{"type": "job", "job": "ghost"}]}]"#,
        )
        .unwrap();
        let result = load_game_data(&dir);
        assert!(matches!(
            result,
            Err(DataLoadError::UnresolvedRef { ref name, expected_kind: "job type", .. }) if name == "ghost"
        ));
        cleanup(&dir);
    }

    #[test]
    fn duplicate_job_id() {
        let dir = make_test_dir("dup");
        fs::write(
            dir.join("jobs.json"),
            r#"[{"id": "a", "name": "A"}, {"id": "a", "name": "Again"}]"#,
        )
        .unwrap();
        assert!(matches!(
            load_game_data(&dir),
            Err(DataLoadError::DuplicateName { ref name, .. }) if name == "a"
        ));
        cleanup(&dir);
    }

    #[test]
    fn invalid_values_are_reported() {
        let dir = make_test_dir("invalid");
        fs::write(
            dir.join("jobs.json"),
            r#"[{"id": "a", "name": "A", "prerequisites": [{"type": "iq", "value": 1.5}]}]"#,
        )
        .unwrap();
        assert!(matches!(load_game_data(&dir), Err(DataLoadError::InvalidValue { .. })));

        fs::write(
            dir.join("jobs.json"),
            r#"[{"id": "a", "name": "A", "acceptance_chance": 1.5}]"#,
        )
        .unwrap();
        assert!(matches!(load_game_data(&dir), Err(DataLoadError::InvalidValue { .. })));
        cleanup(&dir);
    }

    #[test]
    fn inverted_duration_is_rejected() {
        let dir = make_test_dir("inverted");
        fs::write(
            dir.join("jobs.json"),
            r#"[{"id": "a", "name": "A", "duration": [9, 3]}]"#,
        )
        .unwrap();
        assert!(matches!(load_game_data(&dir), Err(DataLoadError::InvalidValue { .. })));
        cleanup(&dir);
    }

    #[test]
    fn oversized_durations_are_rejected() {
        let dir = make_test_dir("huge_duration");
        for range in ["(3000000000, 3000000000)", "(4, 3000000000)"] {
            fs::write(
                dir.join("jobs.ron"),
                format!(r#"[(id: "a", name: "A", duration: Some({range}))]"#),
            )
            .unwrap();
            match load_game_data(&dir) {
                Err(DataLoadError::InvalidValue { owner, detail, .. }) => {
                    assert_eq!(owner, "job type a");
                    assert!(detail.contains("duration"), "{detail}");
                }
                other => panic!("expected InvalidValue, got {other:?}"),
            }
        }
        cleanup(&dir);
    }

    #[test]
    fn oversized_payout_is_rejected() {
        let dir = make_test_dir("huge_payout");
        fs::write(
            dir.join("jobs.ron"),
            r#"[(id: "a", name: "A", payouts: [(resource: money, min: 10000000000000000000)])]"#,
        )
        .unwrap();
        match load_game_data(&dir) {
            Err(DataLoadError::InvalidValue { detail, .. }) => {
                assert!(detail.contains("payout"), "{detail}");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
        cleanup(&dir);
    }

    #[test]
    fn config_with_unknown_starting_job_fails() {
        let dir = make_test_dir("bad_config");
        fs::write(dir.join("jobs.ron"), JOBS_RON).unwrap();
        fs::write(
            dir.join("config.ron"),
            r#"(starting: (unlocked: ["nope"]))"#,
        )
        .unwrap();
        assert!(matches!(
            load_game_data(&dir),
            Err(DataLoadError::Catalog(CatalogError::UnknownJob { .. }))
        ));
        cleanup(&dir);
    }

    #[test]
    fn config_with_out_of_range_numbers_fails() {
        let dir = make_test_dir("config_range");
        fs::write(dir.join("jobs.ron"), JOBS_RON).unwrap();
        for (config, field) in [
            ("(starting: (money: 1000000000000000000000000000000.0))", "starting.money"),
            ("(starting: (money: -5.0))", "starting.money"),
            ("(default_duration: 3000000000)", "default_duration"),
            ("(starter_duration: 3000000000)", "starter_duration"),
        ] {
            fs::write(dir.join("config.ron"), config).unwrap();
            match load_game_data(&dir) {
                Err(DataLoadError::Catalog(CatalogError::InvalidConfig { field: f, .. })) => {
                    assert_eq!(f, field)
                }
                other => panic!("expected InvalidConfig for {config}, got {other:?}"),
            }
        }
        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // Default pack
    // -----------------------------------------------------------------------

    #[test]
    fn default_pack_loads() {
        let data = default_game_data().unwrap();
        let starter = &data.config.starter_job;
        assert!(data.catalog.contains_job(starter));
        assert!(data.catalog.contains_job(&data.config.web_scrape_job));
        assert!(!data.catalog.chapters().is_empty());
        assert_eq!(data.config.starting.unlocked, vec![starter.clone()]);
    }

    #[test]
    fn default_pack_starts_a_session() {
        let mut session = default_game_data().unwrap().new_session();
        let id = session.request_offer().unwrap();
        let offer = session.offers().iter().find(|o| o.id == id).unwrap();
        assert_eq!(offer.job_type.as_str(), "imgclassifier");
        assert_eq!(offer.duration, 4);
    }

    // -----------------------------------------------------------------------
    // Error display messages
    // -----------------------------------------------------------------------

    #[test]
    fn error_display_messages() {
        let e = DataLoadError::MissingRequired {
            file: "jobs".to_string(),
            dir: PathBuf::from("/data"),
        };
        assert!(format!("{e}").contains("jobs"));
        assert!(format!("{e}").contains("/data"));

        let e = DataLoadError::InvalidValue {
            file: PathBuf::from("jobs.ron"),
            owner: "job type a".to_string(),
            detail: "bad".to_string(),
        };
        let msg = format!("{e}");
        assert!(msg.contains("jobs.ron"));
        assert!(msg.contains("job type a"));

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let data_err: DataLoadError = io_err.into();
        assert!(matches!(data_err, DataLoadError::Io(_)));
    }
}
