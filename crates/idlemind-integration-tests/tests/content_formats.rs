//! The same content written as RON, JSON and TOML loads to the same catalog,
//! and a loaded directory pack plays like the embedded one.

use std::fs;
use std::path::{Path, PathBuf};

use idlemind_core::session::ClickOutcome;
use idlemind_core::test_utils::*;
use idlemind_data::{GameData, load_game_data};

fn make_test_dir(suffix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "idlemind_integration_{suffix}_{}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn cleanup(dir: &Path) {
    let _ = fs::remove_dir_all(dir);
}

const JOBS_RON: &str = r#"[
    (
        id: "imgclassifier",
        name: "Image Classifier",
        run_cost: [(resource: compute, amount: 1.0)],
        payouts: [(resource: money, min: 4), (resource: data, min: 2)],
        duration: Some((4, 6)),
    ),
    (
        id: "chatbot",
        name: "Chatbot",
        category: tool,
        prerequisites: [(type: job, job: Some("imgclassifier")), (type: money, value: 80.0)],
        unlock_cost: [(resource: money, amount: 60.0)],
        payouts: [(resource: money, min: 20), (resource: autonomy, min: 1)],
        acceptance_chance: Some(0.5),
        rejection_messages: ["Busy."],
    ),
]"#;

const JOBS_JSON: &str = r#"[
    {
        "id": "imgclassifier",
        "name": "Image Classifier",
        "run_cost": [{"resource": "compute", "amount": 1.0}],
        "payouts": [{"resource": "money", "min": 4}, {"resource": "data", "min": 2}],
        "duration": [4, 6]
    },
    {
        "id": "chatbot",
        "name": "Chatbot",
        "category": "tool",
        "prerequisites": [{"type": "job", "job": "imgclassifier"}, {"type": "money", "value": 80.0}],
        "unlock_cost": [{"resource": "money", "amount": 60.0}],
        "payouts": [{"resource": "money", "min": 20}, {"resource": "autonomy", "min": 1}],
        "acceptance_chance": 0.5,
        "rejection_messages": ["Busy."]
    }
]"#;

const JOBS_TOML: &str = r#"
[[jobs]]
id = "imgclassifier"
name = "Image Classifier"
run_cost = [{ resource = "compute", amount = 1.0 }]
payouts = [{ resource = "money", min = 4 }, { resource = "data", min = 2 }]
duration = [4, 6]

[[jobs]]
id = "chatbot"
name = "Chatbot"
category = "tool"
prerequisites = [{ type = "job", job = "imgclassifier" }, { type = "money", value = 80.0 }]
unlock_cost = [{ resource = "money", amount = 60.0 }]
payouts = [{ resource = "money", min = 20 }, { resource = "autonomy", min = 1 }]
acceptance_chance = 0.5
rejection_messages = ["Busy."]
"#;

const INTERLUDES_RON: &str = r#"[
    (id: "first_chat", trigger: (type: job_run, job: Some("chatbot")), delay_jobs: Some(1)),
]"#;

const INTERLUDES_TOML: &str = r#"
[[interludes]]
id = "first_chat"
delay_jobs = 1
trigger = { type = "job_run", job = "chatbot" }
"#;

fn load_pack(suffix: &str, files: &[(&str, &str)]) -> GameData {
    let dir = make_test_dir(suffix);
    for (name, content) in files {
        fs::write(dir.join(name), content).unwrap();
    }
    let data = load_game_data(&dir).unwrap();
    cleanup(&dir);
    data
}

fn jobs_json(data: &GameData) -> serde_json::Value {
    serde_json::to_value(data.catalog.jobs()).unwrap()
}

#[test]
fn three_formats_load_identically() {
    let ron = load_pack("ron", &[("jobs.ron", JOBS_RON), ("interludes.ron", INTERLUDES_RON)]);
    let json = load_pack("json", &[("jobs.json", JOBS_JSON)]);
    let toml = load_pack("toml", &[("jobs.toml", JOBS_TOML), ("interludes.toml", INTERLUDES_TOML)]);

    assert_eq!(jobs_json(&ron), jobs_json(&json));
    assert_eq!(jobs_json(&ron), jobs_json(&toml));
    assert_eq!(
        serde_json::to_value(ron.catalog.interludes()).unwrap(),
        serde_json::to_value(toml.catalog.interludes()).unwrap(),
    );
    assert!(json.catalog.interludes().is_empty());
}

#[test]
fn directory_pack_plays() {
    let data = load_pack("play", &[("jobs.ron", JOBS_RON), ("interludes.ron", INTERLUDES_RON)]);
    let mut session = data.new_session();

    let id = session.request_offer().unwrap();
    assert_eq!(session.click_offer(id), ClickOutcome::Accepted);
    session.tick(secs(4.0));
    assert_eq!(session.progression().money, money(52));

    session.debug_grant(idlemind_core::resource::Resource::Money, money(28));
    let chatbot = job_id("chatbot");
    assert!(session.is_job_visible(&chatbot));
    assert!(session.can_unlock_job(&chatbot));
}

#[test]
fn conflicting_formats_are_rejected() {
    let dir = make_test_dir("conflict");
    fs::write(dir.join("jobs.ron"), JOBS_RON).unwrap();
    fs::write(dir.join("jobs.json"), JOBS_JSON).unwrap();
    assert!(matches!(
        load_game_data(&dir),
        Err(idlemind_data::DataLoadError::ConflictingFormats { .. })
    ));
    cleanup(&dir);
}
