use std::path::PathBuf;

use nowplaying_proto::config::Config;
use nowplaying_proto::script::{Script, StepKind};

fn workspace_file(rel: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..").join(rel)
}

#[test]
fn demo_script_loads_and_loops() {
    let script = Script::load(&workspace_file("demos/scenario.toml")).unwrap();
    assert!(script.looping);
    let kinds: Vec<StepKind> = script.steps.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![
            StepKind::Playing,
            StepKind::Paused,
            StepKind::Error,
            StepKind::Playing,
            StepKind::Idle,
        ]
    );

    // The first track is long enough to scroll on a 15 character budget.
    let max_chars = Config::default().display.max_chars;
    assert!(script.steps[0].track.chars().count() > max_chars);
    assert!(script.steps[3].track.chars().count() <= max_chars);
}

#[test]
fn demo_script_as_json_parses_the_same() {
    let script = Script::load(&workspace_file("demos/scenario.toml")).unwrap();
    let json = serde_json::to_string(&script).unwrap();
    assert_eq!(Script::from_json_str(&json).unwrap(), script);
}
