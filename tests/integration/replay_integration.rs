//! Journal replay end to end.

use super::test_utils::p;
use serde_json::json;
use syncpath::comparer::Comparison;
use syncpath::config::IndexConfig;
use syncpath::replay::{parse_journal, ReplayEvent, Replayer};
use syncpath::ApiError;

const JOURNAL: &str = r#"
# initial scan
{"op":"insert","path":"sync/docs","value":{"kind":"dir"}}
{"op":"insert","path":"sync/docs/a.txt","value":{"size":12}}
{"op":"insert","path":"sync/docs/b.txt","value":{"size":40}}
{"op":"insert","path":"sync/music/song.mp3","value":{"size":4096}}

# server-side move, then local delete
{"op":"rename","from":"sync/docs","to":"sync/archive/docs"}
{"op":"upsert","path":"sync/archive/docs/a.txt","value":{"size":13}}
{"op":"remove","path":"sync/music"}
"#;

#[test]
fn test_replay_final_state_and_events() {
    let mut replayer = Replayer::new(&IndexConfig::default()).unwrap();
    replayer.apply_strict(&parse_journal(JOURNAL).unwrap()).unwrap();

    let report = replayer.report();
    assert_eq!(report.applied, 7);
    assert_eq!(
        report.entries,
        vec![
            (p("sync/archive/docs"), json!({"kind": "dir"})),
            (p("sync/archive/docs/a.txt"), json!({"size": 13})),
            (p("sync/archive/docs/b.txt"), json!({"size": 40})),
        ]
    );

    let relocated = report
        .events
        .iter()
        .filter(|e| matches!(e, ReplayEvent::Relocated { .. }))
        .count();
    assert_eq!(relocated, 3);
    assert!(report.events.contains(&ReplayEvent::Deleted {
        index: "sync".to_string(),
        path: p("sync/music/song.mp3"),
        value: json!({"size": 4096}),
    }));
    replayer.store().verify().unwrap();
}

#[test]
fn test_replay_with_nfc_comparison() {
    let config = IndexConfig {
        root: "sync".to_string(),
        comparison: Comparison::Nfc,
    };
    // "Café" precomposed, then the same name with a combining accent
    let journal = "{\"op\":\"insert\",\"path\":\"sync/Caf\u{e9}\",\"value\":1}\n\
                   {\"op\":\"insert\",\"path\":\"sync/Cafe\u{301}\",\"value\":2}\n";
    let mut replayer = Replayer::new(&config).unwrap();
    let err = replayer
        .apply_strict(&parse_journal(journal).unwrap())
        .unwrap_err();
    assert!(matches!(err, ApiError::ReplayFailed { line: 2, .. }));
    assert_eq!(replayer.store().len(), 1);
}

#[test]
fn test_report_serializes_to_json() {
    let mut replayer = Replayer::new(&IndexConfig::default()).unwrap();
    replayer.apply_all(&parse_journal(JOURNAL).unwrap());
    let value = serde_json::to_value(replayer.report()).unwrap();
    assert_eq!(value["root"], json!("sync"));
    assert_eq!(value["failures"], json!([]));
    assert_eq!(value["entries"].as_array().unwrap().len(), 3);
}
