use anyhow::{Context, Result};
use rayon::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::account::AccountData;
use crate::config::ExportLayout;
use crate::models::{AccountFiles, ExportFile, ExportLocation, HistoryFiles, RawEvent};

#[derive(Debug, Clone, Default)]
pub struct ExportData {
    pub account: AccountData,
    pub history: HistoryFiles,
}

/// Parse every file of an export. Unreadable files are logged and skipped.
pub fn load_export(location: &ExportLocation) -> ExportData {
    let account: AccountFiles = parse_all(&location.account_files).into_iter().collect();

    let history: HistoryFiles = parse_all(&location.history_files)
        .into_iter()
        .filter_map(|(key, value)| match history_events(value) {
            Some(events) => Some((key, events)),
            None => {
                warn!(file = %key, "history file is not a list of events, skipping");
                None
            }
        })
        .collect();

    debug!(account = account.len(), history = history.len(), "loaded export");
    ExportData {
        account: AccountData::new(account),
        history,
    }
}

fn parse_all(files: &[ExportFile]) -> Vec<(String, Value)> {
    files
        .par_iter()
        .filter_map(|f| match read_json(&f.path) {
            Ok(value) => Some((f.key.clone(), value)),
            Err(e) => {
                warn!(file = %f.path.display(), error = %e, "could not parse export file");
                None
            }
        })
        .collect()
}

pub fn read_json(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

/// Events of one history file; non-object items are dropped.
pub fn history_events(value: Value) -> Option<Vec<RawEvent>> {
    match value {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    }
}

/// Partition history files into (audio, video) by case-sensitive key markers.
pub fn split_history(history: &HistoryFiles, layout: &ExportLayout) -> (HistoryFiles, HistoryFiles) {
    let pick = |marker: &str| -> HistoryFiles {
        history
            .iter()
            .filter(|(key, _)| key.contains(marker))
            .map(|(key, events)| (key.clone(), events.clone()))
            .collect()
    };
    (pick(&layout.audio_marker), pick(&layout.video_marker))
}

/// All events of a subset, files in key order.
pub fn concat_events(files: &HistoryFiles) -> Vec<RawEvent> {
    files.values().flat_map(|events| events.iter().cloned()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scan_export;
    use serde_json::json;
    use tempfile::tempdir;

    fn history(keys: &[&str]) -> HistoryFiles {
        keys.iter()
            .enumerate()
            .map(|(i, k)| {
                let mut event = RawEvent::new();
                event.insert("n".into(), json!(i));
                (k.to_string(), vec![event])
            })
            .collect()
    }

    #[test]
    fn split_is_case_sensitive_substring() {
        let files = history(&[
            "Streaming_History_Audio_2023",
            "Streaming_History_Video_2023",
            "streaming_history_audio_lower",
            "ReadMe",
        ]);
        let (audio, video) = split_history(&files, &ExportLayout::default());
        assert_eq!(audio.keys().collect::<Vec<_>>(), ["Streaming_History_Audio_2023"]);
        assert_eq!(video.keys().collect::<Vec<_>>(), ["Streaming_History_Video_2023"]);
    }

    #[test]
    fn concat_follows_key_order() {
        let files = history(&["b_Audio", "a_Audio"]);
        let events = concat_events(&files);
        assert_eq!(events[0]["n"], json!(1));
        assert_eq!(events[1]["n"], json!(0));
    }

    #[test]
    fn history_events_drops_non_objects() {
        let events = history_events(json!([{"a": 1}, 3, null, {"b": 2}])).unwrap();
        assert_eq!(events.len(), 2);
        assert!(history_events(json!({"a": 1})).is_none());
    }

    #[test]
    fn loads_export_from_disk() {
        let tmp = tempdir().unwrap();
        let layout = ExportLayout::default();
        let account_dir = tmp.path().join(&layout.account_folder);
        let history_dir = tmp.path().join(&layout.streaming_folder);
        fs::create_dir_all(&account_dir).unwrap();
        fs::create_dir_all(&history_dir).unwrap();
        fs::write(account_dir.join("Identity.json"), r#"{"displayName": "dj"}"#).unwrap();
        fs::write(account_dir.join("Broken.json"), "{not json").unwrap();
        fs::write(
            history_dir.join("Streaming_History_Audio_2024.json"),
            r#"[{"ts": "2024-01-01T10:00:00Z", "ms_played": 1000}]"#,
        )
        .unwrap();
        fs::write(history_dir.join("Streaming_History_Video_2024.json"), r#"{"oops": true}"#).unwrap();

        let location = scan_export(tmp.path(), &layout).unwrap();
        let data = load_export(&location);

        assert_eq!(data.account.file_keys().collect::<Vec<_>>(), ["Identity"]);
        assert_eq!(data.history.len(), 1);
        assert_eq!(data.history["Streaming_History_Audio_2024"].len(), 1);
    }
}
