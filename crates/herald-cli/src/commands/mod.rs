pub mod check;
pub mod completions;
pub mod man_pages;
pub mod publish;

use herald_core::{Artifact, StateValue, Ui};
use herald_schema::StateKey;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_CONFIG_ERROR: u8 = 2;
pub const EXIT_STORE_ERROR: u8 = 3;

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .expect("valid template")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(msg.to_owned());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn spin_ok(pb: &ProgressBar, msg: &str) {
    pb.set_style(ProgressStyle::with_template("{msg}").expect("valid template"));
    pb.finish_with_message(format!("✓ {msg}"));
}

pub fn spin_fail(pb: &ProgressBar, msg: &str) {
    pb.set_style(ProgressStyle::with_template("{msg}").expect("valid template"));
    pb.finish_with_message(format!("✗ {msg}"));
}

/// Progress reporting routed through the active spinner so interleaved
/// output does not tear the redraw.
pub struct SpinnerUi {
    pb: ProgressBar,
}

impl SpinnerUi {
    pub fn new(pb: &ProgressBar) -> Self {
        Self { pb: pb.clone() }
    }
}

impl Ui for SpinnerUi {
    fn say(&self, msg: &str) {
        self.pb
            .println(console::Style::new().bold().apply_to(msg).to_string());
    }

    fn message(&self, msg: &str) {
        self.pb.println(format!("  {msg}"));
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ArtifactDescriptor {
    id: String,
    #[serde(default)]
    builder_id: String,
    #[serde(default)]
    state: BTreeMap<String, serde_json::Value>,
}

/// Artifact adapter over the JSON descriptor the upstream build step emits:
/// `{"id": "...", "builder_id": "...", "state": {...}}`. State values must
/// be strings or string maps; anything else is rejected at load time.
#[derive(Debug)]
pub struct FileArtifact {
    id: String,
    builder_id: String,
    state: BTreeMap<String, StateValue>,
}

impl FileArtifact {
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("artifact descriptor unreadable: {e}"))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, String> {
        let descriptor: ArtifactDescriptor = serde_json::from_str(content)
            .map_err(|e| format!("artifact descriptor invalid: {e}"))?;

        let mut state = BTreeMap::new();
        for (key, value) in descriptor.state {
            let typed = match value {
                serde_json::Value::String(text) => StateValue::Text(text),
                serde_json::Value::Object(map) => {
                    let mut entries = BTreeMap::new();
                    for (k, v) in map {
                        let serde_json::Value::String(text) = v else {
                            return Err(format!(
                                "artifact descriptor state '{key}.{k}' must be a string"
                            ));
                        };
                        entries.insert(k, text);
                    }
                    StateValue::Map(entries)
                }
                _ => {
                    return Err(format!(
                        "artifact descriptor state '{key}' must be a string or a map of strings"
                    ))
                }
            };
            state.insert(key, typed);
        }

        Ok(Self {
            id: descriptor.id,
            builder_id: descriptor.builder_id,
            state,
        })
    }
}

impl Artifact for FileArtifact {
    fn id(&self) -> &str {
        &self.id
    }

    fn builder_id(&self) -> &str {
        &self.builder_id
    }

    fn state(&self, key: StateKey) -> Option<StateValue> {
        self.state.get(key.as_str()).cloned()
    }
}
