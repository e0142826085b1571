use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::constants::{
    CUT_ACTION_DELAY_MS, DEFAULT_SETTINGS_CHANGE_DELAY_MS, DEFAULT_STEP_PADDING_MS,
    DIVIDE_ACTION_DELAY_MS, FLIP_ACTION_DELAY_MS, SOLVE_CHECKER_TOOL,
};

/// System set for config loading (other plugins can run after this)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigLoaded;

/// Replay and recording settings persisted to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReplayConfigData {
    /// Added to every inter-step delay during playback
    pub step_padding_ms: u64,

    /// Pause after a replayed settings change
    pub settings_change_delay_ms: u64,

    /// Checkpoints of these actions wait this long before being applied
    pub action_delays_ms: BTreeMap<String, u64>,

    /// Tools whose change/update events are never recorded
    pub ignored_tools: Vec<String>,

    /// Whether exported documents carry the undo/redo history
    pub include_history_on_export: bool,
}

impl Default for ReplayConfigData {
    fn default() -> Self {
        Self {
            step_padding_ms: DEFAULT_STEP_PADDING_MS,
            settings_change_delay_ms: DEFAULT_SETTINGS_CHANGE_DELAY_MS,
            action_delays_ms: BTreeMap::from([
                ("flip".to_string(), FLIP_ACTION_DELAY_MS),
                ("divide".to_string(), DIVIDE_ACTION_DELAY_MS),
                ("cut".to_string(), CUT_ACTION_DELAY_MS),
            ]),
            ignored_tools: vec![SOLVE_CHECKER_TOOL.to_string()],
            include_history_on_export: true,
        }
    }
}

/// Runtime configuration resource
#[derive(Resource)]
pub struct ReplayConfig {
    /// The persisted configuration data
    pub data: ReplayConfigData,
    /// Path to the config file
    pub config_path: PathBuf,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            data: ReplayConfigData::default(),
            config_path: crate::paths::config_file(),
        }
    }
}

/// Resource to notify user when config was reset to defaults
#[derive(Resource, Default)]
pub struct ConfigResetNotification {
    /// Whether the notification is still unread
    pub show: bool,
    /// The reason for the reset (parse error, read error, etc.)
    pub reason: Option<String>,
}

/// Message to trigger config save
#[derive(Message)]
pub struct SaveConfigRequest;

/// Result of loading config from disk
pub struct LoadConfigResult {
    pub data: ReplayConfigData,
    /// Error message if config was reset to defaults due to an error
    pub reset_reason: Option<String>,
}

/// Load configuration from `path`, falling back to defaults
pub fn load_config(path: &Path) -> LoadConfigResult {
    let (data, reset_reason) = if path.exists() {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(data) => {
                    info!("Loaded config from {:?}", path);
                    (data, None)
                }
                Err(e) => {
                    warn!("Failed to parse config file: {}", e);
                    (
                        ReplayConfigData::default(),
                        Some(format!("Configuration file was corrupted: {}", e)),
                    )
                }
            },
            Err(e) => {
                warn!("Failed to read config file: {}", e);
                (
                    ReplayConfigData::default(),
                    Some(format!("Could not read configuration file: {}", e)),
                )
            }
        }
    } else {
        info!("No config file found, using defaults");
        (ReplayConfigData::default(), None)
    };

    LoadConfigResult { data, reset_reason }
}

/// Save configuration to disk
pub fn save_config(config: &ReplayConfig) {
    match serde_json::to_string_pretty(&config.data) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&config.config_path, json) {
                error!("Failed to save config: {}", e);
            } else {
                info!("Config saved to {:?}", config.config_path);
            }
        }
        Err(e) => {
            error!("Failed to serialize config: {}", e);
        }
    }
}

/// Startup system to load config from disk into the existing resource
fn load_config_system(
    mut config: ResMut<ReplayConfig>,
    mut reset_notification: ResMut<ConfigResetNotification>,
) {
    let result = load_config(&config.config_path);
    config.data = result.data;

    // Set notification if config was reset due to an error
    if let Some(reason) = result.reset_reason {
        reset_notification.show = true;
        reset_notification.reason = Some(reason);
    }
}

/// System to save config when requested
fn save_config_system(mut events: MessageReader<SaveConfigRequest>, config: Res<ReplayConfig>) {
    if events.read().count() > 0 {
        save_config(&config);
    }
}

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ReplayConfig>()
            .init_resource::<ConfigResetNotification>()
            .add_message::<SaveConfigRequest>()
            .add_systems(Startup, load_config_system.in_set(ConfigLoaded))
            .add_systems(
                Update,
                save_config_system.run_if(on_message::<SaveConfigRequest>),
            );
    }
}
