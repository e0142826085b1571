//! Delays between replayed steps.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::action_log::ActionLogStep;
use crate::bus::EventKind;
use crate::config::ReplayConfigData;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pacing {
    pub step_padding: Duration,
    pub settings_change: Duration,
    pub actions: BTreeMap<String, Duration>,
}

impl Default for Pacing {
    fn default() -> Self {
        Self::from(&ReplayConfigData::default())
    }
}

impl From<&ReplayConfigData> for Pacing {
    fn from(data: &ReplayConfigData) -> Self {
        Self {
            step_padding: Duration::from_millis(data.step_padding_ms),
            settings_change: Duration::from_millis(data.settings_change_delay_ms),
            actions: data
                .action_delays_ms
                .iter()
                .map(|(name, ms)| (name.clone(), Duration::from_millis(*ms)))
                .collect(),
        }
    }
}

impl Pacing {
    /// No delays at all
    pub fn immediate() -> Self {
        Self {
            step_padding: Duration::ZERO,
            settings_change: Duration::ZERO,
            actions: BTreeMap::new(),
        }
    }

    /// How long the effect of `step` is given before playback moves on
    pub fn delay_for(&self, step: &ActionLogStep) -> Duration {
        if let Some(checkpoint) = step.as_checkpoint() {
            return self
                .actions
                .get(&checkpoint.name)
                .copied()
                .unwrap_or(Duration::ZERO);
        }
        match step.kind {
            EventKind::SettingsChanged => self.settings_change,
            _ => Duration::ZERO,
        }
    }
}
