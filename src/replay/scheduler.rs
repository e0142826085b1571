//! Timer-driven playback of an action log.
//!
//! The scheduler is an explicit state machine. It owns at most one timer;
//! every transition that moves the log cursor or stops playback drops that
//! timer first, so two playback loops can never advance the same log.
//!
//! ```text
//! Idle --start--> Paused <--pause/seek--> Playing
//!                    \                      /
//!                     `--stop--> Idle      `--last checkpoint--> Finished
//! ```

use std::time::Duration;

use bevy::log::{debug, info, warn};
use bevy::time::{Timer, TimerMode};

use crate::action_log::{ActionLog, ActionLogStep, compact};
use crate::bus::EventBus;
use crate::history::History;
use crate::workspace::SnapshotProducer;

use super::error::ReplayError;
use super::pacing::Pacing;

/// Session state the scheduler operates on, borrowed for one call
pub struct ReplayContext<'a> {
    pub producer: &'a mut dyn SnapshotProducer,
    pub bus: &'a mut EventBus,
    pub log: &'a mut ActionLog,
    pub history: &'a mut History,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
    Paused,
    /// The last checkpoint was reached and playback stopped on its own
    Finished,
}

/// Progress notifications, collected until [`ReplayScheduler::drain_events`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplayEvent {
    CheckpointReached { action_index: u32, name: String },
    Paused { action_index: u32 },
    Finished,
}

#[derive(Debug, Default)]
pub struct ReplayScheduler {
    state: PlaybackState,
    pacing: Pacing,
    /// The single in-flight delay before the next step
    timer: Option<Timer>,
    pending_delay: Duration,
    /// Step position of a reached checkpoint not applied yet
    deferred: Option<usize>,
    /// Pause once this action index is reached
    stop_at: Option<u32>,
    /// The last checkpoint was reached; playback ends when its pacing elapses
    finish_pending: bool,
    saved_history: Option<History>,
    events: Vec<ReplayEvent>,
}

impl ReplayScheduler {
    pub fn new(pacing: Pacing) -> Self {
        Self {
            pacing,
            ..Self::default()
        }
    }

    pub fn set_pacing(&mut self, pacing: Pacing) {
        self.pacing = pacing;
    }

    /// Forget any playback, keeping the pacing
    pub fn reset(&mut self) {
        *self = Self::new(std::mem::take(&mut self.pacing));
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, PlaybackState::Playing | PlaybackState::Paused)
    }

    pub fn has_pending_timer(&self) -> bool {
        self.timer.is_some()
    }

    pub fn drain_events(&mut self) -> Vec<ReplayEvent> {
        std::mem::take(&mut self.events)
    }

    /// Begin playback from the start snapshot, paused before the first step
    pub fn start(&mut self, ctx: &mut ReplayContext) -> Result<(), ReplayError> {
        if ctx.log.checkpoint_count() == 0 {
            return Err(ReplayError::EmptyLog);
        }

        self.cancel();
        compact(&mut ctx.log.steps);
        self.saved_history = Some(ctx.history.clone());

        ctx.producer.apply_snapshot(ctx.history.start_snapshot());
        ctx.producer.apply_settings(ctx.history.start_settings());
        ctx.log.cursor = 0;
        ctx.log.action_cursor = 0;
        ctx.log.is_running = true;
        ctx.log.is_playing = false;
        self.state = PlaybackState::Paused;

        info!(
            "Replay started: {} steps, {} actions",
            ctx.log.len(),
            ctx.log.total_actions
        );
        Ok(())
    }

    /// Play the next step by hand
    pub fn step(&mut self, ctx: &mut ReplayContext) -> Result<(), ReplayError> {
        self.ensure_running()?;
        if !self.finish_if_pending(ctx) {
            self.flush(ctx);
            self.advance_one(ctx);
        }
        Ok(())
    }

    /// Keep stepping on the timer until paused, stopped or finished
    pub fn play(&mut self, ctx: &mut ReplayContext) -> Result<(), ReplayError> {
        self.ensure_running()?;
        if self.state == PlaybackState::Playing {
            return Ok(());
        }

        self.state = PlaybackState::Playing;
        ctx.log.is_playing = true;
        self.advance(ctx);
        Ok(())
    }

    pub fn resume(&mut self, ctx: &mut ReplayContext) -> Result<(), ReplayError> {
        self.play(ctx)
    }

    pub fn pause(&mut self, ctx: &mut ReplayContext) -> Result<(), ReplayError> {
        self.ensure_running()?;
        self.halt(ctx);
        Ok(())
    }

    /// Show the state right after checkpoint `action_index` and pause there.
    ///
    /// `0` (or an index with no checkpoint) shows the start snapshot.
    pub fn seek(&mut self, ctx: &mut ReplayContext, action_index: u32) -> Result<(), ReplayError> {
        self.ensure_running()?;
        self.stop_at = None;
        self.jump_to(ctx, action_index);
        self.state = PlaybackState::Paused;
        ctx.log.is_playing = false;
        Ok(())
    }

    /// End playback: show the final state and give back the saved history.
    ///
    /// After a natural finish this only returns to `Idle`.
    pub fn stop(&mut self, ctx: &mut ReplayContext) -> Result<(), ReplayError> {
        if self.state == PlaybackState::Finished {
            self.state = PlaybackState::Idle;
            return Ok(());
        }
        self.ensure_running()?;
        self.shutdown(ctx);
        self.state = PlaybackState::Idle;
        info!("Replay stopped");
        Ok(())
    }

    /// Play exactly one action: start right before it, pause right after it
    pub fn play_action(
        &mut self,
        ctx: &mut ReplayContext,
        action_index: u32,
    ) -> Result<(), ReplayError> {
        self.ensure_running()?;
        let total = ctx.log.total_actions;
        if action_index == 0 || action_index > total {
            return Err(ReplayError::UnknownAction {
                action_index,
                total,
            });
        }

        self.jump_to(ctx, action_index - 1);
        self.state = PlaybackState::Paused;
        self.stop_at = Some(action_index);
        self.play(ctx)
    }

    pub fn previous_action(&mut self, ctx: &mut ReplayContext) -> Result<(), ReplayError> {
        let target = ctx.log.action_cursor.saturating_sub(1);
        self.seek(ctx, target)
    }

    pub fn next_action(&mut self, ctx: &mut ReplayContext) -> Result<(), ReplayError> {
        let target = (ctx.log.action_cursor + 1).min(ctx.log.total_actions);
        self.seek(ctx, target)
    }

    /// Advance the timer by `delta`, playing every step that became due
    pub fn tick(&mut self, ctx: &mut ReplayContext, delta: Duration) {
        let mut budget = delta;
        let mut guard = ctx.log.len() + 1;

        while self.state == PlaybackState::Playing && guard > 0 {
            guard -= 1;
            let Some(timer) = self.timer.as_mut() else {
                break;
            };

            let remaining = timer.remaining();
            timer.tick(budget);
            if !timer.is_finished() {
                break;
            }

            budget = budget.saturating_sub(remaining);
            self.timer = None;
            self.advance(ctx);
        }
    }

    fn ensure_running(&self) -> Result<(), ReplayError> {
        if self.is_running() {
            Ok(())
        } else {
            Err(ReplayError::NotRunning)
        }
    }

    /// Drop the timer and anything scheduled by it
    fn cancel(&mut self) {
        self.timer = None;
        self.deferred = None;
        self.stop_at = None;
        self.finish_pending = false;
        self.pending_delay = Duration::ZERO;
    }

    /// One timer-driven step, re-arming the timer while still playing
    fn advance(&mut self, ctx: &mut ReplayContext) {
        if self.finish_if_pending(ctx) {
            return;
        }
        self.flush(ctx);
        self.advance_one(ctx);
        if self.state == PlaybackState::Playing {
            let delay = self.pending_delay + self.pacing.step_padding;
            self.timer = Some(Timer::new(delay, TimerMode::Once));
        }
    }

    fn advance_one(&mut self, ctx: &mut ReplayContext) {
        let position = ctx.log.cursor;
        let Some(step) = ctx.log.steps.get(position).cloned() else {
            debug!("Reached the end of the action log");
            self.finish(ctx);
            return;
        };
        ctx.log.cursor += 1;
        self.pending_delay = self.pacing.delay_for(&step);

        let Some(checkpoint) = step.as_checkpoint() else {
            ctx.bus.publish(step.kind, step.payload().clone());
            return;
        };

        let action_index = checkpoint.action_index;
        ctx.log.action_cursor = action_index;
        self.events.push(ReplayEvent::CheckpointReached {
            action_index,
            name: checkpoint.name.clone(),
        });

        let is_target = self.stop_at == Some(action_index);
        if !is_target && action_index >= ctx.log.total_actions {
            if self.state == PlaybackState::Playing && !self.pending_delay.is_zero() {
                self.finish_pending = true;
            } else {
                self.finish(ctx);
            }
            return;
        }

        if self.state == PlaybackState::Playing && !self.pending_delay.is_zero() {
            self.deferred = Some(position);
        } else {
            ctx.producer.apply_snapshot(&checkpoint.snapshot);
            ctx.producer.apply_settings(&checkpoint.settings);
        }

        if is_target {
            self.stop_at = None;
            self.halt(ctx);
        }
    }

    /// Apply the checkpoint whose application was deferred, if any
    fn flush(&mut self, ctx: &mut ReplayContext) {
        let Some(position) = self.deferred.take() else {
            return;
        };
        if let Some(checkpoint) = ctx.log.steps.get(position).and_then(ActionLogStep::as_checkpoint) {
            ctx.producer.apply_snapshot(&checkpoint.snapshot);
            ctx.producer.apply_settings(&checkpoint.settings);
        }
    }

    /// End playback now if only the pacing of the last checkpoint is left
    fn finish_if_pending(&mut self, ctx: &mut ReplayContext) -> bool {
        if !self.finish_pending {
            return false;
        }
        self.finish(ctx);
        true
    }

    fn halt(&mut self, ctx: &mut ReplayContext) {
        if self.finish_if_pending(ctx) {
            return;
        }
        self.timer = None;
        self.flush(ctx);
        self.state = PlaybackState::Paused;
        ctx.log.is_playing = false;
        self.events.push(ReplayEvent::Paused {
            action_index: ctx.log.action_cursor,
        });
    }

    /// Apply checkpoint `action_index` (or the start state) and put the log
    /// cursor right after it
    fn jump_to(&mut self, ctx: &mut ReplayContext, action_index: u32) {
        self.timer = None;
        self.deferred = None;
        self.finish_pending = false;

        if let Some((position, checkpoint)) = ctx.log.find_checkpoint(action_index) {
            ctx.producer.apply_snapshot(&checkpoint.snapshot);
            ctx.producer.apply_settings(&checkpoint.settings);
            ctx.log.cursor = position + 1;
            ctx.log.action_cursor = action_index;
            return;
        }

        if action_index != 0 {
            warn!("No checkpoint for action {}, showing the start state", action_index);
        }
        ctx.producer.apply_snapshot(ctx.history.start_snapshot());
        ctx.producer.apply_settings(ctx.history.start_settings());
        ctx.log.cursor = 0;
        ctx.log.action_cursor = 0;
    }

    fn finish(&mut self, ctx: &mut ReplayContext) {
        self.shutdown(ctx);
        self.state = PlaybackState::Finished;
        self.events.push(ReplayEvent::Finished);
        info!("Replay finished");
    }

    fn shutdown(&mut self, ctx: &mut ReplayContext) {
        self.cancel();
        let total = ctx.log.total_actions;
        self.jump_to(ctx, total);
        if let Some(saved) = self.saved_history.take() {
            *ctx.history = saved;
        }
        ctx.log.is_running = false;
        ctx.log.is_playing = false;
    }
}
