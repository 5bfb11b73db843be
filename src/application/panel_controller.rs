// Panel controller - Gesture state machine, user override window and panel sync debounce
use crate::application::clock::ScheduledTask;
use crate::application::view_model::ViewState;
use crate::domain::panel::Panel;
use serde::Deserialize;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelTimings {
    pub override_window: Duration,
    pub sync_debounce: Duration,
    pub swipe_threshold_px: f64,
}

impl Default for PanelTimings {
    fn default() -> Self {
        Self {
            override_window: Duration::from_secs(5),
            sync_debounce: Duration::from_millis(200),
            swipe_threshold_px: 150.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    Idle,
    Dragging { start_x: f64, current_x: f64 },
    Animating,
}

/// What the pointer went down on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerTarget {
    #[default]
    Surface,
    /// Buttons, inputs and chart canvases keep their own pointer handling.
    Control,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub panel: Panel,
    pub from_user: bool,
}

/// Outbound request asking the device to remember the active panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncRequest {
    pub panel: Panel,
}

#[derive(Debug, Clone)]
pub struct PanelController {
    timings: PanelTimings,
    gesture: GestureState,
    override_expiry: ScheduledTask,
    sync_debounce: ScheduledTask,
}

impl PanelController {
    pub fn new(timings: PanelTimings) -> Self {
        Self {
            timings,
            gesture: GestureState::Idle,
            override_expiry: ScheduledTask::new("override_expiry"),
            sync_debounce: ScheduledTask::new("panel_sync"),
        }
    }

    #[cfg(test)]
    pub fn gesture(&self) -> GestureState {
        self.gesture
    }

    /// Returns false when the start is ignored.
    pub fn gesture_start(&mut self, x: f64, target: PointerTarget) -> bool {
        if self.gesture == GestureState::Animating {
            tracing::debug!("Gesture start blocked: transition still animating");
            return false;
        }
        if target == PointerTarget::Control {
            return false;
        }

        self.gesture = GestureState::Dragging {
            start_x: x,
            current_x: x,
        };
        true
    }

    /// Returns the visual offset in pixels while dragging.
    ///
    /// The panel only follows the pointer once the displacement reaches the
    /// swipe threshold; below it the offset is zero.
    pub fn gesture_move(&mut self, x: f64) -> Option<f64> {
        let GestureState::Dragging { start_x, .. } = self.gesture else {
            return None;
        };

        self.gesture = GestureState::Dragging {
            start_x,
            current_x: x,
        };
        let dx = x - start_x;
        Some(if dx.abs() >= self.timings.swipe_threshold_px {
            dx
        } else {
            0.0
        })
    }

    pub fn gesture_end(&mut self, state: &mut ViewState, now: Instant) -> Option<Transition> {
        let GestureState::Dragging { start_x, current_x } = self.gesture else {
            return None;
        };

        let dx = current_x - start_x;
        let threshold = self.timings.swipe_threshold_px;
        let current = state.active_panel;
        let target = if dx < -threshold {
            current.next().unwrap_or(current)
        } else if dx > threshold {
            current.previous().unwrap_or(current)
        } else {
            current
        };

        Some(self.commit_user_transition(state, target, now))
    }

    /// Button click; any in-progress drag is abandoned.
    pub fn click(&mut self, state: &mut ViewState, index: i64, now: Instant) -> Transition {
        self.commit_user_transition(state, Panel::clamped(index), now)
    }

    pub fn transition_finished(&mut self) {
        if self.gesture == GestureState::Animating {
            self.gesture = GestureState::Idle;
        }
    }

    /// Drops a leftover `Animating` once the device owns the panel again.
    ///
    /// A tap or a click on the active panel never moves the slider, so the
    /// front-end has no transition end to report.
    pub fn settle(&mut self) {
        if self.gesture == GestureState::Animating {
            tracing::debug!("Clearing stale animation state");
            self.gesture = GestureState::Idle;
        }
    }

    /// Fires whichever timers are due.
    ///
    /// An expired override hands panel selection back to the device. A due
    /// debounce yields one sync request carrying the panel active right now.
    pub fn tick(&mut self, state: &mut ViewState, now: Instant) -> Option<SyncRequest> {
        if self.override_expiry.fire(now) {
            tracing::debug!("{} fired, following device panel again", self.override_expiry.name());
            state.user_override_active = false;
        }

        if self.sync_debounce.fire(now) {
            tracing::debug!("{} fired for panel {}", self.sync_debounce.name(), state.active_panel);
            return Some(SyncRequest {
                panel: state.active_panel,
            });
        }

        None
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        [self.override_expiry.deadline(), self.sync_debounce.deadline()]
            .into_iter()
            .flatten()
            .min()
    }

    pub fn cancel_timers(&mut self) {
        self.override_expiry.cancel();
        self.sync_debounce.cancel();
    }

    fn commit_user_transition(&mut self, state: &mut ViewState, target: Panel, now: Instant) -> Transition {
        state.active_panel = target;
        state.user_override_active = true;
        self.override_expiry.reset(now, self.timings.override_window);
        self.sync_debounce.reset(now, self.timings.sync_debounce);
        self.gesture = GestureState::Animating;

        Transition {
            panel: target,
            from_user: true,
        }
    }
}
