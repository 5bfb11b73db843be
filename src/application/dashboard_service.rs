// Dashboard service - Owns the view state and drives it from polls, user input and timers
use crate::application::chart_bindings::{ChartBindings, ChartLibrary};
use crate::application::clock::Clock;
use crate::application::panel_controller::{PanelController, PanelTimings, PointerTarget, SyncRequest, Transition};
use crate::application::renderer::{paint, Field, Renderer};
use crate::application::telemetry_source::{PanelSync, SourceError, TelemetrySource};
use crate::application::view_model::{self, DerivedView, ViewState};
use crate::domain::telemetry::TelemetrySnapshot;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

/// Pointer and button events coming from the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UserInput {
    Start {
        x: f64,
        #[serde(default)]
        target: PointerTarget,
    },
    Move {
        x: f64,
    },
    End,
    Leave,
    TransitionEnd,
    Click {
        index: i64,
    },
}

pub struct Dashboard<R, L> {
    state: ViewState,
    controller: PanelController,
    charts: ChartBindings,
    renderer: R,
    library: L,
    last_snapshot: Option<TelemetrySnapshot>,
}

impl<R: Renderer, L: ChartLibrary> Dashboard<R, L> {
    pub fn new(timings: PanelTimings, renderer: R, library: L) -> Self {
        Self {
            state: ViewState::default(),
            controller: PanelController::new(timings),
            charts: ChartBindings::new(),
            renderer,
            library,
            last_snapshot: None,
        }
    }

    pub fn apply_snapshot(&mut self, snapshot: TelemetrySnapshot) -> DerivedView {
        let (state, view) = view_model::apply_snapshot(self.state, &snapshot);
        if state.active_panel != self.state.active_panel {
            tracing::info!(
                "Device switched panel {} -> {}",
                self.state.active_panel,
                state.active_panel
            );
            self.renderer.show_panel(state.active_panel, 0.0);
        }
        self.state = state;
        if !self.state.user_override_active {
            self.controller.settle();
        }

        paint(&view, &mut self.renderer);
        self.charts
            .ensure_all(self.state.active_panel, &snapshot, &mut self.library);
        self.last_snapshot = Some(snapshot);
        view
    }

    pub fn handle(&mut self, input: UserInput, now: Instant) {
        match input {
            UserInput::Start { x, target } => {
                self.controller.gesture_start(x, target);
            }
            UserInput::Move { x } => {
                if let Some(offset) = self.controller.gesture_move(x) {
                    self.renderer.show_panel(self.state.active_panel, offset);
                }
            }
            UserInput::End | UserInput::Leave => {
                if let Some(transition) = self.controller.gesture_end(&mut self.state, now) {
                    self.on_user_transition(transition);
                }
            }
            UserInput::TransitionEnd => self.controller.transition_finished(),
            UserInput::Click { index } => {
                let transition = self.controller.click(&mut self.state, index, now);
                self.on_user_transition(transition);
            }
        }
    }

    pub fn tick(&mut self, now: Instant) -> Option<SyncRequest> {
        self.controller.tick(&mut self.state, now)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.controller.next_deadline()
    }

    /// Clears pending timers and releases every chart instance.
    pub fn shutdown(&mut self) {
        self.controller.cancel_timers();
        self.charts.release_all(&mut self.library);
    }

    fn on_user_transition(&mut self, transition: Transition) {
        tracing::debug!("User moved to panel {}", transition.panel);
        self.renderer
            .set_text(Field::Screen, &transition.panel.to_string());
        self.renderer.show_panel(transition.panel, 0.0);

        if let Some(snapshot) = &self.last_snapshot {
            self.charts
                .ensure_all(self.state.active_panel, snapshot, &mut self.library);
        }
    }
}

/// Runs the dashboard until `shutdown` changes.
///
/// Polls are issued on a fixed period without waiting for the previous one;
/// responses are applied in completion order. Failed polls are logged and
/// dropped.
pub async fn run<R, L>(
    mut dashboard: Dashboard<R, L>,
    source: Arc<dyn TelemetrySource>,
    sync: Arc<dyn PanelSync>,
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
    mut inputs: mpsc::Receiver<UserInput>,
    mut shutdown: watch::Receiver<bool>,
) -> Dashboard<R, L>
where
    R: Renderer,
    L: ChartLibrary,
{
    let (poll_tx, mut poll_rx) = mpsc::channel::<Result<TelemetrySnapshot, SourceError>>(16);
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!("Dashboard loop started, polling every {:?}", poll_interval);

    loop {
        let deadline = dashboard.next_deadline();

        tokio::select! {
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {
                let source = source.clone();
                let tx = poll_tx.clone();
                tokio::spawn(async move {
                    let _ = tx.send(source.fetch().await).await;
                });
            }
            Some(result) = poll_rx.recv() => match result {
                Ok(snapshot) => {
                    dashboard.apply_snapshot(snapshot);
                }
                Err(e) => tracing::warn!("Fetch failed: {}", e),
            },
            Some(input) = inputs.recv() => dashboard.handle(input, clock.now()),
            _ = sleep_until(deadline) => {
                if let Some(request) = dashboard.tick(clock.now()) {
                    let sync = sync.clone();
                    tokio::spawn(async move {
                        if let Err(e) = sync.set_panel(request.panel).await {
                            tracing::warn!("Panel sync failed: {}", e);
                        }
                    });
                }
            }
        }
    }

    dashboard.shutdown();
    tracing::info!("Dashboard loop stopped");
    dashboard
}

#[cfg(test)]
impl<R, L> Dashboard<R, L> {
    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn charts(&self) -> &ChartBindings {
        &self.charts
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn library(&self) -> &L {
        &self.library
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::chart_bindings::fake::FakeChartLibrary;
    use crate::application::chart_bindings::ChartSlot;
    use crate::application::clock::manual::ManualClock;
    use crate::application::clock::SystemClock;
    use crate::application::renderer::recording::RecordingRenderer;
    use crate::domain::panel::Panel;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type TestDashboard = Dashboard<RecordingRenderer, FakeChartLibrary>;

    fn dashboard(timings: PanelTimings) -> TestDashboard {
        Dashboard::new(timings, RecordingRenderer::default(), FakeChartLibrary::default())
    }

    fn snapshot(suggested: i64) -> TelemetrySnapshot {
        TelemetrySnapshot {
            timestamp: 1_700_000_000,
            suggested_panel: Some(suggested),
            history_voltage: vec![12.0; 72],
            history_capacity_percent: vec![80.0; 72],
            ..Default::default()
        }
    }

    #[test]
    fn test_snapshot_switches_panel_and_charts() {
        let mut dashboard = dashboard(PanelTimings::default());

        dashboard.apply_snapshot(snapshot(0));
        assert!(dashboard.charts().instance(ChartSlot::Voltage).is_some());

        let view = dashboard.apply_snapshot(snapshot(1));
        assert_eq!(view.active_panel.index(), 1);
        assert!(dashboard.charts().instance(ChartSlot::Voltage).is_none());
        assert!(dashboard.charts().instance(ChartSlot::HourlyEnergy).is_some());
        assert_eq!(dashboard.renderer().texts[&Field::Screen], "1");
        assert_eq!(dashboard.renderer().panels.last(), Some(&(Panel::clamped(1), 0.0)));
    }

    #[test]
    fn test_click_resyncs_charts_and_blocks_device_panel() {
        let clock = ManualClock::new();
        let mut dashboard = dashboard(PanelTimings::default());
        dashboard.apply_snapshot(snapshot(0));

        dashboard.handle(UserInput::Click { index: 2 }, clock.now());
        assert!(dashboard.charts().instance(ChartSlot::RecentAmps).is_some());
        assert!(dashboard.charts().instance(ChartSlot::Voltage).is_none());

        clock.advance(Duration::from_secs(1));
        assert_eq!(dashboard.tick(clock.now()), Some(SyncRequest { panel: Panel::LAST }));
        dashboard.apply_snapshot(snapshot(0));
        assert_eq!(dashboard.state().active_panel, Panel::LAST);

        clock.advance(Duration::from_secs(4));
        assert_eq!(dashboard.tick(clock.now()), None);
        dashboard.apply_snapshot(snapshot(0));
        assert_eq!(dashboard.state().active_panel, Panel::FIRST);
    }

    #[test]
    fn test_drag_gesture_flow() {
        let clock = ManualClock::new();
        let mut dashboard = dashboard(PanelTimings::default());

        dashboard.handle(UserInput::Start { x: 500.0, target: PointerTarget::Surface }, clock.now());
        dashboard.handle(UserInput::Move { x: 300.0 }, clock.now());
        assert_eq!(dashboard.renderer().panels.last(), Some(&(Panel::FIRST, -200.0)));

        dashboard.handle(UserInput::Leave, clock.now());
        assert_eq!(dashboard.state().active_panel.index(), 1);
        assert!(dashboard.state().user_override_active);

        // Blocked until the front-end reports the slide finished.
        dashboard.handle(UserInput::Start { x: 500.0, target: PointerTarget::Surface }, clock.now());
        dashboard.handle(UserInput::End, clock.now());
        assert_eq!(dashboard.renderer().panels.len(), 2);

        dashboard.handle(UserInput::TransitionEnd, clock.now());
        dashboard.handle(UserInput::Start { x: 500.0, target: PointerTarget::Surface }, clock.now());
        dashboard.handle(UserInput::Move { x: 700.0 }, clock.now());
        dashboard.handle(UserInput::End, clock.now());
        assert_eq!(dashboard.state().active_panel, Panel::FIRST);
    }

    #[test]
    fn test_poll_releases_stuck_animation() {
        let clock = ManualClock::new();
        let mut dashboard = dashboard(PanelTimings::default());
        dashboard.apply_snapshot(snapshot(0));

        // A tap never moves the slider, so no transition end ever arrives.
        dashboard.handle(UserInput::Start { x: 100.0, target: PointerTarget::Surface }, clock.now());
        dashboard.handle(UserInput::End, clock.now());
        assert!(dashboard.state().user_override_active);

        for _ in 0..10 {
            clock.advance(Duration::from_secs(1));
            dashboard.tick(clock.now());
            dashboard.apply_snapshot(snapshot(0));
        }
        assert!(!dashboard.state().user_override_active);

        dashboard.handle(UserInput::Start { x: 500.0, target: PointerTarget::Surface }, clock.now());
        dashboard.handle(UserInput::Move { x: 200.0 }, clock.now());
        dashboard.handle(UserInput::End, clock.now());
        assert_eq!(dashboard.state().active_panel.index(), 1);
    }

    #[test]
    fn test_poll_keeps_animation_during_override() {
        let clock = ManualClock::new();
        let mut dashboard = dashboard(PanelTimings::default());
        dashboard.handle(UserInput::Click { index: 1 }, clock.now());
        dashboard.apply_snapshot(snapshot(0));

        dashboard.handle(UserInput::Start { x: 500.0, target: PointerTarget::Surface }, clock.now());
        dashboard.handle(UserInput::Move { x: 200.0 }, clock.now());
        dashboard.handle(UserInput::End, clock.now());
        assert_eq!(dashboard.state().active_panel.index(), 1);
    }

    #[test]
    fn test_extreme_timestamp_does_not_panic() {
        let mut dashboard = dashboard(PanelTimings::default());
        let mut snapshot: TelemetrySnapshot =
            serde_json::from_str(r#"{"now": -1e19, "screen": 0}"#).unwrap();
        snapshot.history_voltage = vec![12.0; 72];
        assert_eq!(snapshot.timestamp, i64::MIN);

        dashboard.apply_snapshot(snapshot);
        assert!(dashboard.charts().instance(ChartSlot::Voltage).is_some());
    }

    #[test]
    fn test_shutdown_clears_timers_and_charts() {
        let clock = ManualClock::new();
        let mut dashboard = dashboard(PanelTimings::default());
        dashboard.apply_snapshot(snapshot(0));
        dashboard.handle(UserInput::Click { index: 0 }, clock.now());

        dashboard.shutdown();
        assert_eq!(dashboard.next_deadline(), None);
        assert!(dashboard.library().live.is_empty());
    }

    #[test]
    fn test_user_input_json() {
        let input: UserInput = serde_json::from_str(r#"{"kind":"start","x":12.5}"#).unwrap();
        assert_eq!(input, UserInput::Start { x: 12.5, target: PointerTarget::Surface });

        let input: UserInput = serde_json::from_str(r#"{"kind":"click","index":-3}"#).unwrap();
        assert_eq!(input, UserInput::Click { index: -3 });

        let input: UserInput = serde_json::from_str(r#"{"kind":"transition_end"}"#).unwrap();
        assert_eq!(input, UserInput::TransitionEnd);
    }

    struct FlakySource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TelemetrySource for FlakySource {
        async fn fetch(&self) -> Result<TelemetrySnapshot, SourceError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
                Err(SourceError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE))
            } else {
                Ok(snapshot(0))
            }
        }
    }

    struct ChannelSync {
        tx: mpsc::UnboundedSender<Panel>,
    }

    #[async_trait]
    impl PanelSync for ChannelSync {
        async fn set_panel(&self, panel: Panel) -> Result<(), SourceError> {
            let _ = self.tx.send(panel);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_run_loop_polls_syncs_and_stops() {
        let timings = PanelTimings {
            override_window: Duration::from_millis(50),
            sync_debounce: Duration::from_millis(10),
            ..PanelTimings::default()
        };
        let source = Arc::new(FlakySource {
            calls: AtomicUsize::new(0),
        });
        let (sync_tx, mut sync_rx) = mpsc::unbounded_channel();
        let (input_tx, input_rx) = mpsc::channel(8);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(run(
            dashboard(timings),
            source.clone(),
            Arc::new(ChannelSync { tx: sync_tx }),
            Arc::new(SystemClock),
            Duration::from_millis(20),
            input_rx,
            shutdown_rx,
        ));

        input_tx.send(UserInput::Click { index: 1 }).await.unwrap();
        input_tx.send(UserInput::Click { index: 2 }).await.unwrap();
        let synced = tokio::time::timeout(Duration::from_secs(2), sync_rx.recv())
            .await
            .unwrap();
        assert_eq!(synced, Some(Panel::LAST));

        tokio::time::sleep(Duration::from_millis(150)).await;
        shutdown_tx.send(true).unwrap();
        let dashboard = handle.await.unwrap();

        assert!(source.calls.load(Ordering::SeqCst) >= 2);
        assert!(dashboard.renderer().texts.contains_key(&Field::Voltage));
        assert_eq!(dashboard.next_deadline(), None);
        assert!(dashboard.library().live.is_empty());
        assert!(sync_rx.try_recv().is_err());
    }
}
