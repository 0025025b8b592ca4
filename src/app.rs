//! Application state and the effect executor.
//!
//! [`App`] owns the [`ViewController`] and the [`StoreSource`]. User input and
//! store replies become [`ViewEvent`]s; the resulting [`Effect`]s are carried
//! out here (calls submitted, the refetch deadline moved, notices shown).

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use ratatui::layout::Rect;
use tracing::{debug, info};

use crate::controller::{Effect, ViewController, ViewEvent, ViewSettings};
use crate::data::AxisRange;
use crate::source::{StoreCall, StoreSource};
use crate::ui::Theme;

/// The selector that ←/→ currently changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    Metric,
    Host,
    Interface,
    Transform,
    Window,
}

impl Selector {
    pub const ALL: [Selector; 5] = [
        Selector::Metric,
        Selector::Host,
        Selector::Interface,
        Selector::Transform,
        Selector::Window,
    ];

    /// Cycle to the next selector.
    pub fn next(self) -> Self {
        match self {
            Selector::Metric => Selector::Host,
            Selector::Host => Selector::Interface,
            Selector::Interface => Selector::Transform,
            Selector::Transform => Selector::Window,
            Selector::Window => Selector::Metric,
        }
    }

    /// Cycle to the previous selector.
    pub fn prev(self) -> Self {
        match self {
            Selector::Metric => Selector::Window,
            Selector::Host => Selector::Metric,
            Selector::Interface => Selector::Host,
            Selector::Transform => Selector::Interface,
            Selector::Window => Selector::Transform,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Selector::Metric => "Metric",
            Selector::Host => "Host",
            Selector::Interface => "Interface",
            Selector::Transform => "Value",
            Selector::Window => "Window",
        }
    }
}

/// A mouse drag across the plot, in terminal columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Drag {
    pub start: u16,
    pub current: u16,
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,
    pub focus: Selector,
    pub view: ViewController,

    source: Box<dyn StoreSource>,
    refetch_at: Option<Instant>,
    redraw: bool,

    // Window text entry, active while Some
    pub window_input: Option<String>,

    // Plot area from the last draw, used to map mouse columns to time
    pub plot_area: Option<Rect>,
    pub drag: Option<Drag>,

    pub last_error: Option<String>,
    pub last_update: Option<Instant>,

    pub theme: Theme,
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App over the given source.
    pub fn new(source: Box<dyn StoreSource>, settings: ViewSettings) -> Self {
        Self::with_theme(source, settings, Theme::auto_detect())
    }

    pub fn with_theme(source: Box<dyn StoreSource>, settings: ViewSettings, theme: Theme) -> Self {
        Self {
            running: true,
            show_help: false,
            focus: Selector::Metric,
            view: ViewController::new(settings),
            source,
            refetch_at: None,
            redraw: true,
            window_input: None,
            plot_area: None,
            drag: None,
            last_error: None,
            last_update: None,
            theme,
            status_message: None,
        }
    }

    /// Returns a description of the store.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Calls still waiting for a reply.
    pub fn in_flight(&self) -> usize {
        self.source.in_flight()
    }

    /// Time until the next scheduled fetch, if one is armed.
    pub fn refetch_in(&self) -> Option<Duration> {
        self.refetch_at
            .map(|at| at.saturating_duration_since(Instant::now()))
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
        self.redraw = true;
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// True once since the last call if something changed on screen.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    pub fn request_redraw(&mut self) {
        self.redraw = true;
    }

    /// Load the selectors and start the first fetch cycle.
    pub fn start(&mut self) {
        info!("starting against {}", self.source.description());
        self.handle(ViewEvent::Start);
    }

    /// Run one event through the controller and carry out its effects.
    pub fn handle(&mut self, event: ViewEvent) {
        let effects = self.view.handle(event, now_ms());
        self.dispatch(effects);
    }

    fn dispatch(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::List { token, request } => {
                    self.source.submit(StoreCall::List { token, request });
                }
                Effect::Get { token, request } => {
                    self.source.submit(StoreCall::Get { token, request });
                }
                Effect::Render => self.redraw = true,
                Effect::ArmRefetch(delay) => {
                    debug!("next fetch in {:?}", delay);
                    self.refetch_at = Some(Instant::now() + delay);
                }
                Effect::CancelRefetch => self.refetch_at = None,
                Effect::Notice(message) => {
                    self.last_error = Some(message.clone());
                    self.set_status_message(message);
                }
            }
        }
    }

    /// Drain finished store calls and fire the refetch timer if due.
    pub fn tick(&mut self) {
        while let Some(reply) = self.source.poll() {
            let succeeded = match &reply {
                crate::source::StoreReply::List { result, .. } => result.is_ok(),
                crate::source::StoreReply::Get { result, .. } => result.is_ok(),
            };
            // Stale completions come back with no effects
            let effects = self.view.handle(reply.into(), now_ms());
            if succeeded && !effects.is_empty() {
                self.last_error = None;
                self.last_update = Some(Instant::now());
            }
            self.dispatch(effects);
        }

        if self.refetch_at.is_some_and(|at| Instant::now() >= at) {
            self.refetch_at = None;
            self.handle(ViewEvent::Refetch);
        }
    }

    /// Focus the next selector.
    pub fn next_selector(&mut self) {
        self.focus = self.focus.next();
        self.redraw = true;
    }

    /// Focus the previous selector.
    pub fn prev_selector(&mut self) {
        self.focus = self.focus.prev();
        self.redraw = true;
    }

    /// Move the focused selector `delta` options along.
    pub fn change_selected(&mut self, delta: isize) {
        let cascade = self.view.cascade();
        let event = match self.focus {
            Selector::Metric => cascade
                .metric
                .neighbour(delta)
                .map(|v| ViewEvent::MetricSelected(v.to_string())),
            Selector::Host => cascade
                .host
                .neighbour(delta)
                .map(|v| ViewEvent::HostSelected(v.to_string())),
            Selector::Interface => cascade
                .interface
                .neighbour(delta)
                .map(|v| ViewEvent::InterfaceSelected(v.to_string())),
            Selector::Transform => {
                let current = self.view.transform();
                let next = if delta < 0 {
                    current.prev()
                } else {
                    current.next()
                };
                Some(ViewEvent::TransformSelected(next))
            }
            Selector::Window => Some(if delta < 0 {
                ViewEvent::WindowHalved
            } else {
                ViewEvent::WindowDoubled
            }),
        };
        if let Some(event) = event {
            self.handle(event);
        }
    }

    pub fn halve_window(&mut self) {
        self.handle(ViewEvent::WindowHalved);
    }

    pub fn double_window(&mut self) {
        self.handle(ViewEvent::WindowDoubled);
    }

    /// Start typing a window length.
    pub fn start_window_input(&mut self) {
        self.window_input = Some(String::new());
        self.redraw = true;
    }

    pub fn window_input_push(&mut self, c: char) {
        if let Some(input) = self.window_input.as_mut() {
            input.push(c);
            self.redraw = true;
        }
    }

    pub fn window_input_pop(&mut self) {
        if let Some(input) = self.window_input.as_mut() {
            input.pop();
            self.redraw = true;
        }
    }

    pub fn cancel_window_input(&mut self) {
        self.window_input = None;
        self.redraw = true;
    }

    /// Apply the typed window length.
    pub fn confirm_window_input(&mut self) {
        if let Some(text) = self.window_input.take() {
            self.handle(ViewEvent::WindowEntered(text));
        }
        self.redraw = true;
    }

    /// Map a terminal column to an x-axis value, clamping to the plot edges.
    pub fn column_to_x(&self, column: u16) -> Option<f64> {
        let area = self.plot_area?;
        let bounds = self.view.x_bounds()?;
        if area.width < 2 {
            return None;
        }
        let column = column.clamp(area.x, area.x + area.width - 1);
        let fraction = f64::from(column - area.x) / f64::from(area.width - 1);
        Some(bounds.min + fraction * bounds.width())
    }

    /// True if the cell is inside the plot.
    pub fn in_plot(&self, column: u16, row: u16) -> bool {
        self.plot_area.is_some_and(|a| {
            column >= a.x && column < a.x + a.width && row >= a.y && row < a.y + a.height
        })
    }

    pub fn begin_drag(&mut self, column: u16) {
        self.drag = Some(Drag {
            start: column,
            current: column,
        });
        self.redraw = true;
    }

    pub fn update_drag(&mut self, column: u16) {
        if let Some(drag) = self.drag.as_mut() {
            drag.current = column;
            self.redraw = true;
        }
    }

    /// Finish a drag; anything wider than one column becomes a zoom selection.
    pub fn end_drag(&mut self, column: u16) {
        let Some(drag) = self.drag.take() else {
            return;
        };
        self.redraw = true;
        if drag.start.abs_diff(column) < 2 {
            return;
        }
        if let (Some(a), Some(b)) = (self.column_to_x(drag.start), self.column_to_x(column)) {
            self.handle(ViewEvent::ZoomSelected(AxisRange::between(a, b)));
        }
    }

    pub fn zoom_out(&mut self) {
        self.handle(ViewEvent::ZoomOut);
    }

    /// Fetch now instead of waiting for the timer.
    pub fn force_fetch(&mut self) {
        if self.view.cascade().complete().is_none() {
            self.handle(ViewEvent::Start);
        } else {
            self.handle(ViewEvent::Refetch);
        }
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        self.redraw = true;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the plotted series to a file.
    pub fn export_series(&self, path: &Path) -> Result<()> {
        use std::io::Write;

        if self.view.series().is_empty() {
            anyhow::bail!("No data to export");
        }

        let cascade = self.view.cascade();
        let export = serde_json::json!({
            "metric": cascade.metric.current(),
            "host": cascade.host.current(),
            "interface": cascade.interface.current(),
            "window": self.view.window_label(),
            "transform": self.view.transform().name(),
            "zoom": self.view.zoom().applied().map(|r| [r.min, r.max]),
            "series": self.view.series(),
        });

        let json = serde_json::to_string_pretty(&export)?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }
}

/// Wall clock in milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use instrument_client::{ExchangeError, StoreError};
    use instrument_types::{GetResponse, ListResponse, SampleType, Value, ValueStream};

    use super::*;
    use crate::source::StoreReply;

    /// Records submitted calls; tests queue the replies by hand.
    #[derive(Debug, Default, Clone)]
    struct ScriptedSource {
        submitted: Arc<Mutex<Vec<StoreCall>>>,
        replies: Arc<Mutex<VecDeque<StoreReply>>>,
    }

    impl ScriptedSource {
        fn last_call(&self) -> StoreCall {
            self.submitted.lock().unwrap().last().cloned().expect("no calls")
        }

        fn calls(&self) -> usize {
            self.submitted.lock().unwrap().len()
        }

        fn answer_list(&self, variables: &[&str]) {
            let StoreCall::List { token, .. } = self.last_call() else {
                panic!("last call was not a list");
            };
            self.replies.lock().unwrap().push_back(StoreReply::List {
                token,
                result: Ok(ListResponse {
                    success: true,
                    errormessage: None,
                    stream: variables.iter().map(|v| ValueStream::new(*v)).collect(),
                }),
            });
        }

        fn answer_get(&self, result: Result<GetResponse, StoreError>) {
            let StoreCall::Get { token, .. } = self.last_call() else {
                panic!("last call was not a get");
            };
            self.replies
                .lock()
                .unwrap()
                .push_back(StoreReply::Get { token, result });
        }
    }

    impl StoreSource for ScriptedSource {
        fn submit(&mut self, call: StoreCall) {
            self.submitted.lock().unwrap().push(call);
        }

        fn poll(&mut self) -> Option<StoreReply> {
            self.replies.lock().unwrap().pop_front()
        }

        fn description(&self) -> &str {
            "scripted"
        }

        fn in_flight(&self) -> usize {
            0
        }
    }

    const VAR: &str = "/network/interface/stats/ifInOctets{hostname=gw,interface=eth0}";

    fn started() -> (App, ScriptedSource) {
        let source = ScriptedSource::default();
        let mut app = App::with_theme(
            Box::new(source.clone()),
            ViewSettings::default(),
            Theme::dark(),
        );
        app.start();
        source.answer_list(&[VAR]);
        app.tick();
        source.answer_list(&[VAR]);
        app.tick();
        (app, source)
    }

    #[test]
    fn start_lists_then_fetches() {
        let (_app, source) = started();
        assert_eq!(source.calls(), 3);
        match source.last_call() {
            StoreCall::Get { request, .. } => assert_eq!(request.variable, VAR),
            other => panic!("expected get, got {:?}", other),
        }
    }

    #[test]
    fn completed_fetch_arms_refetch() {
        let (mut app, source) = started();
        assert!(app.refetch_in().is_none());

        source.answer_get(Ok(GetResponse {
            success: true,
            errormessage: None,
            stream: vec![ValueStream {
                variable: VAR.to_string(),
                value: vec![Value::double(1000, 1.0)],
            }],
        }));
        app.tick();

        let due = app.refetch_in().expect("refetch armed");
        assert!(due <= Duration::from_secs(30));
        assert!(due > Duration::from_secs(25));
        assert!(app.last_error.is_none());
        assert_eq!(app.view.series().len(), 1);
    }

    #[test]
    fn failed_fetch_shows_notice_and_still_rearms() {
        let (mut app, source) = started();
        source.answer_get(Err(StoreError::Transport {
            path: "/get",
            source: ExchangeError::Status { status: 502 },
        }));
        app.tick();

        assert!(app.refetch_in().is_some());
        assert!(app.get_status_message().is_some());
        assert!(app.last_error.as_deref().is_some_and(|e| e.contains("/get")));
    }

    #[test]
    fn window_change_cancels_timer_and_fetches() {
        let (mut app, source) = started();
        source.answer_get(Ok(GetResponse::default()));
        app.tick();
        assert!(app.refetch_in().is_some());
        let before = source.calls();

        app.halve_window();

        assert!(app.refetch_in().is_none());
        assert_eq!(source.calls(), before + 1);
        assert_eq!(app.view.window_secs(), 21_600);
    }

    #[test]
    fn changing_transform_selector_refetches() {
        let (mut app, source) = started();
        app.focus = Selector::Transform;
        app.change_selected(1);
        assert_eq!(app.view.transform(), SampleType::RateSigned);
        assert!(matches!(source.last_call(), StoreCall::Get { .. }));
    }

    #[test]
    fn typed_window_is_applied_on_confirm() {
        let (mut app, _source) = started();
        app.start_window_input();
        for c in "2dx".chars() {
            app.window_input_push(c);
        }
        app.window_input_pop();
        app.confirm_window_input();
        assert_eq!(app.view.window_secs(), 172_800);
        assert!(app.window_input.is_none());
    }

    #[test]
    fn drag_across_plot_zooms() {
        let (mut app, source) = started();
        source.answer_get(Ok(GetResponse {
            success: true,
            errormessage: None,
            stream: vec![ValueStream {
                variable: VAR.to_string(),
                value: vec![Value::double(0, 1.0), Value::double(100_000, 2.0)],
            }],
        }));
        app.tick();
        app.plot_area = Some(Rect::new(10, 2, 101, 20));

        app.begin_drag(20);
        app.update_drag(60);
        app.end_drag(60);

        let applied = app.view.zoom().applied().expect("zoom applied");
        assert_eq!(applied, AxisRange::between(10_000.0, 50_000.0));

        app.zoom_out();
        assert_eq!(app.view.zoom().applied(), None);
    }

    #[test]
    fn drag_past_plot_edge_clamps_to_edge() {
        let (mut app, source) = started();
        source.answer_get(Ok(GetResponse {
            success: true,
            errormessage: None,
            stream: vec![ValueStream {
                variable: VAR.to_string(),
                value: vec![Value::double(0, 1.0), Value::double(100_000, 2.0)],
            }],
        }));
        app.tick();
        app.plot_area = Some(Rect::new(10, 2, 101, 20));

        app.begin_drag(50);
        app.update_drag(130);
        app.end_drag(130);

        let applied = app.view.zoom().applied().expect("zoom applied");
        assert_eq!(applied, AxisRange::between(40_000.0, 100_000.0));
    }

    #[test]
    fn stale_get_leaves_status_alone() {
        let (mut app, source) = started();
        let StoreCall::Get { token: old, .. } = source.last_call() else {
            panic!("expected get");
        };
        app.halve_window();
        app.last_error = Some("store down".to_string());
        let updated = app.last_update;

        source.replies.lock().unwrap().push_back(StoreReply::Get {
            token: old,
            result: Ok(GetResponse::default()),
        });
        app.tick();

        assert_eq!(app.last_error.as_deref(), Some("store down"));
        assert_eq!(app.last_update, updated);
        assert!(app.refetch_in().is_none());
    }

    #[test]
    fn click_without_drag_does_not_zoom() {
        let (mut app, _source) = started();
        app.plot_area = Some(Rect::new(0, 0, 50, 10));
        app.begin_drag(5);
        app.end_drag(6);
        assert_eq!(app.view.zoom().applied(), None);
    }

    #[test]
    fn export_writes_series_json() {
        let (mut app, source) = started();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        assert!(app.export_series(&path).is_err());

        source.answer_get(Ok(GetResponse {
            success: true,
            errormessage: None,
            stream: vec![ValueStream {
                variable: VAR.to_string(),
                value: vec![Value::double(1000, 3.0)],
            }],
        }));
        app.tick();
        app.export_series(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["window"], "12h");
        assert_eq!(json["series"][0]["label"], VAR);
        assert_eq!(json["series"][0]["data"][0][1], 3.0);
    }
}
