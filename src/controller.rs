//! View state machine: selection, window, value transform and zoom.
//!
//! [`ViewController::handle`] takes one [`ViewEvent`] and returns the
//! [`Effect`]s the caller must carry out (send a call, redraw, arm or cancel
//! the refetch timer, show a notice). It never performs I/O itself.

use std::time::Duration;

use instrument_client::StoreError;
use instrument_types::{
    format_duration, parse_duration, DurationParse, GetRequest, GetResponse, Identifier,
    ListRequest, ListResponse, SampleType, StreamMutation, DEFAULT_MAX_VARIABLES, HOSTNAME_LABEL,
    HOUR, INTERFACE_LABEL,
};
use tracing::{debug, info, warn};

use crate::cascade::{CascadeOutcome, ListCall, ListToken, SelectorCascade};
use crate::data::series::{time_extent, value_max};
use crate::data::{series_from_streams, AxisRange, ChartSeries, ZoomState};

/// Delay before the next poll once a fetch cycle completes.
pub const REFETCH_INTERVAL: Duration = Duration::from_secs(30);

/// Window shown when nothing else is configured.
pub const DEFAULT_WINDOW_SECS: i64 = 12 * HOUR;

/// Identifies one issued Get call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetToken(pub u64);

/// Initial view parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSettings {
    pub namespace: String,
    pub metric: Option<String>,
    pub host: Option<String>,
    pub interface: Option<String>,
    pub window_secs: i64,
    pub transform: SampleType,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            namespace: "/network/interface/stats".to_string(),
            metric: None,
            host: None,
            interface: None,
            window_secs: DEFAULT_WINDOW_SECS,
            transform: SampleType::default(),
        }
    }
}

/// Everything that can happen to the view.
#[derive(Debug)]
pub enum ViewEvent {
    /// Load the selectors from scratch.
    Start,
    MetricSelected(String),
    HostSelected(String),
    InterfaceSelected(String),
    TransformSelected(SampleType),
    WindowDoubled,
    WindowHalved,
    /// Free-text window entry, e.g. `"3d"`.
    WindowEntered(String),
    ZoomSelected(AxisRange),
    ZoomOut,
    /// The refetch timer fired, or the user asked for a fetch.
    Refetch,
    ListCompleted {
        token: ListToken,
        result: Result<ListResponse, StoreError>,
    },
    GetCompleted {
        token: GetToken,
        result: Result<GetResponse, StoreError>,
    },
}

/// Side effects requested by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    List {
        token: ListToken,
        request: ListRequest,
    },
    Get {
        token: GetToken,
        request: GetRequest,
    },
    /// Redraw from current state.
    Render,
    /// Schedule a single [`ViewEvent::Refetch`] after the delay, replacing any pending one.
    ArmRefetch(Duration),
    /// Drop any pending refetch.
    CancelRefetch,
    /// Tell the user something went wrong.
    Notice(String),
}

impl From<ListCall> for Effect {
    fn from(call: ListCall) -> Self {
        Effect::List {
            token: call.token,
            request: call.request,
        }
    }
}

/// Owns the current view and decides what happens next.
#[derive(Debug)]
pub struct ViewController {
    cascade: SelectorCascade,
    window_secs: i64,
    transform: SampleType,
    zoom: ZoomState,
    series: Vec<ChartSeries>,
    get_generation: u64,
    requested: Option<AxisRange>,
}

impl ViewController {
    pub fn new(settings: ViewSettings) -> Self {
        Self {
            cascade: SelectorCascade::new(
                settings.namespace,
                settings.metric,
                settings.host,
                settings.interface,
            ),
            window_secs: settings.window_secs.max(1),
            transform: settings.transform,
            zoom: ZoomState::new(),
            series: Vec::new(),
            get_generation: 0,
            requested: None,
        }
    }

    pub fn cascade(&self) -> &SelectorCascade {
        &self.cascade
    }

    pub fn window_secs(&self) -> i64 {
        self.window_secs
    }

    /// The window as shown to the user, e.g. `"12h"`.
    pub fn window_label(&self) -> String {
        format_duration(self.window_secs).unwrap_or_else(|| format!("{}s", self.window_secs))
    }

    pub fn transform(&self) -> SampleType {
        self.transform
    }

    pub fn zoom(&self) -> &ZoomState {
        &self.zoom
    }

    pub fn series(&self) -> &[ChartSeries] {
        &self.series
    }

    /// X-axis bounds: the applied zoom, else the data, else the requested window.
    pub fn x_bounds(&self) -> Option<AxisRange> {
        self.zoom
            .applied()
            .or_else(|| time_extent(&self.series).map(|(lo, hi)| AxisRange::between(lo, hi)))
            .or(self.requested)
    }

    /// Upper y-axis bound, never below 1.
    pub fn y_max(&self) -> f64 {
        value_max(&self.series).unwrap_or(0.0).max(1.0)
    }

    /// Feed one event through the state machine.
    pub fn handle(&mut self, event: ViewEvent, now_ms: u64) -> Vec<Effect> {
        match event {
            ViewEvent::Start => vec![self.cascade.refresh_top_level().into()],
            ViewEvent::MetricSelected(metric) => match self.cascade.choose_metric(&metric) {
                Some(call) => vec![Effect::Render, call.into()],
                None => vec![Effect::Render],
            },
            ViewEvent::HostSelected(host) => match self.cascade.choose_host(&host) {
                Some(call) => vec![Effect::Render, call.into()],
                None => vec![Effect::Render],
            },
            ViewEvent::InterfaceSelected(interface) => {
                if !self.cascade.choose_interface(&interface) {
                    debug!("ignoring unknown interface {}", interface);
                    return Vec::new();
                }
                let mut effects = vec![Effect::Render];
                effects.extend(self.fetch_cycle(now_ms));
                effects
            }
            ViewEvent::TransformSelected(transform) => {
                self.transform = transform;
                let mut effects = vec![Effect::Render];
                effects.extend(self.fetch_cycle(now_ms));
                effects
            }
            ViewEvent::WindowDoubled => match self.displayed_window().checked_mul(2) {
                Some(secs) => self.apply_window(secs, now_ms),
                None => vec![Effect::Notice("window is already at its maximum".to_string())],
            },
            ViewEvent::WindowHalved => {
                let secs = (self.displayed_window() / 2).max(1);
                self.apply_window(secs, now_ms)
            }
            ViewEvent::WindowEntered(text) => match window_from_text(text.trim()) {
                Ok(secs) => self.apply_window(secs, now_ms),
                Err(notice) => vec![Effect::Notice(notice)],
            },
            ViewEvent::ZoomSelected(range) => {
                self.zoom.select(range);
                vec![Effect::Render]
            }
            ViewEvent::ZoomOut => {
                self.zoom.zoom_out();
                vec![Effect::Render]
            }
            ViewEvent::Refetch => self.fetch_cycle(now_ms),
            ViewEvent::ListCompleted { token, result } => {
                match self.cascade.apply(token, result) {
                    CascadeOutcome::Stale => Vec::new(),
                    CascadeOutcome::Failed(message) => vec![Effect::Notice(message)],
                    CascadeOutcome::TopLevelReady(call) => vec![Effect::Render, call.into()],
                    CascadeOutcome::Incomplete => vec![Effect::Render],
                    CascadeOutcome::SelectionReady => {
                        let mut effects = vec![Effect::Render];
                        effects.extend(self.fetch_cycle(now_ms));
                        effects
                    }
                }
            }
            ViewEvent::GetCompleted { token, result } => self.fetch_completed(token, result),
        }
    }

    /// The window after a format/parse round trip, as the user sees it.
    fn displayed_window(&self) -> i64 {
        parse_duration(&self.window_label())
            .seconds()
            .filter(|s| *s > 0)
            .unwrap_or(self.window_secs)
    }

    fn apply_window(&mut self, secs: i64, now_ms: u64) -> Vec<Effect> {
        info!("window {} -> {}", self.window_secs, secs);
        self.window_secs = secs;
        self.zoom.reset();
        let mut effects = vec![Effect::CancelRefetch, Effect::Render];
        effects.extend(self.start_get(now_ms));
        effects
    }

    /// Cancel the pending refetch and start a Get, unless the selection is incomplete.
    fn fetch_cycle(&mut self, now_ms: u64) -> Vec<Effect> {
        match self.start_get(now_ms) {
            Some(get) => vec![Effect::CancelRefetch, get],
            None => Vec::new(),
        }
    }

    fn start_get(&mut self, now_ms: u64) -> Option<Effect> {
        let Some((metric, host, interface)) = self.cascade.complete() else {
            debug!("selection incomplete, not fetching");
            return None;
        };
        let pattern = Identifier::new(metric)
            .with_label(HOSTNAME_LABEL, host)
            .with_label(INTERFACE_LABEL, interface)
            .to_string();

        let span_ms = window_millis(self.window_secs);
        let min_timestamp = now_ms.saturating_sub(span_ms);

        let mut request = GetRequest::new(pattern);
        request.min_timestamp = Some(min_timestamp);
        request.mutation = vec![StreamMutation::new(self.transform)];
        request.max_variables = Some(DEFAULT_MAX_VARIABLES);

        self.get_generation += 1;
        self.requested = Some(AxisRange::between(min_timestamp as f64, now_ms as f64));
        debug!(
            "get #{} {} {}",
            self.get_generation, request.variable, self.transform
        );
        Some(Effect::Get {
            token: GetToken(self.get_generation),
            request,
        })
    }

    fn fetch_completed(
        &mut self,
        token: GetToken,
        result: Result<GetResponse, StoreError>,
    ) -> Vec<Effect> {
        if token.0 != self.get_generation {
            debug!(
                "dropping stale get #{} (latest #{})",
                token.0, self.get_generation
            );
            return Vec::new();
        }
        let rearm = Effect::ArmRefetch(REFETCH_INTERVAL);
        match result {
            Ok(response) => {
                self.series = series_from_streams(&response.stream);
                debug!("get #{} returned {} series", token.0, self.series.len());
                vec![Effect::Render, rearm]
            }
            Err(err) => {
                warn!("get #{} failed: {}", token.0, err);
                vec![Effect::Notice(err.errormessage()), rearm]
            }
        }
    }
}

/// Read a user-entered window.
///
/// Text matching no unit pattern is accepted if its leading integer is
/// positive. Anything else is refused with a message for the user.
pub fn window_from_text(text: &str) -> Result<i64, String> {
    match parse_duration(text) {
        DurationParse::Matched(secs) if secs > 0 => Ok(secs),
        DurationParse::Lenient(secs) if secs > 0 => {
            warn!("window {:?} matched no unit, reading it as {}s", text, secs);
            Ok(secs)
        }
        _ => Err(format!("invalid window: {:?}", text)),
    }
}

/// Window length in milliseconds, saturating on overflow.
pub fn window_millis(secs: i64) -> u64 {
    (secs.max(0) as u64).saturating_mul(1000)
}
