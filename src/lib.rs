//! # instrument-dash
//!
//! A terminal dashboard for browsing and charting metrics held in an
//! instrument store.
//!
//! The dashboard picks a metric, host and interface from what the store
//! currently holds, fetches the chosen stream over a sliding time window and
//! re-polls it every 30 seconds. The window can be halved, doubled or typed
//! in, and the chart can be zoomed by dragging across it.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                           Application                            │
//! │  ┌────────┐ ViewEvent ┌────────────┐  Effect   ┌────────┐        │
//! │  │ events │──────────▶│ controller │──────────▶│  app   │        │
//! │  └────────┘           │ + cascade  │           └───┬────┘        │
//! │                       └─────▲──────┘       StoreCall │  Render     │
//! │                             │ StoreReply           ▼    ▼        │
//! │                       ┌─────┴──────┐          ┌────────┐         │
//! │                       │   source   │◀─────────│   ui   │         │
//! │                       │  (tokio)   │          └────────┘         │
//! │                       └─────┬──────┘                             │
//! └─────────────────────────────┼────────────────────────────────────┘
//!                               ▼
//!                   instrument-client (HTTP /add /get /list)
//! ```
//!
//! - **[`cascade`]**: metric → host → interface option lists kept in step with the store
//! - **[`controller`]**: the view state machine; pure, returns [`Effect`]s
//! - **[`source`]**: runs store calls on tokio tasks and hands back replies
//! - **[`app`]**: executes effects, owns the refetch deadline and input state
//! - **[`data`]**: chart series, zoom stack and selector models
//! - **[`ui`]**: ratatui rendering
//! - **[`config`]** / **[`logging`]**: layered settings and tracing setup
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Dashboard against a local store
//! instrument-dash --store http://localhost:8020
//!
//! # One-shot queries
//! instrument-dash list '/network/interface/stats/*{hostname=*}'
//! instrument-dash get '/network/interface/stats/ifInOctets{hostname=gw,interface=*}' -d 1h
//! ```
//!
//! ### Driving the controller directly
//!
//! ```
//! use instrument_dash::{Effect, ViewController, ViewEvent, ViewSettings};
//!
//! let mut view = ViewController::new(ViewSettings::default());
//! let effects = view.handle(ViewEvent::Start, 0);
//! assert!(matches!(effects[0], Effect::List { .. }));
//! ```
//!
//! ### With a live store
//!
//! ```no_run
//! use instrument_client::ReqwestExchange;
//! use instrument_dash::{App, RemoteSource, ViewSettings};
//!
//! # tokio_test::block_on(async {
//! let exchange = ReqwestExchange::builder().base_url("http://localhost:8020").build().unwrap();
//! let mut app = App::new(Box::new(RemoteSource::new(exchange)), ViewSettings::default());
//! app.start();
//! # });
//! ```

pub mod app;
pub mod cascade;
pub mod config;
pub mod controller;
pub mod data;
pub mod events;
pub mod logging;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use cascade::{CascadeOutcome, ListCall, ListLevel, ListToken, SelectorCascade};
pub use controller::{Effect, GetToken, ViewController, ViewEvent, ViewSettings};
pub use data::{format_bps, AxisRange, ChartSeries, Selection, ZoomState};
pub use source::{RemoteSource, StoreCall, StoreReply, StoreSource};
