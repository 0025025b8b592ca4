//! Metric → host → interface selector cascade.
//!
//! The cascade never talks to the store itself. It hands out [`ListCall`]s
//! for the caller to send and is fed the outcomes through
//! [`SelectorCascade::apply`]. Each call carries a generation; only the
//! latest call issued for a level is applied, older completions are dropped.

use std::collections::BTreeSet;

use instrument_client::StoreError;
use instrument_types::{Identifier, ListRequest, ListResponse, HOSTNAME_LABEL, INTERFACE_LABEL};
use tracing::{debug, warn};

use crate::data::Selection;

/// Which List a call belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListLevel {
    /// Metric names and hosts under the namespace root.
    TopLevel,
    /// Interfaces of the selected metric and host.
    Interfaces,
}

/// Identifies one issued List call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListToken {
    pub level: ListLevel,
    pub generation: u64,
}

/// A List the caller should send.
#[derive(Debug, Clone, PartialEq)]
pub struct ListCall {
    pub token: ListToken,
    pub request: ListRequest,
}

/// What applying a List outcome led to.
#[derive(Debug, Clone, PartialEq)]
pub enum CascadeOutcome {
    /// A newer call for the same level is outstanding; nothing changed.
    Stale,
    /// The call failed; options and selections are untouched.
    Failed(String),
    /// Metric and host options were rebuilt; send the interface List.
    TopLevelReady(ListCall),
    /// Options were rebuilt but there is no metric/host to scope interfaces by.
    Incomplete,
    /// Interfaces were rebuilt; the full selection may be fetched.
    SelectionReady,
}

/// Keeps the three dependent option lists consistent with the store.
#[derive(Debug, Clone)]
pub struct SelectorCascade {
    namespace: String,
    pub metric: Selection,
    pub host: Selection,
    pub interface: Selection,
    top_generation: u64,
    interface_generation: u64,
}

impl SelectorCascade {
    /// Create a cascade rooted at `namespace` (e.g. `/network/interface/stats`).
    ///
    /// Preferred initial choices are kept once the store offers them.
    pub fn new(
        namespace: impl Into<String>,
        metric: Option<String>,
        host: Option<String>,
        interface: Option<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            metric: Selection::preferring(metric),
            host: Selection::preferring(host),
            interface: Selection::preferring(interface),
            top_generation: 0,
            interface_generation: 0,
        }
    }

    /// Metric, host and interface, if all three are chosen.
    pub fn complete(&self) -> Option<(&str, &str, &str)> {
        Some((
            self.metric.current()?,
            self.host.current()?,
            self.interface.current()?,
        ))
    }

    /// Pattern listing every metric and host under the namespace.
    pub fn top_level_pattern(&self) -> String {
        Identifier::new(format!("{}/*", self.namespace.trim_end_matches('/')))
            .with_label(HOSTNAME_LABEL, "*")
            .with_label(INTERFACE_LABEL, "*")
            .to_string()
    }

    /// Start rebuilding metric and host options.
    pub fn refresh_top_level(&mut self) -> ListCall {
        self.top_generation += 1;
        ListCall {
            token: ListToken {
                level: ListLevel::TopLevel,
                generation: self.top_generation,
            },
            request: ListRequest::new(self.top_level_pattern()),
        }
    }

    /// Start rebuilding interface options for the chosen metric and host.
    ///
    /// Returns `None` (and clears the interface level) when either is unset.
    pub fn refresh_interfaces(&mut self) -> Option<ListCall> {
        let (Some(metric), Some(host)) = (self.metric.current(), self.host.current()) else {
            self.interface.clear();
            return None;
        };
        let prefix = Identifier::new(metric)
            .with_label(HOSTNAME_LABEL, host)
            .with_label(INTERFACE_LABEL, "*")
            .to_string();

        self.interface_generation += 1;
        Some(ListCall {
            token: ListToken {
                level: ListLevel::Interfaces,
                generation: self.interface_generation,
            },
            request: ListRequest::new(prefix),
        })
    }

    /// Choose a metric; returns the interface List to send if it changed.
    pub fn choose_metric(&mut self, metric: &str) -> Option<ListCall> {
        if !self.metric.choose(metric) {
            return None;
        }
        self.refresh_interfaces()
    }

    /// Choose a host; returns the interface List to send if it changed.
    pub fn choose_host(&mut self, host: &str) -> Option<ListCall> {
        if !self.host.choose(host) {
            return None;
        }
        self.refresh_interfaces()
    }

    /// Choose an interface. Returns false if it is not offered.
    pub fn choose_interface(&mut self, interface: &str) -> bool {
        self.interface.choose(interface)
    }

    /// Apply the outcome of a List call.
    pub fn apply(
        &mut self,
        token: ListToken,
        result: Result<ListResponse, StoreError>,
    ) -> CascadeOutcome {
        let latest = match token.level {
            ListLevel::TopLevel => self.top_generation,
            ListLevel::Interfaces => self.interface_generation,
        };
        if token.generation != latest {
            debug!(
                "dropping stale {:?} list (generation {} < {})",
                token.level, token.generation, latest
            );
            return CascadeOutcome::Stale;
        }

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                warn!("{:?} list failed: {}", token.level, err);
                return CascadeOutcome::Failed(err.errormessage());
            }
        };

        let identifiers: Vec<Identifier> = response
            .stream
            .iter()
            .filter_map(|s| Identifier::parse(&s.variable))
            .collect();

        match token.level {
            ListLevel::TopLevel => {
                let metrics: BTreeSet<String> =
                    identifiers.iter().map(|id| id.name.clone()).collect();
                let hosts = label_values(&identifiers, HOSTNAME_LABEL);
                self.metric.replace(metrics);
                self.host.replace(hosts);
                match self.refresh_interfaces() {
                    Some(call) => CascadeOutcome::TopLevelReady(call),
                    None => CascadeOutcome::Incomplete,
                }
            }
            ListLevel::Interfaces => {
                self.interface
                    .replace(label_values(&identifiers, INTERFACE_LABEL));
                if self.complete().is_some() {
                    CascadeOutcome::SelectionReady
                } else {
                    CascadeOutcome::Incomplete
                }
            }
        }
    }
}

fn label_values(identifiers: &[Identifier], key: &str) -> BTreeSet<String> {
    identifiers
        .iter()
        .filter_map(|id| id.label(key))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use instrument_client::ExchangeError;
    use instrument_types::ValueStream;

    const ROOT: &str = "/network/interface/stats";

    fn listing(variables: &[&str]) -> Result<ListResponse, StoreError> {
        Ok(ListResponse {
            success: true,
            errormessage: None,
            stream: variables.iter().map(|v| ValueStream::new(*v)).collect(),
        })
    }

    fn failure() -> Result<ListResponse, StoreError> {
        Err(StoreError::Transport {
            path: "/list",
            source: ExchangeError::Timeout,
        })
    }

    fn loaded() -> SelectorCascade {
        let mut cascade = SelectorCascade::new(ROOT, None, None, None);
        let top = cascade.refresh_top_level();
        let outcome = cascade.apply(
            top.token,
            listing(&[
                "/network/interface/stats/ifInOctets{hostname=gw,interface=eth0}",
                "/network/interface/stats/ifOutOctets{hostname=gw,interface=eth0}",
                "/network/interface/stats/ifInOctets{hostname=core,interface=eth1}",
            ]),
        );
        let CascadeOutcome::TopLevelReady(call) = outcome else {
            panic!("expected interface call, got {:?}", outcome);
        };
        let outcome = cascade.apply(
            call.token,
            listing(&[
                "/network/interface/stats/ifInOctets{hostname=core,interface=eth1}",
                "/network/interface/stats/ifInOctets{hostname=core,interface=eth2}",
            ]),
        );
        assert_eq!(outcome, CascadeOutcome::SelectionReady);
        cascade
    }

    #[test]
    fn top_level_pattern_uses_wildcards() {
        let cascade = SelectorCascade::new(ROOT, None, None, None);
        assert_eq!(
            cascade.top_level_pattern(),
            "/network/interface/stats/*{hostname=*,interface=*}"
        );
    }

    #[test]
    fn top_level_derives_distinct_metrics_and_hosts() {
        let cascade = loaded();
        assert_eq!(
            cascade.metric.options(),
            [
                "/network/interface/stats/ifInOctets",
                "/network/interface/stats/ifOutOctets"
            ]
        );
        assert_eq!(cascade.host.options(), ["core", "gw"]);
        assert_eq!(
            cascade.complete(),
            Some(("/network/interface/stats/ifInOctets", "core", "eth1"))
        );
    }

    #[test]
    fn interface_call_is_scoped_to_metric_and_host() {
        let mut cascade = loaded();
        let call = cascade.refresh_interfaces().unwrap();
        assert_eq!(
            call.request.prefix,
            "/network/interface/stats/ifInOctets{hostname=core,interface=*}"
        );
    }

    #[test]
    fn preferred_selection_is_kept_when_offered() {
        let mut cascade = SelectorCascade::new(
            ROOT,
            Some("/network/interface/stats/ifOutOctets".to_string()),
            Some("gw".to_string()),
            None,
        );
        let top = cascade.refresh_top_level();
        cascade.apply(
            top.token,
            listing(&[
                "/network/interface/stats/ifInOctets{hostname=core,interface=eth0}",
                "/network/interface/stats/ifOutOctets{hostname=gw,interface=eth0}",
            ]),
        );
        assert_eq!(
            cascade.metric.current(),
            Some("/network/interface/stats/ifOutOctets")
        );
        assert_eq!(cascade.host.current(), Some("gw"));
    }

    #[test]
    fn failed_top_level_leaves_everything_untouched() {
        let mut cascade = loaded();
        let before = (
            cascade.metric.clone(),
            cascade.host.clone(),
            cascade.interface.clone(),
        );

        let top = cascade.refresh_top_level();
        let outcome = cascade.apply(top.token, failure());

        assert!(matches!(outcome, CascadeOutcome::Failed(_)));
        assert_eq!(cascade.metric, before.0);
        assert_eq!(cascade.host, before.1);
        assert_eq!(cascade.interface, before.2);
    }

    #[test]
    fn stale_completion_is_dropped() {
        let mut cascade = loaded();
        let old = cascade.refresh_interfaces().unwrap();
        let new = cascade.refresh_interfaces().unwrap();

        let outcome = cascade.apply(old.token, listing(&["m{hostname=core,interface=zz}"]));
        assert_eq!(outcome, CascadeOutcome::Stale);
        assert_eq!(cascade.interface.current(), Some("eth1"));

        let outcome = cascade.apply(
            new.token,
            listing(&["/network/interface/stats/ifInOctets{hostname=core,interface=eth2}"]),
        );
        assert_eq!(outcome, CascadeOutcome::SelectionReady);
        assert_eq!(cascade.interface.current(), Some("eth2"));
    }

    #[test]
    fn interface_selection_never_outlives_its_options() {
        let mut cascade = loaded();
        let call = cascade.choose_host("gw").unwrap();
        cascade.apply(
            call.token,
            listing(&["/network/interface/stats/ifInOctets{hostname=gw,interface=ppp0}"]),
        );
        assert_eq!(cascade.interface.options(), ["ppp0"]);
        assert_eq!(cascade.interface.current(), Some("ppp0"));
    }

    #[test]
    fn unparseable_variables_are_ignored() {
        let mut cascade = SelectorCascade::new(ROOT, None, None, None);
        let top = cascade.refresh_top_level();
        let outcome = cascade.apply(top.token, listing(&["uptime"]));
        assert_eq!(outcome, CascadeOutcome::Incomplete);
        assert!(cascade.metric.options().is_empty());
        assert_eq!(cascade.complete(), None);
    }

    #[test]
    fn choosing_unknown_metric_does_nothing() {
        let mut cascade = loaded();
        assert_eq!(cascade.choose_metric("/nope"), None);
        assert!(!cascade.choose_interface("nope"));
    }
}
