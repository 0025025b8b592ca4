//! Labelled metric identifiers of the form `name{label=value,...}`.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use core::fmt;

/// Label carrying the host a stream was collected from.
pub const HOSTNAME_LABEL: &str = "hostname";
/// Label carrying the network interface a stream describes.
pub const INTERFACE_LABEL: &str = "interface";

/// A metric name plus an unordered set of key/value labels.
///
/// The text form has no escaping: a `,` or `=` inside a label value cannot
/// be represented and will split differently when parsed back.
///
/// # Example
///
/// ```rust
/// use instrument_types::Identifier;
///
/// let id = Identifier::new("/network/interface/stats/ifInOctets")
///     .with_label("interface", "eth0")
///     .with_label("hostname", "gw");
///
/// assert_eq!(
///     id.to_string(),
///     "/network/interface/stats/ifInOctets{hostname=gw,interface=eth0}"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Identifier {
    /// Metric name, everything before the first `{`.
    pub name: String,
    /// Labels, later duplicates already collapsed (last write wins).
    pub labels: BTreeMap<String, String>,
}

impl Identifier {
    /// Create an identifier with no labels.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            labels: BTreeMap::new(),
        }
    }

    /// Add (or replace) a label.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Look up a label value.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// Parse `name{k=v,...}`.
    ///
    /// Returns `None` when the text has no `{...}` part, when the name is
    /// empty, or when the braces are empty. Anything after the final `}` is
    /// ignored. Each comma separated segment splits on its first `=`; a
    /// segment without `=` becomes a label with an empty value. Repeated keys
    /// keep the last value.
    pub fn parse(s: &str) -> Option<Self> {
        let open = s.find('{')?;
        let close = s.rfind('}')?;
        if open == 0 || close <= open + 1 {
            return None;
        }

        let name = &s[..open];
        let body = &s[open + 1..close];

        let mut labels = BTreeMap::new();
        for segment in body.split(',') {
            let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
            labels.insert(key.to_string(), value.to_string());
        }

        Some(Self {
            name: name.to_string(),
            labels,
        })
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if self.labels.is_empty() {
            return Ok(());
        }
        f.write_str("{")?;
        for (i, (key, value)) in self.labels.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_name_is_no_match() {
        assert_eq!(Identifier::parse("cpu.load"), None);
    }

    #[test]
    fn duplicate_keys_last_write_wins() {
        let id = Identifier::parse("cpu.load{host=a,host=b}").unwrap();
        assert_eq!(id.name, "cpu.load");
        assert_eq!(id.labels.len(), 1);
        assert_eq!(id.label("host"), Some("b"));
    }

    #[test]
    fn parses_multiple_labels() {
        let id = Identifier::parse("/net/ifInOctets{hostname=gw,interface=Dialer0}").unwrap();
        assert_eq!(id.name, "/net/ifInOctets");
        assert_eq!(id.label(HOSTNAME_LABEL), Some("gw"));
        assert_eq!(id.label(INTERFACE_LABEL), Some("Dialer0"));
    }

    #[test]
    fn value_keeps_text_after_first_equals() {
        let id = Identifier::parse("m{query=a=b}").unwrap();
        assert_eq!(id.label("query"), Some("a=b"));
    }

    #[test]
    fn segment_without_equals_has_empty_value() {
        let id = Identifier::parse("m{flag}").unwrap();
        assert_eq!(id.label("flag"), Some(""));
    }

    #[test]
    fn empty_name_or_body_is_no_match() {
        assert_eq!(Identifier::parse("{a=b}"), None);
        assert_eq!(Identifier::parse("m{}"), None);
        assert_eq!(Identifier::parse("m{a=b"), None);
    }

    #[test]
    fn wildcards_survive_parsing() {
        let id = Identifier::parse("/net/*{hostname=*,interface=*}").unwrap();
        assert_eq!(id.name, "/net/*");
        assert_eq!(id.label(HOSTNAME_LABEL), Some("*"));
    }

    #[test]
    fn display_without_labels_is_name_only() {
        assert_eq!(Identifier::new("uptime").to_string(), "uptime");
    }

    #[test]
    fn display_round_trips_sorted_form() {
        let text = "m{a=1,b=2}";
        assert_eq!(Identifier::parse(text).unwrap().to_string(), text);
    }
}
