//! Request and response messages for the store's `/add`, `/get` and `/list`
//! endpoints.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::SampleType;

/// Default cap on the number of streams a Get or List returns.
pub const DEFAULT_MAX_VARIABLES: u32 = 100;

/// The three store endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Submit new samples.
    Add,
    /// Fetch samples for a variable pattern.
    Get,
    /// Enumerate variables matching a prefix pattern.
    List,
}

impl Endpoint {
    /// HTTP path the endpoint is served on.
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Add => "/add",
            Endpoint::Get => "/get",
            Endpoint::List => "/list",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A request message bound to exactly one endpoint and response type.
pub trait StoreRequest {
    /// The response shape the endpoint answers with.
    type Response: StoreResponse + Default;

    /// Endpoint this request is posted to.
    const ENDPOINT: Endpoint;
}

/// Fields common to every response.
pub trait StoreResponse {
    /// True if the store handled the request.
    fn success(&self) -> bool;

    /// Store-provided reason for a failure.
    fn errormessage(&self) -> Option<&str>;
}

/// One sample.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Value {
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,

    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub double_value: Option<f64>,

    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub string_value: Option<String>,

    /// Set when the value covers a span rather than an instant.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub end_timestamp: Option<u64>,
}

impl Value {
    /// A numeric sample.
    pub fn double(timestamp: u64, value: f64) -> Self {
        Self {
            timestamp,
            double_value: Some(value),
            ..Default::default()
        }
    }
}

/// One identifier's time-ordered samples.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueStream {
    /// Identifier string, `name{k=v,...}`.
    pub variable: String,

    #[cfg_attr(feature = "serde", serde(default))]
    pub value: Vec<Value>,
}

impl ValueStream {
    /// A stream with no samples, as returned by List.
    pub fn new(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            value: Vec::new(),
        }
    }
}

/// A transform applied by the store before values are returned.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StreamMutation {
    pub sample_type: SampleType,

    /// Output interval in milliseconds.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub sample_frequency: Option<u32>,

    /// Largest gap (in output intervals) that is interpolated across.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub max_gap_interpolate: Option<u32>,
}

impl StreamMutation {
    pub fn new(sample_type: SampleType) -> Self {
        Self {
            sample_type,
            ..Default::default()
        }
    }
}

macro_rules! store_response {
    ($name:ident) => {
        impl StoreResponse for $name {
            fn success(&self) -> bool {
                self.success
            }

            fn errormessage(&self) -> Option<&str> {
                self.errormessage.as_deref()
            }
        }
    };
}

/// Submit a batch of samples.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AddRequest {
    pub stream: Vec<ValueStream>,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AddResponse {
    #[cfg_attr(feature = "serde", serde(default))]
    pub success: bool,

    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub errormessage: Option<String>,
}

impl StoreRequest for AddRequest {
    type Response = AddResponse;
    const ENDPOINT: Endpoint = Endpoint::Add;
}

store_response!(AddResponse);

/// Fetch samples for every variable matching a pattern.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GetRequest {
    /// Identifier pattern; label values may be `*`.
    pub variable: String,

    /// Oldest sample to return, milliseconds since the Unix epoch.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub min_timestamp: Option<u64>,

    /// Newest sample to return, milliseconds since the Unix epoch.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub max_timestamp: Option<u64>,

    #[cfg_attr(feature = "serde", serde(default))]
    pub mutation: Vec<StreamMutation>,

    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub max_variables: Option<u32>,

    /// Keep only the newest N values of each stream.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub max_values: Option<u32>,
}

impl GetRequest {
    pub fn new(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GetResponse {
    #[cfg_attr(feature = "serde", serde(default))]
    pub success: bool,

    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub errormessage: Option<String>,

    #[cfg_attr(feature = "serde", serde(default))]
    pub stream: Vec<ValueStream>,
}

impl StoreRequest for GetRequest {
    type Response = GetResponse;
    const ENDPOINT: Endpoint = Endpoint::Get;
}

store_response!(GetResponse);

/// Enumerate variables matching a prefix pattern.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListRequest {
    /// Identifier pattern; name and label values may be `*`.
    pub prefix: String,

    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub max_variables: Option<u32>,

    /// Skip variables with no samples newer than this many milliseconds.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub max_age: Option<u64>,
}

impl ListRequest {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListResponse {
    #[cfg_attr(feature = "serde", serde(default))]
    pub success: bool,

    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub errormessage: Option<String>,

    /// Matching variables; samples are not populated.
    #[cfg_attr(feature = "serde", serde(default))]
    pub stream: Vec<ValueStream>,
}

impl StoreRequest for ListRequest {
    type Response = ListResponse;
    const ENDPOINT: Endpoint = Endpoint::List;
}

store_response!(ListResponse);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_bound_to_paths() {
        assert_eq!(<AddRequest as StoreRequest>::ENDPOINT.path(), "/add");
        assert_eq!(<GetRequest as StoreRequest>::ENDPOINT.path(), "/get");
        assert_eq!(<ListRequest as StoreRequest>::ENDPOINT.path(), "/list");
    }

    #[test]
    fn default_response_is_a_failure() {
        let response = GetResponse::default();
        assert!(!response.success());
        assert_eq!(response.errormessage(), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_roundtrip() {
        let mut request = GetRequest::new("m{hostname=a,interface=b}");
        request.min_timestamp = Some(1_700_000_000_000);
        request.mutation.push(StreamMutation::new(SampleType::Rate));

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"sample_type\":\"rate\""));
        assert!(!json.contains("max_values"));

        let parsed: GetRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(request, parsed);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn missing_fields_take_defaults() {
        let parsed: ListResponse = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(parsed.success);
        assert!(parsed.stream.is_empty());
    }
}
