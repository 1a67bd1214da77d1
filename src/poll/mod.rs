//! Poll-until-done controller.
//!
//! A [`PollSequence`] is the pure state machine; [`controller`] drives it against a
//! [`crate::device_client::DeviceClient`] and a [`crate::scheduler::Scheduler`].

pub mod controller;

pub use controller::{
    LoadingRequest, PollContext, PollView, show_loading_banner, wait_until_finished,
    wait_until_finished_with,
};

use crate::config::PollConfig;
use serde_json::Value;
use std::{fmt, sync::Arc, time::Duration};

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);
pub const TRANSPORT_BACKOFF: Duration = Duration::from_millis(2000);
pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(4000);

/// Delay between closing the loading banner and showing the success banner.
pub const NOTIFY_DELAY: Duration = Duration::from_millis(100);
/// Delay before a completion callback runs.
pub const CALLBACK_DELAY: Duration = Duration::from_millis(10);
/// Delay between showing the loading banner and the first status request.
pub const LOADING_POLL_DELAY: Duration = Duration::from_millis(500);

pub const TEXT_SUCCESS: &str = "Success";

pub type Predicate = Arc<dyn Fn(Option<&Value>) -> bool + Send + Sync>;

/// How a status field is matched against the finished state.
#[derive(Clone)]
pub enum SuccessCondition {
    /// Coercive equality with a JSON value; see [`loose_eq`].
    LooseEq(Value),
    Predicate(Predicate),
}

impl SuccessCondition {
    pub fn predicate(f: impl Fn(Option<&Value>) -> bool + Send + Sync + 'static) -> Self {
        Self::Predicate(Arc::new(f))
    }

    pub fn is_met(&self, field: Option<&Value>) -> bool {
        match self {
            Self::LooseEq(expected) => loose_eq(field, expected),
            Self::Predicate(predicate) => predicate(field),
        }
    }
}

impl fmt::Debug for SuccessCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LooseEq(value) => f.debug_tuple("LooseEq").field(value).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<Value> for SuccessCondition {
    fn from(value: Value) -> Self {
        Self::LooseEq(value)
    }
}

/// Everything one poll sequence needs; never changes once the sequence started.
#[derive(Clone, Debug)]
pub struct PollRequest {
    pub status_url: String,
    pub status_field: String,
    pub success: SuccessCondition,
    pub interval: Duration,
    pub backoff: Duration,
    pub request_timeout: Duration,
    pub show_progress: bool,
}

impl PollRequest {
    pub fn new(
        status_url: impl Into<String>,
        status_field: impl Into<String>,
        success: impl Into<SuccessCondition>,
    ) -> Self {
        Self {
            status_url: status_url.into(),
            status_field: status_field.into(),
            success: success.into(),
            interval: DEFAULT_INTERVAL,
            backoff: TRANSPORT_BACKOFF,
            request_timeout: REQUEST_TIMEOUT,
            show_progress: false,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Take interval, backoff and request timeout from the configuration.
    pub fn with_timing(mut self, config: &PollConfig) -> Self {
        self.interval = config.interval;
        self.backoff = config.backoff;
        self.request_timeout = config.request_timeout;
        self
    }

    /// Classify a status body.
    pub fn evaluate(&self, body: Value) -> PollOutcome {
        let field = match body {
            Value::Object(mut map) => map.remove(&self.status_field),
            _ => None,
        };

        if self.success.is_met(field.as_ref()) {
            PollOutcome::Success(field.unwrap_or(Value::Null))
        } else {
            PollOutcome::Pending(field)
        }
    }
}

/// Result of one status request.
#[derive(Clone, Debug, PartialEq)]
pub enum PollOutcome {
    /// Field missing or not yet at the target value.
    Pending(Option<Value>),
    Success(Value),
    TransportError(String),
}

impl PollOutcome {
    pub fn field(&self) -> Option<&Value> {
        match self {
            Self::Pending(field) => field.as_ref(),
            Self::Success(field) => Some(field),
            Self::TransportError(_) => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NextAction {
    Schedule(Duration),
    Complete,
    Stop,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PollState {
    #[default]
    Idle,
    Polling {
        cycle: u64,
    },
    Done,
}

/// State machine of one poll sequence: `Idle -> Polling -> {Polling | Done}`.
#[derive(Debug)]
pub struct PollSequence {
    request: PollRequest,
    state: PollState,
}

impl PollSequence {
    pub fn new(request: PollRequest) -> Self {
        Self {
            request,
            state: PollState::Idle,
        }
    }

    pub fn request(&self) -> &PollRequest {
        &self.request
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    /// Feed the outcome of the current cycle and get what to do next.
    ///
    /// `Complete` is returned exactly once, on the step into `Done`; afterwards every
    /// outcome yields `Stop`. A transport error retries the same cycle.
    pub fn transition(&mut self, outcome: &PollOutcome) -> NextAction {
        let cycle = match self.state {
            PollState::Done => return NextAction::Stop,
            PollState::Idle => 1,
            PollState::Polling { cycle } => cycle,
        };

        match outcome {
            PollOutcome::TransportError(_) => {
                self.state = PollState::Polling { cycle };
                NextAction::Schedule(self.request.backoff)
            }
            PollOutcome::Pending(_) => {
                self.state = PollState::Polling { cycle: cycle + 1 };
                NextAction::Schedule(self.request.interval)
            }
            PollOutcome::Success(_) => {
                self.state = PollState::Done;
                NextAction::Complete
            }
        }
    }
}

/// Coercive (`==`) equality between a possibly missing JSON value and a target.
///
/// A missing field only equals `null`. Arrays and objects never equal each other but
/// are compared with scalars through their string form.
pub fn loose_eq(field: Option<&Value>, expected: &Value) -> bool {
    let Some(field) = field else {
        return expected.is_null();
    };

    match (field, expected) {
        (Value::Null, other) | (other, Value::Null) => other.is_null(),
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Bool(a), other) | (other, Value::Bool(a)) => {
            loose_eq(Some(other), &Value::from(u8::from(*a)))
        }
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            n.as_f64() == Some(to_number(s))
        }
        (
            Value::Array(_) | Value::Object(_),
            Value::Array(_) | Value::Object(_),
        ) => false,
        (composite @ (Value::Array(_) | Value::Object(_)), scalar)
        | (scalar, composite @ (Value::Array(_) | Value::Object(_))) => {
            loose_eq(Some(scalar), &Value::String(to_primitive(composite)))
        }
    }
}

/// Numeric reading of a string, `NaN` when it is not a number.
pub fn to_number(text: &str) -> f64 {
    let text = text.trim();

    if text.is_empty() {
        return 0.0;
    }

    match text {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = text.strip_prefix(prefix) {
            return u64::from_str_radix(digits, radix).map_or(f64::NAN, |n| n as f64);
        }
    }

    if !text
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return f64::NAN;
    }

    text.parse().unwrap_or(f64::NAN)
}

fn to_primitive(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(to_primitive)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Progress percentage carried by a status field, if it holds a number.
pub fn progress_value(field: Option<&Value>) -> Option<f64> {
    let value = match field? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => to_number(s),
        _ => return None,
    };

    value.is_finite().then_some(value)
}
