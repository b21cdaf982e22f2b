//! Configuration options for REDCap row generation.

use serde::{Deserialize, Serialize};

/// Event every lab row is attached to.
pub const DEFAULT_EVENT_NAME: &str = "hivpd23_visit_1_arm_1";

/// Repeating instrument that holds lab results.
pub const DEFAULT_REPEAT_INSTRUMENT: &str = "labs";

/// Constant identity fields stamped on every output row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedcapOptions {
    /// Value of `redcap_event_name`.
    pub event_name: String,
    /// Value of `redcap_repeat_instrument`.
    pub repeat_instrument: String,
    /// Value of `redcap_repeat_instance`.
    pub repeat_instance: i64,
    /// Value of `lr_missing`. Rows produced from lab data always carry 0.
    pub labs_missing: i64,
}

impl Default for RedcapOptions {
    fn default() -> Self {
        Self {
            event_name: DEFAULT_EVENT_NAME.to_string(),
            repeat_instrument: DEFAULT_REPEAT_INSTRUMENT.to_string(),
            repeat_instance: 1,
            labs_missing: 0,
        }
    }
}

impl RedcapOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_event_name(mut self, event_name: impl Into<String>) -> Self {
        self.event_name = event_name.into();
        self
    }

    #[must_use]
    pub fn with_repeat_instrument(mut self, instrument: impl Into<String>) -> Self {
        self.repeat_instrument = instrument.into();
        self
    }
}
