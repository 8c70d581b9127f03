//! Per-call options for binding and writing.
//!
//! Both option types deserialize with every field optional, so hosts can keep
//! them in their own configuration files.

use serde::{Deserialize, Serialize};

/// Options for [`Bindings::bind_to_with`](super::Bindings::bind_to_with).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindOptions {
    /// Field on the target to bind to. Defaults to the observer's field name.
    pub target_key: Option<String>,

    /// Skip the hook of the field being bound.
    ///
    /// Other members attached by a merge are still notified when the bind
    /// changes their value.
    pub suppress_notify: bool,
}

impl BindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target_key(mut self, key: impl Into<String>) -> Self {
        self.target_key = Some(key.into());
        self
    }

    pub fn suppress_notify(mut self, suppress: bool) -> Self {
        self.suppress_notify = suppress;
        self
    }
}

/// Options for [`Bindings::set_with`](super::Bindings::set_with).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetOptions {
    /// Fire hooks even if the new value equals the current one. Only bound
    /// fields honour it.
    pub force_callback: bool,
}

impl SetOptions {
    /// Options that always fire hooks.
    pub fn forced() -> Self {
        Self {
            force_callback: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let options = BindOptions::new().target_key("bar").suppress_notify(true);
        assert_eq!(options.target_key.as_deref(), Some("bar"));
        assert!(options.suppress_notify);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let options: BindOptions = serde_json::from_str(r#"{"suppress_notify": true}"#).unwrap();
        assert_eq!(options.target_key, None);
        assert!(options.suppress_notify);

        let options: SetOptions = serde_json::from_str("{}").unwrap();
        assert!(!options.force_callback);
        assert!(SetOptions::forced().force_callback);
    }
}
