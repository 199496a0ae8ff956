//! Runtime error policy for buses.

use log::debug;

use crate::{error::BusError, message::MessageType};

/// Controls how a bus reports misuse.
///
/// | `strict_errors` | `require_listener` | Unsubscribe misuse | Dispatch without listeners |
/// |-----------------|--------------------|--------------------|----------------------------|
/// | on              | on                 | error              | error                      |
/// | on              | off                | error              | no-op                      |
/// | off             | any                | no-op              | no-op                      |
///
/// The lenient policy hides mistakes such as unsubscribing a receiver twice or
/// dispatching before anyone subscribed. That trades diagnostics for resilience, so the
/// default is fully strict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Report unknown message types and unknown receivers on unsubscribe, and (together
    /// with `require_listener`) dispatches nobody listens to.
    pub strict_errors: bool,

    /// Report dispatches to a message type without subscribers. Only meaningful when
    /// `strict_errors` is on.
    pub require_listener: bool,
}

impl Config {
    /// Report every kind of misuse.
    #[inline]
    pub const fn strict() -> Self {
        Self {
            strict_errors: true,
            require_listener: true,
        }
    }

    /// Silently ignore every kind of misuse.
    #[inline]
    pub const fn lenient() -> Self {
        Self {
            strict_errors: false,
            require_listener: false,
        }
    }

    /// Set whether misuse is reported at all.
    #[inline]
    pub const fn with_strict_errors(mut self, strict_errors: bool) -> Self {
        self.strict_errors = strict_errors;
        self
    }

    /// Set whether dispatching to a message type without subscribers is reported.
    #[inline]
    pub const fn with_require_listener(mut self, require_listener: bool) -> Self {
        self.require_listener = require_listener;
        self
    }

    /// Whether unsubscribe misuse is an error.
    #[inline]
    pub const fn reports_unsubscribe_misuse(&self) -> bool {
        self.strict_errors
    }

    /// Whether dispatching a message without subscribers is an error.
    #[inline]
    pub const fn reports_missing_listener(&self) -> bool {
        self.strict_errors && self.require_listener
    }

    /// Apply the unsubscribe policy to a misuse error.
    pub(crate) fn unsubscribe_misuse(&self, error: BusError) -> Result<(), BusError> {
        if self.reports_unsubscribe_misuse() {
            return Err(error);
        }
        debug!("ignoring: {error}");
        Ok(())
    }

    /// Apply the dispatch policy to a message type without subscribers.
    pub(crate) fn missing_listener(&self, message_type: MessageType) -> Result<usize, BusError> {
        let error = BusError::NoListenerForType { message_type };
        if self.reports_missing_listener() {
            return Err(error);
        }
        debug!("ignoring: {error}");
        Ok(0)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::strict()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_strict() {
        // Given
        let config = Config::default();

        // Then
        assert_eq!(config, Config::strict());
        assert!(config.reports_unsubscribe_misuse());
        assert!(config.reports_missing_listener());
    }

    #[test]
    fn lenient_reports_nothing() {
        // Given
        let config = Config::lenient();

        // Then
        assert!(!config.reports_unsubscribe_misuse());
        assert!(!config.reports_missing_listener());
    }

    #[test]
    fn require_listener_needs_strict_errors() {
        // Given
        let config = Config::lenient().with_require_listener(true);

        // Then
        assert!(!config.reports_unsubscribe_misuse());
        assert!(!config.reports_missing_listener());
    }

    #[test]
    fn strict_without_require_listener_allows_silent_dispatch() {
        // Given
        let config = Config::strict().with_require_listener(false);

        // Then
        assert!(config.reports_unsubscribe_misuse());
        assert!(!config.reports_missing_listener());
    }

    #[test]
    fn setters_toggle_flags() {
        // Given
        let config = Config::lenient()
            .with_strict_errors(true)
            .with_require_listener(true);

        // Then
        assert_eq!(config, Config::strict());
    }

    #[derive(crate::Message)]
    struct Unheard;

    #[test]
    fn strict_reports_missing_listener() {
        // Given
        let config = Config::strict();

        // When
        let result = config.missing_listener(MessageType::of::<Unheard>());

        // Then
        assert!(matches!(result, Err(BusError::NoListenerForType { .. })));
    }

    #[test]
    fn lenient_ignores_unsubscribe_misuse() {
        // Given
        let config = Config::lenient();
        let error = BusError::UnknownMessageType {
            message_type: MessageType::of::<Unheard>(),
        };

        // When
        let result = config.unsubscribe_misuse(error);

        // Then
        assert!(result.is_ok());
        assert_eq!(config.missing_listener(MessageType::of::<Unheard>()).unwrap(), 0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_with_defaults_for_missing_fields() {
        // Given
        let json = r#"{ "require_listener": false }"#;

        // When
        let config: Config = serde_json::from_str(json).unwrap();

        // Then
        assert!(config.strict_errors);
        assert!(!config.require_listener);
    }
}
