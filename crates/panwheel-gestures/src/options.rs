//! Engine configuration.
//!
//! [`WheelGesturesConfig`] is the effective, complete configuration. Updates
//! arrive as [`WheelGesturesOptions`], where every field may be left out,
//! set, or explicitly null. A null field rejects the whole update.

use crate::event::Axis;
use panwheel_core::{BooleanXYZ, VectorXYZ};
use std::fmt;

/// When the engine calls `prevent_default` on incoming events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PreventWheelAction {
    /// Always (`true`) or never (`false`).
    Enabled(bool),
    /// Only when this axis carries the event's largest delta.
    Axis(Axis),
    /// A token that is not understood. Never suppresses; logs a warning per event.
    Unsupported(String),
}

impl From<bool> for PreventWheelAction {
    fn from(value: bool) -> Self {
        PreventWheelAction::Enabled(value)
    }
}

impl From<Axis> for PreventWheelAction {
    fn from(axis: Axis) -> Self {
        PreventWheelAction::Axis(axis)
    }
}

impl From<&str> for PreventWheelAction {
    fn from(token: &str) -> Self {
        match token {
            "true" => PreventWheelAction::Enabled(true),
            "false" => PreventWheelAction::Enabled(false),
            "x" => PreventWheelAction::Axis(Axis::X),
            "y" => PreventWheelAction::Axis(Axis::Y),
            "z" => PreventWheelAction::Axis(Axis::Z),
            other => PreventWheelAction::Unsupported(other.to_owned()),
        }
    }
}

impl fmt::Display for PreventWheelAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreventWheelAction::Enabled(value) => write!(f, "{value}"),
            PreventWheelAction::Axis(Axis::X) => f.write_str("x"),
            PreventWheelAction::Axis(Axis::Y) => f.write_str("y"),
            PreventWheelAction::Axis(Axis::Z) => f.write_str("z"),
            PreventWheelAction::Unsupported(token) => f.write_str(token),
        }
    }
}

/// Which axes get their sign flipped during normalization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReverseSign {
    All(bool),
    PerAxis(BooleanXYZ),
}

impl ReverseSign {
    /// Per-axis multipliers, or `None` when nothing is reversed.
    pub fn multipliers(&self) -> Option<VectorXYZ> {
        match *self {
            ReverseSign::All(false) => None,
            ReverseSign::All(true) => Some([-1.0; 3]),
            ReverseSign::PerAxis(flags) => {
                Some(flags.map(|reverse| if reverse { -1.0 } else { 1.0 }))
            }
        }
    }
}

impl From<bool> for ReverseSign {
    fn from(value: bool) -> Self {
        ReverseSign::All(value)
    }
}

impl From<BooleanXYZ> for ReverseSign {
    fn from(flags: BooleanXYZ) -> Self {
        ReverseSign::PerAxis(flags)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WheelGesturesConfig {
    pub prevent_wheel_action: PreventWheelAction,
    pub reverse_sign: ReverseSign,
}

/// Template every engine starts from. Engines copy it; nothing mutates it.
pub const CONFIG_DEFAULTS: WheelGesturesConfig = WheelGesturesConfig {
    prevent_wheel_action: PreventWheelAction::Enabled(true),
    reverse_sign: ReverseSign::PerAxis([true, true, false]),
};

impl Default for WheelGesturesConfig {
    fn default() -> Self {
        CONFIG_DEFAULTS
    }
}

impl Default for PreventWheelAction {
    fn default() -> Self {
        CONFIG_DEFAULTS.prevent_wheel_action
    }
}

impl Default for ReverseSign {
    fn default() -> Self {
        CONFIG_DEFAULTS.reverse_sign
    }
}

/// One field of an options update.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Setting<T> {
    /// Keep the current value.
    #[default]
    Unspecified,
    /// Explicitly null. Makes the whole update invalid.
    Null,
    Value(T),
}

impl<T> Setting<T> {
    pub fn is_null(&self) -> bool {
        matches!(self, Setting::Null)
    }

    fn resolve(&self, current: &T) -> T
    where
        T: Clone,
    {
        match self {
            Setting::Value(value) => value.clone(),
            Setting::Unspecified | Setting::Null => current.clone(),
        }
    }
}

impl<T> From<Option<T>> for Setting<T> {
    /// `None` maps to [`Setting::Null`]: an option that is present but empty.
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Setting::Value(value),
            None => Setting::Null,
        }
    }
}

/// Partial configuration passed to [`crate::WheelGestures::update_options`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WheelGesturesOptions {
    pub prevent_wheel_action: Setting<PreventWheelAction>,
    pub reverse_sign: Setting<ReverseSign>,
}

impl WheelGesturesOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prevent_wheel_action(mut self, value: impl Into<PreventWheelAction>) -> Self {
        self.prevent_wheel_action = Setting::Value(value.into());
        self
    }

    pub fn reverse_sign(mut self, value: impl Into<ReverseSign>) -> Self {
        self.reverse_sign = Setting::Value(value.into());
        self
    }

    /// Checks the update and merges it over `current`.
    pub fn apply_to(
        &self,
        current: &WheelGesturesConfig,
    ) -> Result<WheelGesturesConfig, OptionsError> {
        if self.prevent_wheel_action.is_null() {
            return Err(OptionsError::NullOption {
                option: "preventWheelAction",
            });
        }
        if self.reverse_sign.is_null() {
            return Err(OptionsError::NullOption {
                option: "reverseSign",
            });
        }
        Ok(WheelGesturesConfig {
            prevent_wheel_action: self
                .prevent_wheel_action
                .resolve(&current.prevent_wheel_action),
            reverse_sign: self.reverse_sign.resolve(&current.reverse_sign),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    NullOption { option: &'static str },
}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionsError::NullOption { option } => write!(
                f,
                "updateOptions ignored! undefined & null options not allowed ({option})"
            ),
        }
    }
}

impl std::error::Error for OptionsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_template() {
        let config = WheelGesturesConfig::default();
        let prevent = config.prevent_wheel_action.clone();
        assert_eq!(prevent, PreventWheelAction::Enabled(true));
        assert_eq!(
            config.reverse_sign,
            ReverseSign::PerAxis([true, true, false])
        );
        assert_eq!(PreventWheelAction::default(), prevent);
        assert_eq!(ReverseSign::default(), config.reverse_sign);
    }

    #[test]
    fn settings_default_to_unspecified() {
        let options = WheelGesturesOptions::default();
        assert_eq!(options.prevent_wheel_action, Setting::Unspecified);
        assert_eq!(options.reverse_sign, Setting::Unspecified);
        assert_eq!(options.apply_to(&CONFIG_DEFAULTS), Ok(CONFIG_DEFAULTS));
    }

    #[test]
    fn unspecified_fields_keep_current_values() {
        let current = WheelGesturesOptions::new()
            .prevent_wheel_action(Axis::X)
            .apply_to(&CONFIG_DEFAULTS)
            .unwrap();
        let next = WheelGesturesOptions::new()
            .reverse_sign(false)
            .apply_to(&current)
            .unwrap();

        assert_eq!(next.prevent_wheel_action, PreventWheelAction::Axis(Axis::X));
        assert_eq!(next.reverse_sign, ReverseSign::All(false));
    }

    #[test]
    fn null_field_rejects_update() {
        let options = WheelGesturesOptions {
            reverse_sign: Setting::Null,
            ..WheelGesturesOptions::new().prevent_wheel_action(false)
        };
        assert_eq!(
            options.apply_to(&CONFIG_DEFAULTS),
            Err(OptionsError::NullOption {
                option: "reverseSign"
            })
        );
    }

    #[test]
    fn tokens_parse_into_policies() {
        assert_eq!(
            PreventWheelAction::from("y"),
            PreventWheelAction::Axis(Axis::Y)
        );
        assert_eq!(
            PreventWheelAction::from("false"),
            PreventWheelAction::Enabled(false)
        );
        assert_eq!(
            PreventWheelAction::from("xyz"),
            PreventWheelAction::Unsupported("xyz".into())
        );
        assert_eq!(PreventWheelAction::from("xyz").to_string(), "xyz");
    }

    #[test]
    fn reverse_sign_multipliers() {
        assert_eq!(ReverseSign::All(false).multipliers(), None);
        assert_eq!(ReverseSign::All(true).multipliers(), Some([-1.0; 3]));
        assert_eq!(
            ReverseSign::PerAxis([true, false, true]).multipliers(),
            Some([-1.0, 1.0, -1.0])
        );
    }

    #[test]
    fn option_none_is_null() {
        let setting = Setting::from(None::<ReverseSign>);
        assert!(setting.is_null());
    }
}
