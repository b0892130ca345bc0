//! Names of the built-in intents every skill is expected to handle.

/// The user wants to cancel the current action.
pub const CANCEL: &str = "AMAZON.CancelIntent";

/// The utterance matched no other intent.
pub const FALLBACK: &str = "AMAZON.FallbackIntent";

/// The user asked for help.
pub const HELP: &str = "AMAZON.HelpIntent";

/// The user wants to leave the skill and go home.
pub const NAVIGATE_HOME: &str = "AMAZON.NavigateHomeIntent";

/// The user wants to stop.
pub const STOP: &str = "AMAZON.StopIntent";
