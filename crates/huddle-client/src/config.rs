//! Client configuration loaded from environment variables.
//!
//! Every setting has a default so the index works with zero configuration.

use huddle_shared::constants::{
    DEFAULT_COMMAND_BUFFER, DEFAULT_EMPTY_PREVIEW_LABEL, DEFAULT_FETCH_CONCURRENCY,
    DEFAULT_IMAGE_PREVIEW_LABEL, DEFAULT_UNREAD_BADGE_CAP,
};

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Maximum history fetches in flight during a roster load (0 = unlimited).
    /// Env: `HUDDLE_FETCH_CONCURRENCY`
    /// Default: `8`
    pub fetch_concurrency: usize,

    /// Unread counts above this render as `"{cap}+"`.
    /// Env: `HUDDLE_UNREAD_BADGE_CAP`
    /// Default: `99`
    pub unread_badge_cap: usize,

    /// Preview text for a last message that only has an image.
    /// Env: `HUDDLE_IMAGE_PREVIEW_LABEL`
    /// Default: `"Photo"`
    pub image_preview_label: String,

    /// Preview text for a conversation without history.
    /// Env: `HUDDLE_EMPTY_PREVIEW_LABEL`
    /// Default: `"No messages yet"`
    pub empty_preview_label: String,

    /// Capacity of the runtime command queue.
    /// Env: `HUDDLE_COMMAND_BUFFER`
    /// Default: `256`
    pub command_buffer: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
            unread_badge_cap: DEFAULT_UNREAD_BADGE_CAP,
            image_preview_label: DEFAULT_IMAGE_PREVIEW_LABEL.to_string(),
            empty_preview_label: DEFAULT_EMPTY_PREVIEW_LABEL.to_string(),
            command_buffer: DEFAULT_COMMAND_BUFFER,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(val) = lookup("HUDDLE_FETCH_CONCURRENCY") {
            match val.trim().parse::<usize>() {
                Ok(n) => config.fetch_concurrency = n,
                Err(_) => tracing::warn!(
                    value = %val,
                    "Invalid HUDDLE_FETCH_CONCURRENCY, using default"
                ),
            }
        }

        if let Some(val) = lookup("HUDDLE_UNREAD_BADGE_CAP") {
            match val.trim().parse::<usize>() {
                Ok(n) if n > 0 => config.unread_badge_cap = n,
                _ => tracing::warn!(
                    value = %val,
                    "Invalid HUDDLE_UNREAD_BADGE_CAP, using default"
                ),
            }
        }

        if let Some(label) = lookup("HUDDLE_IMAGE_PREVIEW_LABEL") {
            if !label.is_empty() {
                config.image_preview_label = label;
            }
        }

        if let Some(label) = lookup("HUDDLE_EMPTY_PREVIEW_LABEL") {
            config.empty_preview_label = label;
        }

        if let Some(val) = lookup("HUDDLE_COMMAND_BUFFER") {
            match val.trim().parse::<usize>() {
                Ok(n) if n > 0 => config.command_buffer = n,
                _ => tracing::warn!(
                    value = %val,
                    "Invalid HUDDLE_COMMAND_BUFFER, using default"
                ),
            }
        }

        // RUST_LOG is read by tracing-subscriber's EnvFilter directly.

        config
    }
}
