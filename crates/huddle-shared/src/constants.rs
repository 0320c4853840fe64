/// Application name
pub const APP_NAME: &str = "huddle";

/// Default number of history fetches in flight during a roster load
pub const DEFAULT_FETCH_CONCURRENCY: usize = 8;

/// Unread counts above this are shown as "99+"
pub const DEFAULT_UNREAD_BADGE_CAP: usize = 99;

/// Preview shown for a last message that carries only an image
pub const DEFAULT_IMAGE_PREVIEW_LABEL: &str = "Photo";

/// Preview shown for a conversation with no history
pub const DEFAULT_EMPTY_PREVIEW_LABEL: &str = "No messages yet";

/// Capacity of the index runtime's command queue
pub const DEFAULT_COMMAND_BUFFER: usize = 256;

/// Prefix of the file name offered when downloading a chat image
pub const IMAGE_DOWNLOAD_PREFIX: &str = "chat-image-";

/// Presence labels
pub const PRESENCE_ONLINE: &str = "Online";
pub const PRESENCE_OFFLINE: &str = "Offline";
