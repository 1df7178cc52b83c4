//! Shared building blocks for the Movi workspace: the error taxonomy,
//! identifiers, in-app notifications and the event bus.

pub mod errors;
pub mod events;
pub mod id;
pub mod notifications;

pub use errors::{ConfigError, MoviError, PlatformError};
pub use events::{Event, EventBus};
pub use id::{new_correlation_id, SessionId};
pub use notifications::{Notification, NotificationLevel, NotificationQueue};

pub type Result<T> = std::result::Result<T, MoviError>;
