pub mod manager;
pub mod state;

pub use manager::{SessionError, SessionManager, Subscription};
pub use state::{
    Notification, NotificationLevel, Profile, ProfileUpdate, Role, Session, SessionEvent,
    SessionManagerConfig, User,
};
