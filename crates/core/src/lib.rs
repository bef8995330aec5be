pub mod card;
pub mod config;
pub mod error;
pub mod models;
pub mod status;
pub mod util;

pub use card::{Fact, MessageCard, Notification, compose};
pub use error::{NotifyError, Result};
