// draftscout: watches the local League client during champion select and
// opens analytics pages in the default browser at configured draft moments.

pub mod agent;
pub mod champions;
pub mod config;
pub mod dispatch;
pub mod draft;
pub mod error;
pub mod lcu;
pub mod observer;
pub mod trigger;

pub use agent::{Agent, AgentHandle};
pub use config::Config;
pub use error::{AgentError, Result};
