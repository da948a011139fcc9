//! Database models split into domain-specific modules.

pub mod article;
pub mod experience;
pub mod message;
pub mod portfolio;
pub mod profile;
pub mod project;
pub mod skill;
pub mod social;
pub mod user;

pub use article::*;
pub use experience::*;
pub use message::*;
pub use portfolio::*;
pub use profile::*;
pub use project::*;
pub use skill::*;
pub use social::*;
pub use user::*;
