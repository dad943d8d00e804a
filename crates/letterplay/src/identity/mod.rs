pub mod resolver;
pub mod source;

pub use resolver::IdentityResolver;
pub use source::{Identity, IdentitySource, ProfileFlag, Timer};
