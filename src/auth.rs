//! Auth-domain identifiers, scope sets, and secret handling.

pub mod id;
pub mod scope;
pub mod secret;

pub use id::*;
pub use scope::*;
pub use secret::*;
