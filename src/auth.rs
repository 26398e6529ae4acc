//! Auth-domain models: ordered scopes, token sets, identity-token claims, and derived users.

pub mod claims;
pub mod identity;
pub mod scope;
pub mod token;

pub use claims::*;
pub use identity::*;
pub use scope::*;
pub use token::*;
