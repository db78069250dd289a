// Credential store and bearer-token sessions.

pub mod handlers;
pub mod password;
pub mod session;
pub mod tokens;
pub mod users;
