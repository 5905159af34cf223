// Authentication building blocks
// Password hashing, access tokens and the authorization gate

pub mod gate;
pub mod jwt;
pub mod password;
