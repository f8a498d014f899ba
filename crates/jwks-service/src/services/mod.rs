pub mod key_management_service;
pub mod token_service;

pub use token_service::{IssuedToken, TokenIssuer};
