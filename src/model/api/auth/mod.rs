mod request;
mod token;

pub use request::SignInRequest;
pub use token::{AuthToken, AUTH_TOKEN_COOKIE};
