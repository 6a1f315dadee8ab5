use serde::{Deserialize, Serialize};

/// A sign-in request carrying an OAuth access token obtained by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    pub access_token: String,
}

#[cfg(test)]
mod examples {
    use super::*;

    impl SignInRequest {
        /// Signs in as `Profile::example()`.
        pub fn example() -> Self {
            Self {
                access_token: "alice-token".to_string(),
            }
        }

        /// Signs in as `Profile::example2()`.
        pub fn example2() -> Self {
            Self {
                access_token: "bob-token".to_string(),
            }
        }
    }
}
