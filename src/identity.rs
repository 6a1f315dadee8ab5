//! Resolving OAuth access tokens to user profiles.

use std::ops::Deref;
use std::sync::Arc;

use reqwest::Client;
use rocket::http::Status;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::user::Profile;

pub const DEFAULT_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

/// Something that can tell us who owns an access token.
#[rocket::async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve(&self, access_token: &str) -> Result<Profile>;
}

/// The identity provider in use, held in managed state.
#[derive(Clone)]
pub struct Identity(Arc<dyn IdentityProvider>);

impl Identity {
    pub fn new(provider: impl IdentityProvider + 'static) -> Self {
        Self(Arc::new(provider))
    }
}

impl Deref for Identity {
    type Target = dyn IdentityProvider;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

/// Raw profile fields before the display name is validated.
#[derive(Debug, Deserialize)]
struct UserInfo {
    #[serde(default)]
    name: Option<String>,
    email: String,
}

impl UserInfo {
    /// Fall back to the email when the account has no display name.
    fn into_profile(self) -> Result<Profile> {
        let name = self
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| self.email.clone());
        Ok(Profile {
            name: name.parse()?,
            email: self.email,
        })
    }
}

/// Google's OpenID userinfo endpoint.
pub struct GoogleIdentity {
    client: Client,
    userinfo_url: String,
}

impl GoogleIdentity {
    pub fn new(client: Client, userinfo_url: String) -> Self {
        Self {
            client,
            userinfo_url,
        }
    }
}

#[rocket::async_trait]
impl IdentityProvider for GoogleIdentity {
    async fn resolve(&self, access_token: &str) -> Result<Profile> {
        let response = self
            .client
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::unauthorized(format!(
                "identity provider rejected access token ({})",
                response.status()
            )));
        }
        let info: UserInfo = response.json().await?;
        if info.email.is_empty() {
            return Err(Error::Status(
                Status::Forbidden,
                "Account has no email address".to_string(),
            ));
        }
        info.into_profile()
    }
}

/// Fixed tokens for tests: `alice-token`, `bob-token`, and `comma-token`
/// whose owner has a comma in their name.
#[cfg(test)]
pub struct StaticIdentity;

#[cfg(test)]
#[rocket::async_trait]
impl IdentityProvider for StaticIdentity {
    async fn resolve(&self, access_token: &str) -> Result<Profile> {
        let (name, email) = match access_token {
            "alice-token" => ("Alice", "alice@example.com"),
            "bob-token" => ("Bob", "bob@example.com"),
            "comma-token" => ("Smith, John", "john@example.com"),
            _ => return Err(Error::unauthorized("unknown access token")),
        };
        UserInfo {
            name: Some(name.to_string()),
            email: email.to_string(),
        }
        .into_profile()
    }
}
