use chrono::{serde::ts_seconds, DateTime, Utc};
use jsonwebtoken::{
    errors::Error as JwtError, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use rocket::{
    http::{Cookie, SameSite, Status},
    request::{self, FromRequest},
    time, Request, State,
};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Error;
use crate::model::user::Profile;
use crate::sheets::Credentials;

pub const AUTH_TOKEN_COOKIE: &str = "auth_token";

/// An authentication token for a signed-in user.
///
/// Carries the provider's access token so that sheet calls are made as the
/// user, which is why it only ever travels in a private (encrypted) cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    #[serde(flatten)]
    pub profile: Profile,
    #[serde(rename = "tok")]
    access_token: String,
}

impl AuthToken {
    pub fn new(profile: Profile, access_token: String) -> Self {
        Self {
            profile,
            access_token,
        }
    }

    /// Credentials for calling the spreadsheet service as this user.
    pub fn credentials(&self) -> Credentials {
        Credentials {
            access_token: self.access_token.clone(),
            email: self.profile.email.clone(),
        }
    }

    /// Serialize this token into a cookie, to be added as a private cookie.
    pub fn into_cookie(self, config: &Config) -> Result<Cookie<'static>, JwtError> {
        let claims = Claims {
            token: self,
            expire_at: Utc::now() + config.auth_ttl(),
        };

        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret()),
        )?;

        Ok(Cookie::build(AUTH_TOKEN_COOKIE, token)
            .max_age(time::Duration::seconds(config.auth_ttl().num_seconds()))
            .same_site(SameSite::Strict)
            .http_only(true)
            .finish())
    }

    /// Deserialize a token from a (decrypted) cookie.
    pub fn from_cookie(cookie: &Cookie<'static>, config: &Config) -> Result<Self, JwtError> {
        jsonwebtoken::decode(
            cookie.value(),
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )
        .map(|claims: TokenData<Claims>| claims.claims.token)
    }
}

/// Cookie claims: the token itself plus an expiry datetime.
#[derive(Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    token: AuthToken,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthToken {
    type Error = Error;

    /// Get the AuthToken from the private cookie. Missing, tampered or
    /// expired cookies all fail with 401.
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let config = req.guard::<&State<Config>>().await.unwrap(); // Valid as `Config` is always managed

        let Some(cookie) = req.cookies().get_private(AUTH_TOKEN_COOKIE) else {
            return request::Outcome::Failure((
                Status::Unauthorized,
                Error::unauthorized("not signed in"),
            ));
        };
        match Self::from_cookie(&cookie, config) {
            Ok(token) => request::Outcome::Success(token),
            Err(err) => {
                warn!("Rejected auth cookie: {err}");
                request::Outcome::Failure((Status::Unauthorized, err.into()))
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_round_trip() {
        let config = Config::example();
        let cookie = AuthToken::example().into_cookie(&config).unwrap();
        assert_eq!(cookie.name(), AUTH_TOKEN_COOKIE);
        assert_eq!(
            AuthToken::from_cookie(&cookie, &config).unwrap(),
            AuthToken::example()
        );
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let cookie = AuthToken::example()
            .into_cookie(&Config::example())
            .unwrap();
        let other = Config::example_with_secret("a different secret");
        assert!(AuthToken::from_cookie(&cookie, &other).is_err());
    }

    #[test]
    fn credentials_act_as_user() {
        let credentials = AuthToken::example().credentials();
        assert_eq!(credentials.access_token, "alice-token");
        assert_eq!(credentials.email, "alice@example.com");
    }
}
