use rocket::{
    http::{Cookie, CookieJar, Status},
    serde::json::Json,
    Route, State,
};

use crate::{
    error::Result,
    identity::Identity,
    model::{
        api::auth::{AuthToken, SignInRequest, AUTH_TOKEN_COOKIE},
        user::Profile,
    },
    Config,
};

pub fn routes() -> Vec<Route> {
    routes![sign_in, profile, sign_out]
}

#[post("/auth", data = "<request>", format = "json")]
pub async fn sign_in(
    request: Json<SignInRequest>,
    cookies: &CookieJar<'_>,
    identity: &State<Identity>,
    config: &State<Config>,
) -> Result<Json<Profile>> {
    let profile = identity.resolve(&request.access_token).await?;

    let token = AuthToken::new(profile.clone(), request.0.access_token);
    cookies.add_private(token.into_cookie(config)?);
    info!("{} signed in", profile.email);

    Ok(Json(profile))
}

#[get("/auth")]
pub fn profile(token: AuthToken) -> Json<Profile> {
    Json(token.profile)
}

#[delete("/auth")]
pub fn sign_out(cookies: &CookieJar) -> Status {
    cookies.remove_private(Cookie::named(AUTH_TOKEN_COOKIE));
    Status::Ok
}
