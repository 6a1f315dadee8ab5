use rocket::Route;

pub(crate) mod auth;
mod ideas;
mod metadata;
mod trips;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(auth::routes());
    routes.extend(trips::routes());
    routes.extend(ideas::routes());
    routes.extend(metadata::routes());
    routes
}
