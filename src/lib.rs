#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

use crate::config::{ConfigFairing, ServicesFairing};
use crate::identity::Identity;
use crate::logging::LoggerFairing;
use crate::model::metadata::PageFetcher;
use crate::sheets::Sheets;

pub mod api;
pub mod board;
pub mod config;
pub mod error;
pub mod identity;
pub mod logging;
pub mod model;
pub mod sheets;

pub use config::Config;

/// The server, with its services built from config on ignition.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .attach(ConfigFairing)
        .attach(ServicesFairing)
        .attach(LoggerFairing)
}

/// The server over already-built services.
pub fn rocket_for_services(sheets: Sheets, identity: Identity, fetcher: PageFetcher) -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .attach(ConfigFairing)
        .attach(LoggerFairing)
        .manage(sheets)
        .manage(identity)
        .manage(fetcher)
}
