use std::time::Duration as StdDuration;

use chrono::Duration;
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::identity::{GoogleIdentity, Identity, DEFAULT_USERINFO_URL};
use crate::model::{metadata::PageFetcher, survey::VotePolicy};
use crate::sheets::{
    GoogleSheets, InMemorySheets, Sheets, DEFAULT_DRIVE_API_URL, DEFAULT_SHEETS_API_URL,
};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
pub struct Config {
    // non-secrets
    auth_ttl: u32,
    #[serde(default)]
    vote_policy: VotePolicy,
    #[serde(default = "default_metadata_timeout")]
    metadata_timeout: u64,
    // secrets
    jwt_secret: String,
}

fn default_metadata_timeout() -> u64 {
    5
}

impl Config {
    /// Valid lifetime of auth token cookies in seconds.
    pub fn auth_ttl(&self) -> Duration {
        Duration::seconds(self.auth_ttl.into())
    }

    /// How votes on the same question interact.
    pub fn vote_policy(&self) -> VotePolicy {
        self.vote_policy
    }

    /// How long to wait for a page when fetching link metadata.
    pub fn metadata_timeout(&self) -> StdDuration {
        StdDuration::from_secs(self.metadata_timeout)
    }

    /// Secret key used to encrypt JWTs.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }
}

/// A fairing that loads the application config and puts it in managed state.
/// This could easily be achieved using `AdHoc::config`, but is written out
/// explicitly for symmetry with the other fairings and control over error
/// messages.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        info!("Using vote policy {:?}", config.vote_policy());

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// Where trips are stored.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetsBackend {
    /// Google Sheets and Drive.
    #[default]
    Google,
    /// A process-local store that forgets everything on restart.
    Memory,
}

/// Configuration for the external services.
#[derive(Deserialize)]
struct ServicesConfig {
    #[serde(default)]
    sheets_backend: SheetsBackend,
    #[serde(default = "default_sheets_api_url")]
    sheets_api_url: String,
    #[serde(default = "default_drive_api_url")]
    drive_api_url: String,
    #[serde(default = "default_userinfo_url")]
    userinfo_url: String,
    #[serde(default = "default_http_timeout")]
    http_timeout: u64,
}

fn default_sheets_api_url() -> String {
    DEFAULT_SHEETS_API_URL.to_string()
}

fn default_drive_api_url() -> String {
    DEFAULT_DRIVE_API_URL.to_string()
}

fn default_userinfo_url() -> String {
    DEFAULT_USERINFO_URL.to_string()
}

fn default_http_timeout() -> u64 {
    10
}

/// A fairing that loads the service config and places the spreadsheet store,
/// identity provider and page fetcher into managed state.
///
/// Must be attached after [`ConfigFairing`].
pub struct ServicesFairing;

#[rocket::async_trait]
impl Fairing for ServicesFairing {
    fn info(&self) -> Info {
        Info {
            name: "Google APIs",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<ServicesConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load services config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        let Some(metadata_timeout) = rocket.state::<Config>().map(Config::metadata_timeout) else {
            error!("Application config must be loaded before services");
            return Err(rocket);
        };

        // Construct the clients.
        let client = match reqwest::Client::builder()
            .timeout(StdDuration::from_secs(config.http_timeout))
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to build HTTP client: {e}");
                return Err(rocket);
            }
        };
        let fetcher = match PageFetcher::new(metadata_timeout) {
            Ok(fetcher) => fetcher,
            Err(e) => {
                error!("Failed to build HTTP client: {e}");
                return Err(rocket);
            }
        };

        let sheets = match config.sheets_backend {
            SheetsBackend::Google => Sheets::new(GoogleSheets::new(
                client.clone(),
                config.sheets_api_url,
                config.drive_api_url,
            )),
            SheetsBackend::Memory => {
                warn!("Using in-memory sheets; trips will be lost on shutdown");
                Sheets::new(InMemorySheets::default())
            }
        };
        let identity = Identity::new(GoogleIdentity::new(client, config.userinfo_url));
        info!("Loaded services config ({:?} backend)", config.sheets_backend);

        // Manage the state.
        rocket = rocket.manage(sheets).manage(identity).manage(fetcher);
        Ok(rocket)
    }
}
