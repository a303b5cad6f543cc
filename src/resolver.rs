use crate::api_client::HttpClient;
use crate::client::Client;
use crate::config::{Config, Endpoints};
use crate::error::Error;
use crate::extract::Outcome;
use crate::platforms;
use crate::types::{PlatformKind, ProfileResult};

/// Entry point: picks the adapter for a platform key and maps its outcome to an error kind.
///
/// Holds no per-call state, so one resolver can serve concurrent lookups.
pub struct ProfileResolver {
    client: Box<dyn Client>,
    endpoints: Endpoints,
}

impl ProfileResolver {
    pub fn new(client: impl Client + 'static, endpoints: Endpoints) -> Self {
        Self {
            client: Box::new(client),
            endpoints,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        Ok(Self::new(HttpClient::new(config)?, config.endpoints.clone()))
    }

    pub async fn resolve(&self, platform: &str, username: &str) -> Result<ProfileResult, Error> {
        let kind: PlatformKind = platform.parse()?;
        log::info!("resolving {username} on {kind}");

        let adapter = platforms::adapter(kind, &self.endpoints);
        match adapter.lookup(self.client.as_ref(), username).await? {
            Outcome::Found(profile) => Ok(profile),
            Outcome::NotFound => {
                log::info!("{username} not found on {kind}");
                Err(Error::Username)
            }
            Outcome::SchemaDrift(detail) => {
                log::warn!("{kind} markup changed while reading {username}: {detail}");
                Err(Error::BrokenChanges(detail))
            }
        }
    }
}
