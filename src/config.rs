use std::env;
use std::time::Duration;

use url::Url;

use crate::error::{EnvVarError, Error};

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Base URLs of the upstream sites, without a trailing slash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    pub codechef: String,
    pub codeforces: String,
    pub leetcode: String,
    pub spoj: String,
    pub atcoder: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            codechef: "https://www.codechef.com".into(),
            codeforces: "https://codeforces.com".into(),
            leetcode: "https://leetcode.com".into(),
            spoj: "https://www.spoj.com".into(),
            atcoder: "https://atcoder.jp".into(),
        }
    }
}

impl Endpoints {
    /// Every platform served from one host, used to point adapters at a mock server.
    #[cfg(test)]
    pub fn all_at(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        Self {
            codechef: base_url.into(),
            codeforces: base_url.into(),
            leetcode: base_url.into(),
            spoj: base_url.into(),
            atcoder: base_url.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub timeout: Duration,
    pub user_agent: String,
    pub endpoints: Endpoints,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: concat!("cp-profiles/", env!("CARGO_PKG_VERSION")).into(),
            endpoints: Endpoints::default(),
        }
    }
}

impl Config {
    // reads the process environment, call dotenv first to pick up a .env file
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Self::default();

        if let Some(secs) = optional_var("PROFILES_TIMEOUT_SECS")? {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|e| Error::config("PROFILES_TIMEOUT_SECS", e))?;
            if secs == 0 {
                return Err(Error::config("PROFILES_TIMEOUT_SECS", "must be positive"));
            }
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(user_agent) = optional_var("PROFILES_USER_AGENT")? {
            config.user_agent = user_agent;
        }

        let endpoints = &mut config.endpoints;
        for (var, slot) in [
            ("CODECHEF_URL", &mut endpoints.codechef),
            ("CODEFORCES_URL", &mut endpoints.codeforces),
            ("LEETCODE_URL", &mut endpoints.leetcode),
            ("SPOJ_URL", &mut endpoints.spoj),
            ("ATCODER_URL", &mut endpoints.atcoder),
        ] {
            if let Some(url) = optional_var(var)? {
                Url::parse(&url).map_err(|e| Error::config(var, e))?;
                *slot = url.trim_end_matches('/').to_string();
            }
        }

        Ok(config)
    }
}

fn optional_var(var: &str) -> Result<Option<String>, Error> {
    match env::var(var) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(EnvVarError::new(var, e).into()),
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::{Config, Endpoints};

    // env vars are process global, so every case lives in one test
    #[test]
    fn test_from_env() {
        std::env::remove_var("PROFILES_TIMEOUT_SECS");
        std::env::remove_var("PROFILES_USER_AGENT");
        std::env::remove_var("SPOJ_URL");
        assert_eq!(Config::from_env().unwrap(), Config::default());

        std::env::set_var("PROFILES_TIMEOUT_SECS", "3");
        std::env::set_var("SPOJ_URL", "http://127.0.0.1:9000/");
        let config = Config::from_env().unwrap();
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.endpoints.spoj, "http://127.0.0.1:9000");
        assert_eq!(config.endpoints.atcoder, "https://atcoder.jp");

        std::env::set_var("PROFILES_TIMEOUT_SECS", "soon");
        assert!(Config::from_env().is_err());
        std::env::set_var("PROFILES_TIMEOUT_SECS", "0");
        assert!(Config::from_env().is_err());
        std::env::remove_var("PROFILES_TIMEOUT_SECS");

        std::env::set_var("SPOJ_URL", "spoj.com/users");
        assert!(Config::from_env().is_err());

        std::env::remove_var("PROFILES_TIMEOUT_SECS");
        std::env::remove_var("SPOJ_URL");
    }

    #[test]
    fn test_all_at_strips_trailing_slash() {
        let endpoints = Endpoints::all_at("http://localhost:1234/");
        assert_eq!(endpoints.leetcode, "http://localhost:1234");
        assert_eq!(endpoints.codechef, endpoints.codeforces);
    }
}
