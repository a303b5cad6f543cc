pub mod atcoder;
pub mod codechef;
pub mod codeforces;
pub mod leetcode;
pub mod spoj;

use async_trait::async_trait;

use crate::client::Client;
use crate::config::Endpoints;
use crate::error::Error;
use crate::extract::Outcome;
use crate::types::{PlatformKind, ProfileResult};

/// Fetches one user's profile from a single site and normalizes it.
///
/// `Err` is reserved for a base URL the username cannot be joined onto.
#[async_trait]
pub trait Platform: Send + Sync {
    async fn lookup(
        &self,
        client: &dyn Client,
        username: &str,
    ) -> Result<Outcome<ProfileResult>, Error>;
}

pub fn adapter(kind: PlatformKind, endpoints: &Endpoints) -> Box<dyn Platform> {
    match kind {
        PlatformKind::CodeChef => Box::new(codechef::CodeChef::new(&endpoints.codechef)),
        PlatformKind::Codeforces => Box::new(codeforces::Codeforces::new(&endpoints.codeforces)),
        PlatformKind::LeetCode => Box::new(leetcode::LeetCode::new(&endpoints.leetcode)),
        PlatformKind::Spoj => Box::new(spoj::Spoj::new(&endpoints.spoj)),
        PlatformKind::AtCoder => Box::new(atcoder::AtCoder::new(&endpoints.atcoder)),
    }
}
