use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::{Error, JSONError};
use crate::resolver::ProfileResolver;
use crate::types::{FailureBody, PlatformKind, ProfileResult};

/// Look up competitive programming profiles across sites
#[derive(Parser, Debug)]
#[command(name = "cp-profiles", version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Fetch a profile and print it as JSON
    Lookup {
        /// One of: codechef, codeforces, leetcode, spoj, atcoder
        platform: String,
        username: String,

        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// List supported platform keys
    Platforms,
}

/// Response body for a lookup: the profile, or `{status: "Failed", details}`.
fn render(result: &Result<ProfileResult, Error>, pretty: bool) -> Result<String, Error> {
    let body = match result {
        Ok(profile) => serde_json::to_value(profile),
        Err(err) => serde_json::to_value(FailureBody::from(err)),
    }
    .map_err(|e| JSONError::new("response body", e))?;

    let rendered = if pretty {
        serde_json::to_string_pretty(&body)
    } else {
        serde_json::to_string(&body)
    };
    Ok(rendered.map_err(|e| JSONError::new("response body", e))?)
}

impl Cmd {
    pub async fn run(self, config: &Config) -> anyhow::Result<()> {
        match self {
            Cmd::Lookup {
                platform,
                username,
                pretty,
            } => {
                let resolver = ProfileResolver::from_config(config)?;
                let result = resolver.resolve(&platform, &username).await;
                println!("{}", render(&result, pretty)?);
            }
            Cmd::Platforms => {
                for kind in PlatformKind::ALL {
                    println!("{kind}");
                }
            }
        }

        Ok(())
    }
}
