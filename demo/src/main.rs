//! IndieAuth demo - walk the sign-in flow against real sites
//!
//! ```text
//! indieauth-demo discover https://martymcgui.re/
//! indieauth-demo auth-url --me http://mmg.re --client-id https://example.com/ \
//!     --redirect-uri https://example.com/indieauth-redirect
//! indieauth-demo verify --me https://martymcgui.re/ --code <code> ...
//! ```
//!
//! Logs go to stderr (`RUST_LOG`, default `indieauth=info`); results go to
//! stdout as JSON.

use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use indieauth::{ClientConfig, IndieAuthError, IndieAuthentication, Options};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// IndieAuth client demo
#[derive(Parser, Debug)]
#[command(name = "indieauth-demo", version, about = "Discover IndieAuth endpoints and walk the sign-in flow")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 10)]
    timeout: u64,

    /// Maximum permanent redirects followed
    #[arg(long, global = true, default_value_t = 10)]
    max_redirects: usize,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Discover the endpoints advertised by an identity URL
    Discover {
        /// Identity URL
        url: String,

        /// Extra `relation=key` mappings, e.g. `microsub=microsub`
        #[arg(long = "rel", value_parser = parse_rel)]
        rels: Vec<(String, String)>,
    },

    /// Build the URL that starts the sign-in flow
    AuthUrl {
        #[command(flatten)]
        client: ClientArgs,

        /// Opaque state value; a random one is generated if omitted
        #[arg(long)]
        state: Option<String>,

        /// Send a PKCE challenge
        #[arg(long)]
        pkce: bool,
    },

    /// Verify the code returned to the redirect URI
    Verify {
        #[command(flatten)]
        client: ClientArgs,

        /// Authorization code from the callback
        #[arg(long)]
        code: String,

        /// Stored state value
        #[arg(long, requires = "returned_state")]
        state: Option<String>,

        /// State value from the callback
        #[arg(long)]
        returned_state: Option<String>,

        /// PKCE verifier printed by `auth-url --pkce`
        #[arg(long, env = "INDIEAUTH_CODE_VERIFIER", hide_env_values = true)]
        code_verifier: Option<String>,
    },
}

#[derive(Args, Debug)]
struct ClientArgs {
    /// The user's identity URL
    #[arg(long)]
    me: String,

    /// Client identifier
    #[arg(long, env = "INDIEAUTH_CLIENT_ID")]
    client_id: String,

    /// Redirect URI registered for the client
    #[arg(long, env = "INDIEAUTH_REDIRECT_URI")]
    redirect_uri: String,

    /// Requested scope; switches to the authorization-code flow
    #[arg(long)]
    scope: Option<String>,
}

impl ClientArgs {
    fn into_options(self) -> Options {
        let options = Options::new(self.me)
            .with_client_id(self.client_id)
            .with_redirect_uri(self.redirect_uri);
        match self.scope {
            Some(scope) => options.with_scope(scope),
            None => options,
        }
    }
}

fn parse_rel(value: &str) -> Result<(String, String), String> {
    value
        .split_once('=')
        .filter(|(rel, key)| !rel.is_empty() && !key.is_empty())
        .map(|(rel, key)| (rel.to_string(), key.to_string()))
        .ok_or_else(|| format!("expected relation=key, got `{value}`"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("indieauth=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ClientConfig {
        request_timeout: Duration::from_secs(cli.timeout),
        max_redirects: cli.max_redirects,
        ..ClientConfig::default()
    };

    match run(cli.command, config).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(err) => {
            if let Some(indieauth) = err.downcast_ref::<IndieAuthError>() {
                eprintln!("{}", serde_json::to_string_pretty(&indieauth.to_record())?);
            }
            Err(err)
        }
    }
}

async fn run(command: Commands, config: ClientConfig) -> anyhow::Result<serde_json::Value> {
    match command {
        Commands::Discover { url, rels } => {
            let mut options = Options::new(url.clone());
            for (rel, key) in rels {
                options = options.with_rel_endpoint(rel, key);
            }

            let mut auth = IndieAuthentication::with_config(options, config)?;
            let found = auth.get_endpoints_from_url(&url).await?;
            info!(me = %found.me, count = found.endpoints.len(), "discovery finished");

            Ok(serde_json::to_value(found)?)
        }

        Commands::AuthUrl {
            client,
            state,
            pkce,
        } => {
            let options = client.into_options().with_pkce(pkce);
            let options = match state {
                Some(state) => options.with_state(state),
                None => options.with_random_state(),
            };

            let mut auth = IndieAuthentication::with_config(options, config)?;
            let url = auth.get_auth_url().await?;

            let options = auth.into_options();
            Ok(json!({
                "me": options.me,
                "url": url,
                "state": options.state,
                "codeVerifier": options.code_verifier.as_ref().map(|v| v.expose_secret().clone()),
            }))
        }

        Commands::Verify {
            client,
            code,
            state,
            returned_state,
            code_verifier,
        } => {
            let mut options = client.into_options();
            options.state = state;
            options.code_verifier = code_verifier.map(SecretString::new);

            let mut auth = IndieAuthentication::with_config(options, config)?;
            if let Some(returned) = returned_state.as_deref() {
                auth.verify_state(returned)?;
            }

            let me = auth.options().me.clone();
            auth.get_endpoints_from_url(&me)
                .await
                .context("discovering endpoints before verification")?;
            let verified = auth.verify_code_response(&code).await?;
            info!(me = %verified.me, "identity verified");

            Ok(json!({
                "me": verified.me,
                "tokenType": verified.token_type,
                "scope": verified.scope,
                "accessToken": verified.access_token.as_ref().map(|t| t.expose_secret().clone()),
            }))
        }
    }
}
