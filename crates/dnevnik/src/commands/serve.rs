//! Serve command - runs the proxy server.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Args;
use dnevnik_cache::ResponseCache;
use dnevnik_config::{DnevnikConfig, SESSION_SECRET_ENV, resolve_session_secret};
use dnevnik_server::{Server, ServerConfig, SessionKeys};
use dnevnik_upstream::{HttpUpstream, PrefixClassifier, ResourceKind};
use tracing::info;

use super::Context;

/// Arguments for the serve command.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind to (overrides config)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Upstream API base URL (overrides config)
    #[arg(long, env = "DNEVNIK_UPSTREAM_URL")]
    pub upstream_url: Option<String>,
}

impl ServeArgs {
    /// Layer the command-line overrides on top of file config.
    fn apply(&self, config: &mut DnevnikConfig) {
        if self.port.is_some() || self.bind.is_some() {
            let mut server = config.server();
            if let Some(port) = self.port {
                server.port = port;
            }
            if let Some(bind) = &self.bind {
                server.bind = bind.clone();
            }
            config.server = Some(server);
        }

        if let Some(url) = &self.upstream_url {
            let mut upstream = config.upstream();
            upstream.base_url = Some(url.clone());
            config.upstream = Some(upstream);
        }
    }
}

/// Run the serve command.
pub async fn run(args: ServeArgs, ctx: &Context) -> Result<()> {
    let mut config = ctx.load_config()?.config;
    args.apply(&mut config);
    config.validate()?;

    let secret = resolve_session_secret(config.auth().session_secret.as_deref())
        .with_context(|| {
            format!(
                "no session secret configured: set {} or auth.session_secret",
                SESSION_SECRET_ENV
            )
        })?;

    let upstream = build_upstream(&config)?;
    let cache = ResponseCache::new(cache_config(&config));
    let server_config = server_config(&config)?;

    if ctx.verbose {
        println!("Bind address: {}", server_config.bind_address);
        println!("Upstream: {}", upstream.base_url());
        println!("Session secret from: {}", secret.source);
    }

    info!(
        upstream = %upstream.base_url(),
        ttl_secs = cache.ttl().as_secs(),
        "Proxy configured"
    );

    Server::new(
        server_config,
        Arc::new(upstream),
        cache,
        SessionKeys::new(secret.value.as_bytes()),
    )
    .run()
    .await?;

    Ok(())
}

fn build_upstream(config: &DnevnikConfig) -> Result<HttpUpstream> {
    let upstream = config.upstream();
    let base_url = upstream
        .base_url
        .context("no upstream URL configured: pass --upstream-url or set upstream.base_url")?;

    let mut builder = HttpUpstream::builder()
        .base_url(base_url)
        .timeout(Duration::from_secs(upstream.timeout_secs))
        .classifier(Arc::new(PrefixClassifier::new(upstream.not_found_prefix)));
    for (city, url) in upstream.cities {
        builder = builder.city_url(city, url);
    }

    Ok(builder.build()?)
}

fn cache_config(config: &DnevnikConfig) -> dnevnik_cache::CacheConfig {
    let cache = config.cache();
    let base = dnevnik_cache::CacheConfig::new().with_ttl(Duration::from_secs(cache.ttl_secs));
    match cache.max_entries {
        0 => base.unbounded(),
        max => base.with_max_entries(max),
    }
}

fn server_config(config: &DnevnikConfig) -> Result<ServerConfig> {
    let server = config.server();
    let auth = config.auth();

    let ip: IpAddr = server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", server.bind))?;
    let bind_address = SocketAddr::new(ip, server.port);

    let cached_routes = config
        .cache()
        .routes
        .iter()
        .map(|route| route.parse::<ResourceKind>())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ServerConfig::new()
        .with_bind_address(bind_address)
        .with_rate_limiting(server.rate_limiting)
        .with_api_rpm(server.api_rpm)
        .with_request_logging(server.request_logging)
        .with_cors_origins(server.cors_origins)
        .with_cookie_name(auth.cookie_name)
        .with_cached_routes(cached_routes))
}
