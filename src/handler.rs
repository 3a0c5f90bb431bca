use std::sync::Arc;

use rand::{rngs::StdRng, SeedableRng};
use serde_json::Value as Json;

use crate::{
    config::Config,
    error::{AppError, ConfigError},
    event::{read_code, read_long_url},
    links::{create_link, resolve_link},
    model::ShortenResp,
    response::{json_response, redirect_response, GatewayResponse},
    store::{DynamoStore, LinkStore},
    util::valid_url,
};

/// Per-process state handed to every invocation. Cloning is cheap.
#[derive(Clone)]
pub struct Ctx {
    pub store: Arc<dyn LinkStore>,
}

impl Ctx {
    pub fn new(store: Arc<dyn LinkStore>) -> Self {
        Self { store }
    }

    pub async fn from_env() -> Result<Self, ConfigError> {
        let cfg = Config::from_env()?;
        tracing::info!(table=%cfg.table_name, region=?cfg.table_region, "using DynamoDB table");
        let store = DynamoStore::from_config(&cfg).await;
        Ok(Self::new(Arc::new(store)))
    }
}

/// Shortener entry point: `200 {short_code}`, `400` or `500`.
pub async fn handle_shorten(event: &Json, ctx: &Ctx) -> GatewayResponse {
    let long_url = read_long_url(event);
    if !valid_url(&long_url) {
        tracing::info!(len = long_url.len(), "rejected shorten request");
        return AppError::InvalidInput("Invalid URL. Use http:// or https://").into();
    }

    let mut rng = StdRng::from_entropy();
    match create_link(ctx.store.as_ref(), &long_url, &mut rng).await {
        Ok(short_code) => json_response(200, &ShortenResp { short_code }),
        Err(e) => e.into(),
    }
}

/// Redirector entry point: meta-refresh `200`, `400`, `404` or `500`.
pub async fn handle_redirect(event: &Json, ctx: &Ctx) -> GatewayResponse {
    let code = read_code(event);
    let outcome = resolve_link(ctx.store.as_ref(), &code)
        .await
        .and_then(|target| Ok(redirect_response(&target)?));
    match outcome {
        Ok(resp) => resp,
        Err(e) => {
            if e.status() >= 500 {
                tracing::error!(%code, err=%e, "redirect failed");
            }
            e.into()
        }
    }
}
