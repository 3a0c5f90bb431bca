use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value as Json;
use shortlink::handler::{handle_shorten, Ctx};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .without_time()
        .init();

    let ctx = Ctx::from_env().await?;

    run(service_fn(move |event: LambdaEvent<Json>| {
        let ctx = ctx.clone();
        async move { Ok::<_, Error>(handle_shorten(&event.payload, &ctx).await) }
    }))
    .await
}
