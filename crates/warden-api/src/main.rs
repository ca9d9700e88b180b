use warden_core::Config;

// mimalloc as the global allocator (the musl allocator is slow under concurrent uploads).
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    let (_state, router) = warden_api::setup::initialize_app(config.clone())?;

    warden_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
