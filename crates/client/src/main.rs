//! Scene player binary.
//!
//! Composition root: loads configuration, builds the demo scene, hands it to
//! the runtime and gives control to the terminal loop.
//!
//! ```bash
//! PLAYER_AUTO_ADVANCE=true RUST_LOG=scene_core=debug cargo run -p scene-client
//! ```

use anyhow::Result;
use scene_client::{PlayerApp, PlayerConfig, Script};
use scene_runtime::{Runtime, RuntimeConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let runtime_config = RuntimeConfig::from_env();
    let player_config = PlayerConfig::from_env();
    tracing::info!(?runtime_config, ?player_config, "Starting scene player");

    let script = Script::demo();
    let runtime = Runtime::builder()
        .config(runtime_config)
        .scene(script.scene(&player_config))
        .build()?;

    PlayerApp::new(runtime.handle(), script).run().await?;

    runtime.shutdown().await?;
    tracing::info!("Scene player shutdown complete");
    Ok(())
}
