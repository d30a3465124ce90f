#[cfg(not(target_arch = "wasm32"))]
use anyhow::Result;
#[cfg(not(target_arch = "wasm32"))]
use script2speech::core::config::Config;
#[cfg(not(target_arch = "wasm32"))]
use script2speech::core::init_logging;
#[cfg(not(target_arch = "wasm32"))]
use script2speech::ui::terminal;

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading config: {:#}", e);
            eprintln!("Please fix or remove 'config.yml'.");
            return Err(e);
        }
    };

    config.ensure_directories()?;

    terminal::run(config).await
}

// The browser build starts from `script2speech::start`.
#[cfg(target_arch = "wasm32")]
fn main() {}
