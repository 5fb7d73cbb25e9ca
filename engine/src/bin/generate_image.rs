use std::path::PathBuf;

use clap::Parser;
use color_eyre::{Result, eyre::ensure};
use engine::{
    export::{default_file_name, save_png},
    image_model::{DEFAULT_ENDPOINT, ImageClient, http_client},
};

/// Runs a single generation without the GUI and saves the result as PNG
#[derive(clap::Parser)]
struct Arg {
    key: String,
    prompt: String,
    #[arg(short, long)]
    out: Option<PathBuf>,
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    pretty_env_logger::init();
    let Arg {
        key,
        prompt,
        out,
        endpoint,
    } = Arg::parse();

    let prompt = prompt.trim();
    ensure!(!prompt.is_empty(), "The prompt is empty");

    let client = ImageClient::new(http_client(None)?, endpoint, key);
    let image = client.get_image(prompt).await?;

    let out = out.unwrap_or_else(|| default_file_name(&image.created_at).into());
    let written = save_png(image.bitmap.clone(), out).await?;
    println!(
        "Saved {}x{} image to {}",
        image.bitmap.width(),
        image.bitmap.height(),
        written.display()
    );

    Ok(())
}
