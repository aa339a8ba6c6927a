use anyhow::Result;
use clap::Parser;
use prodmix::{GenerateArgs, generate_main};
use tracing_subscriber::EnvFilter;

fn enable_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = GenerateArgs::parse();
    enable_tracing();

    generate_main(args)
}
