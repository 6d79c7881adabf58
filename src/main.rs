use anyhow::Result;

fn main() -> Result<()> {
    linkdeck::cli::run()
}
