fn main() -> anyhow::Result<()> {
    classrouter::cli::run_cli()
}
