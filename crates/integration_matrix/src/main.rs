//! Command line front end for the codegen integration test matrix.
//!
//! Run from the integration tests' `scripts` directory (all default paths are relative to it):
//!
//! - `generate` builds every test project, then the solution referencing them.
//! - `execute` runs `dotnet test` against every generated project.
//! - `list` prints the test names the matrix expands to.
//! - `show-config` prints the resolved parameter table, which is a good starting point for a `--config` file.
//!
//! All of them take an optional glob over test names, e.g. `generate '*AsProto3'`.  Logging goes through env_logger;
//! set `RUST_LOG=debug` to see every command line and the tools' output.
mod cli_args;
mod commands;

fn main() {
    use clap::Parser;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = cli_args::CliArgs::parse();
    if let Err(e) = commands::dispatch_command(args) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
