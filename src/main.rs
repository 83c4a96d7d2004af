use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use todo_service::config::ConfigArgs;
use todo_service::logs;
use todo_service::server::config::ServerConfig;
use todo_service::server::factory::ServerFactory;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct ServerArgs {
    /// Print server configuration data (JSON) and exit.
    #[arg(long)]
    pub print_config: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

async fn run(args: ServerArgs) -> Result<()> {
    let (cfg, source): (ServerConfig, _) = args.config.load("server")?;

    if args.print_config {
        let data = serde_json::to_string_pretty(&cfg).context("encode config")?;
        println!("{data}");
        return Ok(());
    }

    logs::init_logger(&cfg.logs)?;
    source.report();
    info!(
        "Starting {} {} (environment '{}')",
        cfg.app.name,
        env!("CARGO_PKG_VERSION"),
        cfg.app.environment
    );

    let factory = ServerFactory::new(cfg).context("init server factory")?;
    let server = factory.build_server().await.context("build server")?;
    server.run().await?;

    info!("Server exited by user");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = ServerArgs::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            _ = writeln!(io::stderr(), "Fatal: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
