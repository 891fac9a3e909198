mod commands;
mod terminal;

use camaudit_common::config::Config;
use commands::{CommandLine, Commands, get, search};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let commands = CommandLine::parse_args();

    logging::init(commands.verbose);
    print::banner();

    let cfg = Config {
        verbose: commands.verbose,
        ..Config::default()
    }
    .with_timeout_secs(commands.timeout);

    match commands.command {
        Commands::Search(args) => {
            print::header("searching for devices");
            search::search(args, &cfg).await
        }
        Commands::Get(args) => {
            print::header("checking device");
            get::get(args, &cfg).await
        }
    }
}
