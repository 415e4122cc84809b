use clap::Parser;
use habit_app::app::{run, AppConfig, Cli, Command};

fn main() {
    let cli = Cli::parse();
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Invalid configuration: {err:#}");
            std::process::exit(2);
        }
    };
    habit_app::init_logging(&config);
    if let Err(err) = run(config, cli.command.unwrap_or(Command::Show)) {
        tracing::error!(%err, "command failed");
        eprintln!("lifeos_habits: {err:#}");
        std::process::exit(1);
    }
}
