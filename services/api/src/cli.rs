use crate::report::{run_catalog, run_simulate, CatalogArgs, SimulateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use impact_sim::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Global Health Impact Simulator",
    about = "Project the health and economic impact of interventions across regions",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run one simulation and print the report
    Simulate(SimulateArgs),
    /// List the region and intervention catalogs
    Catalog(CatalogArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Simulate(args) => run_simulate(args),
        Command::Catalog(args) => run_catalog(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use impact_sim::simulation::ModelStrictness;

    #[test]
    fn defaults_to_serve() {
        let cli = Cli::try_parse_from(["impact-sim"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_simulate_arguments() {
        let cli = Cli::try_parse_from([
            "impact-sim",
            "simulate",
            "--region",
            "south_asia",
            "--intervention",
            "vax_expanded=70",
            "--intervention",
            "education=35",
            "--strictness",
            "conservative",
            "--json",
        ])
        .expect("parses");

        let Some(Command::Simulate(args)) = cli.command else {
            panic!("expected simulate command");
        };
        assert_eq!(args.region, "south_asia");
        assert_eq!(args.interventions.len(), 2);
        assert_eq!(args.interventions[1].id, "education");
        assert_eq!(args.interventions[1].intensity, 35);
        assert_eq!(args.strictness, Some(ModelStrictness::Conservative));
        assert!(args.json);
    }

    #[test]
    fn rejects_malformed_intervention_flag() {
        let result = Cli::try_parse_from([
            "impact-sim",
            "simulate",
            "--region",
            "global",
            "--intervention",
            "vax_expanded",
        ]);

        assert!(result.is_err());
    }
}
