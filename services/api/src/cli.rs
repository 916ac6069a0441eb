use crate::demo::{run_demo, run_offer, DemoArgs, OfferArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use emotion_pay::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "EmotionPay",
    about = "Run the EmotionPay event API or walk through the kiosk checkout from the command line",
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
    /// Print the offer the kiosk would show for an emotion label
    Offer(OfferArgs),
    /// Run a scripted kiosk checkout end to end
    Demo(DemoArgs),
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
        Command::Offer(args) => run_offer(args),
        Command::Demo(args) => run_demo(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve() {
        let cli = Cli::try_parse_from(["emotion-pay-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_demo_flags() {
        let cli = Cli::try_parse_from([
            "emotion-pay-api",
            "demo",
            "--emotion",
            "sad",
            "--skip-review",
            "--decline",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Demo(args)) => {
                assert_eq!(args.emotion, "sad");
                assert!(args.skip_review);
                assert!(args.decline);
                assert!(args.endpoint.is_none());
            }
            other => panic!("expected demo command, got {other:?}"),
        }
    }
}
