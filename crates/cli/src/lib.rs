pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::process::ExitCode;

use crate::commands::recommend::RecommendArgs;

#[derive(Debug, Parser)]
#[command(
    name = "behuman",
    about = "BeHuman operator CLI",
    long_about = "Operate the BeHuman wellness engine: migrations, catalog seeding and tagging, \
                  offline recommendations, distress analysis, config inspection and readiness checks.",
    after_help = "Examples:\n  behuman doctor --json\n  behuman seed\n  behuman recommend --transcript \"Mi abuelo murió\" --name Ana --age 34"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the baseline wellness catalog and verify every activity is present")]
    Seed,
    #[command(about = "Recompute inferred situation and profile tags for catalog items")]
    Retag {
        #[arg(long, help = "Report the tags that would change without writing them")]
        dry_run: bool,
    },
    #[command(about = "Rank catalog activities for a transcript and profile without persisting")]
    Recommend(RecommendCommand),
    #[command(about = "Grade the emotional distress expressed in a transcript")]
    Analyze {
        #[arg(long, help = "Conversation transcript to analyze")]
        transcript: String,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, DB connectivity and catalog readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

#[derive(Debug, Args)]
struct RecommendCommand {
    #[arg(long, help = "Conversation transcript to classify")]
    transcript: String,
    #[arg(long, help = "Employee first name used in the empathic message")]
    name: String,
    #[arg(long, help = "Opaque employee identifier")]
    user_id: Option<String>,
    #[arg(long)]
    age: Option<u32>,
    #[arg(long = "hobby", help = "Hobby tag, repeatable")]
    hobbies: Vec<String>,
    #[arg(long = "goal", help = "Goal tag, repeatable")]
    goals: Vec<String>,
    #[arg(long, help = "Maximum number of recommendations")]
    top_n: Option<usize>,
    #[arg(long, help = "Seed for reproducible calming phrase selection")]
    seed: Option<u64>,
}

impl From<RecommendCommand> for RecommendArgs {
    fn from(command: RecommendCommand) -> Self {
        Self {
            transcript: command.transcript,
            name: command.name,
            user_id: command.user_id,
            age: command.age,
            hobbies: command.hobbies,
            goals: command.goals,
            top_n: command.top_n,
            seed: command.seed,
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Retag { dry_run } => commands::retag::run(dry_run),
        Command::Recommend(command) => commands::recommend::run(command.into()),
        Command::Analyze { transcript } => commands::analyze::run(&transcript),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Command};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn recommend_collects_repeated_hobbies_and_goals() {
        let cli = Cli::try_parse_from([
            "behuman",
            "recommend",
            "--transcript",
            "Terminé con mi pareja",
            "--name",
            "Sofía",
            "--hobby",
            "deportes",
            "--hobby",
            "musica",
            "--goal",
            "salud",
            "--top-n",
            "2",
        ])
        .expect("parse");

        let Command::Recommend(command) = cli.command else {
            panic!("expected recommend command");
        };
        assert_eq!(command.hobbies, vec!["deportes", "musica"]);
        assert_eq!(command.goals, vec!["salud"]);
        assert_eq!(command.top_n, Some(2));
        assert_eq!(command.age, None);
    }

    #[test]
    fn retag_accepts_dry_run_flag() {
        let cli = Cli::try_parse_from(["behuman", "retag", "--dry-run"]).expect("parse");
        assert!(matches!(cli.command, Command::Retag { dry_run: true }));
    }
}
