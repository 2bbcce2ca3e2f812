use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use things_values::ValueType;

#[derive(Parser, Debug)]
#[command(
    name = "things",
    about = "Inspect and edit values persisted by abstract-things",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Use this data directory instead of THING_STORAGE or the platform default
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Write through a temporary file and rename it into place
    #[arg(long, global = true)]
    pub atomic: bool,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the data directory and storage root
    Path,
    /// Read a stored value
    Get(GetArgs),
    /// Store a value
    Set(SetArgs),
}

/// Which namespace a key lives in.
#[derive(Args, Debug)]
pub struct Target {
    /// Use the namespace of this instance instead of the global one
    #[arg(short, long, value_name = "ID")]
    pub instance: Option<String>,

    /// Descend into a nested namespace (repeatable)
    #[arg(long = "sub", value_name = "SEGMENT")]
    pub subs: Vec<String>,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    pub key: String,

    #[command(flatten)]
    pub target: Target,

    /// Type tag used to decode the value
    #[arg(short = 't', long = "type", default_value = "mixed")]
    pub kind: ValueType,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    pub key: String,

    /// The value; JSON is accepted where the type allows it
    pub value: String,

    #[command(flatten)]
    pub target: Target,

    /// Type tag used to encode the value
    #[arg(short = 't', long = "type", default_value = "mixed")]
    pub kind: ValueType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_get_with_target() {
        let cli = Cli::parse_from([
            "things", "get", "power", "--instance", "lamp-1", "--sub", "state", "--type", "boolean",
        ]);
        match cli.command {
            Command::Get(args) => {
                assert_eq!(args.key, "power");
                assert_eq!(args.target.instance.as_deref(), Some("lamp-1"));
                assert_eq!(args.target.subs, vec!["state".to_string()]);
                assert_eq!(args.kind, ValueType::Boolean);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn type_defaults_to_mixed() {
        let cli = Cli::parse_from(["things", "set", "name", "\"lamp\""]);
        match cli.command {
            Command::Set(args) => assert_eq!(args.kind, ValueType::Mixed),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(Cli::try_parse_from(["things", "get", "x", "--type", "colour"]).is_err());
    }

    #[test]
    fn global_flags() {
        let cli = Cli::parse_from([
            "things",
            "path",
            "--data-dir",
            "/tmp/d",
            "--format",
            "json",
            "-v",
        ]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/d")));
        assert!(matches!(cli.format, OutputFormat::Json));
        assert!(cli.verbose);
        assert!(!cli.atomic);
    }
}
