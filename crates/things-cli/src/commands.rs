use anyhow::Context;
use colored::Colorize;
use things_storage::{Storage, StorageConfig, SubStorage, WriteMode};
use things_values::{to_json, Value, ValueType};
use tracing::debug;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let storage = open_storage(&cli)?;
    match cli.command {
        Command::Path => cmd_path(&storage, &cli.format),
        Command::Get(args) => cmd_get(&storage, args, &cli.format).await,
        Command::Set(args) => cmd_set(&storage, args).await,
    }
}

fn open_storage(cli: &Cli) -> anyhow::Result<Storage> {
    let mut config = StorageConfig::from_env();
    if let Some(dir) = &cli.data_dir {
        config = config.with_data_dir(dir);
    }
    if cli.atomic {
        config = config.with_write_mode(WriteMode::Atomic);
    }
    debug!(?config, "opening storage");
    Storage::open(config).context("failed to open storage")
}

fn resolve_target(storage: &Storage, target: &Target) -> anyhow::Result<SubStorage> {
    let mut view = match &target.instance {
        Some(id) => storage.instance(id)?,
        None => storage.global(),
    };
    for segment in &target.subs {
        view = view.sub(segment)?;
    }
    Ok(view)
}

/// Turn command-line text into a value for `kind`.
///
/// Types with a textual encoding take the text as-is; everything else is
/// read as JSON, falling back to a plain string.
fn parse_input(kind: ValueType, raw: &str) -> Value {
    match kind {
        ValueType::String | ValueType::Buffer | ValueType::Duration | ValueType::Percentage => {
            Value::String(raw.to_string())
        }
        _ => serde_json::from_str(raw)
            .map(Value::Mixed)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
    }
}

fn cmd_path(storage: &Storage, format: &OutputFormat) -> anyhow::Result<()> {
    let root = storage.data_dir().join(things_storage::root::STORAGE_DIR);
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({
                "data_dir": storage.data_dir().display().to_string(),
                "storage": root.display().to_string(),
            })
        ),
        OutputFormat::Text => {
            println!("Data directory: {}", storage.data_dir().display().to_string().bold());
            println!("Storage root:   {}", root.display().to_string().cyan());
        }
    }
    Ok(())
}

async fn cmd_get(storage: &Storage, args: GetArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let view = resolve_target(storage, &args.target)?;
    let value = view
        .get(&args.key, args.kind)
        .await
        .with_context(|| format!("failed to read {} from {view}", args.key))?;

    match (value, format) {
        (None, OutputFormat::Json) => println!("null"),
        (None, OutputFormat::Text) => {
            println!("{} {} is not set in {}", "∅".dimmed(), args.key.yellow(), view);
        }
        (Some(value), OutputFormat::Json) => println!("{}", to_json(args.kind, &value)?),
        (Some(value), OutputFormat::Text) => println!("{value}"),
    }
    Ok(())
}

async fn cmd_set(storage: &Storage, args: SetArgs) -> anyhow::Result<()> {
    let view = resolve_target(storage, &args.target)?;
    let value = parse_input(args.kind, &args.value);
    view.set(&args.key, &value, args.kind)
        .await
        .with_context(|| format!("failed to write {} to {view}", args.key))?;
    println!(
        "{} Stored {} in {} ({})",
        "✓".green().bold(),
        args.key.yellow(),
        view,
        args.kind.to_string().cyan()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use serde_json::json;

    use super::*;

    #[test]
    fn parse_input_reads_json_for_structured_types() {
        assert_eq!(parse_input(ValueType::Mixed, "{\"a\":1}"), Value::Mixed(json!({"a": 1})));
        assert_eq!(parse_input(ValueType::Number, "5"), Value::Mixed(json!(5)));
        assert_eq!(parse_input(ValueType::Mixed, "lamp"), Value::String("lamp".into()));
    }

    #[test]
    fn parse_input_keeps_text_for_textual_types() {
        assert_eq!(parse_input(ValueType::String, "5"), Value::String("5".into()));
        assert_eq!(parse_input(ValueType::Buffer, "1234"), Value::String("1234".into()));
    }

    fn cli_for(dir: PathBuf, command: Command) -> Cli {
        Cli {
            command,
            verbose: false,
            format: OutputFormat::Text,
            data_dir: Some(dir),
            atomic: false,
        }
    }

    #[tokio::test]
    async fn set_then_get_through_commands() {
        let tmp = tempfile::tempdir().unwrap();
        let set = cli_for(
            tmp.path().to_path_buf(),
            Command::Set(SetArgs {
                key: "timeout".into(),
                value: "1m30s".into(),
                target: Target { instance: Some("hub".into()), subs: vec!["net".into()] },
                kind: ValueType::Duration,
            }),
        );
        run_command(set).await.unwrap();

        let file = tmp.path().join("storage/instance/hub/net/timeout.json");
        let stored = std::fs::read_to_string(file).unwrap();
        assert_eq!(stored, "90000");

        let storage = Storage::open(StorageConfig::default().with_data_dir(tmp.path())).unwrap();
        let view = resolve_target(
            &storage,
            &Target { instance: Some("hub".into()), subs: vec!["net".into()] },
        )
        .unwrap();
        assert_eq!(
            view.get("timeout", ValueType::Duration).await.unwrap(),
            Some(Value::Duration(Duration::from_secs(90)))
        );
    }

    #[tokio::test]
    async fn invalid_target_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let get = cli_for(
            tmp.path().to_path_buf(),
            Command::Get(GetArgs {
                key: "x".into(),
                target: Target { instance: Some("a/b".into()), subs: vec![] },
                kind: ValueType::Mixed,
            }),
        );
        assert!(run_command(get).await.is_err());
    }
}
