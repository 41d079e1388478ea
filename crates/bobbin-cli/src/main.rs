use std::path::PathBuf;

use anyhow::{Context, Result};
use bobbin_core::{FlowRef, OptionValues, Settings, Task};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod registry;
mod variants;

use registry::{BoxedVariant, VariantRegistry};

#[derive(Parser, Debug)]
#[command(name = "bobbin", version, about = "Run configured tasks")]
struct Args {
    /// Settings file
    #[arg(short, long, default_value = "bobbin.toml")]
    config: PathBuf,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List configured tasks
    List,

    /// Show the options a task accepts
    Info { task: String },

    /// Run a task
    Run {
        task: String,

        /// Option override as name=value (value is parsed as JSON when possible)
        #[arg(short = 'o', long = "option", value_parser = parse_override)]
        options: Vec<(String, serde_json::Value)>,

        /// Execution context from the settings file
        #[arg(long)]
        context: Option<String>,

        /// Run as if nested in the named flow
        #[arg(long)]
        flow: Option<String>,
    },
}

fn parse_override(raw: &str) -> Result<(String, serde_json::Value), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))?;
    if name.is_empty() {
        return Err(format!("missing option name in '{raw}'"));
    }
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((name.to_string(), value))
}

fn builtin_registry() -> Result<VariantRegistry> {
    let mut registry = VariantRegistry::new();
    registry.register("echo", || -> BoxedVariant { Box::new(variants::Echo) })?;
    registry.register("command", || -> BoxedVariant {
        Box::new(variants::Command::default())
    })?;
    registry.register("org_info", || -> BoxedVariant { Box::new(variants::OrgInfo) })?;
    Ok(registry)
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let settings = Settings::load(&args.config)?;
    let registry = builtin_registry()?;

    match args.command {
        Command::List => {
            for (name, cfg) in &settings.tasks {
                println!(
                    "{:<24} {:<10} {}",
                    name,
                    cfg.variant.as_deref().unwrap_or(name),
                    cfg.description.as_deref().unwrap_or("")
                );
            }
        }
        Command::Info { task } => {
            let variant_name = variant_of(&settings, &task)?;
            let variant = registry.create(&variant_name)?;
            println!("{task} ({})", variant.name());
            if variant.requires_context() {
                println!("  requires an execution context (--context)");
            }
            for (name, spec) in variant.option_schema().iter() {
                let marker = if spec.required { "*" } else { " " };
                println!("  {marker} {name:<22} {}", spec.description);
            }
        }
        Command::Run {
            task: task_name,
            options,
            context,
            flow,
        } => {
            let task_config = settings.task(&task_name)?.clone();
            let variant = registry.create(&variant_of(&settings, &task_name)?)?;
            let context = context
                .map(|name| settings.context(&name).cloned())
                .transpose()?;
            let overrides: OptionValues = options.into_iter().collect();

            let mut task = Task::new(
                variant,
                settings.project.clone(),
                task_config,
                context,
                flow.map(FlowRef::new),
                overrides,
            )
            .with_context(|| format!("failed to construct task '{task_name}'"))?;

            let values = task.call()?;
            println!("{}", serde_json::to_string_pretty(&values)?);
        }
    }
    Ok(())
}

fn variant_of(settings: &Settings, task: &str) -> Result<String> {
    let cfg = settings.task(task)?;
    Ok(cfg.variant.clone().unwrap_or_else(|| task.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case::number("retries=3", "retries", json!(3))]
    #[case::float("retry_interval=0.5", "retry_interval", json!(0.5))]
    #[case::bare_string("path=src/main", "path", json!("src/main"))]
    #[case::json_list("retry_on_exit_codes=[1,2]", "retry_on_exit_codes", json!([1, 2]))]
    #[case::equals_in_value("command=a=b", "command", json!("a=b"))]
    fn parses_overrides(#[case] raw: &str, #[case] name: &str, #[case] value: serde_json::Value) {
        assert_eq!(parse_override(raw).unwrap(), (name.to_string(), value));
    }

    #[rstest]
    #[case::no_equals("retries")]
    #[case::no_name("=3")]
    fn rejects_malformed_overrides(#[case] raw: &str) {
        assert!(parse_override(raw).is_err());
    }

    #[test]
    fn builtin_registry_has_every_variant() {
        let registry = builtin_registry().unwrap();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["command", "echo", "org_info"]);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
