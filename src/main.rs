//! Testify CLI - build, preview and inspect testimonial embeds.

use clap::Parser;
use std::env;
use std::path::{Path, PathBuf};
use std::process;
use testify::cli::{Cli, Commands, ConfigCommands};
use testify::commands::{self, output};
use testify::config::{
    self, ConfigOverrides, ResolvedConfig, ValueSource, project_config_path, system_config_path,
};
use testify::embed::Theme;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (`EnvFilter` syntax).
const LOG_ENV: &str = "TESTIFY_LOG";

fn main() {
    let cli = Cli::parse();
    let human = cli.human_readable;
    init_logging();

    let project_dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let result = run_command(cli, &project_dir, human);

    if let Err(e) = result {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_command(cli: Cli, project_dir: &Path, human: bool) -> Result<(), testify::Error> {
    let mut overrides = ConfigOverrides::new();
    if let Some(base_url) = cli.base_url {
        overrides = overrides.with_embed_base_url(base_url);
    }
    if let Some(resizer_url) = cli.resizer_url {
        overrides = overrides.with_resizer_url(resizer_url);
    }
    if let Some(theme) = cli.default_theme {
        overrides = overrides.with_default_theme(Theme::parse(&theme));
    }

    match cli.command {
        Commands::Url { embed } => {
            let resolved = config::resolve_config(project_dir, &overrides)?;
            let settings = resolved.to_settings()?;
            output(
                &commands::url(&settings, &embed, &resolved.default_theme.value)?,
                human,
            );
        }
        Commands::Snippet { embed, script_url } => {
            let resolved = config::resolve_config(project_dir, &overrides)?;
            output(
                &commands::snippet(&embed, &script_url, &resolved.default_theme.value)?,
                human,
            );
        }
        Commands::Render { embed } => {
            let resolved = config::resolve_config(project_dir, &overrides)?;
            let settings = resolved.to_settings()?;
            output(
                &commands::render(&settings, &embed, &resolved.default_theme.value)?,
                human,
            );
        }
        Commands::Inspect { url } => {
            output(&commands::inspect(&url)?, human);
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                let resolved: ResolvedConfig = config::resolve_config(project_dir, &overrides)?;
                output(&commands::config_show(resolved), human);
            }
            ConfigCommands::Get { key, project } => {
                let (path, source) = config_file(project_dir, project)?;
                output(&commands::config_get(&path, &key, source)?, human);
            }
            ConfigCommands::Set {
                key,
                value,
                project,
            } => {
                let (path, _) = config_file(project_dir, project)?;
                output(&commands::config_set(&path, &key, &value)?, human);
            }
        },
    }
    Ok(())
}

/// Config file targeted by `config get/set`: project with `--project`, else system.
fn config_file(
    project_dir: &Path,
    project: bool,
) -> Result<(PathBuf, ValueSource), testify::Error> {
    if project {
        return Ok((project_config_path(project_dir), ValueSource::Project));
    }
    let path = system_config_path().ok_or_else(|| {
        testify::Error::Other(format!(
            "no config directory found; set {}",
            config::CONFIG_DIR_ENV
        ))
    })?;
    Ok((path, ValueSource::System))
}
