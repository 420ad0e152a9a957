//! CLI argument definitions for Testify.

use clap::{Args, Parser, Subcommand};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("TESTIFY_GIT_COMMIT"),
    ", built ",
    env!("TESTIFY_BUILD_TIMESTAMP"),
    ")"
);

/// Testify - build, preview and inspect testimonial embeds.
///
/// Start with `testify snippet <space>` to get markup for a host page.
#[derive(Parser, Debug)]
#[command(name = "testify")]
#[command(
    author,
    version,
    long_version = LONG_VERSION,
    about = "Build, preview and inspect Testify testimonial embeds",
    long_about = None
)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Prefix of every frame source URL.
    /// Can also be set via TESTIFY_EMBED_BASE_URL environment variable.
    #[arg(long = "base-url", global = true)]
    pub base_url: Option<String>,

    /// Script URL of the resize library.
    /// Can also be set via TESTIFY_RESIZER_URL environment variable.
    #[arg(long = "resizer-url", global = true)]
    pub resizer_url: Option<String>,

    /// Theme used when an embed command gets no --theme
    #[arg(long = "default-theme", global = true)]
    pub default_theme: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the frame source URL for an embed
    Url {
        #[command(flatten)]
        embed: EmbedArgs,
    },

    /// Print HTML a host page can paste to load an embed
    Snippet {
        #[command(flatten)]
        embed: EmbedArgs,

        /// URL of the loader script module
        #[arg(long, default_value = "/testify.js")]
        script_url: String,
    },

    /// Mount an embed into a headless page and print the resulting markup
    Render {
        #[command(flatten)]
        embed: EmbedArgs,
    },

    /// Decode a frame source URL back into mode, space and options
    Inspect {
        /// Frame source URL (e.g., http://localhost:5173/embed/carousel/acme?theme=dark)
        url: String,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Embed selection and options shared by the embed commands.
#[derive(Args, Debug, Clone, Default)]
pub struct EmbedArgs {
    /// Space whose testimonials are shown
    pub space: String,

    /// Build a wall of love instead of a carousel
    #[arg(long)]
    pub wall: bool,

    /// Theme name (light, dark or a custom theme)
    #[arg(long)]
    pub theme: Option<String>,

    /// CSS width of the iframe (e.g., 100%, 640px)
    #[arg(long)]
    pub width: Option<String>,

    /// CSS height of the iframe (e.g., 500px)
    #[arg(long)]
    pub height: Option<String>,

    /// Advance carousel slides automatically
    #[arg(long)]
    pub autoplay: Option<bool>,

    /// Milliseconds between carousel slides
    #[arg(long)]
    pub delay: Option<u64>,

    /// Carousel slides per view (a number or "auto")
    #[arg(long)]
    pub slides_per_view: Option<String>,

    /// Wall column count
    #[arg(long)]
    pub columns: Option<u32>,
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show every setting with the layer it came from
    Show,

    /// Get a configuration value from a config file
    Get {
        /// Configuration key (embed-base-url, resizer-url, default-theme)
        key: String,

        /// Read the project file instead of the system file
        #[arg(long)]
        project: bool,
    },

    /// Set a configuration value in a config file
    Set {
        /// Configuration key (embed-base-url, resizer-url, default-theme)
        key: String,

        /// Configuration value
        value: String,

        /// Write the project file instead of the system file
        #[arg(long)]
        project: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_wall_options() {
        let cli = Cli::try_parse_from([
            "testify", "url", "acme", "--wall", "--columns", "5", "-H",
        ])
        .unwrap();
        assert!(cli.human_readable);
        match cli.command {
            Commands::Url { embed } => {
                assert_eq!(embed.space, "acme");
                assert!(embed.wall);
                assert_eq!(embed.columns, Some(5));
                assert_eq!(embed.theme, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_base_url_after_subcommand() {
        let cli = Cli::try_parse_from([
            "testify",
            "config",
            "show",
            "--base-url",
            "https://a.test/embed",
        ])
        .unwrap();
        assert_eq!(cli.base_url.as_deref(), Some("https://a.test/embed"));
    }

    #[test]
    fn test_parse_global_resizer_overrides() {
        let cli = Cli::try_parse_from([
            "testify",
            "render",
            "acme",
            "--resizer-url",
            "https://cdn.test/r.js",
            "--default-theme",
            "dark",
        ])
        .unwrap();
        assert_eq!(cli.resizer_url.as_deref(), Some("https://cdn.test/r.js"));
        assert_eq!(cli.default_theme.as_deref(), Some("dark"));
    }
}
