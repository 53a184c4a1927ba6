use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "devforge")]
#[command(about = "Generate isolated devcontainer projects from declarative specs", long_about = None)]
#[command(version = env!("DEVFORGE_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new devcontainer project
    #[command(
        long_about = "Create a new devcontainer project.\n\n\
        Writes a devforge.toml specification built from the chosen template\n\
        or preset plus any flag overrides, then runs the generation pipeline\n\
        against it."
    )]
    Init(InitCmd),

    /// Re-run generation from an existing devforge.toml
    Generate {
        /// Path to the specification document
        #[arg(long, default_value = "devforge.toml")]
        config: PathBuf,

        /// Output directory (defaults to the document's directory)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Report what would change without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate a specification document without generating
    Validate {
        /// Path to the specification document
        #[arg(long, default_value = "devforge.toml")]
        config: PathBuf,
    },

    /// List built-in templates
    ListTemplates,

    /// List built-in presets
    ListPresets,
}

#[derive(Args, Debug)]
pub struct InitCmd {
    /// Project name
    pub name: String,

    /// Template to generate from
    #[arg(long, conflicts_with = "preset")]
    pub template: Option<String>,

    /// Preset providing template defaults
    #[arg(long)]
    pub preset: Option<String>,

    /// Language version (must be supported by the template)
    #[arg(long)]
    pub lang_version: Option<String>,

    /// Claude Code CLI version
    #[arg(long)]
    pub claude_version: Option<String>,

    /// Claude API provider (anthropic, openai, bedrock, vertex, azure)
    #[arg(long)]
    pub claude_provider: Option<String>,

    /// HTTP proxy URL
    #[arg(long)]
    pub proxy_http: Option<String>,

    /// HTTPS proxy URL
    #[arg(long)]
    pub proxy_https: Option<String>,

    /// Comma-separated proxy bypass list
    #[arg(long)]
    pub no_proxy: Option<String>,

    /// Directory to create the project in
    #[arg(long, default_value = ".")]
    pub output: PathBuf,

    /// Report what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Overwrite an existing devforge.toml without asking
    #[arg(short = 'y', long)]
    pub yes: bool,
}
