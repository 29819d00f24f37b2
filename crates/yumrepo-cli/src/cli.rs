use clap::{ArgAction, Parser, Subcommand, ValueHint};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Provide custom config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<String>,

    /// Fetch metadata without reading or writing the cache
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Set user agent
    #[arg(required = false, long, short = 'A', global = true)]
    pub user_agent: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the packages of a repository
    #[command(arg_required_else_help = true)]
    #[clap(name = "packages", visible_alias = "ls")]
    Packages {
        /// Repository URL or configured repository name
        #[arg(required = true, value_hint = ValueHint::Url)]
        repo: String,

        /// Show what each package provides and requires
        #[arg(required = false, short, long)]
        deps: bool,
    },

    /// Show package changelogs
    #[command(arg_required_else_help = true)]
    #[clap(name = "changelog", visible_alias = "log")]
    Changelog {
        /// Repository URL or configured repository name
        #[arg(required = true, value_hint = ValueHint::Url)]
        repo: String,

        /// Only show the changelog of this package
        #[arg(required = false, short, long)]
        package: Option<String>,
    },

    /// List the metadata documents a repository publishes
    #[command(arg_required_else_help = true)]
    Roles {
        /// Repository URL or configured repository name
        #[arg(required = true, value_hint = ValueHint::Url)]
        repo: String,
    },

    /// Print the configuration to stdout
    Config {
        /// Write an annotated default configuration file instead
        #[arg(required = false, long)]
        init: bool,
    },
}
