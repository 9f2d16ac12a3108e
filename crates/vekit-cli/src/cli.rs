use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vekit")]
#[command(about = "Object storage, download and content moderation tools for agents", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file to use instead of the platform default
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload a file or directory and print its signed URL or TOS path
    Upload {
        /// Local file or directory
        path: PathBuf,

        /// Target bucket (default: DATABASE_TOS_BUCKET or config)
        #[arg(long)]
        bucket: Option<String>,

        /// Region (default: DATABASE_TOS_REGION, REGION or config)
        #[arg(long)]
        region: Option<String>,

        /// Signed URL lifetime in seconds (default from config: 604800)
        #[arg(long)]
        expires: Option<u64>,
    },

    /// Download one or more URLs into a local directory
    Download {
        /// URLs to fetch, in order
        #[arg(required = true)]
        urls: Vec<String>,

        /// Destination directory (default from config: /tmp)
        #[arg(long)]
        save_dir: Option<PathBuf>,

        /// Explicit file names, one per URL
        #[arg(long, num_args = 1..)]
        filenames: Option<Vec<String>>,
    },

    /// Hide PII in TEXT (or stdin)
    Redact {
        text: Option<String>,

        /// Print per-rule counts to stderr
        #[arg(long)]
        report: bool,
    },

    /// Check TEXT (or stdin) against the blocked-word list
    Screen { text: Option<String> },

    /// Package and fetch skills
    #[command(subcommand)]
    Skill(SkillCommands),

    /// Publish an html/css/js file with a public URL
    Publish {
        file: PathBuf,

        /// Content type: html, css or js
        #[arg(long = "type", value_name = "TYPE")]
        kind: String,

        #[arg(long)]
        bucket: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum SkillCommands {
    /// Zip a skill directory (with SKILL.md) and upload it
    Push {
        /// Skill directory
        path: PathBuf,

        /// Target bucket (default: DATABASE_TOS_BUCKET or config)
        #[arg(long)]
        bucket: Option<String>,

        /// Use the platform skill bucket of this account instead of --bucket
        #[arg(long, conflicts_with = "bucket")]
        account_id: Option<String>,

        #[arg(long)]
        region: Option<String>,
    },

    /// Download a skill zip and extract it, replacing any existing copy
    Pull {
        /// Package location, e.g. tos://bucket/uploads/20250101_000000/name.zip
        url: String,

        /// Directory the skill is extracted into
        #[arg(long, default_value = ".")]
        dest: PathBuf,

        /// Skill name (default: the zip file name)
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        region: Option<String>,
    },
}
