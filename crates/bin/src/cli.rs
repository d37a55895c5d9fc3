//! CLI argument definitions for the Dramatis binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Backend type
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Backend {
    /// Local JSON-file backend (default, fully offline)
    Memory,
    /// Supabase-style hosted backend
    Remote,
}

/// Dramatis character-book client
#[derive(Parser, Debug)]
#[command(name = "dramatis")]
#[command(about = "Dramatis: character libraries from the command line")]
#[command(version)]
pub struct Cli {
    /// Backend to use
    #[arg(short, long, default_value = "memory", env = "DRAMATIS_BACKEND")]
    pub backend: Backend,

    /// Data directory for the local backend (stores dramatis.json)
    #[arg(short = 'D', long, env = "DRAMATIS_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Project URL (required when backend=remote)
    #[arg(long, env = "DRAMATIS_URL")]
    pub url: Option<String>,

    /// Public API key (required when backend=remote)
    #[arg(long, env = "DRAMATIS_API_KEY")]
    pub api_key: Option<String>,

    /// Sign in before running the command (needed for authenticated
    /// commands on the remote backend, which holds no session between runs)
    #[arg(long, env = "DRAMATIS_EMAIL", global = true)]
    pub email: Option<String>,

    /// Password for --email
    #[arg(long, env = "DRAMATIS_PASSWORD", global = true)]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an account and sign in
    Register(RegisterArgs),
    /// Sign in with an existing account
    Login(LoginArgs),
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List public libraries available to browse
    Libraries,
    /// Show a character collection (your own, or --owner's)
    Characters(CharactersArgs),
    /// Create a character in your library
    Create(CreateArgs),
    /// Delete a character from your library
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct RegisterArgs {
    /// Public display name
    #[arg(long)]
    pub username: String,

    /// Login email address
    #[arg(long)]
    pub email: String,

    /// Password
    #[arg(long)]
    pub password: String,
}

#[derive(clap::Args, Debug)]
pub struct LoginArgs {
    /// Login email address
    #[arg(long)]
    pub email: String,

    /// Password
    #[arg(long)]
    pub password: String,
}

#[derive(clap::Args, Debug)]
pub struct CharactersArgs {
    /// Browse another user's library by account id
    #[arg(long)]
    pub owner: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct CreateArgs {
    /// Character name
    pub name: String,

    /// Portrait image URL or data URL
    #[arg(long)]
    pub image: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Character record id (see `characters`)
    pub id: String,
}
