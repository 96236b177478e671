//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use forge_core::DEFAULT_WINDOW;

/// A tool to work with vendor-format access tokens.
#[derive(Parser, Debug)]
#[command(name = "token-forge")]
#[command(about = "A tool to 'work' with GitHub-style access tokens")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub globals: Globals,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags shared by every command.
#[derive(Args, Debug, Clone)]
pub struct Globals {
    /// Enable debug mode (debug logging and per-result output)
    #[arg(long, global = true)]
    pub debug: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print version and exit
    Version,

    /// Generate tokens
    #[command(visible_alias = "gen")]
    Generate(TokenParams),

    /// Disect tokens into their segments
    #[command(visible_alias = "dis")]
    Disect(DisectArgs),

    /// Test login with one or more tokens
    Login(LoginArgs),

    /// Perform a local collision test
    Local(LocalArgs),

    /// Check the resolved public ip address
    #[command(name = "ip-check", visible_alias = "ip")]
    IpCheck(ProxyArgs),
}

/// Where tokens come from; exactly one must be given.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct SourceArgs {
    /// Token to use
    #[arg(short, long)]
    pub token: Option<String>,

    /// Path to file with tokens
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Use one or more generated tokens
    #[arg(short, long)]
    pub generated: bool,

    /// Query the rate limit api with an unauthenticated client
    #[arg(short = 'x', long)]
    pub no_auth: bool,
}

/// Token generation parameters.
#[derive(Args, Debug, Clone)]
pub struct TokenParams {
    /// Number of tokens (for files, the most to load; 0 loads all)
    #[arg(short = 'n', long, default_value_t = 1)]
    pub num_tokens: u64,

    /// Token prefix; random per token when empty; only used when generating
    #[arg(short, long, default_value = "")]
    pub prefix: String,
}

/// Probe window.
#[derive(Args, Debug, Clone)]
pub struct WindowArgs {
    /// Number of tokens to test concurrently
    #[arg(short = 'b', long, default_value_t = DEFAULT_WINDOW)]
    pub batch_size: usize,
}

/// Outbound proxy.
#[derive(Args, Debug, Clone)]
pub struct ProxyArgs {
    /// Proxy to use for outbound connections
    #[arg(long, default_value = "")]
    pub proxy: String,
}

#[derive(Args, Debug, Clone)]
pub struct DisectArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub params: TokenParams,
}

#[derive(Args, Debug, Clone)]
pub struct LoginArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub params: TokenParams,

    #[command(flatten)]
    pub window: WindowArgs,

    #[command(flatten)]
    pub proxy: ProxyArgs,

    /// Look up the user behind every token so the rate limit is consumed
    #[arg(short = 'c', long)]
    pub force_check: bool,

    /// Enterprise hostname; the public api is used when empty
    #[arg(long, default_value = "")]
    pub host: String,
}

#[derive(Args, Debug, Clone)]
pub struct LocalArgs {
    #[command(flatten)]
    pub params: TokenParams,

    #[command(flatten)]
    pub window: WindowArgs,

    /// Number of tokens to load into the test set
    #[arg(short = 't', long, default_value_t = 1)]
    pub num_tests: u64,
}
