use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "frontier-launcher", version, about = "FFXIV login and version checks from the command line")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Game install directory, overrides the settings file
    #[arg(long, global = true)]
    pub game_path: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a settings file pointing at a game install
    Init {
        game_path: PathBuf,
        #[arg(long, default_value_t = 3)]
        region: u32,
    },

    /// Show world gate and login server status
    Status,

    /// Check whether the boot files need patching
    BootCheck,

    /// Log in and register the session with the patch server
    Login(LoginArgs),

    /// Log in and print the arguments the game would be started with
    LaunchArgs(LoginArgs),
}

#[derive(ClapArgs, Debug)]
pub struct LoginArgs {
    /// Square Enix account id
    #[arg(short, long)]
    pub user: String,

    /// Account password
    #[arg(long, env = "FL_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// One-time password, if the account uses one
    #[arg(long, default_value = "")]
    pub otp: String,

    /// Skip the unique-id cache for this login
    #[arg(long)]
    pub no_cache: bool,

    /// Stop early when the login servers report closed
    #[arg(long)]
    pub check_login_status: bool,
}
