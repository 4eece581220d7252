mod cli;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use fl_auth::{
    Credentials, FileUniqueIdCache, LaunchOptions, Launcher, LauncherClient, LauncherConfig,
    LoginRequest, LoginResult, LoginState, build_launch_arguments,
};
use fl_install::{InstallError, LauncherSettings};
use tracing::{Level, error, info};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::cli::{Args, Commands, LoginArgs};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    if let Err(e) = run(args).await {
        error!("Application error: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let settings_path = match &args.settings {
        Some(path) => path.clone(),
        None => LauncherSettings::default_path()?,
    };

    let game_path = args.game_path;

    match args.command {
        Commands::Init { game_path, region } => {
            let mut settings = LauncherSettings::new(game_path);
            settings.region = region;
            settings.save(&settings_path).await?;
            println!("Settings written to {}", settings_path.display());
        }

        Commands::Status => {
            let (_, client) = prepare(&settings_path, game_path).await?;
            let gate = client.gate_status().await?;
            let login_open = client.login_status().await?;
            println!("Gate:  {}", if gate.status { "open" } else { "closed" });
            println!("Login: {}", if login_open { "open" } else { "closed" });
            for message in gate.message {
                println!("  {}", message);
            }
        }

        Commands::BootCheck => {
            let (settings, client) = prepare(&settings_path, game_path).await?;
            let patches = client
                .check_boot_version(&settings.install(), settings.force_base_version)
                .await?;
            if patches.is_empty() {
                println!("Boot is up to date");
            }
            for patch in patches {
                println!("{}\t{}\t{}", patch.version_id, patch.length, patch.url);
            }
        }

        Commands::Login(login) => {
            let (settings, client) = prepare(&settings_path, game_path).await?;
            let result = login_with(client, &settings, login).await?;
            print_login(&result);
        }

        Commands::LaunchArgs(login) => {
            let (settings, client) = prepare(&settings_path, game_path).await?;
            let result = login_with(client, &settings, login).await?;
            if result.state != LoginState::Ok {
                print_login(&result);
                bail!("Cannot launch while login state is {:?}", result.state);
            }

            let options = LaunchOptions {
                language: settings.language,
                // No ticket provider is wired into the CLI, logins are never platform mode
                platform_login: false,
                additional_arguments: settings.additional_arguments.clone(),
            };
            let arguments = build_launch_arguments(&result, &settings.install(), &options).await?;
            for (key, value) in arguments.entries() {
                println!("{}={}", key, value);
            }
        }
    }

    Ok(())
}

async fn prepare(
    settings_path: &std::path::Path,
    game_path: Option<PathBuf>,
) -> anyhow::Result<(LauncherSettings, LauncherClient)> {
    let settings = load_settings(settings_path, game_path).await?;
    let client = build_client(&settings)?;
    Ok((settings, client))
}

async fn load_settings(
    path: &std::path::Path,
    game_path: Option<PathBuf>,
) -> anyhow::Result<LauncherSettings> {
    let settings = match LauncherSettings::load(path).await {
        Ok(mut settings) => {
            if let Some(game_path) = game_path {
                settings.game_path = game_path;
            }
            settings
        }
        Err(InstallError::SettingsFileNotFound { .. }) => {
            let game_path = game_path.with_context(|| {
                format!(
                    "No settings at {}; run `init` or pass --game-path",
                    path.display()
                )
            })?;
            LauncherSettings::new(game_path)
        }
        Err(e) => return Err(e.into()),
    };

    info!(game_path = %settings.game_path.display(), "Using game install");
    Ok(settings)
}

fn build_client(settings: &LauncherSettings) -> anyhow::Result<LauncherClient> {
    let mut config = LauncherConfig::new(settings.language);
    config.transport.legacy_cipher_suite = settings.legacy_tls;
    Ok(LauncherClient::new(config)?)
}

async fn login_with(
    client: LauncherClient,
    settings: &LauncherSettings,
    login: LoginArgs,
) -> anyhow::Result<LoginResult> {
    let use_cache = settings.use_unique_id_cache && !login.no_cache;

    let mut launcher = Launcher::new(client);
    if use_cache {
        let cache = FileUniqueIdCache::new(FileUniqueIdCache::default_storage_dir()?).await?;
        launcher = launcher.with_cache(Arc::new(cache));
    }

    let mut request = LoginRequest::new(
        Credentials::new(login.user, login.password, login.otp),
        settings.region,
    );
    request.free_trial = settings.free_trial;
    request.use_cache = use_cache;
    request.force_base_version = settings.force_base_version;
    request.check_login_status = login.check_login_status;

    Ok(launcher.login(&request, &settings.install()).await?)
}

fn print_login(result: &LoginResult) {
    println!("State: {:?}", result.state);
    if let Some(oauth) = &result.oauth_login {
        println!("Region: {}", oauth.region);
        println!("Max expansion: {}", oauth.max_expansion);
    }
    if !result.pending_patches.is_empty() {
        println!("Pending patches:");
        for patch in &result.pending_patches {
            println!("  {}\t{}", patch.version_id, patch.length);
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}
