use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use folio_console::config::Config;
use folio_console::console::{
    operator_message, DeveloperConsole, HomeView, LOGIN_REJECTED, SAVE_FAILED, SAVE_SUCCEEDED,
    SYNC_FAILED, SYNC_SUCCEEDED,
};
use folio_console::editor::asset::PendingAsset;
use folio_console::editor::preview::PreviewRegistry;
use folio_console::models::PortfolioDocument;
use folio_console::routes::{Navigator, Route};
use folio_console::session::guard::Guard;
use folio_console::session::store::FileCredentialStore;
use folio_console::session::SessionContext;
use folio_console::sync_client::SyncClient;

#[derive(Debug, Parser)]
#[command(name = "folio", version, about = "Portfolio developer console")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Exchange the admin password for a stored credential.
    Login {
        #[arg(long, env = "FOLIO_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored credential.
    Logout,
    /// Resolve a client route the way the site router would.
    Open { path: String },
    /// Print the public portfolio document.
    Show,
    /// Upload edits and pending files, then print the re-fetched document.
    Save {
        /// Replace the loaded document with this JSON file before saving.
        #[arg(long)]
        document: Option<PathBuf>,
        /// Experience logo, as INDEX=PATH.
        #[arg(long = "logo", value_parser = parse_indexed_path)]
        logos: Vec<(usize, PathBuf)>,
        /// Project cover image, as INDEX=PATH.
        #[arg(long = "cover", value_parser = parse_indexed_path)]
        covers: Vec<(usize, PathBuf)>,
        /// Skill icon for an existing skill, as INDEX=PATH.
        #[arg(long = "icon", value_parser = parse_indexed_path)]
        icons: Vec<(usize, PathBuf)>,
        /// Append a skill by name.
        #[arg(long = "add-skill")]
        add_skills: Vec<String>,
        #[arg(long)]
        resume: Option<PathBuf>,
    },
    /// Push a resume PDF to the ingestion service and print the refreshed document.
    SyncResume { pdf: PathBuf },
}

fn parse_indexed_path(raw: &str) -> Result<(usize, PathBuf), String> {
    let (index, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected INDEX=PATH, got '{raw}'"))?;
    let index = index
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("bad index '{index}': {e}"))?;
    Ok((index, PathBuf::from(path)))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Load configuration first
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "folio_console={0},folio={0}",
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Folio console v{}", env!("CARGO_PKG_VERSION"));

    let store = Arc::new(FileCredentialStore::new(&config.credential_path));
    let session = Arc::new(
        SessionContext::restore(store)
            .with_context(|| format!("Reading {}", config.credential_path.display()))?,
    );
    let client = SyncClient::new(&config, session.clone())?;
    let mut navigator = Navigator::new(
        Guard::new(session.clone(), config.guard_policy),
        config.catch_all,
    );

    match cli.command {
        Command::Login { password } => {
            navigator.navigate(Route::Login.path());
            match client.login(&password).await {
                Ok(_) => {
                    let landed = navigator.complete_login();
                    println!("Authorized. Continue at {}", landed.landed.path());
                }
                Err(e) if e.is_unauthorized() => {
                    eprintln!("{LOGIN_REJECTED}");
                    return Ok(ExitCode::FAILURE);
                }
                Err(e) => {
                    eprintln!("{LOGIN_REJECTED} ({})", operator_message(&e));
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Command::Logout => {
            client.logout()?;
            println!("Signed out");
        }
        Command::Open { path } => {
            let outcome = navigator.navigate(&path);
            if outcome.redirected {
                println!("{} -> {}", outcome.requested, outcome.landed.path());
            } else {
                println!("{}", outcome.landed.path());
            }
        }
        Command::Show => {
            let home = HomeView::load(&client).await;
            println!("{}", serde_json::to_string_pretty(home.document())?);
        }
        Command::Save {
            document,
            logos,
            covers,
            icons,
            add_skills,
            resume,
        } => {
            if !enter_console(&mut navigator) {
                return Ok(ExitCode::FAILURE);
            }
            let previews = PreviewRegistry::new();
            let mut console =
                DeveloperConsole::new(client, previews.clone(), config.status_reset);

            match document {
                Some(path) => {
                    let raw = tokio::fs::read_to_string(&path)
                        .await
                        .with_context(|| format!("Reading {}", path.display()))?;
                    let edited: PortfolioDocument = serde_json::from_str(&raw).with_context(
                        || format!("{} is not a portfolio document", path.display()),
                    )?;
                    console.replace_document(edited);
                }
                None => {
                    // Saving on top of a fallback document would erase the live portfolio.
                    if let Err(e) = console.try_load().await {
                        eprintln!("Could not load the portfolio: {}", operator_message(&e));
                        return Ok(ExitCode::FAILURE);
                    }
                }
            }

            for name in &add_skills {
                console.session_mut().add_skill(name, None);
            }
            for (index, path) in logos {
                let asset = PendingAsset::from_path(&path, &previews).await?;
                if !console.session_mut().attach_logo(index, asset) {
                    eprintln!("No experience entry at index {index}; skipping {}", path.display());
                }
            }
            for (index, path) in covers {
                let asset = PendingAsset::from_path(&path, &previews).await?;
                if !console.session_mut().attach_cover(index, asset) {
                    eprintln!("No project at index {index}; skipping {}", path.display());
                }
            }
            for (index, path) in icons {
                let asset = PendingAsset::from_path(&path, &previews).await?;
                if !console.session_mut().attach_skill_icon(index, asset) {
                    eprintln!("No skill at index {index}; skipping {}", path.display());
                }
            }
            if let Some(path) = resume {
                let asset = PendingAsset::from_path(&path, &previews).await?;
                console.session_mut().attach_resume(asset);
            }

            match console.save().await {
                Ok(()) => {
                    println!("{SAVE_SUCCEEDED}");
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&console.session().document())?
                    );
                }
                Err(e) => {
                    eprintln!("{SAVE_FAILED}: {}", operator_message(&e));
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Command::SyncResume { pdf } => {
            if config.sync_requires_auth && !enter_console(&mut navigator) {
                return Ok(ExitCode::FAILURE);
            }
            let previews = PreviewRegistry::new();
            let resume = PendingAsset::from_path(&pdf, &previews).await?;
            let mut home = HomeView::load(&client).await;
            let mut console = DeveloperConsole::new(client, previews, config.status_reset);

            match console.sync_resume(resume).await {
                Ok(()) => {
                    let before = home.document().experience.len();
                    home.apply_snapshot(console.session().document());
                    println!("{SYNC_SUCCEEDED}");
                    println!(
                        "Home view: {} experience entries (was {before})",
                        home.document().experience.len()
                    );
                    println!("{}", serde_json::to_string_pretty(home.document())?);
                }
                Err(e) => {
                    eprintln!("{SYNC_FAILED}: {}", operator_message(&e));
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Navigates to the console, reporting the redirect when the guard refuses.
fn enter_console(navigator: &mut Navigator) -> bool {
    let outcome = navigator.navigate(Route::Console.path());
    if outcome.landed == Route::Console {
        return true;
    }
    eprintln!(
        "Access denied; redirected to {}. Run `folio login` first.",
        outcome.landed.path()
    );
    false
}
