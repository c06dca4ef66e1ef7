use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use cli::app;
use cli::render;
use cli::shell::{self, Flow, Shell};
use std::io::Write;
use std::path::PathBuf;
use tagger_core::config;
use tagger_core::config::AppConfig;
use tagger_core::models::BatchPosition;
use tagger_core::session::TaggerSession;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut cfg = config::load(cli.config.as_deref())?;
    if let Some(url) = cli.server {
        cfg.server.base_url = url;
    }

    match cli.command {
        Commands::Scan { folder } => run_scan(cfg, &folder, cli.json).await,
        Commands::Tags { folder, filter } => run_tags(cfg, &folder, filter, cli.json).await,
        Commands::Show { folder, image } => run_show(cfg, &folder, &image, cli.json).await,
        Commands::Save {
            folder,
            image,
            content,
        } => run_save(cfg, &folder, &image, &content).await,
        Commands::Add {
            folder,
            content,
            position,
        } => run_add(cfg, &folder, &content, position, cli.yes).await,
        Commands::DeleteTag { folder, tag } => run_delete(cfg, &folder, &tag, cli.yes).await,
        Commands::Thumbnail { image, out } => run_thumbnail(cfg, &image, out).await,
        Commands::Theme { toggle } => run_theme(cfg, toggle).await,
        Commands::Shell { folder } => run_shell(cfg, folder, cli.yes).await,
    }
}

#[derive(Parser)]
#[command(name = "tagger")]
#[command(about = "Browse and tag images through an annotation server", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    /// Annotation server base URL (overrides config)
    #[arg(long)]
    server: Option<String>,

    /// Answer yes to every confirmation
    #[arg(short, long, global = true, default_value_t = false)]
    yes: bool,

    /// Output JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a folder and list its images and top tags
    Scan { folder: String },
    /// Show the most frequent tags, optionally with a tag filter applied
    Tags {
        folder: String,
        /// Tag to filter the image list by
        #[arg(long)]
        filter: Option<String>,
    },
    /// Preview one image's annotation
    Show { folder: String, image: String },
    /// Save an annotation immediately
    Save {
        folder: String,
        image: String,
        content: String,
    },
    /// Add annotation content to every image of the folder
    Add {
        folder: String,
        content: String,
        /// Where to insert: start|end
        #[arg(long, default_value = "end")]
        position: BatchPosition,
    },
    /// Delete a tag from every image of the folder
    DeleteTag { folder: String, tag: String },
    /// Fetch a thumbnail (a placeholder SVG is written when it cannot be loaded)
    Thumbnail {
        image: String,
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Show or toggle the light/dark preference
    Theme {
        #[arg(long, default_value_t = false)]
        toggle: bool,
    },
    /// Interactive session
    Shell { folder: Option<String> },
}

async fn scanned(cfg: &AppConfig, folder: &str, assume_yes: bool) -> Result<TaggerSession> {
    let mut session = app::terminal_session(cfg, assume_yes)?;
    session.scan_folder(folder).await?;
    Ok(session)
}

fn print_frame(session: &TaggerSession, marker: &str, json: bool) -> Result<()> {
    let frame = session.frame();
    if json {
        println!("{}", serde_json::to_string_pretty(&frame)?);
    } else {
        print!("{}", render::frame_text(&frame, marker));
    }
    Ok(())
}

async fn run_scan(cfg: AppConfig, folder: &str, json: bool) -> Result<()> {
    let theme = app::theme(&cfg).await?;
    let session = scanned(&cfg, folder, false).await?;
    print_frame(&session, theme.marker(), json)?;
    session.shutdown().await;
    Ok(())
}

async fn run_tags(cfg: AppConfig, folder: &str, filter: Option<String>, json: bool) -> Result<()> {
    let mut session = scanned(&cfg, folder, false).await?;
    if let Some(tag) = filter {
        session.toggle_filter(&tag);
    }
    let frame = session.frame();
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "tags": frame.tags,
                "visible": frame.tiles.len(),
                "total": frame.total,
            }))?
        );
    } else {
        println!("{}", render::tags_line(&frame.tags));
        println!("{} of {} images", frame.tiles.len(), frame.total);
    }
    session.shutdown().await;
    Ok(())
}

async fn run_show(cfg: AppConfig, folder: &str, image: &str, json: bool) -> Result<()> {
    let mut session = scanned(&cfg, folder, false).await?;
    if session.select_path(image).is_none() {
        bail!("{image} is not part of {folder}");
    }
    let preview = session.frame().preview;
    if json {
        println!("{}", serde_json::to_string_pretty(&preview)?);
    } else if let Some(p) = preview {
        println!("{}\n{}", p.image_path, p.annotation);
    }
    session.shutdown().await;
    Ok(())
}

async fn run_save(cfg: AppConfig, folder: &str, image: &str, content: &str) -> Result<()> {
    let mut session = scanned(&cfg, folder, false).await?;
    if session.select_path(image).is_none() {
        bail!("{image} is not part of {folder}");
    }
    session.save(content).await?;
    println!("saved");
    session.shutdown().await;
    Ok(())
}

async fn run_add(
    cfg: AppConfig,
    folder: &str,
    content: &str,
    position: BatchPosition,
    yes: bool,
) -> Result<()> {
    let mut session = scanned(&cfg, folder, yes).await?;
    if let Some(handle) = session.add_batch(content, position)? {
        let summary = handle.settle().await;
        println!("sent {} saves, {} failed", summary.sent, summary.failed);
    }
    session.shutdown().await;
    Ok(())
}

async fn run_delete(cfg: AppConfig, folder: &str, tag: &str, yes: bool) -> Result<()> {
    let mut session = scanned(&cfg, folder, yes).await?;
    if let Some(handle) = session.delete_tag(tag) {
        let summary = handle.settle().await;
        println!("sent {} saves, {} failed", summary.sent, summary.failed);
    }
    session.shutdown().await;
    Ok(())
}

async fn run_thumbnail(cfg: AppConfig, image: &str, out: PathBuf) -> Result<()> {
    let session = app::terminal_session(&cfg, false)?;
    let thumb = session.thumbnail(image).await;
    std::fs::write(&out, thumb.bytes())?;
    println!("wrote {}", out.display());
    session.shutdown().await;
    Ok(())
}

async fn run_theme(cfg: AppConfig, toggle: bool) -> Result<()> {
    let mut theme = app::theme(&cfg).await?;
    if toggle {
        theme.toggle().await?;
    }
    println!("{} {}", theme.marker(), theme.current());
    Ok(())
}

async fn run_shell(cfg: AppConfig, folder: Option<String>, yes: bool) -> Result<()> {
    let theme = app::theme(&cfg).await?;
    let session = app::terminal_session(&cfg, yes)?;
    let mut shell = Shell::new(session, theme);
    let mut stdout = std::io::stdout();

    if let Some(folder) = folder {
        shell.execute(shell::ShellCommand::Scan(folder), &mut stdout).await?;
    } else {
        writeln!(stdout, "{}", shell::HELP)?;
    }

    let stdin = std::io::stdin();
    loop {
        write!(stdout, "{} > ", shell.theme().marker())?;
        stdout.flush()?;
        let mut line = String::new();
        let read = tokio::task::block_in_place(|| stdin.read_line(&mut line))?;
        if read == 0 {
            break;
        }
        match shell::parse(&line) {
            Ok(Some(cmd)) => {
                if shell.execute(cmd, &mut stdout).await? == Flow::Quit {
                    break;
                }
            }
            Ok(None) => {}
            Err(msg) => writeln!(stdout, "{msg}")?,
        }
    }

    let summary = shell.finish().await;
    if summary.sent > 0 {
        println!("batch saves: {} sent, {} failed", summary.sent, summary.failed);
    }
    Ok(())
}
