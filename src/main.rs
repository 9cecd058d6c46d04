use anyhow::{Context, Result};
use language_reach::config::Config;
use language_reach::views::Viewport;
use language_reach::{loader, App, SyncSnapshot};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

const LOAD_FAILED_MESSAGE: &str = "Unable to load language data. Please reload.";

const HELP: &str = "\
Commands:
  toggle <code>      select or deselect a language
  all                select every language
  clear              deselect everything
  search <query>     filter the language list
  list               show the (filtered) language list
  hover <country>    show the map tooltip for a country code
  resize <w> <h>     re-lay out the map
  show               print the summary and selection
  help               show this message
  quit               exit";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when not present)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("language_reach=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;

    info!(
        "Loading assets: {} and {}",
        config.languages_source, config.world_source
    );
    let dataset = match loader::load_dataset(&config.loader()).await {
        Ok(dataset) => dataset,
        Err(e) => {
            error!("Initialization aborted: {}", e);
            eprintln!("{}", LOAD_FAILED_MESSAGE);
            std::process::exit(1);
        }
    };

    let mut app = App::standard(dataset, config.viewport());
    let output_dir = Path::new(&config.output_dir);
    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("Failed to create output directory {}", config.output_dir))?;

    let snapshot = app.initialize(config.default_selection);
    export_views(output_dir, snapshot).await?;
    print_summary(&app);
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };
        let rest: Vec<&str> = words.collect();

        match (command, rest.as_slice()) {
            ("toggle", [code]) => {
                let snapshot = app.toggle(code);
                export_views(output_dir, snapshot).await?;
                print_summary(&app);
            }
            ("all", []) => {
                let snapshot = app.select_all();
                export_views(output_dir, snapshot).await?;
                print_summary(&app);
            }
            ("clear", []) => {
                let snapshot = app.clear();
                export_views(output_dir, snapshot).await?;
                print_summary(&app);
            }
            ("search", query) => {
                app.search(&query.join(" "));
                print_options(&app);
            }
            ("list", []) => print_options(&app),
            ("hover", [country]) => println!("{}", app.hover(country)),
            ("resize", [width, height]) => match (width.parse::<f64>(), height.parse::<f64>()) {
                (Ok(width), Ok(height)) => {
                    let snapshot = app.relayout(Viewport::new(width, height));
                    export_views(output_dir, snapshot).await?;
                }
                _ => warn!("resize expects two numbers, got '{} {}'", width, height),
            },
            ("show", []) => print_summary(&app),
            ("help", _) => println!("{}", HELP),
            ("quit", _) | ("exit", _) => break,
            _ => println!("Unknown command '{}'. Type 'help' for commands.", line.trim()),
        }
    }

    let report = app.synchronizer().metrics().report();
    info!("Session finished: {}", serde_json::to_string(&report)?);
    Ok(())
}

/// Write each view's latest output into the output directory.
async fn export_views(dir: &Path, snapshot: &SyncSnapshot) -> Result<()> {
    for output in &snapshot.outputs {
        let path = dir.join(output.file_name());
        tokio::fs::write(&path, output.to_document())
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}

fn print_summary(app: &App) {
    let snapshot = app.snapshot();
    let languages = app.dataset().selected(&snapshot.selection);
    let selected: Vec<&str> = languages
        .iter()
        .map(|language| language.name.as_str())
        .collect();

    if snapshot.summary.is_empty() {
        println!("{}", language_reach::summary::NO_SELECTION_MESSAGE);
        return;
    }
    println!("Selected: {}", selected.join(", "));
    println!(
        "{} ({}), {} countries highlighted",
        snapshot.summary.people_text(),
        snapshot.summary.percent_text(),
        snapshot.index.len()
    );
}

fn print_options(app: &App) {
    let members = app.members();
    for option in app.catalog().visible() {
        let mark = if members.contains(&option.iso_code) { "x" } else { " " };
        println!("[{}] {:<6} {}", mark, option.iso_code, option.label);
    }
}
