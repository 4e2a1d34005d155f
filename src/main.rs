use clap::{Parser, Subcommand};
use simple_folio::category::{self, ALL_KEY};
use simple_folio::detail::{self, DetailOutcome};
use simple_folio::gallery::{GalleryEvent, GalleryPage, GalleryState};
use simple_folio::likes::{JsonFileStore, LikeCounter};
use simple_folio::manifest::{self, DirSource};
use simple_folio::probe::SiteRootProbe;
use simple_folio::targets::{self, RenderTargets};
use simple_folio::view::SortKey;
use simple_folio::{config, generate, output};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "simple-folio")]
#[command(about = "Static site generator for design and video portfolios")]
#[command(long_about = "\
Static site generator for design and video portfolios

Projects live in hand-edited JSON manifests. The build renders a home page of
featured work, a filterable projects grid, and one detail page per project.

Site structure:

  site/
  ├── config.toml          # Site config (optional)
  ├── projects.json        # Projects page: array, or object keyed by slug
  ├── manifest.json        # Home page featured picks
  └── assets/              # Images and videos → copied to output

Project fields:
  slug, title, description, excerpt, category (comma-separated), year,
  featured, feature_rank, thumb, cover, media (paths or {file, type})

Run 'simple-folio gen-config' to generate a documented config.toml.
Set RUST_LOG=simple_folio=debug for detailed logs.")]
#[command(version = version_string())]
struct Cli {
    /// Site source directory
    #[arg(long, default_value = "site", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for local state (like counts)
    #[arg(long, default_value = ".simple-folio", global = true)]
    state_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the full static site
    Build,
    /// Validate manifests and assets without building
    Check,
    /// Show the projects grid for one tab and sort order
    Grid {
        /// Category tab to select (case-insensitive); "all" shows everything
        #[arg(long)]
        category: Option<String>,
        /// Sort order: featured or title
        #[arg(long)]
        sort: Option<String>,
        /// Print the grid HTML instead of a listing
        #[arg(long)]
        html: bool,
    },
    /// Show a project's detail page
    Detail {
        /// Project slug
        #[arg(long, conflicts_with = "query")]
        slug: Option<String>,
        /// Query string to read the slug from, e.g. "?slug=travel-app"
        #[arg(long)]
        query: Option<String>,
        /// Print the page body HTML instead of a summary
        #[arg(long)]
        html: bool,
    },
    /// Show or toggle the like counter of a page
    Like {
        /// Page path and query, e.g. "/project/travel-app.html"
        #[arg(long)]
        page: String,
        /// Like the page, or undo an earlier like
        #[arg(long)]
        toggle: bool,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "simple_folio=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Build => {
            let config = config::load_config(&cli.source)?;
            println!("==> Building {} → {}", cli.source.display(), cli.output.display());
            let report = generate::build(&cli.source, &cli.output, &config)?;
            output::print_build_output(&report);
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            let config = config::load_config(&cli.source)?;
            println!("==> Checking {}", cli.source.display());
            let plan = generate::plan(&cli.source, &config);
            output::print_check_output(&plan, &cli.source);
            if plan.gallery.load_error.is_some() || plan.home_error.is_some() {
                return Err("manifest could not be loaded".into());
            }
            println!("==> Content is valid");
        }
        Command::Grid {
            category,
            sort,
            html,
        } => {
            let config = config::load_config(&cli.source)?;
            let source = DirSource::new(&cli.source);
            let loaded = manifest::try_load_projects(&source, &config.manifests.projects)
                .map_err(|e| e.to_string());
            let state = GalleryState::new(
                loaded,
                &config.tabs,
                config.view.default_sort,
                config.site.detail_links,
            );
            let mut page = GalleryPage::new(
                state,
                RenderTargets::with_ids([
                    targets::PROJECTS_GRID,
                    targets::PROJECT_TABS,
                    targets::SORT_SELECT,
                ]),
            );
            page.mount();
            if let Some(wanted) = category {
                let keys: Vec<String> = page.state.tabs.keys().iter().map(|k| k.to_string()).collect();
                let key = if wanted.eq_ignore_ascii_case(ALL_KEY) {
                    Some(ALL_KEY)
                } else {
                    category::find_matching_category(&keys, &wanted)
                };
                match key {
                    Some(key) => {
                        page.dispatch(GalleryEvent::TabClicked(key.to_string()));
                    }
                    None => return Err(format!("no category tab matches {wanted:?}").into()),
                }
            }
            if let Some(sort) = sort {
                page.dispatch(GalleryEvent::SortChanged(SortKey::parse_lenient(&sort)));
            }
            page.probe_thumbnails(&SiteRootProbe::new(&cli.source, &config.site.origin));
            if html {
                println!("{}", page.targets.html(targets::PROJECTS_GRID));
            } else {
                output::print_grid_output(&page.state);
            }
        }
        Command::Detail { slug, query, html } => {
            let config = config::load_config(&cli.source)?;
            let slug = slug.or_else(|| query.as_deref().and_then(detail::slug_from_query));
            let source = DirSource::new(&cli.source);
            let outcome = detail::resolve_detail(slug.as_deref(), || {
                manifest::load_projects(&source, &config.manifests.projects)
            });
            let probe = SiteRootProbe::new(&cli.source, &config.site.origin);
            let mut page_targets = RenderTargets::with_ids([
                targets::PROJECT_TITLE,
                targets::PROJECT_DESC,
                targets::PROJECT_META,
                targets::PROJECT_HERO,
                targets::PROJECT_BODY,
            ]);
            let view = detail::render_detail(
                &outcome,
                &config.site.origin,
                Some(&probe),
                &mut page_targets,
            );
            if html {
                println!("{}", page_targets.html(targets::PROJECT_BODY));
            } else {
                output::print_detail_output(&outcome, view.as_ref());
            }
            if !matches!(outcome, DetailOutcome::Found(_)) {
                std::process::exit(1);
            }
        }
        Command::Like { page, toggle } => {
            let path = cli.state_dir.join("likes.json");
            let mut store = JsonFileStore::open(&path)?;
            let state = {
                let mut counter = LikeCounter::new(&mut store, &page);
                if toggle { counter.toggle() } else { counter.state() }
            };
            if toggle {
                store.save()?;
            }
            output::print_like_output(&page, state);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
