#[macro_use]
extern crate guard;

use anyhow::{anyhow, bail, Context};
use chrono::offset::Utc;
use postview::client::http::HttpClient;
use postview::client::Client;
use postview::config::Config;
use postview::export::{ExportFormat, ExportRequest};
use postview::metrics;
use postview::query::{self, PageSize, SortKey};
use postview::twoface::TfError;
use postview::view::{FetchOutcome, PostsView};
use tracing::{error, info, warn, Level};

const USAGE: &str = "usage: postview <config.toml> <command> [args] [--metrics]

commands:
  list [QUERY] [--sort KEY] [--page-size N] [--next|--previous]
      print one page of posts
  export <csv|excel> [QUERY] [--columns a,b]
      save every matching post to a file; a listing runs alongside only to log how many rows
      to expect
  channels
      print the channels posts can be filtered by
  post <ID>
      print one post

QUERY is a URL query string, e.g. 'channel_id=5&content_type=photo&sort_by=views&page=2'.
--sort sorts by KEY descending, or flips the order if QUERY already sorts by KEY.
--next and --previous move from the page in QUERY, once its total is known.";

fn main() {
    let args: Vec<_> = std::env::args().collect();
    guard!(let [_, config_file_path, command, ..] = &args[..] else {
        eprintln!("{}", USAGE);
        std::process::exit(2)
    });

    let config = match Config::from_file(config_file_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(2)
        }
    };

    // Set up logger output. Results go to stdout, so logs go to stderr.
    let subscriber_builder = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_writer(std::io::stderr);
    if config.human_logs {
        subscriber_builder.init();
    } else {
        subscriber_builder.json().init();
    }

    info!(command = command.as_str(), "starting postview");

    let command = command.clone();
    let rest = args[3..].to_vec();
    let mut sys = actix_rt::System::new("postview");
    if let Err(e) = sys.block_on(async move { run(config, &command, &rest).await }) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

/// Which way `--next`/`--previous` moves the cursor.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Step {
    Next,
    Previous,
}

/// Positional arguments and flags after the command name.
#[derive(Debug, Default, PartialEq)]
struct Invocation {
    positional: Vec<String>,
    columns: Vec<String>,
    sort: Option<SortKey>,
    page_size: Option<PageSize>,
    step: Option<Step>,
    metrics: bool,
}

impl Invocation {
    fn parse(args: &[String]) -> anyhow::Result<Self> {
        let mut invocation = Invocation::default();
        let mut args = args.iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--metrics" => invocation.metrics = true,
                "--columns" => {
                    let columns = args.next().context("--columns needs a value")?;
                    invocation.columns = columns.split(',').map(str::to_owned).collect();
                }
                "--sort" => {
                    let key = args.next().with_context(|| {
                        let keys: Vec<_> = SortKey::ALL.iter().map(|k| k.as_str()).collect();
                        format!("--sort needs one of {}", keys.join(", "))
                    })?;
                    invocation.sort = Some(key.parse()?);
                }
                "--page-size" => {
                    let size = args.next().context("--page-size needs a value")?;
                    let size: u32 = size.parse().context("--page-size must be a number")?;
                    invocation.page_size = Some(PageSize::new(size)?);
                }
                "--next" => invocation.step = Some(Step::Next),
                "--previous" => invocation.step = Some(Step::Previous),
                flag if flag.starts_with("--") => bail!("unknown flag {}", flag),
                _ => invocation.positional.push(arg.clone()),
            }
        }
        Ok(invocation)
    }

    fn query(&self, index: usize) -> &str {
        self.positional.get(index).map_or("", String::as_str)
    }
}

async fn run(config: Config, command: &str, rest: &[String]) -> anyhow::Result<()> {
    let invocation = Invocation::parse(rest)?;
    let client = HttpClient::new(&config)?;
    match command {
        "list" => list(&client, &config, &invocation).await?,
        "export" => {
            let format: ExportFormat = invocation
                .positional
                .first()
                .context("export needs a format: csv or excel")?
                .parse()?;
            let mut request = ExportRequest::new(format);
            request.columns = invocation.columns.clone();
            export(&client, &config, request, invocation.query(1)).await?
        }
        "channels" => channels(&client, &config).await?,
        "post" => {
            let id: i64 = invocation
                .positional
                .first()
                .context("post needs an id")?
                .parse()
                .context("post id must be a number")?;
            guard!(let Some(post) = client.get_post(id).await.map_err(TfError::into_anyhow)? else {
                bail!("post {} not found", id)
            });
            println!("{}", serde_json::to_string(&post)?);
        }
        other => bail!("unknown command {:?}\n\n{}", other, USAGE),
    }
    if invocation.metrics {
        print!("{}", metrics::render()?);
    }
    Ok(())
}

fn open_view(config: &Config, query: &str) -> anyhow::Result<PostsView> {
    let seed = query::parse_seed(query)?;
    let page = seed.page_state(config.default_page_size()?);
    Ok(PostsView::seeded(seed.filters, page))
}

async fn list(client: &HttpClient, config: &Config, invocation: &Invocation) -> anyhow::Result<()> {
    let mut view = open_view(config, invocation.query(0))?;
    if let Some(key) = invocation.sort {
        view.toggle_sort(key);
    }
    if let Some(page_size) = invocation.page_size {
        view.set_page_size(page_size);
    }
    fetch(client, &mut view).await?;
    if let Some(step) = invocation.step {
        // Moving needs the total from the first fetch.
        match step {
            Step::Next => view.next_page(),
            Step::Previous => view.previous_page(),
        }
        fetch(client, &mut view).await?;
    }
    for post in view.rows() {
        println!("{}", serde_json::to_string(post)?);
    }
    let page = view.page();
    let window: Vec<String> = page.page_window().map(|p| p.to_string()).collect();
    info!(
        page = page.page(),
        total_pages = page.total_pages(),
        total = page.total(),
        pages = window.join(" ").as_str(),
        has_previous = page.has_previous(),
        has_next = page.has_next(),
        filtered = view.filters().has_active_filters(),
        "listed posts"
    );
    Ok(())
}

async fn fetch(client: &HttpClient, view: &mut PostsView) -> anyhow::Result<()> {
    if view.refresh(client).await == FetchOutcome::Failed {
        bail!(view.error().unwrap_or("listing failed").to_owned());
    }
    Ok(())
}

async fn export(
    client: &HttpClient,
    config: &Config,
    request: ExportRequest,
    query: &str,
) -> anyhow::Result<()> {
    let mut view = open_view(config, query)?;
    let snapshot = view.clone();
    let today = Utc::now().date_naive();
    // The export doesn't wait on the listing; the listing only reports how many rows to expect.
    let (outcome, exported) = futures::join!(
        view.refresh(client),
        snapshot.export(client, &request, today)
    );
    if outcome == FetchOutcome::Applied {
        info!(matching = view.page().total(), "exporting posts");
    } else {
        warn!("couldn't count matching posts");
    }
    let artifact = exported.map_err(TfError::into_anyhow)?;
    let path = artifact.save(&config.export_dir())?;
    println!("{}", path.display());
    Ok(())
}

async fn channels(client: &HttpClient, config: &Config) -> anyhow::Result<()> {
    let mut view = PostsView::new(config.default_page_size()?);
    view.load_channels(client)
        .await
        .map_err(TfError::into_anyhow)?;
    if view.channels().is_empty() {
        return Err(anyhow!("no channels yet"));
    }
    for channel in view.channels() {
        println!("{}", serde_json::to_string(channel)?);
    }
    Ok(())
}
