use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, bail, eyre};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use booru_view::application::{
    CredentialSource, ImageSlot, LoginRequest, LoginUseCase, PostActionsUseCase,
    RestoreSessionUseCase, SearchHistoryService, SearchPostsUseCase, Session, SlotEvent,
};
use booru_view::domain::entities::{Credentials, Post, PostId};
use booru_view::domain::ports::{PostRepository, TagRepository};
use booru_view::infrastructure::api::{
    ApiAccountRepository, ApiConfig, ApiPostRepository, ApiTagRepository, BooruClient,
    ReqwestTransport,
};
use booru_view::infrastructure::config::{CacheAction, Command};
use booru_view::infrastructure::image::{
    DiskImageCache, ImageFetcher, MemoryImageCache, RasterDecoder,
};
use booru_view::infrastructure::{
    AppConfig, CliArgs, FuzzySearcher, JsonHistoryStore, KeyringCredentialStore, StorageManager,
};

const SUGGESTION_LIMIT: usize = 10;

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = &config.log_path {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let storage = StorageManager::for_override(args.config.as_deref())?;
    let mut config = storage.load()?;
    config.merge_with_args(args);
    Ok(config)
}

fn env_credentials() -> Option<Credentials> {
    let username = std::env::var("BOORU_USERNAME").ok();
    let api_key = std::env::var("BOORU_API_KEY").ok();
    if username.is_none() && api_key.is_none() {
        return None;
    }
    Some(Credentials::new(username.as_deref(), api_key.as_deref()))
}

/// Wired adapters and use cases for one invocation.
struct App {
    config: AppConfig,
    posts: Arc<ApiPostRepository>,
    tags: Arc<ApiTagRepository>,
    accounts: Arc<ApiAccountRepository>,
    credentials: Arc<KeyringCredentialStore>,
    session: Arc<Session>,
    history: Arc<SearchHistoryService>,
}

impl App {
    fn new(config: AppConfig) -> Result<Self> {
        let base_url = config.base_url()?;
        let transport = Arc::new(ReqwestTransport::new(config.api_transport())?);
        let client = Arc::new(BooruClient::new(transport, ApiConfig::new(base_url)));
        debug!(client = ?client, "Client ready");

        Ok(Self {
            posts: Arc::new(ApiPostRepository::new(client.clone())),
            tags: Arc::new(ApiTagRepository::new(client.clone())),
            accounts: Arc::new(ApiAccountRepository::new(client.clone())),
            credentials: Arc::new(KeyringCredentialStore::new()),
            session: Arc::new(Session::new()),
            history: Arc::new(SearchHistoryService::new(Arc::new(JsonHistoryStore::new()))),
            config,
        })
    }

    fn login_use_case(&self) -> LoginUseCase {
        LoginUseCase::new(
            self.accounts.clone(),
            self.credentials.clone(),
            self.session.clone(),
        )
    }

    async fn restore(&self, verify: bool) -> Result<()> {
        let use_case = RestoreSessionUseCase::new(
            self.accounts.clone(),
            self.credentials.clone(),
            self.session.clone(),
        );
        match use_case.execute(env_credentials(), verify).await? {
            Some(restored) => debug!(source = %restored.source, "Credentials restored"),
            None => debug!("Running anonymously"),
        }
        Ok(())
    }

    async fn image_fetcher(&self) -> Result<Arc<ImageFetcher>> {
        let disk = DiskImageCache::open(AppConfig::image_cache_dir(), self.config.images.disk_cache_mb)
            .await
            .wrap_err("failed to open image cache")?;
        let transport = Arc::new(ReqwestTransport::new(self.config.image_transport())?);

        Ok(Arc::new(ImageFetcher::new(
            self.config.fetcher(),
            transport,
            Arc::new(MemoryImageCache::new(self.config.images.memory_cache_entries)),
            Arc::new(disk),
            Arc::new(RasterDecoder::default()),
        )))
    }

    async fn run(&self, command: Command) -> Result<()> {
        if !matches!(command, Command::Login { .. } | Command::Logout) {
            self.restore(matches!(command, Command::Whoami)).await?;
        }

        match command {
            Command::Login { username, api_key } => {
                let request = LoginRequest::new(
                    Credentials::from_parts(&username, &api_key),
                    CredentialSource::UserInput,
                );
                let response = self.login_use_case().execute(request).await?;
                println!("Logged in as {} (id {})", response.user.name, response.user.id);
                if !response.persisted {
                    println!("Credentials were not saved; they apply to this run only.");
                }
            }
            Command::Logout => {
                self.login_use_case().logout().await?;
                println!("Logged out");
            }
            Command::Posts { tags, page, limit } => {
                let limit = limit.unwrap_or(self.config.search.page_size);
                let posts = SearchPostsUseCase::new(self.posts.clone())
                    .with_history(self.history.clone())
                    .execute(tags.as_deref(), page, limit)
                    .await?;
                for post in &posts {
                    print_post_line(post);
                }
            }
            Command::Post { id } => {
                let post = self.posts.get(PostId(id)).await?;
                print_post(&post);
            }
            Command::Tags { prefix, limit } => {
                for tag in self.tags.search(&prefix, limit).await? {
                    let kind = tag.kind.map_or_else(String::new, |k| k.to_string());
                    println!("{:<40} {:>10} {kind}", tag.name, tag.post_count.unwrap_or(0));
                }
            }
            Command::Comments { post_id, limit } => {
                for comment in self.posts.comments(PostId(post_id), limit).await? {
                    let author = comment.creator_name.as_deref().unwrap_or("anonymous");
                    println!("#{} {author}:\n  {}", comment.id, comment.body);
                }
            }
            Command::Comment { post_id, body } => {
                let post = Post::new(post_id);
                let comment = self.post_actions().comment(&post, &body).await?;
                println!("Posted comment #{}", comment.id);
            }
            Command::Whoami => match self.session.state().user() {
                Some(user) => {
                    println!("{} (id {})", user.name, user.id);
                    if let Some(level) = &user.level {
                        println!("Level: {level}");
                    }
                }
                None => println!("Not logged in"),
            },
            Command::Favorite { id } => {
                let post = self.posts.get(PostId(id)).await?;
                let updated = self.post_actions().favorite(&post).await?;
                println!("Favorited #{id} ({} favorites)", updated.fav_count.unwrap_or(0));
            }
            Command::Unfavorite { id } => {
                let post = self.posts.get(PostId(id)).await?;
                let updated = self.post_actions().unfavorite(&post).await?;
                println!("Unfavorited #{id} ({} favorites)", updated.fav_count.unwrap_or(0));
            }
            Command::Vote { id, score } => {
                if score != 1 && score != -1 {
                    bail!("score must be 1 or -1");
                }
                let post = self.posts.get(PostId(id)).await?;
                let updated = self.post_actions().vote(&post, score).await?;
                println!("Voted on #{id} (score {})", updated.score.unwrap_or(0));
            }
            Command::FetchImage { post_id, out } => {
                let post = self.posts.get(PostId(post_id)).await?;
                let out = out.unwrap_or_else(|| PathBuf::from(format!("{post_id}.png")));
                self.fetch_image(&post, out).await?;
            }
            Command::Cache { action } => self.cache(action).await?,
            Command::History { suggest } => self.print_history(suggest.as_deref()).await,
        }

        Ok(())
    }

    fn post_actions(&self) -> PostActionsUseCase {
        PostActionsUseCase::new(self.posts.clone(), self.session.clone())
    }

    async fn fetch_image(&self, post: &Post, out: PathBuf) -> Result<()> {
        let candidates = post.image_candidates();
        if candidates.is_empty() {
            bail!("post #{} has no image", post.id);
        }

        let fetcher = self.image_fetcher().await?;
        let (slot, mut events) = ImageSlot::new(fetcher.clone());
        let generation = slot.bind(candidates);

        while let Some(event) = events.recv().await {
            match event {
                SlotEvent::Displayed { generation: g, image } if g == generation => {
                    info!(
                        url = %image.url,
                        source = %image.source,
                        width = image.image.width(),
                        height = image.image.height(),
                        "Resolved image"
                    );
                }
                SlotEvent::Settled { generation: g } if g == generation => break,
                SlotEvent::Failed { generation: g, error } if g == generation => {
                    return Err(eyre!(error)).wrap_err(format!("could not load post #{}", post.id));
                }
                _ => {}
            }
        }

        let image = slot
            .current()
            .ok_or_else(|| eyre!("image slot closed before resolving"))?;
        let png = tokio::task::spawn_blocking(move || image.image.export_png()).await??;
        tokio::fs::write(&out, png)
            .await
            .wrap_err_with(|| format!("failed to write {}", out.display()))?;

        println!("Wrote {}", out.display());
        debug!(stats = %fetcher.memory_cache_stats(), "Image fetch finished");
        Ok(())
    }

    async fn cache(&self, action: CacheAction) -> Result<()> {
        let fetcher = self.image_fetcher().await?;
        let disk = fetcher.disk_cache();
        match action {
            CacheAction::Usage => {}
            CacheAction::Clear => {
                fetcher.clear_all().await;
                println!("Cleared image cache");
            }
            CacheAction::Limit { megabytes } => {
                disk.update_limit(megabytes).await?;
                println!("Limit set to {megabytes} MB");
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let used_mb = disk.current_usage_bytes().await as f64 / (1024.0 * 1024.0);
        println!(
            "{}: {} images, {used_mb:.1} MB of {} MB",
            disk.directory().display(),
            disk.len().await,
            disk.limit_in_megabytes().await
        );
        Ok(())
    }

    async fn print_history(&self, pattern: Option<&str>) {
        let history = self.history.snapshot().await;

        if let Some(pattern) = pattern {
            let searcher = FuzzySearcher::new();
            for entry in searcher.suggest(&history, pattern, SUGGESTION_LIMIT) {
                println!("{}", entry.query);
            }
            return;
        }

        println!("Saved:");
        for entry in history.saved() {
            let pin = if entry.pinned { "*" } else { " " };
            println!(" {pin} {}", entry.query);
        }
        println!("Recent:");
        for entry in history.recent() {
            println!("   {}", entry.query);
        }
    }
}

fn print_post_line(post: &Post) {
    let rating = post.rating.map_or("-", |r| r.code());
    let tags: Vec<&str> = post.tags().take(6).collect();
    println!(
        "#{:<9} [{rating}] score {:>5}  {}",
        post.id,
        post.score.unwrap_or(0),
        tags.join(" ")
    );
}

fn print_post(post: &Post) {
    println!("Post #{}", post.id);
    if let Some(created_at) = post.created_at {
        println!("Created:  {created_at}");
    }
    if let Some(rating) = post.rating {
        println!("Rating:   {rating}");
    }
    if let (Some(width), Some(height)) = (post.width, post.height) {
        println!("Size:     {width}x{height}");
    }
    println!(
        "Score:    {} (+{} / {}), {} favorites",
        post.score.unwrap_or(0),
        post.up_score.unwrap_or(0),
        post.down_score.unwrap_or(0),
        post.fav_count.unwrap_or(0)
    );
    if let Some(source) = &post.source {
        println!("Source:   {source}");
    }
    let tags = &post.categorized_tags;
    for (label, list) in [
        ("Artists", &tags.artist),
        ("Copyright", &tags.copyright),
        ("Characters", &tags.character),
        ("General", &tags.general),
        ("Meta", &tags.meta),
    ] {
        if let Some(list) = list.as_deref().filter(|l| !l.is_empty()) {
            println!("{label:<10}{list}");
        }
    }
    for url in post.image_candidates() {
        println!("Image:    {url}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let _ = dotenvy::dotenv();

    let args = CliArgs::parse();
    let config = load_config(&args)?;
    init_logging(&config)?;

    info!(version = booru_view::VERSION, "Starting {}", booru_view::NAME);

    let app = App::new(config)?;
    app.run(args.command).await
}
