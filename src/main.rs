use clap::Parser;
use copydesk::adapters::api_handler::ApiState;
use copydesk::adapters::content_store::ContentStore;
use copydesk::adapters::editor::Editor;
use copydesk::adapters::publisher::ContentPublisher;
use copydesk::adapters::save_orchestrator::SaveOrchestrator;
use copydesk::adapters::upload_queue::UploadQueue;
use copydesk::cli::Cli;
use copydesk::config::Settings;
use copydesk::domain::PublisherPort;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let cli = Cli::parse();
    let settings = Settings::new_with_cli(&cli)?;
    let host = settings.server.host.clone();
    let port = settings.server.port;

    info!("Starting Copydesk content admin on {}:{}", host, port);

    // Load the editor session from the local content directory
    let store = ContentStore::load_dir(&settings.content.dir, settings.content.domains.clone())?;
    let queue = UploadQueue::new();
    let editor = Editor::new(
        store.clone(),
        queue.clone(),
        settings.repository.asset_base_path.clone(),
    );

    // Publishing is optional: without repository settings the session still
    // edits locally, and saves report the missing configuration
    let publisher: Option<Arc<dyn PublisherPort>> = if settings.repository.is_configured() {
        match ContentPublisher::new(&settings.repository) {
            Ok(publisher) => Some(Arc::new(publisher)),
            Err(e) => {
                warn!("Repository publishing disabled: {e}");
                None
            }
        }
    } else {
        warn!("Repository settings incomplete, publishing disabled");
        None
    };

    let orchestrator = Arc::new(SaveOrchestrator::new(
        store.clone(),
        queue.clone(),
        publisher.clone(),
        settings.deploy.hook_url.clone(),
    ));

    let app = copydesk::create_app(ApiState {
        store,
        queue,
        editor,
        orchestrator,
        publisher,
    });

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
