use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::mpsc;

use skald::application::ports::Notifier;
use skald::application::services::{StatusService, SubmissionService, TranscriptionWorker};
use skald::infrastructure::audio::EngineFactory;
use skald::infrastructure::notify::WebhookNotifier;
use skald::infrastructure::observability::{TracingConfig, init_tracing};
use skald::infrastructure::persistence::JobStoreFactory;
use skald::infrastructure::storage::ArtifactStoreFactory;
use skald::presentation::{AppState, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;

    init_tracing(TracingConfig::from_settings(&settings.logging));

    tracing::info!(
        environment = %settings.server.environment,
        mode = ?settings.server.mode,
        "Starting skald"
    );

    let artifact_store = ArtifactStoreFactory::create(&settings.storage)?;
    let job_store = JobStoreFactory::create(&settings.job_store).await?;
    let engine = EngineFactory::create(&settings.engine)?;

    // Presence of the URL is enforced by Settings::validate when enabled.
    let notifier: Option<Arc<dyn Notifier>> = settings
        .notifications
        .enabled
        .then(|| settings.notifications.webhook_url.clone())
        .flatten()
        .map(|url| Arc::new(WebhookNotifier::new(url)) as Arc<dyn Notifier>);

    let (sender, receiver) = mpsc::channel(settings.worker.queue_capacity);
    let deadline = Duration::from_secs(settings.worker.deadline_secs);

    let worker = TranscriptionWorker::new(
        receiver,
        Arc::clone(&engine),
        Arc::clone(&job_store),
        Arc::clone(&artifact_store),
        notifier.clone(),
        deadline,
        settings.worker.delete_staging_after,
    );
    tokio::spawn(worker.run());

    let submission_service = Arc::new(SubmissionService::new(
        Arc::clone(&artifact_store),
        Arc::clone(&job_store),
        sender,
    ));
    let status_service = Arc::new(StatusService::new(
        Arc::clone(&job_store),
        Arc::clone(&artifact_store),
    ));

    let state = AppState {
        engine,
        submission_service,
        status_service,
        notifier,
        engine_deadline: deadline,
    };

    let router = create_router(state, settings.server.mode);

    let addr = SocketAddr::new(settings.server.host.parse()?, settings.server.port);
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
