//! Patchwise CLI entrypoint: review one pull request as a GitHub App.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use ortho_config::OrthoConfig;
use patchwise::github::{PullRequestGateway, ReviewPublisher};
use patchwise::{
    AppAssertionSigner, DryRunPublisher, FeedbackModel, GeminiFeedbackModel,
    InstallationCredentials, OctocrabGateway, PatchwiseConfig, PullRequestLocator, ReviewError,
    ReviewOrchestrator, ReviewSummary, SystemClock, TokenLifecycleManager,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

/// Installs a stderr subscriber filtered by `RUST_LOG`, defaulting to `info`.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run() -> Result<(), ReviewError> {
    let config = load_config()?;
    config.validate()?;

    let locator = config.resolve_locator()?;
    let installation_id = config.resolve_installation_id()?;
    let signer = AppAssertionSigner::from_pem(
        config.resolve_app_id()?,
        &config.resolve_private_key()?,
    )?;
    if config.resolve_ai_api_key().is_none() {
        return Err(ReviewError::MissingCredentials {
            name: "AI API key (use --ai-api-key, PATCHWISE_AI_API_KEY, or GEMINI_API_KEY)",
        });
    }

    let exchange = config.token_exchange(&locator);
    let manager = TokenLifecycleManager::new(signer, exchange, SystemClock);
    let gateway = OctocrabGateway::new(InstallationCredentials::new(manager, installation_id));
    let model: Arc<dyn FeedbackModel> =
        Arc::new(GeminiFeedbackModel::new(config.gemini_config()));

    let summary = if config.dry_run {
        let publisher = DryRunPublisher::stdout();
        review(&gateway, &publisher, model, &locator).await?
    } else {
        review(&gateway, &gateway, model, &locator).await?
    };

    write_summary(&locator, &summary)
}

async fn review<G, P>(
    gateway: &G,
    publisher: &P,
    model: Arc<dyn FeedbackModel>,
    locator: &PullRequestLocator,
) -> Result<ReviewSummary, ReviewError>
where
    G: PullRequestGateway,
    P: ReviewPublisher,
{
    ReviewOrchestrator::new(gateway, publisher, model)
        .run(locator)
        .await
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`ReviewError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<PatchwiseConfig, ReviewError> {
    PatchwiseConfig::load().map_err(|error| ReviewError::Configuration {
        message: error.to_string(),
    })
}

fn write_summary(locator: &PullRequestLocator, summary: &ReviewSummary) -> Result<(), ReviewError> {
    let mut stdout = io::stdout().lock();
    writeln!(
        stdout,
        "Reviewed {}/{}#{}: {} of {} files reviewed, {} comments in {} reviews",
        locator.owner().as_str(),
        locator.repository().as_str(),
        locator.number().get(),
        summary.files_reviewed,
        summary.files_listed,
        summary.comments_published,
        summary.reviews_published
    )
    .map_err(|error| ReviewError::Io {
        message: error.to_string(),
    })
}
