use std::{io::Write, process, sync::Arc};

use tokio::net::TcpListener;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

use vetrina::{
    application::{
        assemble::assemble,
        error::{AppError, SsrError},
        render::{CachedProvider, ContentBundle, PortfolioRenderer, ReloadingProvider},
        styles::{DevStyleCollector, DistStyleCollector, StyleCollector},
        template::{CachedShell, ReloadingShell, ShellSource},
    },
    config::{self, Command, RenderArgs, RenderMode, ServeArgs, Settings, SitePaths},
    domain::language::LanguageSource,
    infra::{
        assets::AssetStore,
        error::InfraError,
        http::{self, HttpState},
        telemetry,
    },
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));

    telemetry::init(&settings.logging)?;

    match command {
        Command::Serve(_) => run_serve(settings).await,
        Command::Render(args) => run_render(settings, args).await,
    }
}

async fn run_serve(settings: Settings) -> Result<(), AppError> {
    let mode = RenderMode::resolve(settings.site.production, settings.site.serverless);
    let state = build_http_state(mode, &settings);
    let router = http::build_router(state);

    let listener = TcpListener::bind(settings.server.addr)
        .await
        .map_err(InfraError::from)?;
    info!(
        target = "vetrina::serve",
        mode = ?mode,
        addr = %settings.server.addr,
        "listening"
    );

    let drain = settings.server.graceful_shutdown;
    let server = async move {
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await
    };
    let drain_deadline = async move {
        let _ = tokio::signal::ctrl_c().await;
        tokio::time::sleep(drain).await;
    };

    tokio::select! {
        result = server => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
        }
        _ = drain_deadline => {
            warn!(
                target = "vetrina::serve",
                "graceful shutdown deadline exceeded, aborting in-flight requests"
            );
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!(target = "vetrina::serve", "shutdown signal received, draining"),
        Err(err) => {
            error!(
                target = "vetrina::serve",
                error = %err,
                "failed to install the shutdown signal handler"
            );
            std::future::pending::<()>().await;
        }
    }
}

/// Bind the dispatcher's strategies to the resolved mode: development
/// reloads the shell and content per request, the production modes load once
/// and cache.
fn build_http_state(mode: RenderMode, settings: &Settings) -> HttpState {
    let paths = SitePaths::for_mode(mode, &settings.site);
    let public_url = settings.site.public_url.clone();

    match mode {
        RenderMode::InteractiveDev => HttpState {
            shell: Arc::new(ReloadingShell::new(paths.shell)),
            renderer: Arc::new(ReloadingProvider::new(paths.content, public_url)),
            styles: Arc::new(DevStyleCollector::new(paths.styles)),
            assets: Arc::new(AssetStore::new(paths.assets)),
        },
        RenderMode::StaticProduction | RenderMode::Serverless => HttpState {
            shell: Arc::new(CachedShell::new(paths.shell)),
            renderer: Arc::new(CachedProvider::new(paths.content, public_url)),
            styles: Arc::new(DistStyleCollector::new(paths.styles)),
            assets: Arc::new(AssetStore::new(paths.assets)),
        },
    }
}

/// Single-shot render for serverless hosts: one URL in, one document on
/// stdout, then exit.
async fn run_render(settings: Settings, args: RenderArgs) -> Result<(), AppError> {
    let mode = RenderMode::resolve(true, settings.site.serverless);
    let paths = SitePaths::for_mode(mode, &settings.site);

    let shell_source = CachedShell::new(paths.shell);
    let shell = shell_source.load().await.map_err(SsrError::from)?;

    let bundle = ContentBundle::load(&paths.content)
        .await
        .map_err(SsrError::from)?;
    let renderer = PortfolioRenderer::new(bundle, settings.site.public_url.clone());

    let resolved = renderer
        .policy()
        .resolve(args.language.as_deref(), None, None);
    if args.language.is_some() && resolved.source == LanguageSource::Default {
        warn!(
            target = "vetrina::render",
            requested = args.language.as_deref().unwrap_or(""),
            fallback = %resolved.language,
            "requested language is not declared by the site"
        );
    }

    let rendered = renderer
        .render_fragment(&args.url, &resolved.language)
        .map_err(SsrError::from)?;
    let stylesheet = DistStyleCollector::new(paths.styles)
        .collect(&rendered.touched_styles)
        .await
        .map_err(SsrError::from)?;
    let document = assemble(&shell, &rendered.html, &stylesheet);

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(document.as_bytes())
        .map_err(InfraError::from)?;
    Ok(())
}
