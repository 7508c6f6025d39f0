#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod auth;
pub mod error;
pub mod response;
pub mod router;
pub mod routes;

use core::convert::Infallible;
use core::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use auth::AdminSecret;
use error::{AppError, BoxError};
use futures_util::{pin_mut, FutureExt as _};
use http::{Request, Response};
use hyper::body::Incoming;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use presentation_voting_config::{Config, VotingModeKind};
use presentation_voting_store::{Roster, Store, ThemeId, ThemeSettings, VotingMode};
use response::ResponseBody;
use tokio::net::TcpListener;
use tokio::select;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Everything a request handler can reach. Cloned once per connection.
#[derive(Clone)]
pub struct VotingState {
    pub store: Arc<Store>,
    pub admin: Arc<AdminSecret>,
    pub max_body_bytes: usize,
}

impl VotingState {
    #[must_use]
    pub fn new(store: Store, admin_password: &str, max_body_bytes: usize) -> Self {
        Self {
            store: Arc::new(store),
            admin: Arc::new(AdminSecret::new(admin_password)),
            max_body_bytes,
        }
    }
}

pub fn setup_state(config: &Config) -> Result<VotingState, AppError> {
    let mode = match config.voting_mode {
        VotingModeKind::Selection => VotingMode::Selection {
            required: config.required_selections,
        },
        VotingModeKind::Rating => VotingMode::Rating,
    };
    let roster = match &config.roster_file {
        Some(path) => Roster::from_json_file(path)?,
        None => Roster::default(),
    };
    let theme = ThemeSettings {
        selected: ThemeId::new(config.selected_theme)?,
        random: config.random_theme,
    };
    info!(
        mode = mode.name(),
        presentations = roster.len(),
        "initialized voting store"
    );
    Ok(VotingState::new(
        Store::new(mode, roster, theme),
        &config.admin_password,
        config.max_body_bytes,
    ))
}

/// Never fails: errors and panics are rendered as JSON error responses.
pub async fn handle<B>(
    state: VotingState,
    request: Request<B>,
) -> Result<Response<ResponseBody>, Infallible>
where
    B: http_body::Body,
    B::Error: Into<BoxError>,
{
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let response = match AssertUnwindSafe(router::dispatch(&state, request))
        .catch_unwind()
        .await
    {
        Ok(Ok(response)) => response,
        Ok(Err(err)) => err.into_response(),
        Err(_panic) => {
            error!(%method, %path, "request handler panicked");
            AppError::Panic.into_response()
        }
    };
    info!(%method, %path, status = response.status().as_u16(), "handled request");
    Ok(response)
}

/// Accepts connections until `shutdown` resolves, then waits for every open
/// connection to finish gracefully.
pub async fn serve(
    listener: TcpListener,
    state: VotingState,
    shutdown: impl Future<Output = ()>,
) -> Result<(), AppError> {
    // dropping the receiver tells the connections to shut down
    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let shutdown_tx = Arc::new(shutdown_tx);

    // every connection holds a receiver until it is done
    let (closed_tx, closed_rx) = watch::channel(());

    pin_mut!(shutdown);

    #[allow(clippy::redundant_pub_crate)]
    loop {
        select! {
            accept = listener.accept() => {
                let (socket, remote_addr) = match accept {
                    Ok(accepted) => accepted,
                    Err(err) => {
                        warn!("failed to accept connection: {err}");
                        continue;
                    }
                };

                let shutdown_tx = Arc::clone(&shutdown_tx);
                let closed_rx = closed_rx.clone();
                let state = state.clone();

                tokio::spawn(async move {
                    let socket = TokioIo::new(socket);
                    let service = hyper::service::service_fn(move |request: Request<Incoming>| {
                        handle(state.clone(), request)
                    });

                    let builder = auto::Builder::new(TokioExecutor::new());
                    let connection = builder.serve_connection(socket, service);
                    pin_mut!(connection);

                    let mut shutting_down = false;
                    loop {
                        select! {
                            result = connection.as_mut() => {
                                if let Err(err) = result {
                                    debug!(%remote_addr, "connection ended with error: {err}");
                                }
                                break;
                            }
                            () = shutdown_tx.closed(), if !shutting_down => {
                                shutting_down = true;
                                connection.as_mut().graceful_shutdown();
                            }
                        }
                    }

                    drop(closed_rx);
                });
            }
            () = &mut shutdown => {
                info!("shutting down, waiting for open connections");
                drop(shutdown_rx);
                drop(closed_rx);
                closed_tx.closed().await;
                break;
            }
        }
    }

    info!("server stopped");
    Ok(())
}

pub async fn run_server(
    config: Config,
) -> Result<impl Future<Output = Result<(), AppError>>, AppError> {
    let state = setup_state(&config)?;
    let listener = TcpListener::bind(config.listen_address).await?;
    info!(address = %listener.local_addr()?, "listening");
    Ok(serve(listener, state, shutdown_signal()))
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl+C: {err}");
            core::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("failed to listen for SIGTERM: {err}");
                core::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = core::future::pending::<()>();

    #[allow(clippy::redundant_pub_crate)]
    {
        select! {
            () = ctrl_c => {},
            () = terminate => {},
        }
    }
}
