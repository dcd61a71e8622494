//! HTTP boundary of the boot API.
//!
//! One task per accepted connection, each serving HTTP/1.1 against the
//! shared [`BootService`]. Cancelling the [`ShutdownSignal`] stops the accept
//! loop, asks every connection to finish its in-flight request and close,
//! and waits at most the configured grace period before aborting the rest.
mod body;
pub mod handlers;
mod media_type;
mod shutdown;

use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};

use hyper::{server::conn::http1, service::service_fn};
use hyper_util::rt::{TokioIo, TokioTimer};
use log::{debug, info, warn};
use tokio::{
    net::{TcpListener, TcpStream},
    task::JoinSet,
};

pub use body::{FileBody, ResponseBody};
pub use media_type::MediaType;
pub use shutdown::{wait_for_signal, Shutdown, ShutdownSignal};

use crate::{
    service::BootService,
    utils::{DEFAULT_GRACE_PERIOD_SECS, DEFAULT_HEADER_READ_TIMEOUT_SECS},
    Error, Result,
};

/// Pause before accepting again after `accept` failed, so a persistent
/// failure such as EMFILE does not spin.
pub const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct ServerOptions {
    grace_period: Duration,
    header_read_timeout: Duration,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerOptions {
    pub fn new() -> Self {
        Self {
            grace_period: Duration::from_secs(DEFAULT_GRACE_PERIOD_SECS),
            header_read_timeout: Duration::from_secs(DEFAULT_HEADER_READ_TIMEOUT_SECS),
        }
    }

    /// How long in-flight connections may keep running after shutdown
    /// before they are aborted. Default to 10 seconds.
    pub fn grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    pub fn get_grace_period(&self) -> Duration {
        self.grace_period
    }

    /// How long a client may take to send the headers of a request,
    /// idle keep-alive time included. The connection is closed after that.
    /// Default to 30 seconds.
    pub fn header_read_timeout(mut self, timeout: Duration) -> Self {
        self.header_read_timeout = timeout;
        self
    }

    pub fn get_header_read_timeout(&self) -> Duration {
        self.header_read_timeout
    }
}

#[derive(Debug)]
pub struct Server {
    service: Arc<BootService>,
    options: ServerOptions,
}

impl Server {
    pub fn new(service: BootService, options: ServerOptions) -> Self {
        Self {
            service: Arc::new(service),
            options,
        }
    }

    /// Bind a listener on `addr`.
    pub async fn bind(addr: &str) -> Result<TcpListener> {
        TcpListener::bind(addr).await.map_err(|source| Error::Bind {
            addr: addr.to_string(),
            source,
        })
    }

    /// Serve `listener` until `shutdown` is cancelled, then drain.
    pub async fn serve(&self, listener: TcpListener, mut shutdown: ShutdownSignal) -> Result<()> {
        if let Ok(addr) = listener.local_addr() {
            info!(r#"API now listening at "{addr}"."#);
        }
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        debug!("accepted connection from {peer}");
                        connections.spawn(serve_connection(
                            Arc::clone(&self.service),
                            stream,
                            peer,
                            self.options.header_read_timeout,
                            shutdown.clone(),
                        ));
                    }
                    // per-connection failures (e.g. EMFILE) must not stop the loop
                    Err(e) => {
                        warn!("accept failed: {e}");
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                },
                // reap finished connections so the set does not grow unbounded
                Some(joined) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(e) = joined {
                        warn!("connection task failed: {e}");
                    }
                }
            }
        }

        info!(
            "Shutting down API, draining {} connection(s)...",
            connections.len()
        );
        let grace_period = self.options.grace_period;
        let drained = tokio::time::timeout(grace_period, async {
            while let Some(joined) = connections.join_next().await {
                if let Err(e) = joined {
                    warn!("connection task failed: {e}");
                }
            }
        })
        .await;
        if drained.is_err() {
            warn!(
                "{} connection(s) still open after {:?}, aborting",
                connections.len(),
                grace_period
            );
            connections.shutdown().await;
        }
        drop(listener);
        info!("API stopped.");
        Ok(())
    }
}

async fn serve_connection(
    service: Arc<BootService>,
    stream: TcpStream,
    peer: SocketAddr,
    header_read_timeout: Duration,
    mut shutdown: ShutdownSignal,
) {
    let io = TokioIo::new(stream);
    let svc = service_fn(move |req| {
        let service = Arc::clone(&service);
        async move { Ok::<_, Infallible>(handlers::handle(&service, req).await) }
    });
    let conn = http1::Builder::new()
        .timer(TokioTimer::new())
        .header_read_timeout(header_read_timeout)
        .serve_connection(io, svc);
    tokio::pin!(conn);

    let mut draining = false;
    loop {
        tokio::select! {
            res = conn.as_mut() => {
                if let Err(e) = res {
                    // client went away mid-response; nothing to retry
                    debug!("connection from {peer} closed: {e}");
                }
                break;
            }
            _ = shutdown.cancelled(), if !draining => {
                draining = true;
                conn.as_mut().graceful_shutdown();
            }
        }
    }
}
