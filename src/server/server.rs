use super::router::Router;
use crate::channel::{self, Channel};
use crate::colored::Colorize;
use crate::protocol::{Request, Response};
use crate::Result;
use tracing::{debug, info, warn};

use actix::Addr;

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;

/// The pause after a failed `accept`.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Implements a server for handling incoming connections.
pub struct Server {
    /// The bound listener.
    listener: TcpListener,
    /// The address of the router.
    router: Addr<Router>,
}

impl Server {
    /// Binds to `ip`; connections are only accepted once the server [listen][Server::listen]s.
    pub async fn bind(ip: SocketAddr, router: Addr<Router>) -> Result<Server> {
        let listener = TcpListener::bind(ip).await?;
        Ok(Server { listener, router })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub async fn listen(self) -> Result<()> {
        info!("[{}] listening on {}", "server".blue(), self.local_addr()?);
        loop {
            let (channel, remote) =
                accept_with_backoff(|| Channel::<Response, Request>::accept(&self.listener)).await;
            let router = self.router.clone();
            tokio::spawn(async move {
                if let Err(err) = serve(channel, router).await {
                    debug!("[{}] {}: {}", "server".blue(), remote, err);
                }
            });
        }
    }
}

/// Retries `accept` until it succeeds, pausing after every failure.
async fn accept_with_backoff<T, F, Fut>(mut accept: F) -> T
where
    F: FnMut() -> Fut,
    Fut: Future<Output = channel::Result<T>>,
{
    loop {
        match accept().await {
            Ok(accepted) => return accepted,
            Err(err) => {
                // e.g. out of file descriptors, which persists until connections close
                warn!("[{}] {}, retrying in {:?}", "server".blue(), err, ACCEPT_BACKOFF);
                actix::clock::sleep(ACCEPT_BACKOFF).await;
            }
        }
    }
}

/// Answers the single request of a connection.
async fn serve(channel: Channel<Response, Request>, router: Addr<Router>) -> Result<()> {
    let (mut sender, mut receiver) = channel.split();
    match receiver.recv().await? {
        Some(request) => {
            let response = router.send(request).await?;
            sender.send(response).await?;
            Ok(())
        }
        // closed without a request
        None => Ok(()),
    }
}
