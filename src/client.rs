use crate::channel::{self, Channel};
use crate::colored::Colorize;
use crate::id::Id;
use crate::peer::Peer;
use crate::protocol::{Request, Response};
use crate::snowball::{PreferenceQuery, QueryFuture, Transport};
use crate::view::View;
use crate::{Error, Result};
use tracing::{debug, error};

use futures::FutureExt;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::time::{timeout_at, Instant};

/// Sends a single request and waits for a response.
pub async fn oneshot(ip: SocketAddr, request: Request) -> Result<Option<Response>> {
    let channel: Channel<Request, Response> = Channel::connect(&ip).await?;
    let (mut sender, mut receiver) = channel.split();
    let () = sender.send(request).await?;
    let response = receiver.recv().await?;
    // the connection is closed by dropping the sender / receiver
    Ok(response)
}

/// Like [oneshot], but gives up with [Error::Timeout] at `deadline`.
pub async fn oneshot_until(ip: SocketAddr, request: Request, deadline: Instant) -> Result<Option<Response>> {
    match timeout_at(deadline, oneshot(ip, request)).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout),
    }
}

/// A gentle fanout function which sends requests to peers and collects responses.
pub async fn fanout(ips: Vec<SocketAddr>, request: Request) -> Vec<Response> {
    let mut client_futs = vec![];
    for ip in ips.iter().cloned() {
        let request = request.clone();
        let client_fut = tokio::spawn(async move {
            match oneshot(ip, request).await {
                Ok(result) => result,
                // NOTE: The error here is logged and `None` is returned
                Err(err) => {
                    debug!("[{}] {}: {}", "client".green(), ip, err);
                    None
                }
            }
        });
        client_futs.push(client_fut)
    }
    futures::future::join_all(client_futs)
        .map(|results| {
            let mut responses = vec![];
            for r in results.into_iter() {
                match r {
                    Ok(Some(response)) => responses.push(response),
                    Ok(None) => (),
                    Err(_) => error!("error: joining client futures"),
                }
            }
            responses
        })
        .await
}

/// Queries peers over TCP, one connection per query.
///
/// Peers refusing the connection are reported unreachable to the view, peers answering
/// are reported reachable. A peer which merely misses the deadline is left as it is.
#[derive(Debug, Clone)]
pub struct NetworkTransport {
    view: Arc<View>,
}

impl NetworkTransport {
    pub fn new(view: Arc<View>) -> Self {
        NetworkTransport { view }
    }
}

impl Transport for NetworkTransport {
    fn query(&self, peer: &Peer, question: Id, deadline: Instant) -> QueryFuture {
        let peer = *peer;
        let view = self.view.clone();
        Box::pin(async move {
            let request = Request::QueryPreference(PreferenceQuery { question });
            let response = oneshot_until(peer.ip, request, deadline).await;
            match response {
                Ok(_) => {
                    let _ = view.mark_reachable(&peer.id);
                }
                Err(Error::Channel(channel::Error::Connect(_))) => {
                    let _ = view.mark_unreachable(&peer.id);
                }
                Err(_) => (),
            }
            match response {
                Ok(Some(Response::PreferenceAck(ack))) if ack.question == question => ack.color,
                Ok(Some(response)) => {
                    debug!("[{}] {} sent an invalid response {:?}", "client".green(), peer, response);
                    None
                }
                Ok(None) => None,
                Err(err) => {
                    debug!("[{}] {} did not answer: {}", "client".green(), peer, err);
                    None
                }
            }
        })
    }
}
