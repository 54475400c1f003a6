use crate::client::NetworkTransport;
use crate::colored::Colorize;
use crate::id::Id;
use crate::peer::Peer;
use crate::server::{Router, Server, Settings};
use crate::snowball::{Decided, Engine, RoundDriver, UniformSampler};
use crate::view::View;
use crate::{Error, Result};

use actix::{Actor, Addr, Context, Handler};
use tracing::{error, info};

use std::net::SocketAddr;
use std::sync::Arc;

/// Logs every decision of the node.
pub struct DecisionLog;

impl Actor for DecisionLog {
    type Context = Context<Self>;
}

impl Handler<Decided> for DecisionLog {
    type Result = ();

    fn handle(&mut self, msg: Decided, _ctx: &mut Context<Self>) -> Self::Result {
        info!("[{}] {} => {}", "decided".green(), msg.question, msg.color);
    }
}

/// Starts a node and returns its engine once the server is accepting connections.
pub async fn run(settings: Settings) -> Result<Addr<Engine>> {
    let listener_ip: SocketAddr = settings.listener_ip.parse().map_err(|_| Error::PeerParseError)?;
    let bootstrap_peers =
        settings.bootstrap_peers.iter().map(|p| p.parse()).collect::<Result<Vec<Peer>>>()?;
    let node_id = match settings.id {
        Some(ref id) => id.parse::<Id>()?,
        None => Id::from_ip(&listener_ip),
    };

    info!("Node {} is starting", node_id);

    // Initialise a view with the bootstrap peers
    let view = Arc::new(View::new(node_id));
    let _ = view.init(bootstrap_peers);
    info!("[{}] {} members", "view".yellow(), view.len());

    let driver = RoundDriver::new(
        settings.snowball.clone(),
        node_id,
        view.clone(),
        Arc::new(UniformSampler),
        Arc::new(NetworkTransport::new(view)),
    );
    let decision_log = DecisionLog.start();
    let engine = Engine::new(driver, decision_log.recipient(), settings.retain_decided).start();

    // Setup the router and the server
    let router = Router::new(engine.clone()).start();
    let server = Server::bind(listener_ip, router).await?;
    actix::spawn(async move {
        if let Err(err) = server.listen().await {
            error!("[{}] stopped: {}", "server".blue(), err);
        }
    });

    Ok(engine)
}
