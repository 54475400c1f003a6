use crate::colored::Colorize;
use crate::protocol::{Request, Response};
use crate::snowball::Engine;

use tracing::{debug, error, info};

use actix::{Actor, Addr, Context, Handler, ResponseFuture};

/// Dispatches inbound requests to the actors serving them.
pub struct Router {
    engine: Addr<Engine>,
}

impl Router {
    pub fn new(engine: Addr<Engine>) -> Self {
        Router { engine }
    }
}

impl Actor for Router {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Context<Self>) {
        debug!("[{}] started", "router".blue());
    }
}

impl Handler<Request> for Router {
    type Result = ResponseFuture<Response>;

    fn handle(&mut self, msg: Request, _ctx: &mut Context<Self>) -> Self::Result {
        let engine = self.engine.clone();
        Box::pin(async move {
            let response = match msg {
                Request::QueryPreference(query) => {
                    engine.send(query).await.map(Response::PreferenceAck)
                }
                Request::Submit(submit) => {
                    info!("[{}] routing Submit({}) -> Engine", "router".blue(), submit.question);
                    engine.send(submit).await.map(Response::SubmitAck)
                }
                Request::GetStatus(get_status) => {
                    engine.send(get_status).await.map(Response::StatusAck)
                }
            };
            match response {
                Ok(response) => response,
                Err(err) => {
                    error!("[{}] engine unavailable: {}", "router".blue(), err);
                    Response::Unknown
                }
            }
        })
    }
}
