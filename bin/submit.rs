use metastable::client;
use metastable::id::Id;
use metastable::protocol::{Request, Response};
use metastable::snowball::{Color, ColorSet, GetStatus, Phase, Submit};
use metastable::{Error, Result};

use tracing::info;
use tracing_subscriber;

use clap::{value_t, values_t, App, Arg};

use std::net::SocketAddr;
use std::time::Duration;

#[actix_rt::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().compact().with_max_level(tracing::Level::INFO).init();

    let matches = App::new("metastable")
        .version("0.1")
        .author("zero.fx labs ltd.")
        .about("Submits a question to a set of snowball nodes")
        .arg(
            Arg::with_name("peer-ip")
                .short("p")
                .long("peer-ip")
                .value_name("PEER_IP")
                .multiple(true)
                .required(true),
        )
        .arg(
            Arg::with_name("question")
                .short("q")
                .long("question")
                .value_name("QUESTION")
                .help("Hashed into the question id")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::with_name("proposal")
                .short("c")
                .long("proposal")
                .value_name("COLOR")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("legal")
                .short("l")
                .long("legal")
                .value_name("COLOR")
                .help("A legal color (any color is legal when omitted)")
                .multiple(true),
        )
        .arg(Arg::with_name("wait").short("w").long("wait").help("Waits for the first node to decide"))
        .get_matches();

    let peer_ips = values_t!(matches.values_of("peer-ip"), SocketAddr).unwrap_or_else(|e| e.exit());
    let question = value_t!(matches.value_of("question"), String).unwrap_or_else(|e| e.exit());
    let question = Id::new(question.as_bytes());
    let proposal = match matches.value_of("proposal") {
        Some(_) => Some(Color(value_t!(matches.value_of("proposal"), u32).unwrap_or_else(|e| e.exit()))),
        None => None,
    };
    let colors: ColorSet = if matches.is_present("legal") {
        values_t!(matches.values_of("legal"), u32).unwrap_or_else(|e| e.exit()).into_iter().map(Color).collect()
    } else {
        ColorSet::any()
    };

    let request = Request::Submit(Submit { question, colors, proposal });
    let responses = client::fanout(peer_ips.clone(), request).await;
    let accepted = responses
        .iter()
        .filter(|response| matches!(response, Response::SubmitAck(ack) if ack.accepted))
        .count();
    info!("{} accepted by {}/{} nodes", question, accepted, peer_ips.len());

    if matches.is_present("wait") {
        let ip = peer_ips[0];
        loop {
            match client::oneshot(ip, Request::GetStatus(GetStatus { question })).await? {
                Some(Response::StatusAck(ack)) => match ack.status {
                    Some(status) if status.phase == Phase::Decided => {
                        info!("{} decided {:?} after {} rounds", question, status.snapshot.preferred, status.rounds);
                        break;
                    }
                    Some(status) => info!("{:?} {:?}", status.phase, status.snapshot),
                    None => return Err(Error::EmptyResponse),
                },
                Some(response) => return Err(Error::InvalidResponse(Box::new(response))),
                None => return Err(Error::EmptyResponse),
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
    }

    Ok(())
}
