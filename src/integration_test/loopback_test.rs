use crate::client::{self, NetworkTransport};
use crate::id::Id;
use crate::peer::Peer;
use crate::protocol::{Request, Response};
use crate::server::{node, Settings};
use crate::snowball::{
    Color, ColorSet, GetStatus, Membership, Parameters, Phase, PreferenceQuery, Shutdown, Status,
    Submit, Transport,
};
use crate::view::View;
use crate::Result;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

const A: Color = Color(1);
const B: Color = Color(2);

fn ips(base: u16, n: u16) -> Vec<SocketAddr> {
    (0..n).map(|i| format!("127.0.0.1:{}", base + i).parse().unwrap()).collect()
}

fn settings(ip: &SocketAddr, members: &[SocketAddr]) -> Settings {
    Settings {
        listener_ip: ip.to_string(),
        bootstrap_peers: members.iter().map(|m| m.to_string()).collect(),
        id: None,
        snowball: Parameters::new(0.6, 3, 4, Duration::from_millis(500), Duration::from_millis(5), 1)
            .unwrap(),
        retain_decided: 16,
    }
}

async fn status(ip: SocketAddr, question: Id) -> Result<Option<Status>> {
    match client::oneshot(ip, Request::GetStatus(GetStatus { question })).await? {
        Some(Response::StatusAck(ack)) => Ok(ack.status),
        other => panic!("unexpected response {:?}", other),
    }
}

#[actix_rt::test]
async fn test_nodes_decide_over_tcp() -> Result<()> {
    let members = ips(30100, 5);
    let mut engines = vec![];
    for ip in members.iter() {
        engines.push(node::run(settings(ip, &members)).await?);
    }

    let question = Id::new(b"loopback");
    let colors: ColorSet = vec![A, B].into_iter().collect();
    for (i, ip) in members.iter().enumerate() {
        let proposal = if i == 0 { B } else { A };
        let request = Request::Submit(Submit { question, colors: colors.clone(), proposal: Some(proposal) });
        match client::oneshot(*ip, request).await? {
            Some(Response::SubmitAck(ack)) => assert!(ack.accepted),
            other => panic!("unexpected response {:?}", other),
        }
    }

    let mut decided = 0;
    for _ in 0..200 {
        decided = 0;
        for ip in members.iter() {
            if let Some(status) = status(*ip, question).await? {
                if status.phase == Phase::Decided {
                    assert_eq!(status.snapshot.preferred, Some(A));
                    decided += 1;
                }
            }
        }
        if decided == members.len() {
            break;
        }
        actix::clock::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(decided, members.len());

    // a second submission of the same question is refused
    let request = Request::Submit(Submit { question, colors, proposal: Some(B) });
    match client::oneshot(members[0], request).await? {
        Some(Response::SubmitAck(ack)) => assert!(!ack.accepted),
        other => panic!("unexpected response {:?}", other),
    }

    for engine in engines {
        engine.send(Shutdown).await?;
    }
    Ok(())
}

#[actix_rt::test]
async fn test_network_transport() -> Result<()> {
    let members = ips(30110, 1);
    let engine = node::run(settings(&members[0], &members)).await?;
    let peer = Peer::from_ip(members[0]);
    // nobody listens here
    let dead = Peer::from_ip("127.0.0.1:30119".parse().unwrap());
    let view = Arc::new(View::new(Id::zero()));
    let _ = view.init(vec![peer, dead]);
    let transport = NetworkTransport::new(view.clone());
    let deadline = tokio::time::Instant::now() + Duration::from_millis(500);

    // unknown questions are answered with an abstention
    let question = Id::new(b"unknown");
    match client::oneshot(peer.ip, Request::QueryPreference(PreferenceQuery { question })).await? {
        Some(Response::PreferenceAck(ack)) => assert_eq!(ack.color, None),
        other => panic!("unexpected response {:?}", other),
    }

    // the proposal is answered before the first round completes
    let question = Id::new(b"proposed");
    let request = Request::Submit(Submit { question, colors: ColorSet::any(), proposal: Some(B) });
    let _ = client::oneshot(peer.ip, request).await?;
    assert_eq!(transport.query(&peer, question, deadline).await, Some(B));

    // a refused connection takes the peer out of the sample
    assert_eq!(transport.query(&dead, question, deadline).await, None);
    assert_eq!(view.reachable_members(), vec![peer]);
    assert_eq!(view.len(), 2);

    engine.send(Shutdown).await?;
    Ok(())
}
