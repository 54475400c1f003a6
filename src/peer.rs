use crate::id::Id;
use crate::{Error, Result};

use std::net::SocketAddr;
use std::str::FromStr;

/// A member handle: the peer's identity and the address it answers queries on.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Peer {
    /// The `public_key_hash` of the peer for TLS or the hash of its ip for plain TCP.
    pub id: Id,
    /// The peers ip address.
    pub ip: SocketAddr,
}

impl Peer {
    pub fn new(id: Id, ip: SocketAddr) -> Self {
        Peer { id, ip }
    }

    /// A peer whose identity is derived from its address.
    pub fn from_ip(ip: SocketAddr) -> Self {
        Peer { id: Id::from_ip(&ip), ip }
    }
}

impl std::fmt::Display for Peer {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}@{}", self.id, self.ip)
    }
}

impl FromStr for Peer {
    type Err = Error;

    /// Parse a peer description from the format `IP` or `ID@IP`
    fn from_str(s: &str) -> Result<Peer> {
        let parts: Vec<&str> = s.split('@').collect();
        match parts.as_slice() {
            [ip] => {
                let ip: SocketAddr = ip.parse().map_err(|_| Error::PeerParseError)?;
                Ok(Peer::from_ip(ip))
            }
            [id, ip] => {
                let id: Id = id.parse().map_err(|_| Error::PeerParseError)?;
                let ip: SocketAddr = ip.parse().map_err(|_| Error::PeerParseError)?;
                Ok(Peer { id, ip })
            }
            _ => Err(Error::PeerParseError),
        }
    }
}
