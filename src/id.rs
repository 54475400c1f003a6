//! Hash-based identifiers for questions and peers.
//!
//! See the documentation of [Id] for details.

use std::convert::TryInto;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use base58check::{FromBase58Check, ToBase58Check};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use rand::{self, Rng};

type Blake2b256 = Blake2b<U32>;

/// A 32-byte identifier.
///
/// Questions are named by the hash of whatever the caller decides on (a conflict set,
/// a slot, a label). Peers are named by the hash of their public key or, without TLS,
/// of their address. Ids are displayed and parsed in base58check.
#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Serialize, Deserialize, Default)]
pub struct Id([u8; 32]);

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.to_base58check(0))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.to_base58check(0))
    }
}

impl FromStr for Id {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, crate::Error> {
        let (version, bytes) = s.from_base58check().map_err(|_| crate::Error::TryFromStringError)?;
        if version != 0 {
            return Err(crate::Error::TryFromStringError);
        }
        let bytes: [u8; 32] =
            bytes.as_slice().try_into().map_err(|_| crate::Error::TryFromStringError)?;
        Ok(Id(bytes))
    }
}

impl Id {
    /// Hashes `bytes` into a new id.
    pub fn new(bytes: &[u8]) -> Id {
        Id(hash(bytes))
    }

    /// Converts a `SocketAddr` into an *untrusted* identity.
    pub fn from_ip(ip: &SocketAddr) -> Id {
        Id::new(format!("{:?}", ip).as_bytes())
    }

    /// Generates a random id.
    pub fn generate() -> Id {
        let mut rng = rand::thread_rng();
        Id(rng.gen())
    }

    /// All-zeroes `Id` (for testing)
    pub fn zero() -> Id {
        Id([0u8; 32])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

fn hash(input: &[u8]) -> [u8; 32] {
    let digest = Blake2b256::digest(input);
    let mut buf = [0u8; 32];
    buf.copy_from_slice(&digest[..]);
    buf
}
