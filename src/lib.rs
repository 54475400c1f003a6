#[macro_use]
extern crate serde_derive;
extern crate actix_derive;
extern crate colored;

pub mod channel;
pub mod client;
pub mod id;
pub mod peer;
pub mod protocol;
pub mod server;
pub mod snowball;
pub mod view;

#[cfg(test)]
mod integration_test;

use protocol::Response;

#[derive(Debug)]
pub enum Error {
    IO(std::io::Error),
    Actix(actix::MailboxError),
    Config(config::ConfigError),
    Snowball(snowball::Error),

    // channel errors
    Channel(channel::Error),

    // client errors
    Timeout,
    EmptyResponse,
    InvalidResponse(Box<Response>),

    /// Error caused by converting from a `String` to an `Id`
    TryFromStringError,
    /// Error when parsing a peer description `ID@IP`
    PeerParseError,
}

impl std::error::Error for Error {}

impl std::convert::From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::IO(error)
    }
}

impl std::convert::From<actix::MailboxError> for Error {
    fn from(error: actix::MailboxError) -> Self {
        Error::Actix(error)
    }
}

impl std::convert::From<config::ConfigError> for Error {
    fn from(error: config::ConfigError) -> Self {
        Error::Config(error)
    }
}

impl std::convert::From<snowball::Error> for Error {
    fn from(error: snowball::Error) -> Self {
        Error::Snowball(error)
    }
}

impl std::convert::From<channel::Error> for Error {
    fn from(error: channel::Error) -> Self {
        Error::Channel(error)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
