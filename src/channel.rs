//! Length-delimited, bincode-encoded TCP channels.
//!
//! A `Channel<I, O>` sends `I`s and receives `O`s, so the two ends of a connection are
//! typed `Channel<Request, Response>` and `Channel<Response, Request>`.
use futures::prelude::*;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio_serde::formats::*;
use tokio_serde::Framed;
use tokio_util::codec::{FramedRead, FramedWrite, LengthDelimitedCodec};

#[derive(Debug)]
pub enum Error {
    Connect(std::io::Error),
    Read(std::io::Error),
    Write(std::io::Error),
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Connect(err) => write!(f, "connect: {}", err),
            Error::Read(err) => write!(f, "read: {}", err),
            Error::Write(err) => write!(f, "write: {}", err),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub type Reader<I, O> = Framed<FramedRead<OwnedReadHalf, LengthDelimitedCodec>, O, I, Bincode<O, I>>;

pub type Writer<I, O> = Framed<FramedWrite<OwnedWriteHalf, LengthDelimitedCodec>, O, I, Bincode<O, I>>;

pub struct Receiver<I, O> {
    reader: Reader<I, O>,
}

impl<I, O> Receiver<I, O>
where
    I: Unpin,
    O: for<'de> Deserialize<'de> + Unpin,
{
    /// Returns `None` once the remote end closed the connection.
    pub async fn recv(&mut self) -> Result<Option<O>> {
        self.reader.try_next().await.map_err(Error::Read)
    }
}

pub struct Sender<I, O> {
    writer: Writer<I, O>,
}

impl<I, O> Sender<I, O>
where
    I: Serialize + Unpin,
    O: Unpin,
{
    pub async fn send(&mut self, item: I) -> Result<()> {
        self.writer.send(item).await.map_err(Error::Write)
    }
}

pub struct Channel<I, O> {
    socket: TcpStream,
    ghost: std::marker::PhantomData<(I, O)>,
}

impl<I, O> Channel<I, O> {
    pub async fn connect(address: &SocketAddr) -> Result<Channel<I, O>> {
        let socket = TcpStream::connect(address).await.map_err(Error::Connect)?;
        Ok(Channel { socket, ghost: Default::default() })
    }

    /// Returns the channel together with the address of the remote end.
    pub async fn accept(listener: &TcpListener) -> Result<(Channel<I, O>, SocketAddr)> {
        let (socket, address) = listener.accept().await.map_err(Error::Connect)?;
        Ok((Channel { socket, ghost: Default::default() }, address))
    }

    pub fn split(self) -> (Sender<I, O>, Receiver<I, O>) {
        let (reader, writer) = self.socket.into_split();

        let reader = FramedRead::new(reader, LengthDelimitedCodec::new());
        let reader = Framed::new(reader, Bincode::default());

        let writer = FramedWrite::new(writer, LengthDelimitedCodec::new());
        let writer = Framed::new(writer, Bincode::default());

        (Sender { writer }, Receiver { reader })
    }
}
