use radius_proto::{codec, Code, Packet, RadiusError};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("no response from {server} after {attempts} attempts")]
    CommunicationFailure { server: SocketAddr, attempts: u32 },
    #[error(transparent)]
    Protocol(#[from] RadiusError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// RADIUS client bound to one server.
///
/// The socket lives on an ephemeral local port for the client's lifetime.
/// `communicate` holds an internal mutex for the duration of an exchange,
/// so a shared client never has two outstanding requests; identifiers come
/// from the process-wide allocator either way.
pub struct RadiusClient {
    socket: UdpSocket,
    exchange: Mutex<()>,
    server: IpAddr,
    secret: String,
    auth_port: u16,
    acct_port: u16,
    retries: u32,
    timeout: Duration,
}

impl RadiusClient {
    pub const DEFAULT_AUTH_PORT: u16 = 1812;
    pub const DEFAULT_ACCT_PORT: u16 = 1813;
    pub const DEFAULT_RETRIES: u32 = 3;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(3000);

    /// Bind an ephemeral local socket for exchanges with `server`.
    pub async fn connect(server: IpAddr, secret: impl Into<String>) -> Result<Self, ClientError> {
        let socket = UdpSocket::bind(("0.0.0.0", 0)).await?;
        debug!(local_addr = %socket.local_addr()?, server = %server, "RADIUS client socket bound");

        Ok(RadiusClient {
            socket,
            exchange: Mutex::new(()),
            server,
            secret: secret.into(),
            auth_port: Self::DEFAULT_AUTH_PORT,
            acct_port: Self::DEFAULT_ACCT_PORT,
            retries: Self::DEFAULT_RETRIES,
            timeout: Self::DEFAULT_TIMEOUT,
        })
    }

    pub fn with_auth_port(mut self, port: u16) -> Self {
        self.auth_port = port;
        self
    }

    pub fn with_acct_port(mut self, port: u16) -> Self {
        self.acct_port = port;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Target port for a packet: accounting traffic goes to the acct
    /// port, everything else to the auth port.
    fn port_for(&self, code: Code) -> u16 {
        match code {
            Code::AccountingRequest => self.acct_port,
            _ => self.auth_port,
        }
    }

    /// Send `request` and await its response.
    ///
    /// The request is serialized once (filling in its authenticator and
    /// obfuscating User-Password for Access-Request), then sent up to the
    /// retry count with a timed receive per attempt. A datagram that
    /// decodes as a response to `request` completes the exchange; decode
    /// failures (identifier or authenticator mismatch, malformed reply)
    /// surface immediately. Timeouts and socket errors burn an attempt.
    pub async fn communicate(&self, request: &mut Packet) -> Result<Packet, ClientError> {
        let _guard = self.exchange.lock().await;

        let wire = codec::encode_request(request, self.secret.as_bytes())?;
        let target = SocketAddr::new(self.server, self.port_for(request.code));
        let mut buffer = vec![0u8; Packet::MAX_LENGTH];

        for attempt in 1..=self.retries {
            debug!(
                server = %target,
                request_id = request.identifier,
                attempt = attempt,
                "Sending {}", request.code
            );

            if let Err(e) = self.socket.send_to(&wire, target).await {
                warn!(server = %target, attempt = attempt, error = %e, "Send failed");
                continue;
            }

            match timeout(self.timeout, self.socket.recv_from(&mut buffer)).await {
                Ok(Ok((len, from))) => {
                    debug!(from = %from, bytes = len, "Received datagram");
                    let reply = codec::decode_response(&buffer[..len], self.secret.as_bytes(), request)?;
                    return Ok(reply);
                }
                Ok(Err(e)) => {
                    warn!(server = %target, attempt = attempt, error = %e, "Receive failed");
                }
                Err(_) => {
                    debug!(server = %target, attempt = attempt, "Receive timed out");
                }
            }
        }

        Err(ClientError::CommunicationFailure {
            server: target,
            attempts: self.retries,
        })
    }

    /// Local address of the client socket.
    pub fn local_addr(&self) -> Result<SocketAddr, ClientError> {
        Ok(self.socket.local_addr()?)
    }
}
