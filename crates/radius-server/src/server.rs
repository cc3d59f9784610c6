use crate::backend::{CredentialStore, ExternalAuthenticator, SecretResolver};
use radius_proto::{codec, codes, Attribute, Code, Packet, RadiusError};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Protocol error: {0}")]
    Protocol(#[from] RadiusError),
    #[error("no shared secret configured for {0}")]
    UnknownClient(IpAddr),
    #[error("no credential store or external authenticator is enabled")]
    UnconfiguredAuthPath,
}

/// Server wiring: bind addresses, the secret table, and the collaborator
/// back-ends Access-Requests are checked against.
pub struct ServerConfig {
    pub auth_addr: SocketAddr,
    pub acct_addr: SocketAddr,
    pub secrets: Arc<dyn SecretResolver>,
    pub credentials: Option<Arc<dyn CredentialStore>>,
    pub external: Option<Arc<dyn ExternalAuthenticator>>,
}

impl ServerConfig {
    pub fn new(
        auth_addr: SocketAddr,
        acct_addr: SocketAddr,
        secrets: Arc<dyn SecretResolver>,
    ) -> Self {
        ServerConfig {
            auth_addr,
            acct_addr,
            secrets,
            credentials: None,
            external: None,
        }
    }

    pub fn with_credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.credentials = Some(store);
        self
    }

    pub fn with_external_authenticator(mut self, external: Arc<dyn ExternalAuthenticator>) -> Self {
        self.external = Some(external);
        self
    }
}

/// RADIUS server: one UDP socket per service (authentication and
/// accounting), each with its own receive loop. Datagram handling is
/// spawned per packet; collaborators may block inside those tasks.
pub struct RadiusServer {
    config: Arc<ServerConfig>,
    auth_socket: Arc<UdpSocket>,
    acct_socket: Arc<UdpSocket>,
}

impl RadiusServer {
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let auth_socket = UdpSocket::bind(config.auth_addr).await?;
        let acct_socket = UdpSocket::bind(config.acct_addr).await?;
        info!(
            auth = %auth_socket.local_addr()?,
            acct = %acct_socket.local_addr()?,
            "RADIUS server listening"
        );

        Ok(RadiusServer {
            config: Arc::new(config),
            auth_socket: Arc::new(auth_socket),
            acct_socket: Arc::new(acct_socket),
        })
    }

    /// Bound authentication address, useful when binding port 0 in tests.
    pub fn auth_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.auth_socket.local_addr()?)
    }

    /// Bound accounting address.
    pub fn acct_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.acct_socket.local_addr()?)
    }

    /// Run both receive loops until a socket fails or is closed.
    pub async fn run(&self) -> Result<(), ServerError> {
        tokio::try_join!(
            Self::run_socket(Arc::clone(&self.auth_socket), Arc::clone(&self.config)),
            Self::run_socket(Arc::clone(&self.acct_socket), Arc::clone(&self.config)),
        )?;
        Ok(())
    }

    async fn run_socket(socket: Arc<UdpSocket>, config: Arc<ServerConfig>) -> Result<(), ServerError> {
        let mut buf = vec![0u8; Packet::MAX_LENGTH];

        loop {
            let (len, addr) = socket.recv_from(&mut buf).await?;
            let data = buf[..len].to_vec();

            let config = Arc::clone(&config);
            let socket = Arc::clone(&socket);
            tokio::spawn(async move {
                // Receive-path failures are logged and the datagram is
                // dropped; the server never answers malformed input.
                if let Err(e) = Self::handle_datagram(data, addr, config, socket).await {
                    debug!(client_addr = %addr, error = %e, "Dropped datagram");
                }
            });
        }
    }

    async fn handle_datagram(
        data: Vec<u8>,
        addr: SocketAddr,
        config: Arc<ServerConfig>,
        socket: Arc<UdpSocket>,
    ) -> Result<(), ServerError> {
        let secret = match config.secrets.secret_for(addr.ip()) {
            Some(secret) => secret,
            None => {
                warn!(client_ip = %addr.ip(), "Dropping datagram from unknown client");
                return Err(ServerError::UnknownClient(addr.ip()));
            }
        };

        let request = codec::decode_request(&data, secret.as_bytes())?;

        debug!(
            packet_type = %request.code,
            client_addr = %addr,
            request_id = request.identifier,
            "Received RADIUS packet"
        );

        let mut response = match request.code {
            Code::AccessRequest => {
                Self::handle_access_request(&request, &config, addr.ip())?
            }
            Code::AccountingRequest => Self::handle_accounting_request(&request),
            other => {
                warn!(packet_type = %other, client_addr = %addr, "Unsupported packet type");
                return Ok(());
            }
        };

        let wire = codec::encode_response(&mut response, secret.as_bytes(), &request.authenticator)?;
        socket.send_to(&wire, addr).await?;

        debug!(
            response_type = %response.code,
            client_addr = %addr,
            request_id = response.identifier,
            "Sent RADIUS response"
        );

        Ok(())
    }

    /// Decide an Access-Request.
    ///
    /// The external authenticator (when enabled) gets the first word; a
    /// rejection falls through to the credential store's password
    /// comparison. Proxy-State attributes are echoed in request order on
    /// both outcomes.
    fn handle_access_request(
        request: &Packet,
        config: &ServerConfig,
        source_ip: IpAddr,
    ) -> Result<Packet, ServerError> {
        if config.external.is_none() && config.credentials.is_none() {
            warn!(
                client_ip = %source_ip,
                request_id = request.identifier,
                "Access-Request received but no authentication path is enabled"
            );
            return Err(ServerError::UnconfiguredAuthPath);
        }

        let user_name = request
            .find_attribute(codes::USER_NAME)
            .and_then(|attr| attr.as_string().ok());
        // Deobfuscated by the request decode hook.
        let password = request
            .find_attribute(codes::USER_PASSWORD)
            .and_then(|attr| attr.as_string().ok());

        let accepted = match (&user_name, &password) {
            (Some(user_name), Some(password)) => {
                info!(
                    username = %user_name,
                    client_ip = %source_ip,
                    request_id = request.identifier,
                    "Authentication request received"
                );
                Self::verify_credentials(user_name, password, config)
            }
            _ => {
                warn!(
                    client_ip = %source_ip,
                    request_id = request.identifier,
                    "Access-Request without User-Name/User-Password"
                );
                false
            }
        };

        let mut response = if accepted {
            info!(
                username = user_name.as_deref().unwrap_or("?"),
                client_ip = %source_ip,
                request_id = request.identifier,
                "Authentication successful"
            );
            Packet::reply(Code::AccessAccept, request)
        } else {
            warn!(
                username = user_name.as_deref().unwrap_or("?"),
                client_ip = %source_ip,
                request_id = request.identifier,
                "Authentication failed"
            );
            let mut reject = Packet::reply(Code::AccessReject, request);
            reject.add_attribute(
                Attribute::string(codes::REPLY_MESSAGE, "Authentication failed")
                    .expect("static reply message"),
            );
            reject
        };

        Self::copy_proxy_state(request, &mut response);
        Ok(response)
    }

    fn verify_credentials(user_name: &str, password: &str, config: &ServerConfig) -> bool {
        if let Some(external) = &config.external {
            if external.authenticate(user_name, password) {
                return true;
            }
        }

        if let Some(store) = &config.credentials {
            if let Some(stored) = store.password_for(user_name) {
                return stored == password;
            }
        }

        false
    }

    /// Accounting-Requests arrive with their authenticator already
    /// verified by the decoder; the reply acknowledges receipt.
    fn handle_accounting_request(request: &Packet) -> Packet {
        let mut response = Packet::reply(Code::AccountingResponse, request);
        Self::copy_proxy_state(request, &mut response);
        response
    }

    /// Echo Proxy-State attributes in their original order (RFC 2865
    /// Section 5.33).
    fn copy_proxy_state(request: &Packet, response: &mut Packet) {
        for attr in &request.attributes {
            if attr.attr_type == codes::PROXY_STATE {
                response.add_attribute(attr.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryCredentialStore;

    struct RejectAll;

    impl ExternalAuthenticator for RejectAll {
        fn authenticate(&self, _user_name: &str, _password: &str) -> bool {
            false
        }
    }

    struct FixedSecret(&'static str);

    impl SecretResolver for FixedSecret {
        fn secret_for(&self, _client_addr: IpAddr) -> Option<String> {
            Some(self.0.to_string())
        }
    }

    fn test_config(store: MemoryCredentialStore) -> ServerConfig {
        ServerConfig::new(
            "127.0.0.1:0".parse().unwrap(),
            "127.0.0.1:0".parse().unwrap(),
            Arc::new(FixedSecret("s3cr3t")),
        )
        .with_credential_store(Arc::new(store))
    }

    fn access_request(user: &str, password: &str) -> Packet {
        let mut request = Packet::access_request(user, password).unwrap();
        request.authenticator = [1u8; 16];
        request
    }

    #[test]
    fn test_access_accept_on_matching_password() {
        let mut store = MemoryCredentialStore::new();
        store.add_user("alice", "hunter2");
        let config = test_config(store);

        let request = access_request("alice", "hunter2");
        let response =
            RadiusServer::handle_access_request(&request, &config, "10.0.0.1".parse().unwrap())
                .unwrap();

        assert_eq!(response.code, Code::AccessAccept);
        assert_eq!(response.identifier, request.identifier);
    }

    #[test]
    fn test_access_reject_on_password_mismatch() {
        let mut store = MemoryCredentialStore::new();
        store.add_user("alice", "other");
        let config = test_config(store);

        let request = access_request("alice", "hunter2");
        let response =
            RadiusServer::handle_access_request(&request, &config, "10.0.0.1".parse().unwrap())
                .unwrap();

        assert_eq!(response.code, Code::AccessReject);
        assert!(response.find_attribute(codes::REPLY_MESSAGE).is_some());
    }

    #[test]
    fn test_access_reject_on_unknown_user() {
        let config = test_config(MemoryCredentialStore::new());

        let request = access_request("nobody", "x");
        let response =
            RadiusServer::handle_access_request(&request, &config, "10.0.0.1".parse().unwrap())
                .unwrap();
        assert_eq!(response.code, Code::AccessReject);
    }

    #[test]
    fn test_unconfigured_auth_path() {
        let config = ServerConfig::new(
            "127.0.0.1:0".parse().unwrap(),
            "127.0.0.1:0".parse().unwrap(),
            Arc::new(FixedSecret("s3cr3t")),
        );

        let request = access_request("alice", "hunter2");
        let result =
            RadiusServer::handle_access_request(&request, &config, "10.0.0.1".parse().unwrap());
        assert!(matches!(result, Err(ServerError::UnconfiguredAuthPath)));
    }

    #[test]
    fn test_external_rejection_falls_through_to_store() {
        let mut store = MemoryCredentialStore::new();
        store.add_user("alice", "hunter2");
        let config = test_config(store).with_external_authenticator(Arc::new(RejectAll));

        let request = access_request("alice", "hunter2");
        let response =
            RadiusServer::handle_access_request(&request, &config, "10.0.0.1".parse().unwrap())
                .unwrap();
        assert_eq!(response.code, Code::AccessAccept);
    }

    #[test]
    fn test_proxy_state_copied_in_order() {
        let mut store = MemoryCredentialStore::new();
        store.add_user("alice", "other");
        let config = test_config(store);

        let mut request = access_request("alice", "hunter2");
        request.add_attribute(Attribute::octets(codes::PROXY_STATE, b"one".to_vec()).unwrap());
        request.add_attribute(Attribute::octets(codes::PROXY_STATE, b"two".to_vec()).unwrap());

        let response =
            RadiusServer::handle_access_request(&request, &config, "10.0.0.1".parse().unwrap())
                .unwrap();
        let echoed = response.find_all_attributes(codes::PROXY_STATE);
        assert_eq!(echoed.len(), 2);
        assert_eq!(echoed[0].value, b"one");
        assert_eq!(echoed[1].value, b"two");
    }

    #[test]
    fn test_accounting_reply() {
        let mut request = Packet::accounting_request();
        request.add_attribute(Attribute::octets(codes::PROXY_STATE, b"p".to_vec()).unwrap());

        let response = RadiusServer::handle_accounting_request(&request);
        assert_eq!(response.code, Code::AccountingResponse);
        assert_eq!(response.identifier, request.identifier);
        assert_eq!(response.find_all_attributes(codes::PROXY_STATE).len(), 1);
    }
}
