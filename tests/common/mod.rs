//! Local directory-server stand-ins for integration tests
//!
//! The servers speak just enough LDAP, framed with `LdapCodec`, to answer a
//! StartTLS request; after that they drain the connection until the client
//! hangs up.

#![allow(dead_code)]

use rcgen::{BasicConstraints, Certificate, CertificateParams, DnType, IsCa, KeyPair};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::ServerConfig;
use futures::{SinkExt, StreamExt};
use ldap3_proto::proto::{LdapExtendedResponse, LdapResult};
use ldap_config_wire::protocol::{LdapCodec, LdapMsg, LdapOp, LdapResultCode, START_TLS_OID};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_rustls::TlsAcceptor;
use tokio_util::codec::Framed;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Certificate material for a test server
pub struct TestPki {
    /// PEM of the certificate clients should trust
    pub ca_pem: String,
    chain: Vec<CertificateDer<'static>>,
    key_der: Vec<u8>,
}

impl TestPki {
    /// Leaf for `names` signed by a fresh test CA; `ca_pem` is the CA
    pub fn ca_signed(names: &[&str]) -> Self {
        let ca_key = KeyPair::generate().unwrap();
        let mut ca_params = CertificateParams::new(Vec::<String>::new()).unwrap();
        ca_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        ca_params
            .distinguished_name
            .push(DnType::CommonName, "ldap-config-wire test CA");
        let ca_cert: Certificate = ca_params.self_signed(&ca_key).unwrap();

        let leaf_key = KeyPair::generate().unwrap();
        let leaf_params =
            CertificateParams::new(names.iter().map(|n| n.to_string()).collect::<Vec<_>>())
                .unwrap();
        let leaf_cert = leaf_params.signed_by(&leaf_key, &ca_cert, &ca_key).unwrap();

        Self {
            ca_pem: ca_cert.pem(),
            chain: vec![leaf_cert.der().clone(), ca_cert.der().clone()],
            key_der: leaf_key.serialize_der(),
        }
    }

    /// Self-signed leaf for `names`; `ca_pem` is the leaf itself
    pub fn self_signed(names: &[&str]) -> Self {
        let certified = rcgen::generate_simple_self_signed(
            names.iter().map(|n| n.to_string()).collect::<Vec<_>>(),
        )
        .unwrap();

        Self {
            ca_pem: certified.cert.pem(),
            chain: vec![certified.cert.der().clone()],
            key_der: certified.key_pair.serialize_der(),
        }
    }

    pub fn acceptor(&self) -> TlsAcceptor {
        let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
        let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(self.key_der.clone()));
        let config = ServerConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .unwrap()
            .with_no_client_auth()
            .with_single_cert(self.chain.clone(), key)
            .unwrap();
        TlsAcceptor::from(Arc::new(config))
    }
}

/// How the stand-in server treats each accepted connection
#[derive(Clone)]
pub enum Behavior {
    /// Plain LDAP; never speaks first
    Plain,
    /// Answer StartTLS with success and run the TLS handshake
    StartTls(TlsAcceptor),
    /// Answer StartTLS with `unavailable`
    RefuseStartTls,
    /// TLS from the first byte
    Ldaps(TlsAcceptor),
    /// Accept and never answer
    Silent,
}

/// Running stand-in server
pub struct TestServer {
    pub port: u16,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(behavior: Behavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let behavior = behavior.clone();
                tokio::spawn(async move {
                    serve(stream, behavior).await;
                });
            }
        });

        Self { port, handle }
    }

    pub fn url(&self, scheme: &str) -> String {
        format!("{}://127.0.0.1:{}", scheme, self.port)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Port with nothing listening on it
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

async fn serve(stream: TcpStream, behavior: Behavior) {
    match behavior {
        Behavior::Plain => drain(stream).await,
        Behavior::StartTls(acceptor) => {
            let mut framed = Framed::new(stream, LdapCodec);
            let Some(msgid) = read_start_tls_request(&mut framed).await else {
                return;
            };
            let response = start_tls_response(msgid, LdapResultCode::Success);
            if framed.send(response).await.is_err() {
                return;
            }
            let stream = framed.into_parts().io;
            if let Ok(tls) = acceptor.accept(stream).await {
                drain(tls).await;
            }
        }
        Behavior::RefuseStartTls => {
            let mut framed = Framed::new(stream, LdapCodec);
            let Some(msgid) = read_start_tls_request(&mut framed).await else {
                return;
            };
            let response = start_tls_response(msgid, LdapResultCode::Unavailable);
            let _ = framed.send(response).await;
            drain(framed.into_parts().io).await;
        }
        Behavior::Ldaps(acceptor) => {
            if let Ok(tls) = acceptor.accept(stream).await {
                drain(tls).await;
            }
        }
        Behavior::Silent => {
            let _hold = stream;
            std::future::pending::<()>().await;
        }
    }
}

/// Next message, which must be a StartTLS ExtendedRequest; returns its id
async fn read_start_tls_request(framed: &mut Framed<TcpStream, LdapCodec>) -> Option<i32> {
    let msg = framed.next().await?.ok()?;
    match msg.op {
        LdapOp::ExtendedRequest(request) => {
            assert_eq!(request.name, START_TLS_OID, "expected a StartTLS request");
            Some(msg.msgid)
        }
        other => panic!("expected an ExtendedRequest, got {:?}", other),
    }
}

fn start_tls_response(msgid: i32, code: LdapResultCode) -> LdapMsg {
    LdapMsg {
        msgid,
        op: LdapOp::ExtendedResponse(LdapExtendedResponse {
            res: LdapResult {
                code,
                matcheddn: String::new(),
                message: String::new(),
                referral: vec![],
            },
            name: None,
            value: None,
        }),
        ctrl: vec![],
    }
}

async fn drain<S: AsyncRead + AsyncWrite + Unpin>(mut stream: S) {
    let mut buf = [0u8; 256];
    while let Ok(n) = stream.read(&mut buf).await {
        if n == 0 {
            break;
        }
    }
}
