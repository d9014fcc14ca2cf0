use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::oneshot;

/// Canned answer a mock server gives to every query.
#[derive(Debug, Clone)]
pub enum MockAnswer {
    /// One A record, ttl 60, name compressed against the question.
    Address(Ipv4Addr),
    /// One MX record, ttl 120.
    Mail(u16, &'static str),
    /// One PTR record, ttl 3600.
    Pointer(&'static str),
    NxDomain,
    /// NOERROR with an empty answer section.
    Empty,
    /// A valid answer carrying the wrong transaction id.
    WrongId,
    /// Never replies.
    Silent,
    /// A 93.184.216.34 followed by an MX whose RDATA (`00 0a 3f`) ends
    /// inside the exchange name.
    MalformedTrailer,
}

pub struct MockDnsServer {
    addr: SocketAddr,
    queries: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn start(answer: MockAnswer) -> Result<(Self, SocketAddr), std::io::Error> {
        let socket = UdpSocket::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let local_addr = socket.local_addr()?;
        let queries = Arc::new(AtomicUsize::new(0));
        let counter = queries.clone();

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            let mut buf = vec![0u8; 512];

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        break;
                    }
                    result = socket.recv_from(&mut buf) => {
                        if let Ok((len, peer)) = result {
                            counter.fetch_add(1, Ordering::SeqCst);
                            if let Some(response) = build_response(&buf[..len], &answer) {
                                let _ = socket.send_to(&response, peer).await;
                            }
                        }
                    }
                }
            }
        });

        Ok((
            Self {
                addr: local_addr,
                queries,
                shutdown_tx: Some(shutdown_tx),
            },
            local_addr,
        ))
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Builds the response to `query` by echoing its header and question.
pub fn build_response(query: &[u8], answer: &MockAnswer) -> Option<Vec<u8>> {
    if query.len() < 12 || matches!(answer, MockAnswer::Silent) {
        return None;
    }

    let rcode = match answer {
        MockAnswer::NxDomain => 0x03,
        _ => 0x00,
    };
    let (ancount, answer_rr) = match answer {
        MockAnswer::MalformedTrailer => {
            let mut records = resource_record(1, 60, vec![93, 184, 216, 34]);
            records.extend_from_slice(&resource_record(15, 300, vec![0x00, 0x0a, 0x3f]));
            (2, records)
        }
        _ => {
            let record = answer_record(answer);
            (if record.is_empty() { 0 } else { 1 }, record)
        }
    };

    let mut response = Vec::with_capacity(512);
    match answer {
        MockAnswer::WrongId => {
            response.extend_from_slice(&[query[0] ^ 0xff, query[1]]);
        }
        _ => response.extend_from_slice(&query[0..2]),
    }
    response.push(0x81);
    response.push(0x80 | rcode);
    response.extend_from_slice(&query[4..6]);
    response.extend_from_slice(&[0x00, ancount]);
    response.extend_from_slice(&[0x00, 0x00]);
    response.extend_from_slice(&[0x00, 0x00]);
    response.extend_from_slice(&query[12..]);
    response.extend_from_slice(&answer_rr);
    Some(response)
}

fn answer_record(answer: &MockAnswer) -> Vec<u8> {
    let (rtype, ttl, rdata): (u16, u32, Vec<u8>) = match answer {
        MockAnswer::Address(ip) => (1, 60, ip.octets().to_vec()),
        MockAnswer::WrongId => (1, 60, vec![93, 184, 216, 34]),
        MockAnswer::Mail(preference, exchange) => {
            let mut rdata = preference.to_be_bytes().to_vec();
            rdata.extend_from_slice(&encode_name(exchange));
            (15, 120, rdata)
        }
        MockAnswer::Pointer(target) => (12, 3600, encode_name(target)),
        _ => return Vec::new(),
    };
    resource_record(rtype, ttl, rdata)
}

/// Answer owned by the question name through a compression pointer.
fn resource_record(rtype: u16, ttl: u32, rdata: Vec<u8>) -> Vec<u8> {
    let mut record = vec![0xc0, 0x0c];
    record.extend_from_slice(&rtype.to_be_bytes());
    record.extend_from_slice(&[0x00, 0x01]);
    record.extend_from_slice(&ttl.to_be_bytes());
    record.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
    record.extend_from_slice(&rdata);
    record
}

fn encode_name(name: &str) -> Vec<u8> {
    let mut out = Vec::new();
    for label in name.trim_end_matches('.').split('.') {
        out.push(label.len() as u8);
        out.extend_from_slice(label.as_bytes());
    }
    out.push(0);
    out
}
