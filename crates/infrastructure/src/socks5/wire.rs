use std::net::IpAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

const VERSION: u8 = 0x05;
const CMD_CONNECT: u8 = 0x01;
const ATYP_IPV4: u8 = 0x01;
const ATYP_DOMAIN: u8 = 0x03;
const ATYP_IPV6: u8 = 0x04;

pub struct ParsedRequest {
    pub domain: Option<String>,
    pub dst_ip: Option<IpAddr>,
    pub dst_port: u16,
}

#[derive(Debug, Clone, Copy)]
pub enum Reply {
    Succeeded,
    ConnectionNotAllowed,
    HostUnreachable,
    CommandNotSupported,
}

impl Reply {
    fn code(self) -> u8 {
        match self {
            Reply::Succeeded => 0x00,
            Reply::ConnectionNotAllowed => 0x02,
            Reply::HostUnreachable => 0x04,
            Reply::CommandNotSupported => 0x07,
        }
    }
}

/// Negotiates NOAUTH and parses a CONNECT request (§4.7.1). Returns `Ok(None)`
/// for a well-formed-but-unsupported command/ATYP (BIND, UDP ASSOCIATE) after
/// sending the matching error reply; returns `Err` for anything that leaves
/// the stream in an unreadable state (closed without a reply, no log row).
pub async fn read_connect_request(stream: &mut TcpStream) -> std::io::Result<Option<ParsedRequest>> {
    let mut greeting = [0u8; 2];
    stream.read_exact(&mut greeting).await?;
    if greeting[0] != VERSION || greeting[1] == 0 {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "bad socks5 greeting",
        ));
    }

    let mut methods = vec![0u8; greeting[1] as usize];
    stream.read_exact(&mut methods).await?;
    if !methods.contains(&0x00) {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "client does not support NOAUTH",
        ));
    }
    stream.write_all(&[VERSION, 0x00]).await?;

    let mut header = [0u8; 4];
    stream.read_exact(&mut header).await?;
    if header[0] != VERSION {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "bad socks5 request version",
        ));
    }

    if header[1] != CMD_CONNECT {
        write_reply_raw(stream, Reply::CommandNotSupported).await?;
        return Ok(None);
    }

    let (domain, dst_ip) = match header[3] {
        ATYP_IPV4 => {
            let mut octets = [0u8; 4];
            stream.read_exact(&mut octets).await?;
            (None, Some(IpAddr::from(octets)))
        }
        ATYP_IPV6 => {
            let mut octets = [0u8; 16];
            stream.read_exact(&mut octets).await?;
            (None, Some(IpAddr::from(octets)))
        }
        ATYP_DOMAIN => {
            let mut len = [0u8];
            stream.read_exact(&mut len).await?;
            let mut buf = vec![0u8; len[0] as usize];
            stream.read_exact(&mut buf).await?;
            let domain = String::from_utf8(buf).map_err(|_| {
                std::io::Error::new(std::io::ErrorKind::InvalidData, "non-utf8 domain")
            })?;
            (Some(domain.trim_end_matches('.').to_string()), None)
        }
        _ => {
            write_reply_raw(stream, Reply::CommandNotSupported).await?;
            return Ok(None);
        }
    };

    let mut port_buf = [0u8; 2];
    stream.read_exact(&mut port_buf).await?;
    let dst_port = u16::from_be_bytes(port_buf);

    Ok(Some(ParsedRequest {
        domain,
        dst_ip,
        dst_port,
    }))
}

pub async fn write_reply(stream: &mut TcpStream, reply: Reply) -> Result<(), custos_domain::DomainError> {
    write_reply_raw(stream, reply)
        .await
        .map_err(custos_domain::DomainError::from)
}

async fn write_reply_raw(stream: &mut TcpStream, reply: Reply) -> std::io::Result<()> {
    let buf = [
        VERSION,
        reply.code(),
        0x00, // RSV
        ATYP_IPV4,
        0, 0, 0, 0, // BND.ADDR (unused by clients)
        0, 0, // BND.PORT
    ];
    stream.write_all(&buf).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn loopback_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr);
        let (server, client) = tokio::join!(
            async { listener.accept().await.unwrap().0 },
            async { client.await.unwrap() }
        );
        (server, client)
    }

    #[tokio::test]
    async fn parses_domain_connect_request() {
        let (mut server, mut client) = loopback_pair().await;

        let writer = tokio::spawn(async move {
            client.write_all(&[VERSION, 1, 0x00]).await.unwrap();
            let mut reply = [0u8; 2];
            client.read_exact(&mut reply).await.unwrap();
            assert_eq!(reply, [VERSION, 0x00]);

            let domain = b"example.com";
            let mut req = vec![VERSION, CMD_CONNECT, 0x00, ATYP_DOMAIN, domain.len() as u8];
            req.extend_from_slice(domain);
            req.extend_from_slice(&443u16.to_be_bytes());
            client.write_all(&req).await.unwrap();
        });

        let parsed = read_connect_request(&mut server).await.unwrap().unwrap();
        assert_eq!(parsed.domain.as_deref(), Some("example.com"));
        assert_eq!(parsed.dst_ip, None);
        assert_eq!(parsed.dst_port, 443);

        writer.await.unwrap();
    }

    #[tokio::test]
    async fn strips_trailing_dot_from_domain() {
        let (mut server, mut client) = loopback_pair().await;

        let writer = tokio::spawn(async move {
            client.write_all(&[VERSION, 1, 0x00]).await.unwrap();
            let mut reply = [0u8; 2];
            client.read_exact(&mut reply).await.unwrap();

            let domain = b"example.com.";
            let mut req = vec![VERSION, CMD_CONNECT, 0x00, ATYP_DOMAIN, domain.len() as u8];
            req.extend_from_slice(domain);
            req.extend_from_slice(&80u16.to_be_bytes());
            client.write_all(&req).await.unwrap();
        });

        let parsed = read_connect_request(&mut server).await.unwrap().unwrap();
        assert_eq!(parsed.domain.as_deref(), Some("example.com"));

        writer.await.unwrap();
    }

    #[tokio::test]
    async fn parses_ipv4_and_ipv6_atyp() {
        let (mut server, mut client) = loopback_pair().await;

        let writer = tokio::spawn(async move {
            client.write_all(&[VERSION, 1, 0x00]).await.unwrap();
            let mut reply = [0u8; 2];
            client.read_exact(&mut reply).await.unwrap();

            let mut req = vec![VERSION, CMD_CONNECT, 0x00, ATYP_IPV6];
            req.extend_from_slice(&[0u8; 15]);
            req.push(1); // ::1
            req.extend_from_slice(&1080u16.to_be_bytes());
            client.write_all(&req).await.unwrap();
        });

        let parsed = read_connect_request(&mut server).await.unwrap().unwrap();
        assert_eq!(parsed.domain, None);
        assert_eq!(parsed.dst_ip, Some(IpAddr::from([0u8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1])));
        assert_eq!(parsed.dst_port, 1080);

        writer.await.unwrap();
    }

    #[tokio::test]
    async fn bind_command_gets_command_not_supported_reply() {
        let (mut server, mut client) = loopback_pair().await;

        let writer = tokio::spawn(async move {
            client.write_all(&[VERSION, 1, 0x00]).await.unwrap();
            let mut reply = [0u8; 2];
            client.read_exact(&mut reply).await.unwrap();

            // CMD = 0x02 (BIND), never supported.
            let mut req = vec![VERSION, 0x02, 0x00, ATYP_IPV4];
            req.extend_from_slice(&[127, 0, 0, 1]);
            req.extend_from_slice(&0u16.to_be_bytes());
            client.write_all(&req).await.unwrap();

            let mut final_reply = [0u8; 10];
            client.read_exact(&mut final_reply).await.unwrap();
            assert_eq!(final_reply[1], Reply::CommandNotSupported.code());
        });

        let parsed = read_connect_request(&mut server).await.unwrap();
        assert!(parsed.is_none());

        writer.await.unwrap();
    }

    #[tokio::test]
    async fn rejects_greeting_without_noauth() {
        let (mut server, mut client) = loopback_pair().await;

        let writer = tokio::spawn(async move {
            // Advertise only username/password auth (0x02).
            client.write_all(&[VERSION, 1, 0x02]).await.unwrap();
        });

        let result = read_connect_request(&mut server).await;
        assert!(result.is_err());

        writer.await.unwrap();
    }
}
