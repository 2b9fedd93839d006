use std::net::IpAddr;
use std::time::Duration;

use chrono::Local;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use super::message::{compose_message, Notification};
use crate::config::{SmtpConfig, DEFAULT_TIMEOUT};
use crate::error::{LapseError, Result};

/// A complete, possibly multi-line, server reply.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Reply {
    code: u16,
    text: String,
}

impl Reply {
    fn is_positive(&self) -> bool {
        (200..400).contains(&self.code)
    }
}

/// Delivers alert emails over plain SMTP, one connection per message.
#[derive(Debug, Clone)]
pub struct EmailNotifier {
    config: SmtpConfig,
    timeout: Duration,
}

impl EmailNotifier {
    pub fn new(config: SmtpConfig) -> Self {
        Self {
            config,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[instrument(skip(self, notification), fields(domain = %notification.domain))]
    pub async fn send(&self, notification: &Notification) -> Result<()> {
        let message = compose_message(
            notification,
            &self.config.from,
            &self.config.to,
            Local::now().fixed_offset(),
        );

        let mut session =
            SmtpSession::connect(&self.config.server, self.config.port, self.timeout).await?;

        let delivered = session
            .deliver(&self.config.from, &self.config.to, &message)
            .await;
        // The message is already accepted or refused; a failed QUIT changes nothing
        if let Err(e) = session.quit().await {
            debug!(error = %e, "QUIT failed");
        }
        delivered?;

        debug!(to = %self.config.to, "Alert email accepted by {}", self.config.server);
        Ok(())
    }
}

struct SmtpSession {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    hello_name: String,
    server: String,
    timeout: Duration,
}

impl SmtpSession {
    async fn connect(server: &str, port: u16, timeout_after: Duration) -> Result<Self> {
        let addr = format!("{}:{}", server, port);
        let stream = timeout(timeout_after, TcpStream::connect(&addr))
            .await
            .map_err(|_| LapseError::Smtp(format!("connection to {} timed out", addr)))?
            .map_err(|e| LapseError::Smtp(format!("cannot connect to {}: {}", addr, e)))?;

        let hello_name = match stream.local_addr().map(|a| a.ip()) {
            Ok(IpAddr::V4(ip)) => format!("[{}]", ip),
            Ok(IpAddr::V6(ip)) => format!("[IPv6:{}]", ip),
            Err(_) => "localhost".to_string(),
        };

        let (read_half, write_half) = stream.into_split();
        let mut session = Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            hello_name,
            server: server.to_string(),
            timeout: timeout_after,
        };

        let greeting = session.read_reply().await?;
        if greeting.code != 220 {
            return Err(session.rejected("greeting", &greeting));
        }
        Ok(session)
    }

    async fn deliver(&mut self, from: &str, to: &str, message: &str) -> Result<()> {
        self.hello().await?;
        self.expect(&format!("MAIL FROM:<{}>", from), &[250]).await?;
        self.expect(&format!("RCPT TO:<{}>", to), &[250, 251]).await?;
        self.expect("DATA", &[354]).await?;

        let mut payload = dot_stuff(message);
        payload.push_str(".\r\n");
        self.write(&payload).await?;

        let reply = self.read_reply().await?;
        if reply.code != 250 {
            return Err(self.rejected("message", &reply));
        }
        Ok(())
    }

    /// EHLO, falling back to HELO for servers that predate ESMTP.
    async fn hello(&mut self) -> Result<()> {
        let ehlo = self.command(&format!("EHLO {}", self.hello_name)).await?;
        if ehlo.code == 250 {
            return Ok(());
        }

        warn!(code = ehlo.code, server = %self.server, "EHLO refused, retrying with HELO");
        self.expect(&format!("HELO {}", self.hello_name), &[250])
            .await
            .map(|_| ())
    }

    async fn quit(&mut self) -> Result<()> {
        self.command("QUIT").await.map(|_| ())
    }

    async fn expect(&mut self, line: &str, accepted: &[u16]) -> Result<Reply> {
        let reply = self.command(line).await?;
        if accepted.contains(&reply.code) {
            Ok(reply)
        } else {
            let verb = line.split([' ', ':']).next().unwrap_or(line);
            Err(self.rejected(verb, &reply))
        }
    }

    async fn command(&mut self, line: &str) -> Result<Reply> {
        debug!(command = %line, "SMTP >");
        self.write(&format!("{}\r\n", line)).await?;
        self.read_reply().await
    }

    async fn write(&mut self, data: &str) -> Result<()> {
        timeout(self.timeout, self.writer.write_all(data.as_bytes()))
            .await
            .map_err(|_| LapseError::Smtp(format!("write to {} timed out", self.server)))?
            .map_err(|e| LapseError::Smtp(format!("write to {} failed: {}", self.server, e)))
    }

    async fn read_reply(&mut self) -> Result<Reply> {
        let mut text = Vec::new();

        loop {
            let mut line = String::new();
            let read = timeout(self.timeout, self.reader.read_line(&mut line))
                .await
                .map_err(|_| LapseError::Smtp(format!("{} stopped responding", self.server)))?
                .map_err(|e| LapseError::Smtp(format!("read from {} failed: {}", self.server, e)))?;
            if read == 0 {
                return Err(LapseError::Smtp(format!(
                    "{} closed the connection",
                    self.server
                )));
            }

            let line = line.trim_end_matches(['\r', '\n']);
            let code = line
                .get(..3)
                .and_then(|c| c.parse::<u16>().ok())
                .ok_or_else(|| {
                    LapseError::Smtp(format!("malformed reply from {}: {:?}", self.server, line))
                })?;
            text.push(line.get(4..).unwrap_or("").to_string());

            // "250-" continues a multi-line reply, "250 " ends it
            if line.as_bytes().get(3) != Some(&b'-') {
                debug!(code = code, "SMTP <");
                let reply = Reply {
                    code,
                    text: text.join(" "),
                };
                if !reply.is_positive() {
                    debug!(text = %reply.text, "SMTP negative reply");
                }
                return Ok(reply);
            }
        }
    }

    fn rejected(&self, stage: &str, reply: &Reply) -> LapseError {
        LapseError::Smtp(format!(
            "{} rejected {}: {} {}",
            self.server, stage, reply.code, reply.text
        ))
    }
}

/// Doubles a leading dot on every line so the body cannot end the `DATA` phase early.
fn dot_stuff(message: &str) -> String {
    let mut stuffed = String::with_capacity(message.len() + 8);
    for line in message.split_inclusive("\r\n") {
        if line.starts_with('.') {
            stuffed.push('.');
        }
        stuffed.push_str(line);
    }
    if !stuffed.ends_with("\r\n") {
        stuffed.push_str("\r\n");
    }
    stuffed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    #[derive(Clone, Copy, Default)]
    struct Script {
        reject_ehlo: bool,
        reject_rcpt: bool,
    }

    /// Accepts one SMTP session and returns every line the client sent.
    async fn spawn_smtp_server(script: Script) -> (u16, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (read_half, mut write_half) = stream.into_split();
            let mut lines = BufReader::new(read_half).lines();
            let mut seen = Vec::new();
            let mut in_data = false;

            write_half
                .write_all(b"220 mail.example.test ESMTP\r\n")
                .await
                .unwrap();

            while let Some(line) = lines.next_line().await.unwrap() {
                seen.push(line.clone());

                if in_data {
                    if line == "." {
                        in_data = false;
                        write_half.write_all(b"250 2.0.0 queued\r\n").await.unwrap();
                    }
                    continue;
                }

                let verb = line.split([' ', ':']).next().unwrap_or("").to_uppercase();
                let reply: &[u8] = match verb.as_str() {
                    "EHLO" if script.reject_ehlo => b"502 5.5.1 command not recognized\r\n",
                    "EHLO" => b"250-mail.example.test\r\n250 8BITMIME\r\n",
                    "HELO" => b"250 mail.example.test\r\n",
                    "MAIL" => b"250 2.1.0 ok\r\n",
                    "RCPT" if script.reject_rcpt => b"550 5.1.1 no such user\r\n",
                    "RCPT" => b"250 2.1.5 ok\r\n",
                    "DATA" => {
                        in_data = true;
                        b"354 end data with <CR><LF>.<CR><LF>\r\n"
                    }
                    "QUIT" => {
                        write_half.write_all(b"221 2.0.0 bye\r\n").await.unwrap();
                        break;
                    }
                    _ => b"500 5.5.2 unknown command\r\n",
                };
                write_half.write_all(reply).await.unwrap();
            }
            seen
        });

        (port, handle)
    }

    fn notifier(port: u16) -> EmailNotifier {
        EmailNotifier::new(SmtpConfig {
            server: "127.0.0.1".to_string(),
            port,
            to: "hostmaster@example.net".to_string(),
            from: "lapse@example.net".to_string(),
        })
        .with_timeout(Duration::from_secs(5))
    }

    fn notification() -> Notification {
        Notification {
            domain: "example.com".to_string(),
            registrar: "Example Registrar".to_string(),
            expiration: NaiveDate::from_ymd_opt(2020, 6, 23).unwrap(),
            days_remaining: 14,
        }
    }

    #[tokio::test]
    async fn test_send_dialogue() {
        let (port, server) = spawn_smtp_server(Script::default()).await;

        notifier(port).send(&notification()).await.unwrap();
        let seen = server.await.unwrap();

        assert!(seen[0].starts_with("EHLO [127.0.0.1]"));
        assert_eq!(seen[1], "MAIL FROM:<lapse@example.net>");
        assert_eq!(seen[2], "RCPT TO:<hostmaster@example.net>");
        assert_eq!(seen[3], "DATA");
        assert!(seen.contains(
            &"Subject: The DNS Domain example.com is set to expire in 14 days".to_string()
        ));
        assert!(seen.contains(&"Time to renew example.com".to_string()));
        assert_eq!(seen.last().map(String::as_str), Some("QUIT"));
    }

    #[tokio::test]
    async fn test_helo_fallback() {
        let script = Script {
            reject_ehlo: true,
            ..Script::default()
        };
        let (port, server) = spawn_smtp_server(script).await;

        notifier(port).send(&notification()).await.unwrap();
        let seen = server.await.unwrap();

        assert!(seen[0].starts_with("EHLO "));
        assert!(seen[1].starts_with("HELO "));
        assert_eq!(seen[2], "MAIL FROM:<lapse@example.net>");
    }

    #[tokio::test]
    async fn test_rejected_recipient() {
        let script = Script {
            reject_rcpt: true,
            ..Script::default()
        };
        let (port, server) = spawn_smtp_server(script).await;

        let err = notifier(port).send(&notification()).await.unwrap_err();
        let seen = server.await.unwrap();

        assert!(matches!(err, LapseError::Smtp(_)));
        assert!(err.to_string().contains("550"), "{err}");
        assert!(!seen.contains(&"DATA".to_string()));
        assert_eq!(seen.last().map(String::as_str), Some("QUIT"));
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = notifier(port).send(&notification()).await.unwrap_err();
        assert!(matches!(err, LapseError::Smtp(_)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_dot_stuff() {
        assert_eq!(dot_stuff("a\r\n.b\r\n..c\r\n"), "a\r\n..b\r\n...c\r\n");
        assert_eq!(dot_stuff(".\r\n"), "..\r\n");
        assert_eq!(dot_stuff("no newline"), "no newline\r\n");
    }
}
