use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

/// Starts a WHOIS server on an ephemeral localhost port and returns the port.
///
/// `answer` maps a query to a response; `None` produces a "No match" reply
/// the way Verisign does for unregistered names.
pub(crate) async fn spawn_whois_server<F>(answer: F) -> u16
where
    F: Fn(&str) -> Option<String> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let (read_half, mut write_half) = stream.into_split();
            let mut line = String::new();
            if BufReader::new(read_half).read_line(&mut line).await.is_err() {
                continue;
            }

            let query = line.trim();
            let reply = answer(query)
                .unwrap_or_else(|| format!("No match for \"{}\".\r\n", query.to_uppercase()));
            let _ = write_half.write_all(reply.as_bytes()).await;
            let _ = write_half.shutdown().await;
        }
    });

    port
}
