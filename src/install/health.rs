//! Post-start health check.
//!
//! Confirms the agent is actually serving: polls its listen port by TCP
//! connect with a bounded number of attempts, then double-checks that
//! systemd reports the unit active.

use anyhow::{Result, anyhow};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};

use super::service_control;

const HEALTH_ATTEMPTS: u32 = 10;
const HEALTH_RETRY_DELAY: Duration = Duration::from_secs(1);
const HEALTH_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Wait until something accepts connections on the agent port
pub async fn wait_for_listen(port: u16) -> Result<()> {
    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port);

    for attempt in 1..=HEALTH_ATTEMPTS {
        match timeout(HEALTH_CONNECT_TIMEOUT, TcpStream::connect(addr)).await {
            Ok(Ok(_stream)) => {
                log::info!("Agent listening on port {} (attempt {})", port, attempt);
                return Ok(());
            }
            Ok(Err(e)) => {
                log::debug!("Connect attempt {}/{} failed: {}", attempt, HEALTH_ATTEMPTS, e);
            }
            Err(_) => {
                log::debug!("Connect attempt {}/{} timed out", attempt, HEALTH_ATTEMPTS);
            }
        }

        if attempt < HEALTH_ATTEMPTS {
            sleep(HEALTH_RETRY_DELAY).await;
        }
    }

    Err(anyhow!(
        "Agent not listening on port {} after {} attempts",
        port,
        HEALTH_ATTEMPTS
    ))
}

/// Verify the service is listening and systemd reports it active
pub async fn verify_service(service_name: &str, port: u16) -> Result<()> {
    wait_for_listen(port).await?;

    if !service_control::is_active(service_name)? {
        return Err(anyhow!(
            "Port {} is open but systemd does not report {} active",
            port,
            service_name
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn detects_listening_socket() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("local addr").port();

        wait_for_listen(port).await.expect("port is open");
    }
}
