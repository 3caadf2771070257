//! One-shot lookups: WHOIS, DNS, reverse DNS, BGP and the caller's own IP

use crate::request::{ApiClient, RequestError};
use api::types::{BgpResponse, DnsResponse, DnsType, IpResponse, ReverseDnsResponse, WhoisResponse};
use std::net::IpAddr;
use tracing::debug;

impl ApiClient {
    pub async fn whois(&self, host: &str, location: Option<&str>) -> Result<String, RequestError> {
        debug!("WHOIS {}", host);
        let response: WhoisResponse = self
            .get_json("/whois/:host", &[("host", host.into())], location)
            .await?;
        Ok(response.result)
    }

    pub async fn dns(
        &self,
        record_type: DnsType,
        host: &str,
        trace: bool,
        location: Option<&str>,
    ) -> Result<DnsResponse, RequestError> {
        debug!("DNS {} {} (trace: {})", record_type, host, trace);
        self.get_json(
            "/dns/:type/:host",
            &[
                ("type", record_type.as_str().into()),
                ("host", host.into()),
                ("trace", trace.into()),
            ],
            location,
        )
        .await
    }

    pub async fn reverse_dns(
        &self,
        ip: IpAddr,
        trace: bool,
        location: Option<&str>,
    ) -> Result<ReverseDnsResponse, RequestError> {
        debug!("rDNS {} (trace: {})", ip, trace);
        self.get_json(
            "/rdns/:ip",
            &[("ip", ip.to_string().into()), ("trace", trace.into())],
            location,
        )
        .await
    }

    pub async fn bgp(&self, ip: IpAddr, location: Option<&str>) -> Result<BgpResponse, RequestError> {
        debug!("BGP {}", ip);
        self.get_json("/bgp/:ip", &[("ip", ip.to_string().into())], location)
            .await
    }

    /// Address the backend sees requests coming from
    pub async fn own_ip(&self, location: Option<&str>) -> Result<String, RequestError> {
        let response: IpResponse = self.get_json("/ip", &[], location).await?;
        Ok(response.ip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::HopProbe;
    use api::{Location, LocationRegistry};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answer a single HTTP request, returning the request line it received
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = stream.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;

            request.lines().next().unwrap_or_default().to_string()
        });

        (format!("http://{}", addr), handle)
    }

    fn client(origin: String) -> ApiClient {
        let registry =
            LocationRegistry::init(vec![Location::new("Local", "local", Some(origin))]).unwrap();
        ApiClient::new(registry, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_whois() {
        let (origin, server) = serve_once("200 OK", r#"{"result": "Domain Name: EXAMPLE.COM"}"#).await;

        let result = client(origin).whois("example.com", None).await.unwrap();
        assert_eq!(result, "Domain Name: EXAMPLE.COM");
        assert_eq!(server.await.unwrap(), "GET /v1/whois/example.com HTTP/1.1");
    }

    #[tokio::test]
    async fn test_error_body_message() {
        let (origin, server) =
            serve_once("400 Bad Request", r#"{"message": "unable to parse hostname or IP"}"#).await;

        let err = client(origin).bgp("192.0.2.1".parse().unwrap(), Some("local")).await.unwrap_err();
        assert!(err.is_status());
        assert_eq!(err.to_string(), "unable to parse hostname or IP");
        assert_eq!(server.await.unwrap(), "GET /v1/bgp/192.0.2.1 HTTP/1.1");
    }

    #[tokio::test]
    async fn test_traceroute_hop_request() {
        let (origin, server) =
            serve_once("200 OK", r#"{"destination_ip": "1.1.1.1", "traceroute": []}"#).await;

        let response = client(origin).hop("one.one.one.one", 2, "local").await.unwrap();
        assert_eq!(response.destination_ip, "1.1.1.1");
        assert_eq!(
            server.await.unwrap(),
            "GET /v1/traceroute/one.one.one.one?hop=2 HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn test_dns_request() {
        let (origin, server) = serve_once(
            "200 OK",
            r#"{"MX": [{"type": "MX", "ttl": 300, "priority": 10, "name": "example.com.", "value": "mail.example.com."}]}"#,
        )
        .await;

        let records = client(origin)
            .dns(DnsType::Mx, "example.com", true, None)
            .await
            .unwrap();
        assert_eq!(records[&DnsType::Mx][0].priority, Some(10));
        assert_eq!(
            server.await.unwrap(),
            "GET /v1/dns/MX/example.com?trace=true HTTP/1.1"
        );
    }
}
