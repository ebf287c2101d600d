//! Off-mesh HTTP relay adapter.
//!
//! Implements [`RelayPort`] by POSTing help traffic to the configured
//! relay endpoint as a small JSON body. A beacon with no `relay_url`
//! reports `is_enabled() == false` and the gateway never calls `post`.
//!
//! Posts are bounded by the configured HTTP timeout so a dead uplink
//! cannot stall the tick loop longer than that.

use log::{debug, warn};
use serde::Serialize;

use crate::app::ports::RelayPort;

#[derive(Serialize)]
struct RelayBody<'a> {
    text: &'a str,
    sender: &'a str,
}

pub struct HttpRelayAdapter {
    url: Option<heapless::String<128>>,
    timeout_ms: u32,
    #[cfg(not(target_os = "espidf"))]
    sim_posts: Vec<(String, String)>,
}

impl HttpRelayAdapter {
    pub fn new(url: Option<heapless::String<128>>, timeout_ms: u32) -> Self {
        Self {
            url,
            timeout_ms,
            #[cfg(not(target_os = "espidf"))]
            sim_posts: Vec::new(),
        }
    }

    /// `(text, sender)` pairs posted on the simulated uplink.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_posts(&self) -> &[(String, String)] {
        &self.sim_posts
    }

    #[cfg(target_os = "espidf")]
    fn platform_post(&mut self, url: &str, body: &str) -> bool {
        use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
        use esp_idf_svc::http::Method;
        use esp_idf_svc::io::Write;

        let config = Configuration {
            timeout: Some(core::time::Duration::from_millis(u64::from(self.timeout_ms))),
            ..Default::default()
        };
        let mut conn = match EspHttpConnection::new(&config) {
            Ok(conn) => conn,
            Err(e) => {
                warn!("relay: connection setup failed: {}", e);
                return false;
            }
        };

        let headers = [
            ("Content-Type", "application/json"),
            ("Content-Length", &body.len().to_string()),
        ];
        if let Err(e) = conn.initiate_request(Method::Post, url, &headers) {
            warn!("relay: request failed: {}", e);
            return false;
        }
        if conn.write_all(body.as_bytes()).is_err() || conn.initiate_response().is_err() {
            warn!("relay: post aborted mid-flight");
            return false;
        }
        let status = conn.status();
        if !(200..300).contains(&status) {
            warn!("relay: endpoint returned HTTP {}", status);
            return false;
        }
        true
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_post(&mut self, _url: &str, body: &str) -> bool {
        debug!("relay(sim): POST {}", body);
        true
    }
}

impl RelayPort for HttpRelayAdapter {
    fn is_enabled(&self) -> bool {
        self.url.is_some()
    }

    fn post(&mut self, text: &str, sender: &str) -> bool {
        let Some(url) = self.url.clone() else {
            return false;
        };
        let body = match serde_json::to_string(&RelayBody { text, sender }) {
            Ok(body) => body,
            Err(e) => {
                warn!("relay: body serialization failed: {}", e);
                return false;
            }
        };
        let ok = self.platform_post(url.as_str(), &body);
        #[cfg(not(target_os = "espidf"))]
        if ok {
            self.sim_posts.push((text.to_owned(), sender.to_owned()));
        }
        ok
    }
}
