// PowerView hub HTTP client
//
// Wraps `reqwest::Client` with hub URL construction, envelope unwrapping and
// status checking. Every call is independent; serializing mutations is the
// job of `powerview-core`, not this client.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{
    Shade, ShadeEnvelope, ShadeId, ShadeUpdate, ShadesResponse, UserData, UserDataEnvelope,
};
use crate::transport::TransportConfig;

/// Raw HTTP client for a PowerView hub.
///
/// Cheap to clone: the underlying `reqwest::Client` shares its connection pool.
#[derive(Debug, Clone)]
pub struct HubClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HubClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the hub root, e.g. `http://192.168.1.20`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for a hub API path: `{base}/home/{path}`.
    pub(crate) fn home_url(&self, path: &str) -> Result<Url, Error> {
        let full = format!("{}/home/{}", self.base_url.as_str().trim_end_matches('/'), path);
        Ok(Url::parse(&full)?)
    }

    fn shade_url(&self, id: ShadeId) -> Result<Url, Error> {
        self.home_url(&format!("shades/{id}"))
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// List every shade known to the hub.
    ///
    /// `GET /home/shades`
    pub async fn get_shades(&self) -> Result<ShadesResponse, Error> {
        let url = self.home_url("shades")?;
        self.get(url).await
    }

    /// Fetch a single shade.
    ///
    /// `GET /home/shades/{id}`, with `?refresh=true` when `refresh` is set,
    /// which makes the hub poll the shade over RF before answering.
    pub async fn get_shade(&self, id: ShadeId, refresh: bool) -> Result<Shade, Error> {
        let mut url = self.shade_url(id)?;
        if refresh {
            url.query_pairs_mut().append_pair("refresh", "true");
        }
        let envelope: ShadeEnvelope<Shade> = self.get(url).await?;
        Ok(envelope.shade)
    }

    /// Send a position or motion update to a shade.
    ///
    /// `PUT /home/shades/{id}` with `{"shade": <update>}`
    pub async fn put_shade(&self, id: ShadeId, update: &ShadeUpdate) -> Result<Shade, Error> {
        let url = self.shade_url(id)?;
        let envelope: ShadeEnvelope<Shade> =
            self.put(url, &ShadeEnvelope { shade: update }).await?;
        Ok(envelope.shade)
    }

    /// Fetch hub identity and account information.
    ///
    /// `GET /home/userdata`
    pub async fn get_user_data(&self) -> Result<UserData, Error> {
        let url = self.home_url("userdata")?;
        let envelope: UserDataEnvelope = self.get(url).await?;
        Ok(envelope.user_data)
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;

        Self::parse_response(resp).await
    }

    async fn put<T: DeserializeOwned>(&self, url: Url, body: &impl Serialize) -> Result<T, Error> {
        debug!("PUT {}", url);

        let resp = self
            .http
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_response(resp).await
    }

    /// Anything but `200 OK` is an error; a 200 body must parse as `T`.
    async fn parse_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            return Err(Error::Status {
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}
