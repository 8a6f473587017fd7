//! Blocking client for the Turing Pi 2 BMC API.
//!
//! # Design
//! `BmcClient` authenticates once in its constructor and is immutable
//! afterwards. Each operation is split into a `build_*` method that produces
//! an `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`;
//! the plain `*` method runs both around one round trip on the stored
//! transport. Callers that want to drive the I/O themselves can use the
//! halves directly.

use tracing::{debug, warn};

use crate::auth::{self, AuthType, Credentials};
use crate::envelope::{parse_object, parse_scalar};
use crate::error::{Error, Result};
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::types::{Node, OtherInfo, PowerState, PowerStatus};

/// Address of the BMC on a stock Turing Pi 2 board.
pub const DEFAULT_BASE_URL: &str = "https://turingpi.local";

/// Authenticated client for the BMC API.
///
/// The transport is supplied by the caller and used for every request. Pass
/// a reference or an `Arc` to share one transport between several clients.
#[derive(Debug, Clone)]
pub struct BmcClient<T> {
    base_url: String,
    transport: T,
    credentials: Credentials,
}

impl<T: Transport> BmcClient<T> {
    /// Authenticate against the BMC and return a ready client.
    ///
    /// `auth_type` must be exactly `"basic"` or `"bearer"`. An empty
    /// `base_url` selects [`DEFAULT_BASE_URL`].
    pub fn connect(
        base_url: &str,
        auth_type: &str,
        username: &str,
        password: &str,
        transport: T,
    ) -> Result<Self> {
        let auth_type: AuthType = auth_type.parse()?;
        Self::connect_with(base_url, auth_type, username, password, transport)
    }

    /// Same as [`connect`](Self::connect) with an already-parsed auth type.
    pub fn connect_with(
        base_url: &str,
        auth_type: AuthType,
        username: &str,
        password: &str,
        transport: T,
    ) -> Result<Self> {
        let base_url = normalize_base_url(base_url);

        let credentials = match auth_type {
            AuthType::Bearer => {
                let request = auth::build_bearer_login(&base_url, username, password)?;
                debug!(url = %request.url, "requesting bearer token");
                auth::parse_bearer_login(transport.execute(&request)?)
            }
            AuthType::Basic => {
                let request = auth::build_basic_probe(&base_url, username, password);
                debug!(url = %request.url, "validating basic credentials");
                auth::parse_basic_probe(transport.execute(&request)?, username, password)
            }
        }
        .inspect_err(|e| warn!(%auth_type, error = %e, "authentication failed"))?;

        debug!(%auth_type, %base_url, "bmc client ready");
        Ok(Self {
            base_url,
            transport,
            credentials,
        })
    }

    /// Wrap credentials obtained elsewhere, e.g. a token from an earlier
    /// session, without contacting the BMC.
    ///
    /// A bearer token with an empty `id` is rejected the same way the
    /// handshake rejects it.
    pub fn from_credentials(
        base_url: &str,
        credentials: Credentials,
        transport: T,
    ) -> Result<Self> {
        if let Credentials::Bearer(token) = &credentials {
            if token.id.is_empty() {
                return Err(Error::Authentication("response missing token".to_string()));
            }
        }
        Ok(Self {
            base_url: normalize_base_url(base_url),
            transport,
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth_type(&self) -> AuthType {
        self.credentials.auth_type()
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // ---------------------------------------------------------------------
    // Operations
    // ---------------------------------------------------------------------

    /// Firmware and network details of the BMC.
    pub fn get_other(&self) -> Result<OtherInfo> {
        let response = self.round_trip(&self.build_get_other())?;
        self.parse_get_other(response)
    }

    /// Boot `node` from USB on its next power-on.
    pub fn usb_boot(&self, node: u8) -> Result<String> {
        let request = self.build_usb_boot(node)?;
        self.parse_command(self.round_trip(&request)?)
    }

    /// Undo [`usb_boot`](Self::usb_boot) for `node`.
    pub fn clear_usb_boot(&self, node: u8) -> Result<String> {
        let request = self.build_clear_usb_boot(node)?;
        self.parse_command(self.round_trip(&request)?)
    }

    /// Reset the on-board network switch.
    pub fn reset_network(&self) -> Result<String> {
        let request = self.build_reset_network();
        self.parse_command(self.round_trip(&request)?)
    }

    /// Reboot `node` into USB mass storage device mode.
    pub fn node_to_msd(&self, node: u8) -> Result<String> {
        let request = self.build_node_to_msd(node)?;
        self.parse_command(self.round_trip(&request)?)
    }

    /// Switch `node` off (`0`) or on (`1`).
    pub fn set_power(&self, node: u8, state: u8) -> Result<String> {
        let request = self.build_set_power(node, state)?;
        self.parse_command(self.round_trip(&request)?)
    }

    /// Power state of all four nodes.
    pub fn get_power(&self) -> Result<PowerStatus> {
        let response = self.round_trip(&self.build_get_power())?;
        self.parse_get_power(response)
    }

    // ---------------------------------------------------------------------
    // Request builders
    // ---------------------------------------------------------------------

    pub fn build_get_other(&self) -> HttpRequest {
        self.request("/api/bmc?opt=get&type=other")
    }

    pub fn build_usb_boot(&self, node: u8) -> Result<HttpRequest> {
        let node = Node::new(node)?;
        Ok(self.request(&format!("/api/bmc?opt=set&type=usb_boot&node={node}")))
    }

    pub fn build_clear_usb_boot(&self, node: u8) -> Result<HttpRequest> {
        let node = Node::new(node)?;
        Ok(self.request(&format!("/api/bmc?opt=set&type=clear_usb_boot&node={node}")))
    }

    pub fn build_reset_network(&self) -> HttpRequest {
        self.request("/api/bmc?opt=set&type=network")
    }

    pub fn build_node_to_msd(&self, node: u8) -> Result<HttpRequest> {
        let node = Node::new(node)?;
        Ok(self.request(&format!("/api/bmc?opt=set&type=node_to_msd&node={node}")))
    }

    /// The device expects `node<N>=<S>` with no separator between the key
    /// and the node number.
    pub fn build_set_power(&self, node: u8, state: u8) -> Result<HttpRequest> {
        let node = Node::new(node)?;
        let state = PowerState::try_from(state)?;
        Ok(self.request(&format!("/api/bmc?opt=power&type=set&node{node}={state}")))
    }

    pub fn build_get_power(&self) -> HttpRequest {
        self.request("/api/bmc?opt=get&type=power")
    }

    // ---------------------------------------------------------------------
    // Response parsers
    // ---------------------------------------------------------------------

    pub fn parse_get_other(&self, response: HttpResponse) -> Result<OtherInfo> {
        let body = check_status(response)?;
        parse_object(&body).map(OtherInfo::from_map)
    }

    /// Parse the answer to any of the command operations (`usb_boot`,
    /// `clear_usb_boot`, `reset_network`, `node_to_msd`, `set_power`).
    pub fn parse_command(&self, response: HttpResponse) -> Result<String> {
        let body = check_status(response)?;
        parse_scalar(&body)
    }

    pub fn parse_get_power(&self, response: HttpResponse) -> Result<PowerStatus> {
        let body = check_status(response)?;
        parse_object(&body)
    }

    // ---------------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------------

    fn request(&self, endpoint: &str) -> HttpRequest {
        let mut request = HttpRequest::get(format!("{}{endpoint}", self.base_url));
        self.credentials.apply(&mut request);
        request
    }

    fn round_trip(&self, request: &HttpRequest) -> Result<HttpResponse> {
        debug!(method = request.method.as_str(), url = %request.url, "bmc request");
        let response = self.transport.execute(request)?;
        debug!(status = response.status, bytes = response.body.len(), "bmc response");
        Ok(response)
    }
}

/// Reject anything but 200 and hand back the body.
fn check_status(response: HttpResponse) -> Result<Vec<u8>> {
    if response.is_ok() {
        return Ok(response.body);
    }
    let status_line = response.status_line();
    warn!(status = response.status, %status_line, "bmc returned an error status");
    Err(Error::HttpStatus {
        status: response.status,
        status_line,
    })
}

fn normalize_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_BASE_URL.to_string()
    } else {
        trimmed.to_string()
    }
}
