//! Listener API client

use control_plane_api::{Listener, ResourceList};

use crate::errors::ClientError;
use crate::http::client::HttpClient;

impl HttpClient {
    /// List all available listeners.
    ///
    /// Errors go through the same channel as every other call; use
    /// [`ClientError::to_error_response`] to get the `{error, message}` shape.
    pub async fn list_listeners(&self) -> Result<ResourceList<Listener>, ClientError> {
        self.get("/v2/listeners", "Failed to list listeners").await
    }
}
