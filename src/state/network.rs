use crate::state::messages::{NetworkRequest, NetworkResponse};
use log::{debug, error, warn};
use pool_api::{ApiResult, PoolApi};
use tokio::sync::mpsc;

/// Serves `NetworkRequest`s one at a time against the pool service.
pub struct NetworkWorker {
    client: PoolApi,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
}

impl NetworkWorker {
    pub fn new(
        client: PoolApi,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self { client, requests, responses }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            let result = match request {
                NetworkRequest::LoadEntries | NetworkRequest::RefreshEntries => {
                    self.handle_load_entries(request).await
                }
            };

            debug!("network request {request:?} complete");

            let response = result.unwrap_or_else(|err| {
                warn!("{request:?} failed: {err}");
                NetworkResponse::Error {
                    message: err.to_string(),
                    retryable: err.is_retryable(),
                }
            });

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn handle_load_entries(&self, request: NetworkRequest) -> ApiResult<NetworkResponse> {
        debug!("{request:?} from {}", self.client.base_url());
        let entries = self.client.fetch_entries().await?;
        Ok(NetworkResponse::EntriesLoaded { entries })
    }
}
