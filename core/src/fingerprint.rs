//! Fingerprint matcher: confirms a target runs the audited device stack
//! before any credential material is sent to it.

use camaudit_common::network::target::Target;
use camaudit_protocols::http::DeviceClient;
use camaudit_protocols::isapi;
use tracing::debug;

/// Fetches the device family's static UI asset without credentials.
///
/// Only an HTTP 200 counts. Transport errors, timeouts and any other status
/// are a mismatch, and there is no retry.
pub async fn matches(client: &DeviceClient, target: &Target) -> bool {
    match client.get(&target.url(isapi::FINGERPRINT_ASSET)).await {
        Ok(response) if response.is_ok() => true,
        Ok(response) => {
            debug!(%target, status = response.status, "fingerprint asset missing");
            false
        }
        Err(err) => {
            debug!(%target, error = %err, "fingerprint request failed");
            false
        }
    }
}
