//! Credential validator: one digest-authenticated request to the
//! privilege-check endpoint.

use camaudit_common::models::device::Credential;
use camaudit_common::network::target::Target;
use camaudit_protocols::http::DeviceClient;
use camaudit_protocols::isapi;
use tracing::debug;

/// Result of checking a credential against one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// The device answered 200: the credential is now bound to this target.
    Accepted(Credential),
    /// Wrong credential, unreachable device or timeout. Not distinguished.
    Rejected,
}

/// Must only be called for targets whose fingerprint matched.
pub async fn validate(client: &DeviceClient, target: &Target, credential: &Credential) -> Validation {
    match client
        .get_digest(&target.url(isapi::USER_CHECK), credential)
        .await
    {
        Ok(response) if response.is_ok() => Validation::Accepted(credential.clone()),
        Ok(response) => {
            debug!(%target, status = response.status, "credential rejected");
            Validation::Rejected
        }
        Err(err) => {
            debug!(%target, error = %err, "credential check failed");
            Validation::Rejected
        }
    }
}
