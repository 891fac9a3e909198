//! # Per-Target Probe Pipeline
//!
//! `scope check -> fingerprint -> credential check -> inventory`.
//!
//! A failed stage ends the pipeline for that target and is reported as an
//! ordinary outcome, not an error: most candidates are expected to drop out.

use std::fmt;

use camaudit_common::config::Config;
use camaudit_common::models::device::{Credential, DeviceRecord};
use camaudit_common::network::scope::Scope;
use camaudit_common::network::target::Target;
use camaudit_protocols::http::{DeviceClient, TransportError};
use tracing::info;

use crate::auth::{self, Validation};
use crate::{fingerprint, inventory};

/// Terminal state of one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Fingerprint and credential both passed; inventory attached best-effort.
    Matched(Box<DeviceRecord>),
    FingerprintFailed,
    AuthFailed,
    /// Not inside the authorized scope; nothing was sent.
    OutOfScope,
    /// Same `address:port` already dispatched earlier in this run.
    Duplicate,
}

impl ProbeOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, ProbeOutcome::Matched(_))
    }

    pub fn into_record(self) -> Option<DeviceRecord> {
        match self {
            ProbeOutcome::Matched(record) => Some(*record),
            _ => None,
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProbeOutcome::Matched(_) => "matched",
            ProbeOutcome::FingerprintFailed => "fingerprint mismatch",
            ProbeOutcome::AuthFailed => "credential rejected",
            ProbeOutcome::OutOfScope => "out of scope",
            ProbeOutcome::Duplicate => "duplicate",
        };
        f.write_str(label)
    }
}

/// Runs the pipeline with one credential for a whole run.
#[derive(Debug, Clone)]
pub struct Prober {
    client: DeviceClient,
    credential: Credential,
    scope: Option<Scope>,
}

impl Prober {
    pub fn new(cfg: &Config, credential: Credential) -> Result<Self, TransportError> {
        Ok(Self {
            client: DeviceClient::new(cfg.timeout)?,
            credential,
            scope: None,
        })
    }

    /// Restricts probing to targets inside `scope`.
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub async fn probe(&self, target: &Target) -> ProbeOutcome {
        if let Some(scope) = &self.scope {
            if !scope.permits(target) {
                return ProbeOutcome::OutOfScope;
            }
        }

        if !fingerprint::matches(&self.client, target).await {
            return ProbeOutcome::FingerprintFailed;
        }

        let credential = match auth::validate(&self.client, target, &self.credential).await {
            Validation::Accepted(credential) => credential,
            Validation::Rejected => return ProbeOutcome::AuthFailed,
        };

        let mut record = DeviceRecord::new(target.clone(), credential);
        let found = inventory::extract(&self.client, target, &record.credential).await;
        record.device_info = found.device_info;
        record.channels = found.channels;
        record.users = found.users;

        info!(
            %target,
            cameras = record.channels.len(),
            users = record.users.len(),
            "logged in"
        );

        ProbeOutcome::Matched(Box::new(record))
    }
}
