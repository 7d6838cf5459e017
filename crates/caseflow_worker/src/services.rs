//! Clients for the downstream incident and case-phase services.
//!
//! Handlers only see the [`IncidentService`] and [`CasePhaseService`] traits;
//! the HTTP implementations live here and tests substitute in-process fakes.

use async_trait::async_trait;
use caseflow_protocol::{CasePhase, DrcAction, EndpointConfig, SourceType};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Invalid response from {service}: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },
}

/// Body of an incident creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncidentPayload {
    #[serde(rename = "Account_Num")]
    pub account_num: String,
    #[serde(rename = "DRC_Action")]
    pub drc_action: DrcAction,
    #[serde(rename = "Monitor_Months")]
    pub monitor_months: u32,
    #[serde(rename = "Created_By")]
    pub created_by: String,
    #[serde(rename = "Source_Type")]
    pub source_type: SourceType,
    #[serde(rename = "Contact_number", skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
}

/// What the case-phase service said about a case status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseLookup {
    Phase(CasePhase),
    /// 2xx response that carried no `case_phase`.
    Missing,
    /// Non-2xx response.
    Rejected { status: u16 },
}

#[async_trait]
pub trait IncidentService: Send + Sync {
    /// Create one incident; returns the service's JSON reply.
    async fn create_incident(&self, payload: &IncidentPayload) -> Result<serde_json::Value, ServiceError>;
}

#[async_trait]
pub trait CasePhaseService: Send + Sync {
    async fn case_phase(&self, case_status: &str) -> Result<PhaseLookup, ServiceError>;
}

fn build_client(timeout: Duration) -> Result<reqwest::Client, ServiceError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|source| ServiceError::Transport {
            endpoint: "client builder".to_string(),
            source,
        })
}

/// HTTP client for the incident creation endpoint.
pub struct HttpIncidentService {
    http_client: reqwest::Client,
    endpoint: String,
}

impl HttpIncidentService {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        Ok(Self {
            http_client: build_client(timeout)?,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &EndpointConfig) -> Result<Self, ServiceError> {
        Self::new(config.incident_creation.clone(), config.request_timeout())
    }
}

#[async_trait]
impl IncidentService for HttpIncidentService {
    async fn create_incident(&self, payload: &IncidentPayload) -> Result<serde_json::Value, ServiceError> {
        debug!(endpoint = %self.endpoint, account = %payload.account_num, "Sending incident creation request");

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|source| ServiceError::Transport {
                endpoint: self.endpoint.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                service: "incident service",
                status: status.as_u16(),
                body,
            });
        }

        let reply: serde_json::Value = response.json().await.map_err(|err| ServiceError::Decode {
            service: "incident service",
            message: err.to_string(),
        })?;

        info!(account = %payload.account_num, status = status.as_u16(), "Incident created");
        Ok(reply)
    }
}

#[derive(Debug, Deserialize)]
struct CasePhaseReply {
    #[serde(default)]
    case_phase: Option<CasePhase>,
}

/// HTTP client for the case-phase lookup endpoint.
pub struct HttpCasePhaseService {
    http_client: reqwest::Client,
    endpoint: String,
}

impl HttpCasePhaseService {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        Ok(Self {
            http_client: build_client(timeout)?,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &EndpointConfig) -> Result<Self, ServiceError> {
        Self::new(config.case_phase.clone(), config.request_timeout())
    }
}

#[async_trait]
impl CasePhaseService for HttpCasePhaseService {
    async fn case_phase(&self, case_status: &str) -> Result<PhaseLookup, ServiceError> {
        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[("case_status", case_status)])
            .send()
            .await
            .map_err(|source| ServiceError::Transport {
                endpoint: self.endpoint.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            debug!(case_status, status = status.as_u16(), "Case phase lookup rejected");
            return Ok(PhaseLookup::Rejected {
                status: status.as_u16(),
            });
        }

        let reply: CasePhaseReply = response.json().await.map_err(|err| ServiceError::Decode {
            service: "case phase service",
            message: err.to_string(),
        })?;

        Ok(match reply.case_phase {
            Some(phase) => PhaseLookup::Phase(phase),
            None => PhaseLookup::Missing,
        })
    }
}
