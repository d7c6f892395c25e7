// Response payload module
// Bodies serialized into `Response::body`, one shape per action

use serde::Serialize;

pub const ARCHITECTURE: &str = "ultra-low-cost";
pub const BACKEND_MESSAGE: &str = "ITSANDBOX Ultra-Low-Cost Backend";
pub const INTERNAL_ERROR: &str = "Internal server error";

/// Capability flag value; every advertised feature is on
const ENABLED: &str = "enabled";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Features {
    pub github_pages: &'static str,
    pub mock_api: &'static str,
    pub local_storage: &'static str,
    pub cost_monitoring: &'static str,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            github_pages: ENABLED,
            mock_api: ENABLED,
            local_storage: ENABLED,
            cost_monitoring: ENABLED,
        }
    }
}

/// `health-check` body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthPayload<'a> {
    pub status: &'static str,
    pub timestamp: &'a str,
    pub architecture: &'static str,
    pub estimated_monthly_cost: &'static str,
    pub features: Features,
}

impl<'a> HealthPayload<'a> {
    pub fn new(timestamp: &'a str) -> Self {
        Self {
            status: "healthy",
            timestamp,
            architecture: ARCHITECTURE,
            estimated_monthly_cost: "$0.50-2.00",
            features: Features::default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EstimatedCosts {
    pub hosting: &'static str,
    pub backend: &'static str,
    pub monitoring: &'static str,
    pub total: &'static str,
}

/// `system-stats` body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatsPayload<'a> {
    pub platform: &'static str,
    pub architecture: &'static str,
    pub hosting: &'static str,
    pub backend: &'static str,
    pub database: &'static str,
    pub estimated_costs: EstimatedCosts,
    pub timestamp: &'a str,
}

impl<'a> SystemStatsPayload<'a> {
    pub const fn new(timestamp: &'a str) -> Self {
        Self {
            platform: "aws-lambda",
            architecture: ARCHITECTURE,
            hosting: "GitHub Pages",
            backend: "Minimal Lambda",
            database: "LocalStorage + GitHub",
            estimated_costs: EstimatedCosts {
                hosting: "$0.00 (GitHub Pages)",
                backend: "$0.50-2.00 (Lambda)",
                monitoring: "$0.00-1.00 (CloudWatch)",
                total: "$0.50-3.00/month",
            },
            timestamp,
        }
    }
}

/// Body for any unrecognized action; echoes the label back
#[derive(Debug, Serialize)]
pub struct EchoPayload<'a> {
    pub message: &'static str,
    pub action: &'a str,
    pub timestamp: &'a str,
    pub cost: &'static str,
}

impl<'a> EchoPayload<'a> {
    pub const fn new(action: &'a str, timestamp: &'a str) -> Self {
        Self {
            message: BACKEND_MESSAGE,
            action,
            timestamp,
            cost: "Under $5/month",
        }
    }
}

/// Body of the 500 response
#[derive(Debug, Serialize)]
pub struct ErrorPayload<'a> {
    pub error: &'static str,
    pub message: &'a str,
    pub timestamp: &'a str,
}

impl<'a> ErrorPayload<'a> {
    pub const fn new(message: &'a str, timestamp: &'a str) -> Self {
        Self {
            error: INTERNAL_ERROR,
            message,
            timestamp,
        }
    }
}
