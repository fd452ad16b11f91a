use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TallyError};
use crate::models::PlanTier;

const BILLING_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Annual,
}

impl BillingCycle {
    pub fn parse(value: &str) -> Option<BillingCycle> {
        match value {
            "monthly" => Some(BillingCycle::Monthly),
            "annual" => Some(BillingCycle::Annual),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "monthly",
            BillingCycle::Annual => "annual",
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutRequest<'a> {
    plan: PlanTier,
    cycle: BillingCycle,
    user_id: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutResponse {
    redirect_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PortalResponse {
    portal_url: Option<String>,
}

fn client() -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(BILLING_TIMEOUT)
        .build()
        .map_err(|e| TallyError::Network(e.to_string()))
}

fn require_endpoint(endpoint: Option<&str>) -> Result<&str> {
    endpoint.ok_or_else(|| TallyError::Other("Billing endpoint not configured".to_string()))
}

/// Start a plan checkout and return the payment page URL. The plan itself
/// only changes once the user confirms with `plan set`.
pub fn start_checkout(
    endpoint: Option<&str>,
    plan: PlanTier,
    cycle: BillingCycle,
    user_id: &str,
) -> Result<String> {
    let base = require_endpoint(endpoint)?.trim_end_matches('/');
    let response = client()?
        .post(format!("{base}/billing/checkout"))
        .json(&CheckoutRequest { plan, cycle, user_id })
        .send()
        .map_err(|e| TallyError::Network(format!("Checkout failed: {e}")))?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(TallyError::Network(format!(
            "Checkout failed: {} {}",
            status.as_u16(),
            body.trim()
        )));
    }
    let payload: CheckoutResponse = response
        .json()
        .map_err(|e| TallyError::Network(format!("Checkout failed: {e}")))?;
    payload
        .redirect_url
        .filter(|url| !url.is_empty())
        .ok_or_else(|| {
            TallyError::Network("Billing endpoint did not return redirectUrl".to_string())
        })
}

/// Fetch the customer portal URL for managing an existing subscription.
pub fn portal_url(endpoint: Option<&str>, user_id: &str) -> Result<String> {
    let base = require_endpoint(endpoint)?.trim_end_matches('/');
    let response = client()?
        .get(format!("{base}/billing/portal"))
        .query(&[("userId", user_id)])
        .send()
        .map_err(|e| TallyError::Network(format!("Portal request failed: {e}")))?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(TallyError::Network(format!(
            "Portal request failed: {} {}",
            status.as_u16(),
            body.trim()
        )));
    }
    let payload: PortalResponse = response
        .json()
        .map_err(|e| TallyError::Network(format!("Portal request failed: {e}")))?;
    payload
        .portal_url
        .filter(|url| !url.is_empty())
        .ok_or_else(|| {
            TallyError::Network("Billing endpoint did not return portalUrl".to_string())
        })
}
