//! Checkout providers behind `POST /api/pay`

use aivis_core::Mode;
use serde::Serialize;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("checkout provider rejected the request: {0}")]
    Rejected(String),
}

/// A validated request to pay for a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub mode: Mode,
    /// Normalized target URL
    pub url: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutSession {
    pub session_id: String,
    /// Where the browser should be sent next
    pub session_url: String,
}

/// Creates a payment session for a report
pub trait CheckoutProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn create_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession, CheckoutError>;
}

/// Local checkout that goes straight to the success page
#[derive(Debug, Clone, Default)]
pub struct SandboxCheckout;

impl CheckoutProvider for SandboxCheckout {
    fn name(&self) -> &'static str {
        "sandbox"
    }

    fn create_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession, CheckoutError> {
        let session_id = format!("sandbox_{}", Uuid::new_v4().simple());
        Ok(CheckoutSession {
            session_url: format!("/success?mode={}&session_id={}", request.mode, session_id),
            session_id,
        })
    }
}

/// Hosted payment link with the report details as query parameters
#[derive(Debug, Clone)]
pub struct PaymentLinkCheckout {
    link: Url,
}

impl PaymentLinkCheckout {
    pub fn new(link: Url) -> Self {
        Self { link }
    }
}

impl CheckoutProvider for PaymentLinkCheckout {
    fn name(&self) -> &'static str {
        "payment_link"
    }

    fn create_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession, CheckoutError> {
        if self.link.cannot_be_a_base() {
            return Err(CheckoutError::Rejected(format!(
                "payment link '{}' cannot carry parameters",
                self.link
            )));
        }

        let session_id = Uuid::new_v4().to_string();
        let mut session_url = self.link.clone();
        {
            let mut query = session_url.query_pairs_mut();
            query
                .append_pair("mode", request.mode.as_str())
                .append_pair("url", &request.url)
                .append_pair("client_reference_id", &session_id);
            if let Some(email) = &request.email {
                query.append_pair("prefilled_email", email);
            }
        }

        Ok(CheckoutSession {
            session_id,
            session_url: session_url.to_string(),
        })
    }
}
