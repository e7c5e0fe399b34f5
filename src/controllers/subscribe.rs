use crate::config::{SubscribeConfig, SubscribeFormIds};
use crate::dom::{require, Dom};
use crate::error::{TransportError, UiError};
use crate::host::Host;
use crate::transport::{SubscribeRequest, SubscribeTransport};

/// Result of one submit of a subscription form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Email failed client-side validation; nothing was sent.
    Rejected,
    /// Server accepted the subscription.
    Subscribed(String),
    /// Server answered with `success: false`.
    Declined(String),
    /// Network or parse failure.
    Failed(TransportError),
}

/// Non-empty and containing `@`. Returns the trimmed address.
pub fn validate_email(raw: &str) -> Option<&str> {
    let email = raw.trim();
    if email.is_empty() || !email.contains('@') {
        None
    } else {
        Some(email)
    }
}

/// Newsletter signup form. The footer and article-page variants are the same
/// component bound to different element IDs.
pub struct SubscribeForm<D: Dom> {
    ids: SubscribeFormIds,
    invalid_email_message: String,
    failure_message: String,
    loading_html: String,
    form: D::Node,
    email: D::Node,
    button: D::Node,
    fingerprint_field: D::Node,
    fingerprint: String,
}

impl<D: Dom> Clone for SubscribeForm<D> {
    fn clone(&self) -> Self {
        SubscribeForm {
            ids: self.ids.clone(),
            invalid_email_message: self.invalid_email_message.clone(),
            failure_message: self.failure_message.clone(),
            loading_html: self.loading_html.clone(),
            form: self.form.clone(),
            email: self.email.clone(),
            button: self.button.clone(),
            fingerprint_field: self.fingerprint_field.clone(),
            fingerprint: self.fingerprint.clone(),
        }
    }
}

impl<D: Dom> SubscribeForm<D> {
    /// Anchored on the form element. Writes `fingerprint` into the hidden field.
    pub fn bind(
        dom: &D,
        ids: &SubscribeFormIds,
        cfg: &SubscribeConfig,
        fingerprint: &str,
    ) -> Result<Option<Self>, UiError> {
        let form = match dom.by_id(&ids.form_id) {
            Some(f) => f,
            None => return Ok(None),
        };
        let email = require(dom, &ids.email_id)?;
        let button = require(dom, &ids.button_id)?;
        let fingerprint_field = require(dom, &ids.fingerprint_id)?;
        dom.set_value(&fingerprint_field, fingerprint);

        Ok(Some(SubscribeForm {
            ids: ids.clone(),
            invalid_email_message: cfg.invalid_email_message.clone(),
            failure_message: cfg.failure_message.clone(),
            loading_html: cfg.loading_html.clone(),
            form,
            email,
            button,
            fingerprint_field,
            fingerprint: fingerprint.to_string(),
        }))
    }

    pub fn ids(&self) -> &SubscribeFormIds {
        &self.ids
    }

    pub fn form(&self) -> &D::Node {
        &self.form
    }

    pub fn set_fingerprint(&mut self, dom: &D, fingerprint: &str) {
        dom.set_value(&self.fingerprint_field, fingerprint);
        self.fingerprint = fingerprint.to_string();
    }

    fn fingerprint_value(&self, dom: &D) -> String {
        let value = dom.value(&self.fingerprint_field);
        if value.is_empty() {
            self.fingerprint.clone()
        } else {
            value
        }
    }

    /// Validate, post, report. The submit button is disabled while the request
    /// is in flight and always restored afterwards.
    pub async fn submit<H, T>(&self, dom: &D, host: &H, transport: &T) -> SubmitOutcome
    where
        H: Host,
        T: SubscribeTransport + ?Sized,
    {
        let raw = dom.value(&self.email);
        let email = match validate_email(&raw) {
            Some(e) => e.to_string(),
            None => {
                host.alert(&self.invalid_email_message);
                return SubmitOutcome::Rejected;
            }
        };

        let original_label = dom.inner_html(&self.button);
        dom.set_disabled(&self.button, true);
        dom.set_inner_html(&self.button, &self.loading_html);

        let req = SubscribeRequest {
            email,
            browser_fingerprint: self.fingerprint_value(dom),
        };

        let outcome = match transport.subscribe(&req).await {
            Ok(resp) => {
                host.alert(&resp.message);
                if resp.success {
                    dom.set_value(&self.email, "");
                    SubmitOutcome::Subscribed(resp.message)
                } else {
                    SubmitOutcome::Declined(resp.message)
                }
            }
            Err(e) => {
                log::warn!("[subscribe] #{} failed: {}", self.ids.form_id, e);
                host.alert(&self.failure_message);
                SubmitOutcome::Failed(e)
            }
        };

        dom.set_disabled(&self.button, false);
        dom.set_inner_html(&self.button, &original_label);
        outcome
    }
}
