//! Scheduled-batch delivery through the EmailJS REST API.

use recall_core::{Notifier, question::ScheduledQuestion};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{Result, error::ensure_success, http_client};

pub const DEFAULT_ENDPOINT: &str = "https://api.emailjs.com/api/v1.0/email/send";
const SUBJECT: &str = "Your Random Questions";

/// Credentials and addressing for one EmailJS template.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailJsConfig {
  pub service_id:  String,
  pub template_id: String,
  pub user_id:     String,
  /// Sent as a bearer token.
  pub private_key: String,
  pub to_email:    String,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
  service_id:      &'a str,
  template_id:     &'a str,
  user_id:         &'a str,
  template_params: TemplateParams<'a>,
}

#[derive(Debug, Serialize)]
struct TemplateParams<'a> {
  to_email:            &'a str,
  subject:             &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  first_question_id:   Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  first_question_url:  Option<&'a str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  second_question_id:  Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  second_question_url: Option<&'a str>,
  questions:           &'a [ScheduledQuestion],
}

impl<'a> TemplateParams<'a> {
  fn new(to_email: &'a str, batch: &'a [ScheduledQuestion]) -> Self {
    let first = batch.first();
    let second = batch.get(1);
    Self {
      to_email,
      subject: SUBJECT,
      first_question_id: first.map(|q| q.id.0),
      first_question_url: first.map(|q| q.url.as_str()),
      second_question_id: second.map(|q| q.id.0),
      second_question_url: second.map(|q| q.url.as_str()),
      questions: batch,
    }
  }
}

/// Mails every non-empty scheduled batch to the configured address.
#[derive(Debug, Clone)]
pub struct EmailJsNotifier {
  client:   Client,
  endpoint: String,
  config:   EmailJsConfig,
}

impl EmailJsNotifier {
  pub fn new(config: EmailJsConfig) -> Result<Self> {
    Ok(Self { client: http_client()?, endpoint: DEFAULT_ENDPOINT.to_string(), config })
  }

  pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
    self.endpoint = endpoint.into();
    self
  }

  pub async fn send(&self, batch: &[ScheduledQuestion]) -> Result<()> {
    if batch.is_empty() {
      debug!("empty batch; nothing to mail");
      return Ok(());
    }

    let request = SendRequest {
      service_id:      &self.config.service_id,
      template_id:     &self.config.template_id,
      user_id:         &self.config.user_id,
      template_params: TemplateParams::new(&self.config.to_email, batch),
    };
    let resp = self
      .client
      .post(&self.endpoint)
      .bearer_auth(&self.config.private_key)
      .json(&request)
      .send()
      .await?;
    ensure_success(&self.endpoint, resp).await?;

    info!(count = batch.len(), to = %self.config.to_email, "mailed scheduled batch");
    Ok(())
  }
}

impl Notifier for EmailJsNotifier {
  type Error = crate::Error;

  async fn deliver<'a>(&'a self, batch: &'a [ScheduledQuestion]) -> Result<()> {
    self.send(batch).await
  }
}

#[cfg(test)]
mod tests {
  use recall_core::QuestionId;
  use serde_json::json;
  use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path},
  };

  use super::*;
  use crate::Error;

  fn config() -> EmailJsConfig {
    EmailJsConfig {
      service_id:  "svc".into(),
      template_id: "tpl".into(),
      user_id:     "usr".into(),
      private_key: "key".into(),
      to_email:    "me@example.com".into(),
    }
  }

  fn notifier(server: &MockServer) -> EmailJsNotifier {
    EmailJsNotifier::new(config())
      .unwrap()
      .with_endpoint(format!("{}/api/v1.0/email/send", server.uri()))
  }

  fn q(id: i64, slug: &str) -> ScheduledQuestion {
    ScheduledQuestion {
      id:  QuestionId(id),
      url: format!("https://leetcode.com/problems/{slug}/"),
    }
  }

  #[tokio::test]
  async fn posts_template_params_with_bearer_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/api/v1.0/email/send"))
      .and(header("authorization", "Bearer key"))
      .and(body_json(json!({
        "service_id": "svc",
        "template_id": "tpl",
        "user_id": "usr",
        "template_params": {
          "to_email": "me@example.com",
          "subject": "Your Random Questions",
          "first_question_id": 4,
          "first_question_url": "https://leetcode.com/problems/two-sum/",
          "second_question_id": 9,
          "second_question_url": "https://leetcode.com/problems/lru-cache/",
          "questions": [
            { "id": 4, "url": "https://leetcode.com/problems/two-sum/" },
            { "id": 9, "url": "https://leetcode.com/problems/lru-cache/" },
          ],
        },
      })))
      .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
      .expect(1)
      .mount(&server)
      .await;

    notifier(&server)
      .deliver(&[q(4, "two-sum"), q(9, "lru-cache")])
      .await
      .unwrap();
  }

  #[tokio::test]
  async fn single_question_omits_second_slot() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(body_json(json!({
        "service_id": "svc",
        "template_id": "tpl",
        "user_id": "usr",
        "template_params": {
          "to_email": "me@example.com",
          "subject": "Your Random Questions",
          "first_question_id": 4,
          "first_question_url": "https://leetcode.com/problems/two-sum/",
          "questions": [{ "id": 4, "url": "https://leetcode.com/problems/two-sum/" }],
        },
      })))
      .respond_with(ResponseTemplate::new(200))
      .expect(1)
      .mount(&server)
      .await;

    notifier(&server).deliver(&[q(4, "two-sum")]).await.unwrap();
  }

  #[tokio::test]
  async fn empty_batch_is_not_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(200))
      .expect(0)
      .mount(&server)
      .await;

    notifier(&server).deliver(&[]).await.unwrap();
  }

  #[tokio::test]
  async fn rejected_send_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(403).set_body_string("bad key"))
      .mount(&server)
      .await;

    let err = notifier(&server).deliver(&[q(1, "two-sum")]).await.unwrap_err();
    assert!(matches!(err, Error::Status { status, .. } if status.as_u16() == 403));
  }
}
