//! # Attachment Endpoints
//!
//! Files are attached to a test result or to a single step of it. Results
//! are looked up by test run and test case, or addressed by their id
//! directly.

use reqwest::blocking::multipart::{Form, Part};
use tracing::{debug, instrument, warn};

use crate::client::{AdaptavistClient, check_status};
use crate::consts::{ATLASSIAN_TOKEN_HEADER, ATLASSIAN_TOKEN_NOCHECK};
use crate::error::{AdaptavistError, Result};
use crate::models::{Attachment, AttachmentRef, TestResult};

/// Wire index of a 1-based step number, checked against the steps of `result`
fn step_index(result: &TestResult, step: usize) -> Result<usize> {
  if step == 0 {
    return Err(AdaptavistError::validation("Step numbers start at 1"));
  }
  if result.step(step).is_none() {
    return Err(AdaptavistError::validation(format!(
      "Test result {} has no step {step}",
      result.id
    )));
  }
  Ok(step - 1)
}

impl AdaptavistClient {
  /// Get the attachments of the latest test result of a test case within a
  /// test run. Empty when there is no such result.
  #[instrument(skip(self), level = "debug")]
  pub fn get_test_result_attachments(&self, test_run_key: &str, test_case_key: &str) -> Result<Vec<AttachmentRef>> {
    match self.get_test_result(test_run_key, test_case_key)? {
      Some(result) => self.get_attachments_by_result_id(result.id),
      None => {
        debug!("No test result for {test_case_key} in {test_run_key}");
        Ok(Vec::new())
      }
    }
  }

  /// Attach a file to the latest test result of a test case within a test run
  #[instrument(skip(self, attachment), level = "debug")]
  pub fn add_test_result_attachment(
    &self,
    test_run_key: &str,
    test_case_key: &str,
    attachment: Attachment,
  ) -> Result<AttachmentRef> {
    let result = self.get_test_result(test_run_key, test_case_key)?.ok_or_else(|| {
      AdaptavistError::NotFound(format!("Test result of {test_case_key} in test run {test_run_key}"))
    })?;

    self.add_attachment_by_result_id(result.id, attachment)
  }

  /// Get the attachments of a test result by its id
  #[instrument(skip(self), level = "debug")]
  pub fn get_attachments_by_result_id(&self, test_result_id: u64) -> Result<Vec<AttachmentRef>> {
    let url = self.atm_url(&format!("testresult/{test_result_id}/attachments"));
    Ok(self.get_json(&url, &[])?.unwrap_or_default())
  }

  /// Attach a file to a test result by its id
  #[instrument(skip(self, attachment), level = "debug")]
  pub fn add_attachment_by_result_id(&self, test_result_id: u64, attachment: Attachment) -> Result<AttachmentRef> {
    let url = self.atm_url(&format!("testresult/{test_result_id}/attachments"));
    self.upload(&url, attachment, &format!("Test result {test_result_id}"))
  }

  /// Get the attachments of one step (1-based) of the latest test result.
  /// Empty when there is no such result.
  #[instrument(skip(self), level = "debug")]
  pub fn get_test_script_attachments(
    &self,
    test_run_key: &str,
    test_case_key: &str,
    step: usize,
  ) -> Result<Vec<AttachmentRef>> {
    let Some(result) = self.get_test_result(test_run_key, test_case_key)? else {
      debug!("No test result for {test_case_key} in {test_run_key}");
      return Ok(Vec::new());
    };

    let index = step_index(&result, step)?;
    let url = self.atm_url(&format!("testresult/{}/step/{index}/attachments", result.id));
    Ok(self.get_json(&url, &[])?.unwrap_or_default())
  }

  /// Attach a file to one step (1-based) of the latest test result
  #[instrument(skip(self, attachment), level = "debug")]
  pub fn add_test_script_attachment(
    &self,
    test_run_key: &str,
    test_case_key: &str,
    step: usize,
    attachment: Attachment,
  ) -> Result<AttachmentRef> {
    let result = self.get_test_result(test_run_key, test_case_key)?.ok_or_else(|| {
      AdaptavistError::NotFound(format!("Test result of {test_case_key} in test run {test_run_key}"))
    })?;

    let index = step_index(&result, step)?;
    let url = self.atm_url(&format!("testresult/{}/step/{index}/attachments", result.id));
    self.upload(&url, attachment, &format!("Step {step} of test result {}", result.id))
  }

  /// Upload a file as multipart form field `file`.
  ///
  /// Servers answering without a JSON body still count as success, the
  /// reference then only carries the file name.
  fn upload(&self, url: &str, attachment: Attachment, entity: &str) -> Result<AttachmentRef> {
    let Attachment { filename, content } = attachment;
    debug!("Uploading '{filename}' ({} bytes) to {url}", content.len());

    let part = Part::bytes(content)
      .file_name(filename.clone())
      .mime_str("application/octet-stream")?;
    let form = Form::new().part("file", part);

    let builder = self
      .client
      .post(url)
      .header(ATLASSIAN_TOKEN_HEADER, ATLASSIAN_TOKEN_NOCHECK)
      .multipart(form);
    let response = check_status(self.request(builder).send()?, entity)?;
    let text = response.text()?;

    let mut reference = match serde_json::from_str::<AttachmentRef>(&text) {
      Ok(reference) => reference,
      Err(e) => {
        if !text.trim().is_empty() {
          warn!("Unexpected answer to the upload of '{filename}': {e}");
        }
        AttachmentRef::default()
      }
    };
    if reference.filename.is_empty() {
      reference.filename = filename;
    }
    Ok(reference)
  }
}
