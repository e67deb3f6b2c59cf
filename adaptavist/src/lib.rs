//! # Adaptavist Test Management Client
//!
//! Convenience client for the REST API of Adaptavist Test Management (TM4J)
//! on a Jira server, plus the Jira APIs it relies on. Every method issues one
//! or more blocking HTTP requests with Basic authentication and maps the JSON
//! answers to typed models.
//!
//! Queries never fail because nothing was found; they return `None` or an
//! empty list instead. Edits only send the fields that actually change.

pub mod auth;
mod client;
pub mod consts;
mod endpoints;
pub mod error;
pub mod fields;
pub mod models;
pub mod options;

#[cfg(test)]
mod testing;

pub use adaptavist_core::Verification;
pub use auth::create_client_from_config;
// Re-export the client
pub use client::{AdaptavistClient, ClientOptions};
pub use error::{AdaptavistError, Result};
// Re-export models
pub use models::{
  AdaptavistAuth, Attachment, AttachmentRef, Environment, FolderNode, FolderType, Project, ReportReference,
  ScriptResult, TestCase, TestCaseRef, TestExecution, TestPlan, TestResult, TestRun, TestRunItem, TestRunRef,
  TestScript, TestStep, User,
};
pub use options::{
  Assignee, BulkResultOptions, CloneOptions, ListEdit, NewTestResult, ScriptStatusEdit, TestCaseEdit,
  TestCaseOptions, TestPlanEdit, TestPlanOptions, TestResultEdit, TestResultOptions, TestRunOptions,
};
