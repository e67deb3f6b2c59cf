//! # Folder Endpoints
//!
//! Folders are addressed by path (`/Smoke/Login`). The tree is read through
//! the Jira internal API which needs the numeric project id.

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::client::AdaptavistClient;
use crate::consts::FOLDER_PAGE_SIZE;
use crate::error::Result;
use crate::fields::{folder_names, normalize_folder};
use crate::models::{CreatedId, FolderNode, FolderType};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewFolder<'a> {
  project_key: &'a str,
  name: &'a str,
  #[serde(rename = "type")]
  folder_type: FolderType,
}

impl AdaptavistClient {
  /// Get the paths of all folders of a type, including the root `/`.
  ///
  /// Returns an empty list for unknown projects.
  #[instrument(skip(self), level = "debug")]
  pub fn get_folders(&self, project_key: &str, folder_type: FolderType) -> Result<Vec<String>> {
    let Some(project) = self.find_project(project_key)? else {
      warn!("Project '{project_key}' not found");
      return Ok(Vec::new());
    };

    let url = self.tests_url(&format!(
      "project/{}/foldertree/{}",
      project.id,
      folder_type.tree_segment()
    ));
    let query = [("startAt", "0".to_string()), ("maxResults", FOLDER_PAGE_SIZE.to_string())];

    let tree: Option<FolderNode> = self.get_json(&url, &query)?;
    Ok(tree.map(|root| folder_names(&root)).unwrap_or_default())
  }

  /// Create a folder unless it already exists.
  ///
  /// Returns the id of the new folder, `None` for the root folder or an
  /// existing one.
  #[instrument(skip(self), level = "debug")]
  pub fn create_folder(&self, project_key: &str, folder_type: FolderType, folder: &str) -> Result<Option<u64>> {
    let Some(folder) = normalize_folder(folder)? else {
      return Ok(None);
    };

    if self.get_folders(project_key, folder_type)?.contains(&folder) {
      debug!("Folder '{folder}' ({folder_type}) already exists in project '{project_key}'");
      return Ok(None);
    }

    let url = self.atm_url("folder");
    let body = NewFolder {
      project_key,
      name: &folder,
      folder_type,
    };

    debug!("Creating folder '{folder}' ({folder_type}) in project '{project_key}'");
    let created: CreatedId = self.post_json(&url, &body, &format!("Project {project_key}"))?;
    Ok(Some(created.id))
  }

  /// Normalise an optional folder and make sure it exists.
  ///
  /// Returns the value for the `folder` field: `None` is the root folder.
  pub(crate) fn prepare_folder(
    &self,
    project_key: &str,
    folder_type: FolderType,
    folder: Option<&str>,
  ) -> Result<Option<String>> {
    let Some(folder) = folder else {
      return Ok(None);
    };

    let normalized = normalize_folder(folder)?;
    if let Some(path) = normalized.as_deref() {
      self.create_folder(project_key, folder_type, path)?;
    }
    Ok(normalized)
  }
}
