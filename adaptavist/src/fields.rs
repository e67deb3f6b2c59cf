//! Helpers computing what an edit actually changes.
//!
//! Edits are read-modify-write: the current entity is fetched and only values
//! that differ are put back.

use crate::consts::{
  MULTILINE_SEPARATOR, ROOT_FOLDER, STATUS_BLOCKED, STATUS_FAIL, STATUS_IN_PROGRESS, STATUS_NOT_EXECUTED, STATUS_PASS,
};
use crate::error::{AdaptavistError, Result};
use crate::models::{FolderNode, ScriptResult};
use crate::options::ListEdit;

/// Normalise a folder path.
///
/// Returns `None` for the root folder (sent to the server as `null`) and the
/// path with a single leading slash otherwise. An empty path is rejected; the
/// root folder must be given as `/`.
pub fn normalize_folder(folder: &str) -> Result<Option<String>> {
  let trimmed = folder.trim();
  if trimmed.is_empty() {
    return Err(AdaptavistError::validation(
      "Folder path must not be empty, use \"/\" for the root folder",
    ));
  }

  let mut path = format!("/{trimmed}");
  while path.contains("//") {
    path = path.replace("//", "/");
  }
  let path = path.trim_end_matches('/');

  if path.is_empty() || path == ROOT_FOLDER {
    Ok(None)
  } else {
    Ok(Some(path.to_string()))
  }
}

/// Flatten a folder tree into full paths, the root being `/`
pub fn folder_names(root: &FolderNode) -> Vec<String> {
  let mut names = Vec::new();
  collect_folder_names(root, "", &mut names);
  names
}

fn collect_folder_names(node: &FolderNode, parent: &str, names: &mut Vec<String>) {
  let name = format!("{parent}/{}", node.name).replace("//", "/");
  for child in &node.children {
    collect_folder_names(child, &name, names);
  }
  names.push(name);
}

/// Apply a list edit, returning the new list only when it differs
pub fn merge_list(current: &[String], edit: &ListEdit) -> Option<Vec<String>> {
  let merged = match edit {
    ListEdit::Replace(values) => values.clone(),
    ListEdit::Append(values) => {
      let mut merged = current.to_vec();
      for value in values {
        if !merged.contains(value) {
          merged.push(value.clone());
        }
      }
      merged
    }
  };

  (merged != current).then_some(merged)
}

/// Apply a list edit to a multi-line (HTML) custom field whose entries are
/// separated by line breaks. Returns the new content only when the entries
/// change; the content is always written back with `<br>`.
pub fn merge_multiline(current: &str, edit: &ListEdit) -> Option<String> {
  let current_entries: Vec<String> = current
    .replace("<br />", MULTILINE_SEPARATOR)
    .replace("<br/>", MULTILINE_SEPARATOR)
    .split(MULTILINE_SEPARATOR)
    .map(str::trim)
    .filter(|entry| !entry.is_empty())
    .map(str::to_string)
    .collect();

  merge_list(&current_entries, edit).map(|entries| entries.join(MULTILINE_SEPARATOR))
}

/// Overall status implied by the step results.
///
/// A failed step fails the result, a blocked one blocks it. All steps passed
/// means passed, none executed means not executed; any other mix is in
/// progress. Returns `None` without steps.
pub fn derive_overall_status(steps: &[ScriptResult]) -> Option<&'static str> {
  if steps.is_empty() {
    return None;
  }

  let all = |status: &str| steps.iter().all(|step| step.status == status);
  let any = |status: &str| steps.iter().any(|step| step.status == status);

  let status = if any(STATUS_FAIL) {
    STATUS_FAIL
  } else if any(STATUS_BLOCKED) {
    STATUS_BLOCKED
  } else if all(STATUS_PASS) {
    STATUS_PASS
  } else if all(STATUS_NOT_EXECUTED) {
    STATUS_NOT_EXECUTED
  } else {
    STATUS_IN_PROGRESS
  };

  Some(status)
}
