//! Detection of the user that executes tests on this machine.

/// Environment variable Jenkins sets to the URL of the running build
pub const ENV_BUILD_URL: &str = "BUILD_URL";

/// Environment variable Jenkins sets to its own base URL
pub const ENV_JENKINS_URL: &str = "JENKINS_URL";

/// User name reported when running inside a Jenkins build
pub const JENKINS_EXECUTOR: &str = "jenkins";

const USER_VARIABLES: [&str; 3] = ["USER", "USERNAME", "LOGNAME"];

/// Determine the executor name for test results.
///
/// Inside a Jenkins build (`BUILD_URL` starts with `JENKINS_URL`) this is
/// `jenkins`; otherwise the lower-cased login name of the current user.
/// Returns `None` when no login name can be determined.
pub fn current_executor() -> Option<String> {
  let build_url = std::env::var(ENV_BUILD_URL).ok();
  let jenkins_url = std::env::var(ENV_JENKINS_URL).ok();

  if let (Some(build_url), Some(jenkins_url)) = (build_url, jenkins_url)
    && !jenkins_url.is_empty()
    && build_url.starts_with(&jenkins_url)
  {
    return Some(JENKINS_EXECUTOR.to_string());
  }

  USER_VARIABLES
    .iter()
    .filter_map(|name| std::env::var(name).ok())
    .find(|value| !value.trim().is_empty())
    .map(|user| user.trim().to_lowercase())
}
