//! Deploy tasks

use super::Site;
use crate::error::{DeployError, TaskResult};
use crate::runner::{Tool, ToolArgs};
use std::env;
use tracing::info;

/// Variable the deploy client reads its token from
pub const CLIENT_TOKEN_ENV: &str = "FIREBASE_TOKEN";

/// `firebase`: publish the publish directory to the hosting project.
///
/// The token is read from the environment here and nowhere else, and reaches
/// the deploy client through its environment, never its command line. The
/// client runs as a child process that is waited on before returning.
pub fn firebase(site: &Site) -> TaskResult<()> {
    let config = &site.context.config;
    let token_env = &config.deploy.token_env;
    let token = env::var(token_env)
        .ok()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| DeployError::MissingCredential(token_env.clone()))?;

    let project = config.deploy_project();
    let args = ToolArgs::new()
        .value("project", project)
        .path("public_dir", &site.context.publish_dir())
        .env(CLIENT_TOKEN_ENV, token);

    site.toolchain
        .invoke(Tool::Deploy, &args)
        .map_err(|source| DeployError::PublishFailed {
            project: project.to_string(),
            source,
        })?;

    info!(project, "deployed");
    Ok(())
}

/// `exit`: runs only after a successful deploy
pub fn finish(site: &Site) -> TaskResult<()> {
    info!(project = site.context.config.deploy_project(), "deploy finished");
    Ok(())
}
