//! Marathon config file loading

use std::io::ErrorKind;

use tracing::debug;

use crate::errors::DeployError;
use crate::filesys::file::File;
use crate::models::app::AppSpec;

/// Load the app definition to publish.
///
/// A missing file and a malformed one are reported as distinct errors.
pub async fn load_app_spec(file: &File) -> Result<AppSpec, DeployError> {
    let path = file.path().to_path_buf();

    let contents = match file.read_string().await {
        Ok(contents) => contents,
        Err(DeployError::IoError(e)) if e.kind() == ErrorKind::NotFound => {
            return Err(DeployError::DescriptorNotFound { path });
        }
        Err(e) => {
            return Err(DeployError::DescriptorInvalid {
                path,
                reason: e.to_string(),
            })
        }
    };

    let spec: AppSpec =
        serde_json::from_str(&contents).map_err(|e| DeployError::DescriptorInvalid {
            path: path.clone(),
            reason: e.to_string(),
        })?;

    if spec.id.trim_matches('/').trim().is_empty() {
        return Err(DeployError::DescriptorInvalid {
            path,
            reason: "app id is empty".to_string(),
        });
    }

    debug!("Loaded app {} from {}", spec.id, file.path().display());
    Ok(spec)
}
