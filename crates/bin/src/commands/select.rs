//! Device user selection shared by the authorize and deauthorize
//! commands.

use authdir::AuthDir;
use authdir::auth::DeviceUser;

/// Resolve the selection flags into device user handles.
///
/// One handle per named device user per selected scope; `all` picks the
/// match-all record instead. Missing records and missing scope documents
/// are created on the fly. An empty selection is a usage error.
pub fn select_device_users(
    dir: &AuthDir,
    device_user_ids: &[String],
    all: bool,
    states: &[String],
    always: bool,
) -> Result<Vec<DeviceUser>, Box<dyn std::error::Error>> {
    let auth = dir.auth();

    let scopes = if always {
        vec![auth.always()]
    } else {
        states.iter().map(|state| auth.on(state)).collect()
    };

    let mut selected = Vec::new();
    for scope in &scopes {
        if all {
            selected.push(scope.ensure_all()?);
        } else {
            for id in device_user_ids {
                selected.push(scope.ensure(id)?);
            }
        }
    }

    if selected.is_empty() {
        return Err("Nothing to do: name a device user and a device state to operate on".into());
    }

    Ok(selected)
}

/// Every device user of every scope present on disk.
pub fn all_device_users(dir: &AuthDir) -> Result<Vec<DeviceUser>, authdir::Error> {
    let mut out = Vec::new();
    for scope in dir.auth().scopes()? {
        out.extend(scope.iter()?);
    }
    Ok(out)
}
