//! Stored API credentials (`lsw login` / `lsw logout`).
//!
//! The key is kept in a small TOML file under the user's config directory:
//! `$XDG_CONFIG_HOME/lsw/credentials.toml`, falling back to
//! `~/.config/lsw/credentials.toml`.

use std::{
  ffi::OsString,
  fs,
  io::ErrorKind,
  path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Shape of the credentials file.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Credentials {
  pub api_key: String,
}

/// Location of the credentials file, with environment variables read
/// through `var`.
pub fn default_path(var: impl Fn(&str) -> Option<OsString>) -> Result<PathBuf> {
  let base = match var("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
    Some(dir) => PathBuf::from(dir),
    None => {
      let home = var("HOME")
        .ok_or_else(|| anyhow!("neither XDG_CONFIG_HOME nor HOME is set"))?;
      PathBuf::from(home).join(".config")
    }
  };
  Ok(base.join("lsw").join("credentials.toml"))
}

/// Read stored credentials; `None` if nothing has been stored.
pub fn load(path: &Path) -> Result<Option<Credentials>> {
  let raw = match fs::read_to_string(path) {
    Ok(raw) => raw,
    Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
    Err(e) => {
      return Err(e).with_context(|| format!("reading credentials file {}", path.display()));
    }
  };
  let creds: Credentials = toml::from_str(&raw)
    .with_context(|| format!("parsing credentials file {}", path.display()))?;
  Ok(Some(creds).filter(|c| !c.api_key.is_empty()))
}

/// Write `creds`, creating parent directories. On Unix the file is made
/// readable by its owner only.
pub fn save(path: &Path, creds: &Credentials) -> Result<()> {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent)
      .with_context(|| format!("creating directory {}", parent.display()))?;
  }
  let raw = toml::to_string(creds).context("serialising credentials")?;
  fs::write(path, raw).with_context(|| format!("writing credentials file {}", path.display()))?;

  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
      .with_context(|| format!("restricting permissions on {}", path.display()))?;
  }
  Ok(())
}

/// Delete stored credentials. Returns whether a file was removed.
pub fn remove(path: &Path) -> Result<bool> {
  match fs::remove_file(path) {
    Ok(()) => Ok(true),
    Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
    Err(e) => Err(e).with_context(|| format!("removing credentials file {}", path.display())),
  }
}
