//! `login` and `logout`.

use std::{
  io::{self, BufRead, IsTerminal, Write},
  path::Path,
};

use anyhow::{Context, Result, bail};

use crate::credentials::{self, Credentials};

/// Store `api_key`, reading it from stdin when not given.
pub fn login(path: &Path, api_key: Option<String>) -> Result<()> {
  let api_key = match api_key.filter(|k| !k.is_empty()) {
    Some(key) => key,
    None => read_key(io::stdin().lock())?,
  };
  credentials::save(path, &Credentials { api_key })?;
  tracing::info!(path = %path.display(), "stored API key");
  println!("API key saved to {}", path.display());
  Ok(())
}

pub fn logout(path: &Path) -> Result<()> {
  if credentials::remove(path)? {
    println!("Removed stored API key.");
  } else {
    println!("No stored API key.");
  }
  Ok(())
}

fn read_key(mut input: impl BufRead) -> Result<String> {
  if io::stdin().is_terminal() {
    eprint!("Leaseweb API key: ");
    io::stderr().flush().ok();
  }
  let mut line = String::new();
  input.read_line(&mut line).context("reading API key from stdin")?;
  let key = line.trim();
  if key.is_empty() {
    bail!("no API key given");
  }
  Ok(key.to_string())
}
