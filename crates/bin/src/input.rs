//! Public key acquisition for commands taking a KEY argument.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use authdir::pubkey::Pubkey;

/// Conventional key file consulted when no key is given, relative to
/// the home directory.
const HOME_PUBKEY: &str = ".ssh/id_rsa.pub";

/// Turn the KEY argument into a key, structurally validated.
///
/// `-` reads stdin, an existing path reads that file, anything else is
/// taken as the key text itself. With no KEY and no USER argument the
/// key of the default user is read from `~/.ssh/id_rsa.pub`.
///
/// Validation is structural only: the first line must split into at
/// least two whitespace-separated tokens, the first starting `ssh-`.
pub fn acquire_pubkey(
    arg: Option<&str>,
    user_arg: Option<&str>,
    default_user: Option<&str>,
) -> Result<Pubkey, Box<dyn std::error::Error>> {
    if arg.is_none() && user_arg.is_none() && default_user.is_some() {
        let home = dirs::home_dir().ok_or("Cannot locate the home directory")?;
        return read_key_file(&home.join(HOME_PUBKEY));
    }

    match arg {
        Some("-") => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            validate(text, "stdin")
        }
        Some(arg) => {
            let path = expand_home(arg);
            if path.exists() {
                read_key_file(&path)
            } else {
                validate(arg.to_string(), "the KEY argument")
            }
        }
        None => Err("No public key given and nothing to fall back on".into()),
    }
}

fn read_key_file(path: &Path) -> Result<Pubkey, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Cannot read key file '{}': {e}", path.display()))?;
    validate(text, &format!("'{}'", path.display()))
}

fn validate(text: String, origin: &str) -> Result<Pubkey, Box<dyn std::error::Error>> {
    let mut tokens = text.lines().next().unwrap_or("").split_whitespace();
    let key_type = tokens.next().unwrap_or("");
    if !key_type.starts_with("ssh-") || tokens.next().is_none() {
        return Err(format!("Not a valid SSH public key: {origin}").into());
    }
    Ok(Pubkey::new(text))
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}
