use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tally_interpret::Provider;

use crate::state::ensure_tally_home;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AuthState {
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
}

impl AuthState {
    fn slot(&mut self, provider: Provider) -> &mut Option<String> {
        match provider {
            Provider::Gemini => &mut self.gemini_api_key,
            Provider::OpenAI => &mut self.openai_api_key,
            Provider::Anthropic => &mut self.anthropic_api_key,
        }
    }

    pub fn stored_key(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::Gemini => self.gemini_api_key.as_deref(),
            Provider::OpenAI => self.openai_api_key.as_deref(),
            Provider::Anthropic => self.anthropic_api_key.as_deref(),
        }
    }

    /// Key for `provider`: the environment variable wins over the stored key.
    pub fn api_key(&self, provider: Provider) -> Option<String> {
        let from_env = std::env::var(provider.api_key_env()).ok();
        pick_key(from_env, self.stored_key(provider))
    }
}

fn pick_key(from_env: Option<String>, stored: Option<&str>) -> Option<String> {
    from_env
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .or_else(|| stored.map(str::to_string))
}

fn auth_path() -> Result<PathBuf> {
    Ok(ensure_tally_home()?.join("auth.json"))
}

pub fn load_auth() -> Result<AuthState> {
    let p = auth_path()?;
    if !p.exists() {
        return Ok(AuthState::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_auth(auth: &AuthState) -> Result<()> {
    let p = auth_path()?;
    let s = serde_json::to_string_pretty(auth)?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

fn prompt_secret(label: &str) -> Result<String> {
    print!("{label}: ");
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

pub fn set_key(provider: Provider) -> Result<()> {
    let key = prompt_secret(&format!("Paste {provider} API key"))?;
    if key.is_empty() {
        bail!("no key entered");
    }
    let mut auth = load_auth()?;
    *auth.slot(provider) = Some(key);
    save_auth(&auth)?;
    println!("Saved {provider} API key to {}", auth_path()?.display());
    Ok(())
}
