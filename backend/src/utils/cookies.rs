use std::{str::FromStr, time::Duration};

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::{config::Config, types::SessionId};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Lax,
    Strict,
    None,
}

impl FromStr for SameSite {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lax" => Ok(SameSite::Lax),
            "strict" => Ok(SameSite::Strict),
            "none" => Ok(SameSite::None),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CookieOptions {
    pub secure: bool,
    pub same_site: SameSite,
}

impl CookieOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            secure: config.cookie_secure,
            same_site: config.cookie_same_site,
        }
    }
}

pub const SESSION_COOKIE_NAME: &str = "greenci.sid";
pub const SESSION_COOKIE_PATH: &str = "/";

pub fn build_cookie(
    name: &str,
    value: &str,
    max_age: Duration,
    path: &str,
    options: CookieOptions,
) -> String {
    let mut cookie = format!(
        "{}={}; Path={}; Max-Age={}; HttpOnly; SameSite={}",
        name,
        value,
        path,
        max_age.as_secs(),
        same_site_value(options.same_site)
    );
    if options.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn build_clear_cookie(name: &str, path: &str, options: CookieOptions) -> String {
    build_cookie(name, "", Duration::ZERO, path, options)
}

/// `Set-Cookie` value carrying a signed session id.
pub fn build_session_cookie(id: &SessionId, config: &Config) -> String {
    build_cookie(
        SESSION_COOKIE_NAME,
        &sign_session_id(id, &config.session_secret),
        Duration::from_secs(config.session_max_age_seconds),
        SESSION_COOKIE_PATH,
        CookieOptions::from_config(config),
    )
}

pub fn build_session_clear_cookie(config: &Config) -> String {
    build_clear_cookie(
        SESSION_COOKIE_NAME,
        SESSION_COOKIE_PATH,
        CookieOptions::from_config(config),
    )
}

pub fn extract_cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').map(str::trim).find_map(|pair| {
        let mut parts = pair.splitn(2, '=');
        let key = parts.next()?.trim();
        let value = parts.next()?.trim();
        if key == name {
            Some(value.to_string())
        } else {
            None
        }
    })
}

/// Returns `<id>.<hex hmac>`.
pub fn sign_session_id(id: &SessionId, secret: &str) -> String {
    let id = id.to_string();
    let signature = hex::encode(session_mac(secret, &id).finalize().into_bytes());
    format!("{}.{}", id, signature)
}

/// Recovers the session id from a signed cookie value. Returns `None` for
/// malformed values and signature mismatches.
pub fn verify_signed_session_id(value: &str, secret: &str) -> Option<SessionId> {
    let (id, signature) = value.rsplit_once('.')?;
    let signature = hex::decode(signature).ok()?;
    session_mac(secret, id).verify_slice(&signature).ok()?;
    id.parse().ok()
}

fn session_mac(secret: &str, id: &str) -> HmacSha256 {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(id.as_bytes());
    mac
}

fn same_site_value(same_site: SameSite) -> &'static str {
    match same_site {
        SameSite::Lax => "Lax",
        SameSite::Strict => "Strict",
        SameSite::None => "None",
    }
}
