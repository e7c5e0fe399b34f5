use async_trait::async_trait;
use sha2::{Digest, Sha256};

/// Browser properties the fallback fingerprint is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserTraits {
    pub user_agent: String,
    pub screen_width: u32,
    pub screen_height: u32,
    pub color_depth: u32,
    /// Minutes, as reported by `Date.getTimezoneOffset()`.
    pub timezone_offset: i32,
    pub language: String,
}

impl BrowserTraits {
    pub fn resolution(&self) -> String {
        format!("{}x{}", self.screen_width, self.screen_height)
    }

    /// The string the fallback hash is computed over.
    pub fn components(&self) -> String {
        [
            self.user_agent.clone(),
            self.resolution(),
            self.color_depth.to_string(),
            self.timezone_offset.to_string(),
            self.language.clone(),
        ]
        .join("|")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashKind {
    /// SHA-256, lowercase hex. Used when a digest primitive is available.
    Sha256,
    /// 32-bit `h * 31 + unit` fold over UTF-16 code units.
    Fold,
}

/// A third-party fingerprinting library that yields a visitor ID.
#[async_trait(?Send)]
pub trait FingerprintSource {
    async fn visitor_id(&self) -> Result<String, String>;
}

pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Rendered as lowercase hex of the absolute value of the wrapped `i32`.
pub fn fold_hash(input: &str) -> String {
    let mut hash: i32 = 0;
    for unit in input.encode_utf16() {
        hash = hash.wrapping_mul(31).wrapping_add(unit as i32);
    }
    format!("{:x}", hash.unsigned_abs())
}

pub fn fallback_fingerprint(traits: &BrowserTraits, kind: HashKind) -> String {
    let components = traits.components();
    match kind {
        HashKind::Sha256 => sha256_hex(&components),
        HashKind::Fold => fold_hash(&components),
    }
}

/// Ask the library for a visitor ID; fall back to hashing `traits` when it
/// is unavailable, fails, or returns nothing. Never fails.
pub async fn browser_fingerprint<S>(
    source: Option<&S>,
    traits: &BrowserTraits,
    kind: HashKind,
) -> String
where
    S: FingerprintSource + ?Sized,
{
    if let Some(source) = source {
        match source.visitor_id().await {
            Ok(id) if !id.trim().is_empty() => return id,
            Ok(_) => log::warn!("[fingerprint] library returned an empty visitor id"),
            Err(e) => log::warn!("[fingerprint] library failed: {}", e),
        }
    }
    fallback_fingerprint(traits, kind)
}
