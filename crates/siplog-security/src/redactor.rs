use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use siplog_core::RedactionConfig;

use crate::{Redact, RedactError};

static SIP_URI_USER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(sips?):[^@\s;<>",]+@"#).expect("SIP URI pattern is valid")
});

static TEL_URI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(tel):\+?[0-9*#.()\-]+").expect("tel URI pattern is valid")
});

const IDENTITY_HEADERS: &str =
    r"From|To|Contact|P-Asserted-Identity|P-Preferred-Identity|Remote-Party-ID|f|t|m";

static QUOTED_DISPLAY_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"(?im)^((?:{IDENTITY_HEADERS})[ \t]*:[ \t]*)"(?:[^"\\\r\n]|\\.)*""#
    ))
    .expect("quoted display name pattern is valid")
});

static TOKEN_DISPLAY_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"(?im)^((?:{IDENTITY_HEADERS})[ \t]*:[ \t]*)([^"<;\s][^"<;\r\n]*?)([ \t]*<)"#
    ))
    .expect("token display name pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionInfo {
    pub redaction_type: String,
    pub count: usize,
}

/// Regex based redaction of identities in SIP messages
pub struct SipRedactor {
    patterns: Vec<(&'static str, &'static Regex, String)>,
    max_message_bytes: usize,
}

impl SipRedactor {
    pub fn new(config: &RedactionConfig) -> Self {
        let placeholder = config.placeholder.replace('$', "$$");
        let mut patterns = Vec::new();

        // URIs first, so header rules see already-scrubbed values
        patterns.push((
            "SIP_URI_USER",
            &*SIP_URI_USER,
            format!("${{1}}:{}@", placeholder),
        ));
        if config.tel_uris {
            patterns.push(("TEL_URI", &*TEL_URI, format!("${{1}}:{}", placeholder)));
        }
        if config.display_names {
            patterns.push((
                "DISPLAY_NAME",
                &*QUOTED_DISPLAY_NAME,
                format!("${{1}}\"{}\"", placeholder),
            ));
            patterns.push((
                "DISPLAY_NAME",
                &*TOKEN_DISPLAY_NAME,
                format!("${{1}}{}${{3}}", placeholder),
            ));
        }

        Self {
            patterns,
            max_message_bytes: config.max_message_bytes,
        }
    }

    /// Redact a message and report how many values of each kind were replaced
    pub fn redact_with_report(
        &self,
        message: &str,
    ) -> Result<(String, Vec<RedactionInfo>), RedactError> {
        if message.len() > self.max_message_bytes {
            return Err(RedactError::MessageTooLarge {
                size: message.len(),
                limit: self.max_message_bytes,
            });
        }

        let mut result = message.to_string();
        let mut redactions: Vec<RedactionInfo> = Vec::new();

        for (redaction_type, pattern, replacement) in &self.patterns {
            let count = pattern.find_iter(&result).count();
            if count == 0 {
                continue;
            }

            result = pattern
                .replace_all(&result, replacement.as_str())
                .into_owned();

            match redactions
                .iter_mut()
                .find(|r| r.redaction_type == *redaction_type)
            {
                Some(info) => info.count += count,
                None => redactions.push(RedactionInfo {
                    redaction_type: redaction_type.to_string(),
                    count,
                }),
            }
        }

        Ok((result, redactions))
    }
}

impl Default for SipRedactor {
    fn default() -> Self {
        Self::new(&RedactionConfig::default())
    }
}

impl Redact for SipRedactor {
    fn redact(&self, message: &[u8]) -> Result<Vec<u8>, RedactError> {
        let text = std::str::from_utf8(message)?;
        let (redacted, _) = self.redact_with_report(text)?;
        Ok(redacted.into_bytes())
    }
}
