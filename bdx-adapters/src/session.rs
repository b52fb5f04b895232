//! Session cookies injected into every upstream request.

use std::fmt;

/// The two cookies the dashboards require.
///
/// Values are never logged: `Debug` redacts them.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    sess_map: String,
    php_sess_id: String,
}

impl Session {
    pub fn new(sess_map: impl Into<String>, php_sess_id: impl Into<String>) -> Self {
        Self {
            sess_map: sess_map.into(),
            php_sess_id: php_sess_id.into(),
        }
    }

    /// Value of the `Cookie` header, e.g. `sess_map=abc; PHPSESSID=xyz`.
    pub fn cookie_header(&self) -> String {
        format!("sess_map={}; PHPSESSID={}", self.sess_map, self.php_sess_id)
    }

    /// Whether either cookie is missing.
    pub fn is_incomplete(&self) -> bool {
        self.sess_map.is_empty() || self.php_sess_id.is_empty()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("sess_map", &redact(&self.sess_map))
            .field("php_sess_id", &redact(&self.php_sess_id))
            .finish()
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}
