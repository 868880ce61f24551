/// Shared-passphrase gate in front of every analysis and result route.
///
/// No lockout and no attempt counting: a wrong code is simply rejected.
#[derive(Clone)]
pub enum AccessGate {
    Open,
    Code(String),
}

impl AccessGate {
    pub fn from_config(access_code: Option<&str>) -> Self {
        match access_code {
            Some(code) => AccessGate::Code(code.to_string()),
            None => AccessGate::Open,
        }
    }

    pub fn requires_code(&self) -> bool {
        matches!(self, AccessGate::Code(_))
    }

    pub fn verify(&self, candidate: &str) -> bool {
        match self {
            AccessGate::Open => true,
            AccessGate::Code(expected) => constant_time_eq(candidate.as_bytes(), expected.as_bytes()),
        }
    }
}

/// Compares without short-circuiting on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_gate_accepts_anything() {
        let gate = AccessGate::from_config(None);
        assert!(!gate.requires_code());
        assert!(gate.verify(""));
    }

    #[test]
    fn test_code_gate_accepts_only_exact_code() {
        let gate = AccessGate::from_config(Some("open-sesame"));
        assert!(gate.requires_code());
        assert!(gate.verify("open-sesame"));
        assert!(!gate.verify("open-sesame "));
        assert!(!gate.verify("OPEN-SESAME"));
        assert!(!gate.verify(""));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
    }
}
