use serde::{Deserialize, Serialize};

/// Canonical approval states for a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusValue {
    Pending,
    Approved,
    Rejected,
}

impl StatusValue {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Matches a lower-cased synonym against the known sets.
    pub fn from_synonym(value: &str) -> Option<Self> {
        match value {
            "approved" | "approve" | "active" | "ok" | "accepted" => Some(Self::Approved),
            "rejected" | "reject" | "inactive" => Some(Self::Rejected),
            "pending" | "pend" | "waiting" => Some(Self::Pending),
            _ => None,
        }
    }

    pub fn from_canonical(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(Self::Pending),
            "APPROVED" => Some(Self::Approved),
            "REJECTED" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Maps an arbitrary status string to its canonical form. Unknown values are
/// uppercased and forwarded as-is so the upstream decides what to do with
/// them; that case is logged because it usually means a client-side typo.
pub fn normalize_status(input: &str) -> String {
    let trimmed = input.trim();
    let lower = trimmed.to_ascii_lowercase();
    if let Some(value) = StatusValue::from_synonym(&lower) {
        return value.as_str().to_string();
    }
    let upper = trimmed.to_ascii_uppercase();
    if StatusValue::from_canonical(&upper).is_some() {
        return upper;
    }
    log::warn!("normalize_status: unknown status value, forwarding uppercased: {trimmed}");
    upper
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approve_synonyms_normalize_to_approved() {
        for input in ["approved", "approve", "active", "ok", "accepted"] {
            assert_eq!(normalize_status(input), "APPROVED", "input: {input}");
        }
    }

    #[test]
    fn reject_synonyms_normalize_to_rejected() {
        for input in ["rejected", "reject", "inactive"] {
            assert_eq!(normalize_status(input), "REJECTED", "input: {input}");
        }
    }

    #[test]
    fn pending_synonyms_normalize_to_pending() {
        for input in ["pending", "pend", "waiting"] {
            assert_eq!(normalize_status(input), "PENDING", "input: {input}");
        }
    }

    #[test]
    fn matching_tolerates_case_and_whitespace() {
        assert_eq!(normalize_status("  Approve \n"), "APPROVED");
        assert_eq!(normalize_status("WAITING"), "PENDING");
        assert_eq!(normalize_status(" InAcTiVe"), "REJECTED");
    }

    #[test]
    fn canonical_values_pass_through() {
        assert_eq!(normalize_status("APPROVED"), "APPROVED");
        assert_eq!(normalize_status("pending"), "PENDING");
        assert_eq!(normalize_status("Rejected"), "REJECTED");
    }

    #[test]
    fn unknown_value_is_uppercased_and_forwarded() {
        assert_eq!(normalize_status("banana"), "BANANA");
        assert_eq!(normalize_status(" on hold "), "ON HOLD");
    }
}
