//! Translates an internal [`Verdict`] into the public result schema
//! (§4.6 Output Mapper).

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::verifier::{Verdict, VerdictStatus};

fn full_inbox_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)quota|full|insufficient storage|storage exceeded|limit exceeded").unwrap()
    })
}

fn disabled_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)disabled|suspended|inactive|deactivated|account closed|not active").unwrap()
    })
}

/// Maps a verdict status onto the spec's screaming-snake-case vocabulary
/// (§3 Status set) rather than leaning on `Debug`, which would render
/// `CatchAll` as `"CatchAll"` and not `"CATCH_ALL"`.
fn status_str(status: &VerdictStatus) -> &'static str {
    match status {
        VerdictStatus::Valid => "VALID",
        VerdictStatus::Invalid => "INVALID",
        VerdictStatus::CatchAll => "CATCH_ALL",
        VerdictStatus::Unknown => "UNKNOWN",
    }
}

/// The schema the CLI prints (§6 External interfaces).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PublicResult {
    pub status: String,
    pub reason: String,
    pub can_connect_smtp: bool,
    pub is_deliverable: bool,
    pub is_catch_all: bool,
    pub has_full_inbox: bool,
    pub is_disabled: bool,
}

pub fn to_public_result(verdict: &Verdict) -> PublicResult {
    let can_connect_smtp = verdict.details.smtp_code.is_some();
    let mut is_deliverable = matches!(verdict.status, VerdictStatus::Valid | VerdictStatus::CatchAll);
    let is_catch_all = verdict.status == VerdictStatus::CatchAll || verdict.details.catch_all_active;

    let has_full_inbox = verdict
        .details
        .smtp_code
        .map(|code| matches!(code, 452 | 552 | 554))
        .unwrap_or(false)
        && verdict
            .details
            .smtp_message
            .as_deref()
            .map(|m| full_inbox_regex().is_match(m))
            .unwrap_or(false);
    if has_full_inbox {
        is_deliverable = false;
    }

    let is_disabled = verdict.details.smtp_code == Some(550)
        && verdict
            .details
            .smtp_message
            .as_deref()
            .map(|m| disabled_regex().is_match(m))
            .unwrap_or(false);
    if is_disabled {
        is_deliverable = false;
    }

    PublicResult {
        status: status_str(&verdict.status).to_string(),
        reason: verdict.reason.clone(),
        can_connect_smtp,
        is_deliverable,
        is_catch_all,
        has_full_inbox,
        is_disabled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verifier::VerdictDetails;

    fn verdict(status: VerdictStatus, code: Option<u16>, message: &str) -> Verdict {
        Verdict {
            status,
            reason: "test".to_string(),
            details: VerdictDetails {
                smtp_code: code,
                smtp_message: Some(message.to_string()),
                catch_all_active: false,
                greylisted: false,
            },
        }
    }

    #[test]
    fn full_inbox_forces_not_deliverable() {
        let v = verdict(VerdictStatus::Valid, Some(552), "mailbox quota exceeded");
        let result = to_public_result(&v);
        assert!(result.has_full_inbox);
        assert!(!result.is_deliverable);
    }

    #[test]
    fn disabled_account_forces_not_deliverable() {
        let v = verdict(VerdictStatus::Valid, Some(550), "account suspended");
        let result = to_public_result(&v);
        assert!(result.is_disabled);
        assert!(!result.is_deliverable);
    }

    #[test]
    fn catch_all_is_deliverable() {
        let v = verdict(VerdictStatus::CatchAll, Some(250), "accepted");
        let result = to_public_result(&v);
        assert!(result.is_deliverable);
        assert!(result.is_catch_all);
        assert_eq!(result.status, "CATCH_ALL");
    }

    #[test]
    fn can_connect_is_false_without_smtp_code() {
        let v = verdict(VerdictStatus::Invalid, None, "dns failure");
        let result = to_public_result(&v);
        assert!(!result.can_connect_smtp);
    }

    #[test]
    fn full_inbox_code_without_matching_message_does_not_force() {
        let v = verdict(VerdictStatus::Valid, Some(452), "try later");
        let result = to_public_result(&v);
        assert!(!result.has_full_inbox);
        assert!(result.is_deliverable);
    }
}
