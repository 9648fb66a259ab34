use std::sync::LazyLock;

use regex::Regex;

/// Nepali mobile numbers, with or without the country code.
pub static NEPALI_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+?977)?9[78]\d{8}$").unwrap());

/// Nepalese Vehicle Registration Number, e.g. "Ba 1 Pa 1234".
pub static NEPALI_VRN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]{1,2} \d{1,2} [A-Za-z]{1,2} \d{1,4}$").unwrap());

/// Subdomain labels: lowercase alphanumerics with inner dashes.
pub static SUBDOMAIN_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]([a-z0-9-]*[a-z0-9])?$").unwrap());

/// Structural email check; full deliverability is not our problem.
pub fn is_email(v: &str) -> bool {
    let Some((local, domain)) = v.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_accepts_both_forms() {
        assert!(NEPALI_PHONE.is_match("+9779812345678"));
        assert!(NEPALI_PHONE.is_match("9779812345678"));
        assert!(NEPALI_PHONE.is_match("9812345678"));
        assert!(!NEPALI_PHONE.is_match("12345"));
        assert!(!NEPALI_PHONE.is_match("+9779612345678"));
    }

    #[test]
    fn vrn_matches_the_department_format() {
        assert!(NEPALI_VRN.is_match("Ba 1 Pa 1234"));
        assert!(NEPALI_VRN.is_match("Ga 12 Kha 1"));
        assert!(!NEPALI_VRN.is_match("Ba1Pa1234"));
    }

    #[test]
    fn subdomain_labels_reject_edge_dashes() {
        assert!(SUBDOMAIN_LABEL.is_match("autofix"));
        assert!(SUBDOMAIN_LABEL.is_match("auto-fix-2"));
        assert!(!SUBDOMAIN_LABEL.is_match("-autofix"));
        assert!(!SUBDOMAIN_LABEL.is_match("Auto_Fix"));
    }
}
