//! Host-based tenant resolution.
//!
//! Resolution derives the tenant purely from the request's `Host` header:
//! parse out a candidate subdomain label, then make a single directory
//! lookup. No other request data is consulted, so the whole step is
//! idempotent and runs once per request.

use std::collections::HashSet;

use crate::config::ConfigSnapshot;
use crate::directory::GarageDirectory;
use crate::errors::{GadiError, GadiResult};
use crate::tenant::TenantScope;

pub const DEFAULT_RESERVED_SUBDOMAINS: &[&str] = &["www", "api", "admin"];
pub const DEFAULT_LOCAL_SUFFIX: &str = "localhost";

/// Host-matching rules. Both the reserved deny-list and the development
/// loopback suffix are deployment configuration, not code.
#[derive(Debug, Clone)]
pub struct TenancyRules {
    reserved: HashSet<String>,
    local_suffix: String,
}

impl Default for TenancyRules {
    fn default() -> Self {
        Self {
            reserved: DEFAULT_RESERVED_SUBDOMAINS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            local_suffix: DEFAULT_LOCAL_SUFFIX.to_string(),
        }
    }
}

impl TenancyRules {
    pub fn new(
        reserved: impl IntoIterator<Item = String>,
        local_suffix: impl Into<String>,
    ) -> Self {
        Self {
            reserved: reserved.into_iter().map(|s| s.to_lowercase()).collect(),
            local_suffix: local_suffix.into().to_lowercase(),
        }
    }

    /// Read `tenancy.reserved_subdomains` (comma-separated) and
    /// `tenancy.local_suffix` from config, defaulting either when unset.
    pub fn from_config(config: &ConfigSnapshot) -> Self {
        let defaults = Self::default();

        let reserved = match config.get_list("tenancy.reserved_subdomains") {
            Some(list) => list.into_iter().map(|s| s.to_lowercase()).collect(),
            None => defaults.reserved,
        };

        let local_suffix = config
            .get_string("tenancy.local_suffix")
            .map(|s| s.to_lowercase())
            .unwrap_or(defaults.local_suffix);

        Self {
            reserved,
            local_suffix,
        }
    }

    pub fn is_reserved(&self, label: &str) -> bool {
        self.reserved.contains(&label.to_lowercase())
    }
}

/// Outcome of parsing a host header, before any directory lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostLabel {
    /// No usable subdomain: apex domain, reserved label, bare loopback.
    Platform,
    /// Candidate tenant label, already lowercased.
    Subdomain(String),
}

/// Extract the candidate tenant label from a host.
///
/// Examples (with default rules):
///   autofix.gadisewa.com    -> Subdomain("autofix")
///   AutoFix.gadisewa.com:80 -> Subdomain("autofix")
///   autofix.localhost       -> Subdomain("autofix")
///   gadisewa.com            -> Platform
///   localhost:3030          -> Platform
///   www.gadisewa.com        -> Platform
pub fn subdomain_label(host: &str, rules: &TenancyRules) -> HostLabel {
    if host.is_empty() {
        return HostLabel::Platform;
    }

    let host = host
        .split(':')
        .next()
        .unwrap_or_default()
        .to_lowercase();

    let labels: Vec<&str> = host.split('.').collect();

    let local_tail = format!(".{}", rules.local_suffix);
    let candidate = if host == rules.local_suffix {
        return HostLabel::Platform;
    } else if host.ends_with(&local_tail) {
        labels[0]
    } else if labels.len() < 3 {
        return HostLabel::Platform;
    } else {
        labels[0]
    };

    if candidate.is_empty() || rules.is_reserved(candidate) {
        return HostLabel::Platform;
    }

    HostLabel::Subdomain(candidate.to_string())
}

/// Resolve a host to a tenant scope against the directory.
///
/// An unmatched label is a client-visible not-found, distinct from the
/// platform scope; the message never reveals whether the subdomain
/// exists but is disabled.
pub async fn resolve_scope(
    directory: &dyn GarageDirectory,
    host: &str,
    rules: &TenancyRules,
) -> GadiResult<TenantScope> {
    match subdomain_label(host, rules) {
        HostLabel::Platform => Ok(TenantScope::Platform),
        HostLabel::Subdomain(label) => match directory.find_active_by_subdomain(&label).await? {
            Some(garage) => Ok(TenantScope::Garage(garage.id)),
            None => Err(GadiError::not_found("Garage not found.").into_anyhow()),
        },
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::directory::{Garage, GarageType};
    use crate::errors::ErrorKind;
    use crate::tenant::GarageId;

    fn rules() -> TenancyRules {
        TenancyRules::default()
    }

    fn label(host: &str) -> HostLabel {
        subdomain_label(host, &rules())
    }

    #[test]
    fn three_label_hosts_yield_the_first_label() {
        assert_eq!(
            label("autofix.gadisewa.com"),
            HostLabel::Subdomain("autofix".into())
        );
        assert_eq!(
            label("autofix.gadisewa.com.np"),
            HostLabel::Subdomain("autofix".into())
        );
    }

    #[test]
    fn label_matching_is_case_insensitive_and_strips_ports() {
        assert_eq!(
            label("AutoFix.GadiSewa.com:8443"),
            HostLabel::Subdomain("autofix".into())
        );
    }

    #[test]
    fn apex_domains_are_platform() {
        assert_eq!(label("gadisewa.com"), HostLabel::Platform);
        assert_eq!(label(""), HostLabel::Platform);
    }

    #[test]
    fn reserved_labels_are_platform_everywhere() {
        assert_eq!(label("www.gadisewa.com"), HostLabel::Platform);
        assert_eq!(label("api.gadisewa.com"), HostLabel::Platform);
        assert_eq!(label("admin.localhost"), HostLabel::Platform);
    }

    #[test]
    fn loopback_hosts_use_the_first_label() {
        assert_eq!(label("localhost"), HostLabel::Platform);
        assert_eq!(label("localhost:3030"), HostLabel::Platform);
        assert_eq!(
            label("autofix.localhost:3030"),
            HostLabel::Subdomain("autofix".into())
        );
    }

    #[test]
    fn rules_come_from_config_not_code() {
        let mut cfg = crate::config::GadiConfig::new();
        cfg.set("tenancy.reserved_subdomains", "www,api,admin,status");
        cfg.set("tenancy.local_suffix", "lvh.me");
        let rules = TenancyRules::from_config(&cfg.snapshot());

        assert_eq!(
            subdomain_label("status.gadisewa.com", &rules),
            HostLabel::Platform
        );
        assert_eq!(
            subdomain_label("autofix.lvh.me", &rules),
            HostLabel::Subdomain("autofix".into())
        );
    }

    struct OneGarage(Garage);

    #[async_trait]
    impl GarageDirectory for OneGarage {
        async fn find_active_by_subdomain(&self, label: &str) -> GadiResult<Option<Garage>> {
            if self.0.active && self.0.subdomain.eq_ignore_ascii_case(label) {
                Ok(Some(self.0.clone()))
            } else {
                Ok(None)
            }
        }
    }

    fn garage(subdomain: &str, active: bool) -> Garage {
        Garage {
            id: GarageId::new(),
            name: "AutoFix Workshop".into(),
            subdomain: subdomain.into(),
            registration_number: "REG-100".into(),
            tax_pan_number: "PAN-100".into(),
            garage_type: GarageType::AutoRepair,
            street_address: "Balaju".into(),
            city: "Kathmandu".into(),
            postal_code: "44600".into(),
            phone_number: "+9779812345678".into(),
            email_address: "hello@autofix.com".into(),
            working_hours: None,
            active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn active_subdomains_resolve_to_their_garage() {
        let dir = OneGarage(garage("autofix", true));
        let scope = resolve_scope(&dir, "AUTOFIX.gadisewa.com", &rules())
            .await
            .unwrap();
        assert_eq!(scope, TenantScope::Garage(dir.0.id));
    }

    #[tokio::test]
    async fn unknown_and_disabled_subdomains_are_the_same_not_found() {
        let dir = OneGarage(garage("autofix", false));

        let disabled = resolve_scope(&dir, "autofix.gadisewa.com", &rules())
            .await
            .unwrap_err();
        let unknown = resolve_scope(&dir, "ghost.gadisewa.com", &rules())
            .await
            .unwrap_err();

        let disabled = GadiError::from_anyhow(&disabled).unwrap();
        let unknown = GadiError::from_anyhow(&unknown).unwrap();
        assert_eq!(disabled.kind, ErrorKind::NotFound);
        assert_eq!(disabled.message, unknown.message);
    }

    #[tokio::test]
    async fn reserved_labels_never_hit_the_directory() {
        let dir = OneGarage(garage("www", true));
        let scope = resolve_scope(&dir, "www.gadisewa.com", &rules())
            .await
            .unwrap();
        assert_eq!(scope, TenantScope::Platform);
    }
}
