//! Field level validation of profile drafts.
//!
//! [`validate`] is pure and cheap, so front ends can call it after every edit and
//! show the messages next to the offending fields. A draft is committable when
//! the returned [`ValidationErrors`] is empty.

use std::{collections::BTreeMap, fmt};

use derive_more::Deref;
use strum::{AsRefStr, Display};

use crate::repository::{Mode, Profile};

const REQUIRED: &str = "Required";
const INVALID_IP: &str = "Invalid IPv4";
const INVALID_SUBNET: &str = "Invalid subnet";
const INVALID_GATEWAY: &str = "Invalid gateway";
const INVALID_DNS: &str = "Bad DNS (comma-separated)";

/// A user editable field of a [`Profile`] that can carry an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Field {
    Name,
    Interface,
    Ip,
    Subnet,
    Gateway,
    Dns,
}

/// Error message per failing field, ordered by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref)]
pub struct ValidationErrors(BTreeMap<Field, &'static str>);

impl ValidationErrors {
    pub fn message(&self, field: Field) -> Option<&'static str> {
        self.0.get(&field).copied()
    }

    fn insert(&mut self, field: Field, message: &'static str) {
        self.0.insert(field, message);
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{field}: {message}")?;
        }

        Ok(())
    }
}

/// Check every field of `profile`, collecting all failures.
///
/// Address fields are only checked for [`Mode::Static`] profiles.
pub fn validate(profile: &Profile) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    if profile.name.trim().is_empty() {
        errors.insert(Field::Name, REQUIRED);
    }
    if profile.interface.trim().is_empty() {
        errors.insert(Field::Interface, REQUIRED);
    }

    if profile.mode == Mode::Static {
        if !is_ipv4(&profile.ip) {
            errors.insert(Field::Ip, INVALID_IP);
        }
        if !is_ipv4(&profile.subnet) {
            errors.insert(Field::Subnet, INVALID_SUBNET);
        }
        if !is_ipv4(&profile.gateway) {
            errors.insert(Field::Gateway, INVALID_GATEWAY);
        }
        if !profile.dns.is_empty() && !dns_entries(&profile.dns).all(is_ipv4) {
            errors.insert(Field::Dns, INVALID_DNS);
        }
    }

    errors
}

/// Whether `text` is a dotted quad: four decimal groups in `0..=255` without
/// leading zeros. Surrounding whitespace is ignored.
pub fn is_ipv4(text: &str) -> bool {
    let groups: Vec<&str> = text.trim().split('.').collect();

    groups.len() == 4 && groups.iter().all(|group| is_octet(group))
}

/// Split a comma separated list, trimming entries and dropping empty ones.
pub fn dns_entries(dns: &str) -> impl Iterator<Item = &str> {
    dns.split(',').map(str::trim).filter(|entry| !entry.is_empty())
}

fn is_octet(group: &str) -> bool {
    if group.is_empty() || !group.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if group.len() > 1 && group.starts_with('0') {
        return false;
    }

    group.parse::<u8>().is_ok()
}

#[cfg(test)]
mod test {
    use super::{Field, dns_entries, is_ipv4, validate};
    use crate::repository::{Mode, Profile};

    #[test]
    fn test_is_ipv4() {
        for valid in [
            "192.168.1.10",
            "255.255.255.0",
            "0.0.0.0",
            "10.0.0.1",
            " 8.8.8.8 ",
        ] {
            assert!(is_ipv4(valid), "{valid} should be accepted");
        }

        for invalid in [
            "256.1.1.1",
            "1.1.1",
            "1.1.1.1.1",
            "a.b.c.d",
            "01.1.1.1",
            "1.1.1.00",
            "192.168.1.999",
            "1..1.1",
            "-1.1.1.1",
            "+1.1.1.1",
            "1.1.1.1 .",
            "",
        ] {
            assert!(!is_ipv4(invalid), "{invalid} should be rejected");
        }
    }

    #[test]
    fn test_dns_entries() {
        let entries: Vec<&str> = dns_entries("8.8.8.8, 1.1.1.1,, ").collect();

        assert_eq!(entries, vec!["8.8.8.8", "1.1.1.1"]);
        assert_eq!(dns_entries("").count(), 0);
    }

    #[test]
    fn test_required_fields() {
        let errors = validate(&Profile::new("  ", ""));

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.message(Field::Name), Some("Required"));
        assert_eq!(errors.message(Field::Interface), Some("Required"));
    }

    #[test]
    fn test_dhcp_ignores_address_fields() {
        let mut profile = Profile::new("Office", "eth0").with_dns("not, an, address");
        profile.ip = "garbage".into();
        profile.subnet = "999.0.0.0".into();
        profile.gateway = "".into();

        let errors = validate(&profile);

        assert!(errors.is_empty(), "unexpected errors: {errors}");
    }

    #[test]
    fn test_valid_static() {
        let profile = Profile::new("Office", "eth0")
            .with_static("192.168.1.10", "255.255.255.0", "192.168.1.1")
            .with_dns("8.8.8.8, 1.1.1.1");

        assert!(validate(&profile).is_empty());
    }

    #[test]
    fn test_invalid_static_ip() {
        let profile = Profile::new("Office", "eth0").with_static(
            "192.168.1.999",
            "255.255.255.0",
            "192.168.1.1",
        );

        let errors = validate(&profile);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.message(Field::Ip), Some("Invalid IPv4"));
    }

    #[test]
    fn test_static_collects_every_error() {
        let mut profile = Profile::new("", "eth0").with_dns("8.8.8.8, nope");
        profile.mode = Mode::Static;

        let errors = validate(&profile);

        assert_eq!(errors.message(Field::Name), Some("Required"));
        assert_eq!(errors.message(Field::Ip), Some("Invalid IPv4"));
        assert_eq!(errors.message(Field::Subnet), Some("Invalid subnet"));
        assert_eq!(errors.message(Field::Gateway), Some("Invalid gateway"));
        assert_eq!(
            errors.message(Field::Dns),
            Some("Bad DNS (comma-separated)")
        );
        assert_eq!(errors.message(Field::Interface), None);
    }

    #[test]
    fn test_blank_dns_list_is_accepted() {
        let profile = Profile::new("Office", "eth0")
            .with_static("10.0.0.2", "255.0.0.0", "10.0.0.1")
            .with_dns(" , ");

        assert!(validate(&profile).is_empty());
    }

    #[test]
    fn test_display() {
        let errors = validate(&Profile::new("", ""));

        assert_eq!(errors.to_string(), "name: Required, interface: Required");
    }
}
