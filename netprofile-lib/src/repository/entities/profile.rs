use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
    repository::entities::ProfileId,
    validation::{self, ValidationErrors},
};

/// How a [`Profile`] obtains its address.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    ValueEnum,
)]
#[strum(ascii_case_insensitive)]
pub enum Mode {
    #[default]
    #[serde(rename = "DHCP")]
    #[strum(serialize = "DHCP")]
    Dhcp,
    #[serde(rename = "Static")]
    #[strum(serialize = "Static")]
    Static,
}

/// A named network configuration record.
///
/// Address fields are kept as the text the user typed. They are only meaningful,
/// and only checked, when [`mode`](Profile::mode) is [`Mode::Static`]. Missing
/// fields deserialize as empty so that partially filled records can still be
/// loaded and then fixed up through the editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub id: ProfileId,
    pub name: String,
    pub interface: String,
    pub mode: Mode,
    pub ip: String,
    pub subnet: String,
    pub gateway: String,
    /// Comma separated list of name servers
    pub dns: String,
}

impl Profile {
    /// A new DHCP profile on `interface`.
    pub fn new(name: impl Into<String>, interface: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            interface: interface.into(),
            ..Default::default()
        }
    }

    /// Switch to [`Mode::Static`] with the given addresses.
    pub fn with_static(
        mut self,
        ip: impl Into<String>,
        subnet: impl Into<String>,
        gateway: impl Into<String>,
    ) -> Self {
        self.mode = Mode::Static;
        self.ip = ip.into();
        self.subnet = subnet.into();
        self.gateway = gateway.into();
        self
    }

    pub fn with_dns(mut self, dns: impl Into<String>) -> Self {
        self.dns = dns.into();
        self
    }

    pub fn is_static(&self) -> bool {
        self.mode == Mode::Static
    }

    /// Individual name server entries, trimmed and with blanks dropped.
    pub fn dns_servers(&self) -> Vec<&str> {
        validation::dns_entries(&self.dns).collect()
    }

    /// One line description, e.g. `Static • eth0`.
    pub fn summary(&self) -> String {
        let interface = match self.interface.trim() {
            "" => "—",
            interface => interface,
        };

        format!("{} • {}", self.mode, interface)
    }

    pub fn validate(&self) -> ValidationErrors {
        validation::validate(self)
    }
}
