//! Proxy node types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Region labels for the prefixes used in node names.
const REGIONS: &[(&str, &str)] = &[
    ("US", "United States"),
    ("SG", "Singapore"),
    ("Tokyo", "Japan"),
    ("EUR", "Europe"),
    ("AMSD", "Amsterdam"),
    ("LA", "Los Angeles"),
    ("ALT", "Atlanta"),
    ("FRK", "Frankfurt am Main"),
];

/// A proxy node listed on a service detail page.
///
/// Serializes to the node config file read by the local proxy client, so
/// field names follow that format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProxyNode {
    /// Node name, `AREA[_AREA...]_N`.
    #[serde(rename = "node_name")]
    pub name: String,
    /// Node type as shown on the site; not part of the client config.
    #[serde(skip)]
    pub kind: String,
    /// Server address.
    pub server: String,
    /// Server port.
    pub server_port: u16,
    /// Password.
    pub password: String,
    /// Encryption method.
    pub method: String,
    /// Connection protocol.
    pub protocol: String,
    /// Obfuscation plugin.
    pub obfs: String,
}

impl ProxyNode {
    /// Returns the region label derived from the node name.
    ///
    /// `US_LA_3` becomes `United States-Los Angeles`. Names without a
    /// trailing node number are "Unknown", as are unknown prefixes.
    pub fn region(&self) -> String {
        let parts: Vec<&str> = self.name.split('_').collect();
        if parts.len() <= 1 {
            return "Unknown".to_string();
        }
        parts[..parts.len() - 1]
            .iter()
            .map(|area| {
                REGIONS
                    .iter()
                    .find(|(prefix, _)| prefix == area)
                    .map_or("Unknown", |(_, label)| *label)
            })
            .collect::<Vec<_>>()
            .join("-")
    }
}

impl fmt::Display for ProxyNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Name:{:<10} IP:{:<15} Port:{:<5} Crypto:{:<11} Protocol:{:<7} Obfs:{:<6}",
            self.name, self.server, self.server_port, self.method, self.protocol, self.obfs
        )
    }
}
