//! Monitored hosts and the registry that owns them.

use crate::error::HostError;

/// City shown when a host was added without one.
pub const UNKNOWN_CITY: &str = "Unknown Location";

/// A monitored endpoint with the coordinates used to place it on the map.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Host {
    /// Unique display label and history key.
    pub name: String,
    /// IP or DNS name the prober connects to. Unique across the registry.
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    #[cfg_attr(feature = "serde", serde(default = "unknown_city"))]
    pub city: String,
}

#[cfg(feature = "serde")]
fn unknown_city() -> String {
    UNKNOWN_CITY.to_string()
}

impl Host {
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            latitude,
            longitude,
            city: UNKNOWN_CITY.to_string(),
        }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = city.into();
        self
    }

    /// Check required fields and coordinate ranges.
    pub fn validate(&self) -> Result<(), HostError> {
        if self.name.trim().is_empty() {
            return Err(HostError::MissingField("name"));
        }
        if self.address.trim().is_empty() {
            return Err(HostError::MissingField("address"));
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(HostError::InvalidLatitude(self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(HostError::InvalidLongitude(self.longitude));
        }
        Ok(())
    }
}

/// The six cloud regions monitored out of the box.
pub fn default_hosts() -> Vec<Host> {
    vec![
        Host::new("us-east-1", "99.82.166.0", 39.0395, -77.4918).with_city("Ashburn, Virginia"),
        Host::new("sa-east-1", "15.228.0.0", -23.5471, -46.6372).with_city("Sao Paulo, Brazil"),
        Host::new("eu-west-3", "35.180.0.0", 48.8591, 2.2935).with_city("Paris, France"),
        Host::new("ap-southeast-1", "35.71.118.0", 1.29, 103.8503).with_city("Singapore"),
        Host::new("af-south-1", "13.246.0.0", -33.9256, 18.4229)
            .with_city("Cape Town, South Africa"),
        Host::new("ap-southeast-2", "3.104.0.0", -33.8678, 151.2070)
            .with_city("Sydney, Australia"),
    ]
}

/// Ordered set of hosts, unique by name and by address.
#[derive(Debug, Clone, Default)]
pub struct HostRegistry {
    hosts: Vec<Host>,
}

impl HostRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry, skipping entries that fail validation or collide.
    pub fn from_hosts(hosts: impl IntoIterator<Item = Host>) -> Self {
        let mut registry = Self::new();
        for host in hosts {
            if let Err(e) = registry.add(host) {
                tracing::warn!(error = %e, "skipping host");
            }
        }
        registry
    }

    /// Add a host. On error the registry is left unchanged.
    pub fn add(&mut self, mut host: Host) -> Result<(), HostError> {
        host.validate()?;
        host.name = host.name.trim().to_string();
        host.address = host.address.trim().to_string();
        if host.city.trim().is_empty() {
            host.city = UNKNOWN_CITY.to_string();
        }

        if self.hosts.iter().any(|h| h.name == host.name) {
            return Err(HostError::DuplicateName(host.name));
        }
        if self.hosts.iter().any(|h| h.address == host.address) {
            return Err(HostError::DuplicateAddress(host.address));
        }

        tracing::info!(name = %host.name, address = %host.address, "host added");
        self.hosts.push(host);
        Ok(())
    }

    /// Hosts in insertion order.
    pub fn list(&self) -> &[Host] {
        &self.hosts
    }

    pub fn get(&self, name: &str) -> Option<&Host> {
        self.hosts.iter().find(|h| h.name == name)
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_rejects_duplicate_address() {
        let mut registry = HostRegistry::from_hosts(default_hosts());
        let before = registry.len();

        let err = registry
            .add(Host::new("extra", "99.82.166.0", 0.0, 0.0))
            .unwrap_err();
        assert_eq!(err, HostError::DuplicateAddress("99.82.166.0".into()));
        assert!(err.is_duplicate());
        assert_eq!(registry.len(), before);
    }

    #[test]
    fn add_rejects_duplicate_name() {
        let mut registry = HostRegistry::new();
        registry.add(Host::new("a", "10.0.0.1", 0.0, 0.0)).unwrap();
        let err = registry
            .add(Host::new("a", "10.0.0.2", 0.0, 0.0))
            .unwrap_err();
        assert_eq!(err, HostError::DuplicateName("a".into()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn add_validates_fields() {
        let mut registry = HostRegistry::new();
        assert_eq!(
            registry.add(Host::new("  ", "10.0.0.1", 0.0, 0.0)),
            Err(HostError::MissingField("name"))
        );
        assert_eq!(
            registry.add(Host::new("a", "", 0.0, 0.0)),
            Err(HostError::MissingField("address"))
        );
        assert_eq!(
            registry.add(Host::new("a", "10.0.0.1", 91.0, 0.0)),
            Err(HostError::InvalidLatitude(91.0))
        );
        assert_eq!(
            registry.add(Host::new("a", "10.0.0.1", 0.0, -181.0)),
            Err(HostError::InvalidLongitude(-181.0))
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn blank_city_falls_back() {
        let mut registry = HostRegistry::new();
        registry
            .add(Host::new(" edge ", " 10.0.0.9 ", 10.0, 10.0).with_city(""))
            .unwrap();
        let host = registry.get("edge").unwrap();
        assert_eq!(host.address, "10.0.0.9");
        assert_eq!(host.city, UNKNOWN_CITY);
    }

    #[test]
    fn list_keeps_insertion_order() {
        let registry = HostRegistry::from_hosts(default_hosts());
        let names: Vec<&str> = registry.list().iter().map(|h| h.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "us-east-1",
                "sa-east-1",
                "eu-west-3",
                "ap-southeast-1",
                "af-south-1",
                "ap-southeast-2"
            ]
        );
    }

    #[test]
    fn from_hosts_skips_collisions() {
        let mut hosts = default_hosts();
        hosts.push(Host::new("us-east-1", "1.1.1.1", 0.0, 0.0));
        let registry = HostRegistry::from_hosts(hosts);
        assert_eq!(registry.len(), 6);
    }
}
