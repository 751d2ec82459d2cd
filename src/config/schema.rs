//! Settings validation
//!
//! This module provides validation logic for settings files.

use crate::config::types::{NetworkSettings, Settings};
use crate::error::{ConfigError, ConfigResult};
use std::net::Ipv4Addr;

/// Validate a complete settings structure
pub fn validate_settings(settings: &Settings) -> ConfigResult<()> {
    validate_network(&settings.network)?;

    if let Some(ip) = &settings.host_ip {
        parse_ip("host-ip", ip)?;
    }
    if let Some(domain) = &settings.system_domain {
        require_non_empty("system-domain", domain)?;
    }

    require_non_empty("director.name", &settings.director.name)?;
    require_non_empty("cf.deployment", &settings.cf.deployment)?;
    require_non_empty("cf.admin-user", &settings.cf.admin_user)?;

    if settings.readiness.attempts == 0 {
        return Err(ConfigError::Invalid(
            "readiness.attempts must be at least 1".to_string(),
        ));
    }

    for (name, program) in [
        ("bosh", &settings.tools.bosh),
        ("cf", &settings.tools.cf),
        ("docker", &settings.tools.docker),
        ("git", &settings.tools.git),
    ] {
        require_non_empty(&format!("tools.{}", name), program)?;
    }

    Ok(())
}

/// Validate the network block: gateway and director must sit inside the subnet
pub fn validate_network(network: &NetworkSettings) -> ConfigResult<()> {
    require_non_empty("network.name", &network.name)?;

    let (base, prefix) = parse_cidr(&network.subnet)?;
    let gateway = parse_ip("network.gateway", &network.gateway)?;
    let director = parse_ip("network.director-ip", &network.director_ip)?;

    for (field, ip) in [("network.gateway", gateway), ("network.director-ip", director)] {
        if !cidr_contains(base, prefix, ip) {
            return Err(ConfigError::Invalid(format!(
                "{} {} is outside subnet {}",
                field, ip, network.subnet
            )));
        }
    }

    if gateway == director {
        return Err(ConfigError::Invalid(
            "network.director-ip must differ from network.gateway".to_string(),
        ));
    }

    Ok(())
}

/// Parse `a.b.c.d/n` into its base address and prefix length
pub fn parse_cidr(cidr: &str) -> ConfigResult<(Ipv4Addr, u8)> {
    let invalid = || ConfigError::Invalid(format!("Invalid subnet '{}': expected a.b.c.d/n", cidr));

    let (addr, prefix) = cidr.split_once('/').ok_or_else(invalid)?;
    let addr: Ipv4Addr = addr.trim().parse().map_err(|_| invalid())?;
    let prefix: u8 = prefix.trim().parse().map_err(|_| invalid())?;
    if prefix > 32 {
        return Err(invalid());
    }

    Ok((addr, prefix))
}

/// Check whether `ip` falls inside `base/prefix`
pub fn cidr_contains(base: Ipv4Addr, prefix: u8, ip: Ipv4Addr) -> bool {
    let mask = if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix))
    };
    (u32::from(base) & mask) == (u32::from(ip) & mask)
}

fn parse_ip(field: &str, value: &str) -> ConfigResult<Ipv4Addr> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{} '{}' is not an IPv4 address", field, value)))
}

fn require_non_empty(field: &str, value: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{} must not be empty", field)));
    }
    Ok(())
}
