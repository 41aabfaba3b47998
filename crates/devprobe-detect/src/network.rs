// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Network matcher: is the first local IPv4 address the emulator NAT address?

use std::net::{IpAddr, Ipv4Addr};

use devprobe_core::{ProbeError, Signal};
use tracing::{debug, trace};

use crate::probe::NetworkProbe;
use crate::signatures::SignatureDatabase;

/// First IPv4 address in enumeration order that is not loopback.
pub fn first_non_loopback_ipv4<P: NetworkProbe + ?Sized>(
    probe: &P,
) -> Result<Option<Ipv4Addr>, ProbeError> {
    Ok(probe
        .interface_addresses()?
        .into_iter()
        .find_map(|addr| match addr {
            IpAddr::V4(v4) if !v4.is_loopback() => Some(v4),
            _ => None,
        }))
}

/// Compare the first candidate address with `db.emulator_address`.
///
/// Only the first non-loopback IPv4 address is considered; later interfaces
/// are never inspected, even when the first one does not match. Without
/// permission, or when enumeration fails, the host is assumed physical.
pub fn check_ip<P: NetworkProbe + ?Sized>(probe: &P, db: &SignatureDatabase) -> Option<Signal> {
    if !probe.permission_granted() {
        trace!("no permission to enumerate interfaces, skipping network check");
        return None;
    }

    let address = match first_non_loopback_ipv4(probe) {
        Ok(Some(address)) => address,
        Ok(None) => return None,
        Err(e) => {
            trace!(error = %e, "interface enumeration failed");
            return None;
        }
    };

    if address == db.emulator_address {
        debug!(%address, "emulator NAT address in use");
        Some(Signal::EmulatorAddress { address })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signatures::SIGNATURES;
    use crate::testing::FakeProbe;

    #[test]
    fn emulator_address_matches() {
        let probe = FakeProbe::default().with_addresses(&["10.0.2.15"]);
        assert_eq!(
            check_ip(&probe, &SIGNATURES),
            Some(Signal::EmulatorAddress {
                address: Ipv4Addr::new(10, 0, 2, 15),
            })
        );
    }

    #[test]
    fn lan_address_does_not_match() {
        let probe = FakeProbe::default().with_addresses(&["192.168.1.5"]);
        assert_eq!(check_ip(&probe, &SIGNATURES), None);
    }

    #[test]
    fn loopback_and_ipv6_are_skipped() {
        let probe = FakeProbe::default().with_addresses(&["127.0.0.1", "::1", "fe80::1", "10.0.2.15"]);
        assert_eq!(
            first_non_loopback_ipv4(&probe).unwrap(),
            Some(Ipv4Addr::new(10, 0, 2, 15))
        );
        assert!(check_ip(&probe, &SIGNATURES).is_some());
    }

    #[test]
    fn only_the_first_candidate_is_compared() {
        let probe = FakeProbe::default().with_addresses(&["127.0.0.1", "192.168.1.5", "10.0.2.15"]);
        assert_eq!(check_ip(&probe, &SIGNATURES), None);
    }

    #[test]
    fn no_candidate_means_no_signal() {
        let probe = FakeProbe::default().with_addresses(&["127.0.0.1"]);
        assert_eq!(first_non_loopback_ipv4(&probe).unwrap(), None);
        assert_eq!(check_ip(&probe, &SIGNATURES), None);
    }

    #[test]
    fn denied_permission_fails_closed_without_enumerating() {
        let probe = FakeProbe::default()
            .with_addresses(&["10.0.2.15"])
            .denied();
        assert_eq!(check_ip(&probe, &SIGNATURES), None);
        assert_eq!(probe.enumerations(), 0);
    }

    #[test]
    fn enumeration_failure_fails_closed() {
        let probe = FakeProbe::default().with_address_error(ProbeError::Io("netlink".into()));
        assert_eq!(check_ip(&probe, &SIGNATURES), None);
    }
}
