// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Probe traits the classifier queries, and the host implementations.
//
// Probes report failures as `ProbeError`; the matchers decide that a failed
// probe means "no evidence". Nothing here panics on I/O.

use std::fs::File;
use std::io::Read;
use std::net::IpAddr;
use std::path::Path;

use devprobe_core::ProbeError;

/// Read-only view of the filesystem.
pub trait FilesystemProbe {
    /// Whether `path` exists. Unreadable or missing paths report `false`.
    fn exists(&self, path: &Path) -> bool;

    /// Read at most `max_bytes` from the start of `path`.
    fn read_prefix(&self, path: &Path, max_bytes: usize) -> Result<Vec<u8>, ProbeError>;
}

/// Local network interface enumeration.
pub trait NetworkProbe {
    /// Whether the host allows this process to enumerate interfaces.
    /// Callers must check this before `interface_addresses`.
    fn permission_granted(&self) -> bool;

    /// Addresses of all local interfaces, in enumeration order.
    fn interface_addresses(&self) -> Result<Vec<IpAddr>, ProbeError>;
}

/// Everything the classifier needs besides the build snapshot.
pub trait EnvironmentProbe: FilesystemProbe + NetworkProbe {}

impl<T: FilesystemProbe + NetworkProbe + ?Sized> EnvironmentProbe for T {}

/// Probes backed by the real host: `std::fs` and `getifaddrs(3)`.
///
/// There is no permission model on desktop hosts, so enumeration is always
/// permitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostProbe;

impl FilesystemProbe for HostProbe {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_prefix(&self, path: &Path, max_bytes: usize) -> Result<Vec<u8>, ProbeError> {
        read_prefix(path, max_bytes)
    }
}

impl NetworkProbe for HostProbe {
    fn permission_granted(&self) -> bool {
        true
    }

    fn interface_addresses(&self) -> Result<Vec<IpAddr>, ProbeError> {
        host_interface_addresses()
    }
}

/// Bounded read of the first `max_bytes` of a file.
pub fn read_prefix(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ProbeError> {
    let file = File::open(path)?;
    let mut buf = Vec::with_capacity(max_bytes);
    file.take(max_bytes as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

/// Enumerate interface addresses with `getifaddrs(3)`.
///
/// Entries without an address, or with a family other than IPv4/IPv6, are
/// skipped. Order follows the kernel's interface list.
#[cfg(unix)]
pub fn host_interface_addresses() -> Result<Vec<IpAddr>, ProbeError> {
    use std::net::{Ipv4Addr, Ipv6Addr};

    let mut head: *mut libc::ifaddrs = std::ptr::null_mut();
    // SAFETY: `head` is a valid out-pointer; on success libc hands us a list
    // we release with `freeifaddrs` below.
    if unsafe { libc::getifaddrs(&mut head) } != 0 {
        return Err(std::io::Error::last_os_error().into());
    }

    let mut addresses = Vec::new();
    let mut cursor = head;
    while !cursor.is_null() {
        // SAFETY: `cursor` is a non-null node of the list returned above.
        let entry = unsafe { &*cursor };
        if !entry.ifa_addr.is_null() {
            // SAFETY: `ifa_addr` is non-null and points to a sockaddr whose
            // concrete layout is selected by `sa_family`.
            let family = unsafe { (*entry.ifa_addr).sa_family } as libc::c_int;
            match family {
                libc::AF_INET => {
                    // SAFETY: `sa_family` is AF_INET, so the kernel stored a
                    // `sockaddr_in` at `ifa_addr`.
                    let sin = unsafe { &*(entry.ifa_addr as *const libc::sockaddr_in) };
                    let octets = sin.sin_addr.s_addr.to_ne_bytes();
                    addresses.push(IpAddr::V4(Ipv4Addr::from(octets)));
                }
                libc::AF_INET6 => {
                    // SAFETY: `sa_family` is AF_INET6, so the kernel stored a
                    // `sockaddr_in6` at `ifa_addr`.
                    let sin6 = unsafe { &*(entry.ifa_addr as *const libc::sockaddr_in6) };
                    addresses.push(IpAddr::V6(Ipv6Addr::from(sin6.sin6_addr.s6_addr)));
                }
                _ => {}
            }
        }
        cursor = entry.ifa_next;
    }

    // SAFETY: `head` came from a successful `getifaddrs` and is freed once.
    unsafe { libc::freeifaddrs(head) };
    Ok(addresses)
}

#[cfg(not(unix))]
pub fn host_interface_addresses() -> Result<Vec<IpAddr>, ProbeError> {
    Err(ProbeError::Unavailable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_prefix_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cpuinfo");
        std::fs::write(&path, vec![b'x'; 4096]).unwrap();

        let bytes = HostProbe.read_prefix(&path, 1024).unwrap();
        assert_eq!(bytes.len(), 1024);
    }

    #[test]
    fn read_prefix_returns_short_files_whole() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drivers");
        std::fs::write(&path, b"goldfish_tty /dev/ttyGF 248 0-2 serial\n").unwrap();

        let bytes = HostProbe.read_prefix(&path, 1024).unwrap();
        assert!(bytes.starts_with(b"goldfish_tty"));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = HostProbe
            .read_prefix(&dir.path().join("absent"), 1024)
            .unwrap_err();
        assert_eq!(err, ProbeError::NotFound);
    }

    #[test]
    fn exists_reflects_the_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genyd");
        assert!(!HostProbe.exists(&path));
        std::fs::write(&path, b"").unwrap();
        assert!(HostProbe.exists(&path));
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn host_enumeration_succeeds() {
        // Results depend on the machine; only the call itself is checked.
        assert!(host_interface_addresses().is_ok());
    }
}
