// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// devprobe: Emulator and virtualization detection.
//
// The classifier runs three matchers in a fixed order over a snapshot of
// build facts and a set of host probes:
//
//   1. basic      build-string rules (direct-hit or scored policy)
//   2. network    first non-loopback IPv4 vs. the emulator NAT address
//   3. filesystem marker files, then QEMU driver strings
//
// The first matcher that fires decides. Probe failures count as "no signal",
// so classification always ends in a verdict.

pub mod basic;
pub mod classifier;
pub mod filesystem;
pub mod network;
pub mod probe;
pub mod signatures;

pub use classifier::VirtualizationClassifier;
pub use probe::{EnvironmentProbe, FilesystemProbe, HostProbe, NetworkProbe};
pub use signatures::{SIGNATURES, SignatureDatabase};

#[cfg(test)]
mod testing;
