// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory probe for unit tests.

use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::path::Path;

use devprobe_core::ProbeError;

use crate::probe::{FilesystemProbe, NetworkProbe};

pub(crate) struct FakeProbe {
    files: HashSet<String>,
    contents: HashMap<String, Result<Vec<u8>, ProbeError>>,
    permission: bool,
    addresses: Result<Vec<IpAddr>, ProbeError>,
    reads: Cell<usize>,
    enumerations: Cell<usize>,
}

impl Default for FakeProbe {
    fn default() -> Self {
        Self {
            files: HashSet::new(),
            contents: HashMap::new(),
            permission: true,
            addresses: Ok(Vec::new()),
            reads: Cell::new(0),
            enumerations: Cell::new(0),
        }
    }
}

impl FakeProbe {
    pub(crate) fn with_file(mut self, path: &str) -> Self {
        self.files.insert(path.to_owned());
        self
    }

    pub(crate) fn with_contents(self, path: &str, contents: &str) -> Self {
        self.with_bytes(path, contents.as_bytes().to_vec())
    }

    pub(crate) fn with_bytes(mut self, path: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(path.to_owned());
        self.contents.insert(path.to_owned(), Ok(bytes));
        self
    }

    pub(crate) fn with_read_error(mut self, path: &str, err: ProbeError) -> Self {
        self.contents.insert(path.to_owned(), Err(err));
        self
    }

    pub(crate) fn with_addresses(mut self, addresses: &[&str]) -> Self {
        self.addresses = Ok(addresses
            .iter()
            .map(|a| a.parse().expect("test address"))
            .collect());
        self
    }

    pub(crate) fn with_address_error(mut self, err: ProbeError) -> Self {
        self.addresses = Err(err);
        self
    }

    pub(crate) fn denied(mut self) -> Self {
        self.permission = false;
        self
    }

    /// Number of `read_prefix` calls so far.
    pub(crate) fn reads(&self) -> usize {
        self.reads.get()
    }

    /// Number of `interface_addresses` calls so far.
    pub(crate) fn enumerations(&self) -> usize {
        self.enumerations.get()
    }
}

impl FilesystemProbe for FakeProbe {
    fn exists(&self, path: &Path) -> bool {
        path.to_str().is_some_and(|p| self.files.contains(p))
    }

    fn read_prefix(&self, path: &Path, max_bytes: usize) -> Result<Vec<u8>, ProbeError> {
        self.reads.set(self.reads.get() + 1);
        let key = path.to_str().ok_or(ProbeError::NotFound)?;
        match self.contents.get(key) {
            Some(Ok(bytes)) => Ok(bytes.iter().copied().take(max_bytes).collect()),
            Some(Err(e)) => Err(e.clone()),
            None => Err(ProbeError::NotFound),
        }
    }
}

impl NetworkProbe for FakeProbe {
    fn permission_granted(&self) -> bool {
        self.permission
    }

    fn interface_addresses(&self) -> Result<Vec<IpAddr>, ProbeError> {
        self.enumerations.set(self.enumerations.get() + 1);
        self.addresses.clone()
    }
}
