// Copyright 2026 The openstack-service-test Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Service types known to the tests.

use std::fmt;

/// A service type as found in the service catalog.
///
/// Some clouds register services under vendor-specific names, so a service
/// type carries a list of catalog names tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceType {
    catalog_types: &'static [&'static str],
}

impl ServiceType {
    const fn new(catalog_types: &'static [&'static str]) -> ServiceType {
        ServiceType { catalog_types }
    }

    /// Primary catalog type.
    #[inline]
    pub fn catalog_type(&self) -> &'static str {
        self.catalog_types[0]
    }

    /// All catalog types in the order of preference.
    #[inline]
    pub fn catalog_types(&self) -> &'static [&'static str] {
        self.catalog_types
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.catalog_type())
    }
}

/// Compute service (Nova).
pub const COMPUTE: ServiceType = ServiceType::new(&["compute"]);

/// Object storage service (Swift).
pub const OBJECT_STORAGE: ServiceType = ServiceType::new(&["object-store"]);

/// Database service (Reddwarf/Trove).
pub const DATABASE: ServiceType = ServiceType::new(&["database", "hpext:dbaas", "rax:database"]);

#[cfg(test)]
mod test {
    use super::{COMPUTE, DATABASE};

    #[test]
    fn test_service_types() {
        assert_eq!(COMPUTE.catalog_type(), "compute");
        assert_eq!(DATABASE.to_string(), "database");
        assert!(DATABASE.catalog_types().contains(&"hpext:dbaas"));
    }
}
