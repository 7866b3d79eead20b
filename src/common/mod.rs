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

//! Types and helpers shared by all API parts.

pub(crate) mod protocol;
mod waiter;

pub use self::protocol::Status;
pub use self::waiter::{interrupted, with_deadline, LinearBackoff};

use crate::{Error, ErrorKind, Result};

/// Return the only item of the list.
///
/// Fails with `ResourceNotFound` if the list is empty and with `TooManyItems`
/// if it has more than one item.
pub fn one<T>(mut items: Vec<T>, what: &str) -> Result<T> {
    match items.len() {
        1 => Ok(items.remove(0)),
        0 => Err(Error::new(
            ErrorKind::ResourceNotFound,
            format!("No {} found", what),
        )),
        n => {
            debug!("{} {} items match, expected exactly one", n, what);
            Err(Error::new(
                ErrorKind::TooManyItems,
                format!("Query for {} returned {} items, expected one", what, n),
            ))
        }
    }
}

#[cfg(test)]
mod test {
    use super::one;
    use crate::ErrorKind;

    #[test]
    fn test_one() {
        assert_eq!(one(vec![1], "flavor").unwrap(), 1);
        assert_eq!(
            one(Vec::<u8>::new(), "flavor").unwrap_err().kind(),
            ErrorKind::ResourceNotFound
        );
        assert_eq!(
            one(vec![1, 2], "flavor").unwrap_err().kind(),
            ErrorKind::TooManyItems
        );
    }
}
