//
// Copyright (c) 2023 ZettaScale Technology
//
// This program and the accompanying materials are made available under the
// terms of the Eclipse Public License 2.0 which is available at
// http://www.eclipse.org/legal/epl-2.0, or the Apache License, Version 2.0
// which is available at https://www.apache.org/licenses/LICENSE-2.0.
//
// SPDX-License-Identifier: EPL-2.0 OR Apache-2.0
//
// Contributors:
//   ZettaScale Zenoh Team, <zenoh@zettascale.tech>
//
use super::DELIMITER;

/// In-place canonization of a key expression string.
///
/// Canonization removes every empty segment: consecutive slashes collapse
/// into one, leading and trailing slashes disappear. A string made of
/// slashes only canonizes to the empty string.
pub trait Canonizable {
    fn canonize(&mut self);
}

impl Canonizable for String {
    fn canonize(&mut self) {
        let mut last = DELIMITER;
        self.retain(|c| {
            let keep = c != DELIMITER || last != DELIMITER;
            if keep {
                last = c;
            }
            keep
        });
        if self.ends_with(DELIMITER) {
            self.pop();
        }
    }
}
