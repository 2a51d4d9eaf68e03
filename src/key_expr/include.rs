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
use super::{keyexpr, matching};

pub const DEFAULT_INCLUDER: LTRIncluder = LTRIncluder;

/// The trait used to implement includers.
pub trait Includer<Left, Right> {
    /// Returns `true` if the set of keys defined by `left` includes the one
    /// defined by `right`.
    fn includes(&self, left: Left, right: Right) -> bool;
}

impl<T: for<'a, 'b> Includer<&'a [&'b str], &'a [&'b str]>> Includer<&keyexpr, &keyexpr> for T {
    fn includes(&self, left: &keyexpr, right: &keyexpr) -> bool {
        if left.as_str() == right.as_str() {
            return true;
        }
        let left: Vec<&str> = left.segments().collect();
        let right: Vec<&str> = right.segments().collect();
        self.includes(left.as_slice(), right.as_slice())
    }
}

/// An includer that walks the including pattern left to right, anchoring the
/// segments around its first `**` to both ends of the included expression.
/// The included side is compared as opaque tokens: its own wildcards get no
/// special treatment beyond textual equality.
pub struct LTRIncluder;

impl Includer<&[&str], &[&str]> for LTRIncluder {
    fn includes(&self, left: &[&str], right: &[&str]) -> bool {
        matching::segments_match(left, right)
    }
}
