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
use super::{keyexpr, matching, SINGLE_WILD};

pub const DEFAULT_INTERSECTOR: ClassicIntersector = ClassicIntersector;

/// The trait used to implement intersectors.
pub trait Intersector<Left, Right> {
    /// Returns `true` if the sets of keys defined by `left` and `right` have
    /// at least one common element.
    fn intersect(&self, left: Left, right: Right) -> bool;
}

impl<T: for<'a, 'b> Intersector<&'a [&'b str], &'a [&'b str]>> Intersector<&keyexpr, &keyexpr>
    for T
{
    fn intersect(&self, left: &keyexpr, right: &keyexpr) -> bool {
        if left.as_str() == right.as_str() {
            return true;
        }
        let left: Vec<&str> = left.segments().collect();
        let right: Vec<&str> = right.segments().collect();
        self.intersect(left.as_slice(), right.as_slice())
    }
}

/// The segment-wise intersector.
///
/// When both sides carry a `**` the intersection is reported unconditionally:
/// the two multi-wilds can absorb each other's fixed parts. This is knowingly
/// coarser than a full product construction and may report intersections that
/// have no witness key.
pub struct ClassicIntersector;

impl Intersector<&[&str], &[&str]> for ClassicIntersector {
    fn intersect(&self, left: &[&str], right: &[&str]) -> bool {
        match (
            matching::first_double_wild(left),
            matching::first_double_wild(right),
        ) {
            (Some(_), Some(_)) => true,
            (Some(d), None) => matching::head_tail_match(left, right, d),
            (None, Some(d)) => matching::head_tail_match(right, left, d),
            (None, None) => {
                left.len() == right.len()
                    && left
                        .iter()
                        .zip(right)
                        .all(|(l, r)| *l == SINGLE_WILD || *r == SINGLE_WILD || l == r)
            }
        }
    }
}
