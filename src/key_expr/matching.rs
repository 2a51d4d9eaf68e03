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

//! The segment-wise matching core shared by the inclusion and intersection
//! relations.
//!
//! Only the first `**` of a pattern is significant: segments before it are
//! compared positionally from the left, segments after it are compared
//! positionally from the right, and everything in between is absorbed.

use super::{DOUBLE_WILD, SINGLE_WILD};

/// Index of the first `**` segment of `pattern`, if any.
#[inline]
pub(crate) fn first_double_wild(pattern: &[&str]) -> Option<usize> {
    pattern.iter().position(|s| *s == DOUBLE_WILD)
}

#[inline]
fn segment_matches(pattern: &str, key: &str) -> bool {
    pattern == SINGLE_WILD || pattern == key
}

/// Returns `true` if `pattern` matches `key`, where the segments of `key` are
/// compared as opaque tokens.
pub(crate) fn segments_match(pattern: &[&str], key: &[&str]) -> bool {
    match first_double_wild(pattern) {
        Some(d) => head_tail_match(pattern, key, d),
        None => {
            kcheck!(pattern.len() == key.len());
            pattern.iter().zip(key).all(|(p, k)| segment_matches(p, k))
        }
    }
}

/// The head/tail check around the first `**` of `pattern`, sitting at index
/// `d`. Head segments are anchored to the start of `key`, tail segments to
/// its end; tail segments whose anchor falls before `d` are consumed by the
/// `**` and left unchecked.
pub(crate) fn head_tail_match(pattern: &[&str], key: &[&str], d: usize) -> bool {
    kcheck!(key.len() >= d);
    for i in 0..d {
        kcheck!(segment_matches(pattern[i], key[i]));
    }
    for i in (d + 1)..pattern.len() {
        match (key.len() + i).checked_sub(pattern.len()) {
            Some(k) if k >= d => kcheck!(segment_matches(pattern[i], key[k])),
            _ => {}
        }
    }
    true
}
