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
//! The key expression algebra.
//!
//! Key expressions address sets of keys. A key is a `/`-separated path such
//! as `demo/example/test`; a key expression is a key whose segments may also
//! be the wildcards `*` (exactly one segment) and `**` (any number of
//! segments, including none).
//!
//! The two core relations are [`intersects`] (do two expressions share at
//! least one key?) and [`includes`] (does the left expression match every key
//! the right one matches?). Both operate on the segment structure, so they
//! expect canonical expressions: use [`canonize`] or the `autocanonize`
//! constructors to get rid of empty segments first.
use crate::result::KResult;

mod borrowed;
pub mod canon;
pub mod include;
pub mod intersect;
pub(crate) mod matching;
mod owned;
#[cfg(test)]
mod tests;

pub use borrowed::keyexpr;
pub use owned::OwnedKeyExpr;

use canon::Canonizable;
use include::Includer;
use intersect::Intersector;

pub(crate) const DELIMITER: char = '/';
pub(crate) const SINGLE_WILD: &str = "*";
pub(crate) const DOUBLE_WILD: &str = "**";

/// Splits `s` into key expression segments.
///
/// Exactly one trailing delimiter is ignored, and the empty expression yields
/// no segment. Other empty segments are preserved, so canonize first if they
/// are unwanted.
pub(crate) fn segments(s: &str) -> impl DoubleEndedIterator<Item = &str> {
    let body = s.strip_suffix(DELIMITER).unwrap_or(s);
    let non_empty = !body.is_empty();
    body.split(DELIMITER).filter(move |_| non_empty)
}

/// Returns `true` if `left` matches every key that `right` matches.
///
/// Both arguments must be valid key expressions; invalid or non-canonical
/// input makes the answer meaningless rather than an error.
pub fn includes(left: &str, right: &str) -> bool {
    if left == right {
        return true;
    }
    let left: Vec<&str> = segments(left).collect();
    let right: Vec<&str> = segments(right).collect();
    include::DEFAULT_INCLUDER.includes(left.as_slice(), right.as_slice())
}

/// Returns `true` if some concrete key is matched by both `left` and `right`.
///
/// Both arguments must be valid key expressions; invalid or non-canonical
/// input makes the answer meaningless rather than an error.
pub fn intersects(left: &str, right: &str) -> bool {
    if left == right {
        return true;
    }
    let left: Vec<&str> = segments(left).collect();
    let right: Vec<&str> = segments(right).collect();
    intersect::DEFAULT_INTERSECTOR.intersect(left.as_slice(), right.as_slice())
}

/// Validates `s` and returns its canonical form: empty segments are removed,
/// which maps `"/"` to the empty string.
pub fn canonize(s: &str) -> KResult<String> {
    keyexpr::new(s)?;
    let mut canon = s.to_owned();
    canon.canonize();
    Ok(canon)
}

/// Joins two key expression fragments with a `/`.
///
/// One trailing slash of `s1` and one leading slash of `s2` are stripped, so
/// `join("a/", "/b")` yields `"a/b"`. Either fragment may be empty, in which
/// case the other is returned as is; joining two empty fragments fails.
pub fn join(s1: &str, s2: &str) -> KResult<String> {
    if s1.is_empty() && s2.is_empty() {
        bail!("Unable to join two empty key expression fragments");
    }
    let left = s1.strip_suffix(DELIMITER).unwrap_or(s1);
    let right = s2.strip_prefix(DELIMITER).unwrap_or(s2);
    if left.is_empty() {
        return Ok(right.to_owned());
    }
    if right.is_empty() {
        return Ok(left.to_owned());
    }
    Ok(format!("{}{}{}", left, DELIMITER, right))
}
