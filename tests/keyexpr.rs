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
use keybus::key_expr::{canonize, includes, intersects, join};

#[test]
fn keyexpr_intersect() {
    assert!(intersects("a", "a"));
    assert!(intersects("a/b", "a/b"));
    assert!(intersects("*", "abc"));
    assert!(intersects("*", "abc/"));
    assert!(intersects("*/", "abc"));
    assert!(!intersects("*", "x/abc"));
    assert!(intersects("x/*", "x/abc"));
    assert!(!intersects("x/*", "abc"));
    assert!(!intersects("x/*", "x/abc/d"));
    assert!(intersects("*", "*"));
    assert!(intersects("*", "**"));
    assert!(intersects("a/*/c/*/e", "a/b/c/d/e"));
    assert!(!intersects("a/*/c/*/e", "a/c/e"));
    assert!(!intersects("a/*/c/*/e", "a/b/c/d/x/e"));
    assert!(!intersects("a/b", "a/b/c"));
    assert!(intersects("**", "abc"));
    assert!(intersects("**", "a/b/c"));
    assert!(intersects("**", "a/b/c/"));
    assert!(intersects("**/", "a/b/c"));
    assert!(intersects("ab/**", "ab"));
    assert!(intersects("**/xyz", "a/b/xyz/d/e/f/xyz"));
    assert!(!intersects("**/xyz", "a/b/xyz/d/e/f"));
    assert!(intersects("a/b/c", "a/**/c"));
    assert!(!intersects("a/b/x", "a/**/c"));
    assert!(intersects("a/**/c", "a/c"));
    assert!(intersects("a/**/c", "a/b/b/b/c"));
    // The `**` absorbs tail segments that would reach back past it.
    assert!(intersects("a/**/c", "a"));
    assert!(!intersects("a/**/c", "b"));
    assert!(intersects("demo/**", "demo/example/test"));
    assert!(!intersects("demo/**", "other/test"));
    // Two multi-wilds always intersect.
    assert!(intersects("a/**", "**/b"));
    assert!(intersects("**", "**"));
    assert!(intersects("*/b", "a/b"));
    assert!(!intersects("*/b", "a/c"));
}

#[test]
fn keyexpr_include() {
    assert!(includes("a", "a"));
    assert!(includes("*", "abc"));
    assert!(!includes("abc", "*"));
    assert!(includes("*", "*"));
    assert!(includes("**", "*"));
    assert!(includes("**", "**"));
    assert!(includes("**", "a/b/c"));
    assert!(includes("a/**", "a/b/c"));
    assert!(includes("a/**", "a"));
    assert!(!includes("a/b", "a/**"));
    assert!(includes("a/*", "a/b"));
    assert!(!includes("a/b", "a/*"));
    // The included side is opaque: its `**` is just one token for `*`.
    assert!(includes("a/*", "a/**"));
    assert!(includes("demo/**", "demo/example/*"));
    assert!(!includes("demo/**", "other"));
    assert!(includes("**/c", "a/b/c"));
    assert!(!includes("**/c", "a/b/x"));
    assert!(includes("a/**/c", "a/x/c"));
    assert!(includes("a/**/c", "a/c"));
    // The `**` absorbs tail segments that would reach back past it.
    assert!(includes("a/**/c", "a"));
    assert!(!includes("a/*", "a"));
    assert!(!includes("a", "a/b"));
}

#[test]
fn keyexpr_canon() {
    assert_eq!(canonize("a/b").unwrap(), "a/b");
    assert_eq!(canonize("a//b").unwrap(), "a/b");
    assert_eq!(canonize("/a/b").unwrap(), "a/b");
    assert_eq!(canonize("a/b/").unwrap(), "a/b");
    assert_eq!(canonize("//a///b//").unwrap(), "a/b");
    assert_eq!(canonize("/").unwrap(), "");
    assert_eq!(canonize("///").unwrap(), "");
    assert_eq!(canonize("**/").unwrap(), "**");
    assert!(canonize("").is_err());
    assert!(canonize("a/***").is_err());
    assert!(canonize("a/b\n").is_err());
    assert!(canonize("a\0b").is_err());
}

#[test]
fn keyexpr_join() {
    assert_eq!(join("a", "b").unwrap(), "a/b");
    assert_eq!(join("a/", "b").unwrap(), "a/b");
    assert_eq!(join("a", "/b").unwrap(), "a/b");
    assert_eq!(join("a/", "/b").unwrap(), "a/b");
    assert_eq!(join("a/b", "c/d").unwrap(), "a/b/c/d");
    assert_eq!(join("", "b").unwrap(), "b");
    assert_eq!(join("a", "").unwrap(), "a");
    assert!(join("", "").is_err());
}
