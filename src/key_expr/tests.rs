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
use std::convert::TryFrom;

use super::*;

#[test]
fn validation() {
    assert!(keyexpr::new("demo/example/test").is_ok());
    assert!(keyexpr::new("demo/*/test").is_ok());
    assert!(keyexpr::new("demo/**").is_ok());
    assert!(keyexpr::new("*").is_ok());
    assert!(keyexpr::new("**").is_ok());
    // Valid but non-canonical forms are accepted as is.
    assert!(keyexpr::new("demo//test").is_ok());
    assert!(keyexpr::new("/demo").is_ok());
    assert!(keyexpr::new("demo/").is_ok());
    assert!(keyexpr::new("/").is_ok());
    // Wildcards are plain segments, so adjacent stars do not merge.
    assert!(keyexpr::new("*/**").is_ok());
    assert!(keyexpr::new("**/*").is_ok());

    assert!(keyexpr::new("").is_err());
    assert!(keyexpr::new("demo/***").is_err());
    assert!(keyexpr::new("***").is_err());
    assert!(keyexpr::new("demo/****/test").is_err());
    assert!(keyexpr::new("demo\0test").is_err());
    assert!(keyexpr::new("demo\rtest").is_err());
    assert!(keyexpr::new("demo\ntest").is_err());
}

#[test]
fn canonization() {
    assert_eq!(canonize("demo/example").unwrap(), "demo/example");
    assert_eq!(canonize("demo//example").unwrap(), "demo/example");
    assert_eq!(canonize("demo/example/").unwrap(), "demo/example");
    assert_eq!(canonize("/demo/example").unwrap(), "demo/example");
    assert_eq!(canonize("a//b//").unwrap(), "a/b");
    assert_eq!(canonize("/").unwrap(), "");
    assert_eq!(canonize("///").unwrap(), "");
    assert!(canonize("").is_err());
    assert!(canonize("a/***").is_err());

    // Idempotence.
    let once = canonize("a///b///c//").unwrap();
    assert_eq!(canonize(&once).unwrap(), once);

    let mut s = String::from("demo//example/");
    assert_eq!(keyexpr::autocanonize(&mut s).unwrap(), "demo/example");
    assert_eq!(
        OwnedKeyExpr::autocanonize(String::from("//demo//**//"))
            .unwrap()
            .as_str(),
        "demo/**"
    );
}

#[test]
fn joining() {
    assert_eq!(join("a", "b").unwrap(), "a/b");
    assert_eq!(join("a/", "/b").unwrap(), "a/b");
    assert_eq!(join("a/b", "c/d").unwrap(), "a/b/c/d");
    assert_eq!(join("", "b").unwrap(), "b");
    assert_eq!(join("a", "").unwrap(), "a");
    assert_eq!(join("/", "/").unwrap(), "");
    assert!(join("", "").is_err());

    let base = keyexpr::new("demo").unwrap();
    let leaf = keyexpr::new("example/test").unwrap();
    assert_eq!(base.join(leaf).unwrap().as_str(), "demo/example/test");
    assert_eq!((base / leaf).as_str(), "demo/example/test");
    // The method canonizes its result, unlike the fragment helper.
    assert_eq!(
        keyexpr::new("demo/")
            .unwrap()
            .join(keyexpr::new("/test").unwrap())
            .unwrap()
            .as_str(),
        "demo/test"
    );
}

#[test]
fn wildness() {
    assert!(!keyexpr::new("demo/example").unwrap().is_wild());
    assert!(keyexpr::new("demo/*").unwrap().is_wild());
    assert!(keyexpr::new("**/example").unwrap().is_wild());
    assert!(keyexpr::new("*").unwrap().is_wild());
    // A `*` embedded in a longer segment is a literal, not a wildcard.
    assert!(!keyexpr::new("demo/a*b").unwrap().is_wild());
}

#[test]
fn segmentation() {
    let segs = |s: &str| -> Vec<String> {
        keyexpr::new(s)
            .unwrap()
            .segments()
            .map(String::from)
            .collect()
    };
    assert_eq!(segs("a/b/c"), ["a", "b", "c"]);
    assert_eq!(segs("a/b/"), ["a", "b"]);
    assert_eq!(segs("a//b"), ["a", "", "b"]);
    assert!(segs("/").is_empty());

    // Canonical expressions never carry empty segments.
    let canon = canonize("//a///b//").unwrap();
    assert!(keyexpr::new(&canon).unwrap().segments().all(|s| !s.is_empty()));
}

#[test]
fn inclusion() {
    let ke = |s| keyexpr::new(s).unwrap();
    // Reflexive.
    for s in ["demo/example", "demo/*", "demo/**", "**"] {
        assert!(ke(s).includes(ke(s)));
    }
    assert!(ke("demo/**").includes(ke("demo/example/test")));
    assert!(ke("demo/**").includes(ke("demo")));
    assert!(ke("demo/**").includes(ke("demo/*")));
    assert!(ke("demo/**").includes(ke("demo/**/test")));
    assert!(ke("demo/*").includes(ke("demo/example")));
    assert!(ke("**").includes(ke("demo/example")));
    assert!(!ke("demo/example").includes(ke("demo/*")));
    assert!(!ke("demo/*/test").includes(ke("demo/example")));
    assert!(!ke("demo/**").includes(ke("other/example")));
    assert!(!ke("**/test").includes(ke("demo/example")));
    // The right side is compared structurally: its wildcards are plain
    // segments, and the pattern's `*` covers them like any other text.
    assert!(ke("demo/*").includes(ke("demo/*")));
    assert!(ke("demo/*").includes(ke("demo/**")));
    assert!(!ke("*/example").includes(ke("demo/**")));
    // Very short right sides satisfy tail comparisons vacuously.
    assert!(ke("demo/**/test").includes(ke("demo")));
    assert!(ke("**/a/b").includes(ke("b")));
}

#[test]
fn intersection() {
    let ke = |s| keyexpr::new(s).unwrap();
    for s in ["demo/example", "demo/*", "demo/**"] {
        assert!(ke(s).intersects(ke(s)));
    }
    assert!(ke("demo/*/test").intersects(ke("demo/**")));
    assert!(ke("demo/*/**").intersects(ke("demo/example")));
    assert!(ke("demo/example").intersects(ke("demo/*")));
    assert!(ke("*").intersects(ke("demo")));
    assert!(ke("**").intersects(ke("demo/example/test")));
    assert!(ke("**/test").intersects(ke("demo/test")));
    assert!(!ke("**/test").intersects(ke("demo/example")));
    assert!(!ke("demo/**").intersects(ke("other/test")));
    assert!(!ke("demo/example").intersects(ke("demo/test")));
    assert!(!ke("demo/*").intersects(ke("other/*")));
    assert!(!ke("demo/a/*").intersects(ke("demo/b/*")));
    assert!(!ke("demo").intersects(ke("demo/example")));
    // The `**` absorbs tail comparisons that would reach back past it.
    assert!(ke("a/**/b").intersects(ke("a")));
    // Two `**`-bearing expressions always intersect, literal conflicts
    // included.
    assert!(ke("demo/**").intersects(ke("**/test")));
    assert!(ke("a/**").intersects(ke("b/**")));
    // Symmetry on a mixed sample.
    for (a, b) in [
        ("demo/**", "demo/example"),
        ("demo/*", "demo/**/test"),
        ("a/b/c", "a/**"),
        ("a/*/c", "*/b/*"),
        ("**/test", "demo/example"),
    ] {
        assert_eq!(ke(a).intersects(ke(b)), ke(b).intersects(ke(a)));
    }
}

#[test]
fn ownership() {
    let owned = OwnedKeyExpr::new("demo/example").unwrap();
    assert_eq!(owned.as_str(), "demo/example");
    let borrowed: &keyexpr = &owned;
    assert_eq!(OwnedKeyExpr::from(borrowed), owned);
    assert_eq!(String::from(owned.clone()), "demo/example");
    assert_eq!("demo/example".parse::<OwnedKeyExpr>().unwrap(), owned);
    assert!(OwnedKeyExpr::try_from(String::from("demo/***")).is_err());

    use std::collections::HashMap;
    let mut map: HashMap<OwnedKeyExpr, u32> = HashMap::new();
    map.insert(owned.clone(), 1);
    // Borrow lets lookups go through &keyexpr.
    assert_eq!(map.get(borrowed), Some(&1));
}

#[test]
fn serde_support() {
    let owned = OwnedKeyExpr::new("demo/**").unwrap();
    let json = serde_json::to_string(&owned).unwrap();
    assert_eq!(json, "\"demo/**\"");
    let back: OwnedKeyExpr = serde_json::from_str(&json).unwrap();
    assert_eq!(back, owned);
    assert!(serde_json::from_str::<OwnedKeyExpr>("\"demo/***\"").is_err());
    assert!(serde_json::from_str::<OwnedKeyExpr>("\"\"").is_err());
}
