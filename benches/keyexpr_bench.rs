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
#[macro_use]
extern crate criterion;

use criterion::Criterion;

use keybus::key_expr::{canonize, includes, intersects};

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("bench_keyexpr_1", |b| {
        b.iter(|| {
            intersects(
                "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
                "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
            );
        })
    });
    c.bench_function("bench_keyexpr_2", |b| {
        b.iter(|| {
            intersects(
                "a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a",
                "a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a",
            );
        })
    });
    c.bench_function("bench_keyexpr_3", |b| {
        b.iter(|| {
            intersects("*", "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        })
    });
    c.bench_function("bench_keyexpr_4", |b| {
        b.iter(|| {
            intersects(
                "**",
                "a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a/a",
            );
        })
    });
    c.bench_function("bench_keyexpr_5", |b| {
        b.iter(|| {
            intersects("a", "a");
            intersects("a/b", "a/b");
            intersects("*", "abc");
            intersects("*", "xxx");
            intersects("ab", "ab/*");
            intersects("a/*/c/*/e", "a/b/c/d/e");
            intersects("a/*/c/*/e", "a/c/e");
            intersects("a/*/c/*/e", "a/b/c/d/x/e");
            intersects("**", "abc");
            intersects("**", "a/b/c");
            intersects("ab/**", "ab");
            intersects("**/xyz", "a/b/xyz/d/e/f/xyz");
            intersects("a/**/c/**/e", "a/b/b/b/c/d/d/d/e");
            intersects("a/**/c/**/e", "a/c/e");
            intersects("a/**/c/*/e/*", "a/b/b/b/c/d/d/c/d/e/f");
            intersects("a/**/c/*/e/*", "a/b/b/b/c/d/d/c/d/d/e/f");
            intersects("x/abc", "x/abc");
            intersects("x/abc", "abc");
            intersects("x/*", "x/abc");
            intersects("x/*", "abc");
            intersects("*", "x/abc");
            intersects("x/**", "x/abc/d/e");
            includes("a/b/c", "a/b/c");
            includes("a/*/c", "a/b/c");
            includes("a/**", "a/b/c/d/e");
            includes("a/**/e", "a/b/c/d/e");
            includes("**", "a/b/c");
            includes("a/*", "a/b/c");
            includes("a/*/c", "a/b/x");
        })
    });
    c.bench_function("bench_keyexpr_canon", |b| {
        b.iter(|| {
            canonize("a/b/c").unwrap();
            canonize("a//b//c/").unwrap();
            canonize("/a/b/c").unwrap();
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
