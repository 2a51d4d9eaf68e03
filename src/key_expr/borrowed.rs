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
use std::borrow::Borrow;
use std::convert::{TryFrom, TryInto};
use std::fmt;
use std::ops::{Deref, Div};

use super::canon::Canonizable;
use super::include::{Includer, DEFAULT_INCLUDER};
use super::intersect::{Intersector, DEFAULT_INTERSECTOR};
use super::{OwnedKeyExpr, DELIMITER, DOUBLE_WILD, SINGLE_WILD};
use crate::result::KResult;

/// A valid key expression, borrowed as a `str` newtype.
///
/// Key expressions are `/`-separated paths where a segment may also be one of
/// two wildcards: `*` matches exactly one segment, `**` matches any number of
/// segments, including none. A string is a valid key expression unless it is
/// empty, contains a NUL, `\r` or `\n` byte, or contains the substring `***`.
///
/// Validity does not imply canonicity: `a//b` is valid but holds an empty
/// segment that [`autocanonize`](keyexpr::autocanonize) would remove.
///
/// # Examples
/// ```
/// use keybus::key_expr::keyexpr;
///
/// assert!(keyexpr::new("demo/example/**").is_ok());
/// assert!(keyexpr::new("").is_err());
/// assert!(keyexpr::new("demo/***").is_err());
/// ```
#[allow(non_camel_case_types)]
#[derive(PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct keyexpr(str);

impl keyexpr {
    /// Validates `t` as a key expression, returning it borrowed as `keyexpr`.
    pub fn new<'a, T, E>(t: &'a T) -> Result<&'a Self, E>
    where
        &'a Self: TryFrom<&'a T, Error = E>,
        T: ?Sized,
    {
        t.try_into()
    }

    /// Canonizes `t` in place, then validates it.
    ///
    /// # Examples
    /// ```
    /// use keybus::key_expr::keyexpr;
    ///
    /// let mut s = String::from("demo//example/");
    /// assert_eq!(keyexpr::autocanonize(&mut s).unwrap(), "demo/example");
    /// ```
    pub fn autocanonize<'a, T, E>(t: &'a mut T) -> Result<&'a Self, E>
    where
        &'a Self: TryFrom<&'a mut T, Error = E>,
        T: Canonizable + ?Sized,
    {
        t.canonize();
        t.try_into()
    }

    /// Returns `self` as a `&str`.
    #[inline]
    pub fn as_str(&self) -> &str {
        self
    }

    /// Splits `self` into its segments: exactly one trailing `/` is ignored,
    /// and an otherwise empty expression yields no segment at all. Empty
    /// segments from consecutive slashes are preserved.
    pub fn segments(&self) -> impl DoubleEndedIterator<Item = &str> {
        super::segments(&self.0)
    }

    /// Returns `true` if any segment of `self` is a wildcard.
    pub fn is_wild(&self) -> bool {
        self.segments()
            .any(|s| s == SINGLE_WILD || s == DOUBLE_WILD)
    }

    /// Returns `true` if `self` matches every key that `other` matches.
    ///
    /// # Examples
    /// ```
    /// use keybus::key_expr::keyexpr;
    ///
    /// let wild = keyexpr::new("demo/**").unwrap();
    /// assert!(wild.includes(keyexpr::new("demo/example/test").unwrap()));
    /// assert!(wild.includes(keyexpr::new("demo/*").unwrap()));
    /// assert!(!wild.includes(keyexpr::new("other/**").unwrap()));
    /// ```
    pub fn includes(&self, other: &Self) -> bool {
        DEFAULT_INCLUDER.includes(self, other)
    }

    /// Returns `true` if some concrete key is matched by both `self` and
    /// `other`.
    ///
    /// # Examples
    /// ```
    /// use keybus::key_expr::keyexpr;
    ///
    /// let a = keyexpr::new("demo/**").unwrap();
    /// assert!(a.intersects(keyexpr::new("demo/example/test").unwrap()));
    /// assert!(!a.intersects(keyexpr::new("other/test").unwrap()));
    /// ```
    pub fn intersects(&self, other: &Self) -> bool {
        DEFAULT_INTERSECTOR.intersect(self, other)
    }

    /// Joins `self` and `other` with a `/` and canonizes the result.
    ///
    /// Fails only when the concatenation canonizes to an empty expression,
    /// which requires both operands to consist of slashes only.
    ///
    /// # Examples
    /// ```
    /// use keybus::key_expr::keyexpr;
    ///
    /// let base = keyexpr::new("demo").unwrap();
    /// let leaf = keyexpr::new("example").unwrap();
    /// assert_eq!(base.join(leaf).unwrap().as_str(), "demo/example");
    /// ```
    pub fn join(&self, other: &keyexpr) -> KResult<OwnedKeyExpr> {
        OwnedKeyExpr::autocanonize(format!("{}/{}", self, other))
    }

    /// # Safety
    /// `s` must be a valid key expression.
    pub(crate) const unsafe fn from_str_unchecked(s: &str) -> &Self {
        std::mem::transmute(s)
    }
}

impl<'a> TryFrom<&'a str> for &'a keyexpr {
    type Error = crate::Error;
    fn try_from(value: &'a str) -> Result<Self, Self::Error> {
        if value.is_empty() {
            bail!("Invalid key expression ``: key expressions must not be empty");
        }
        if let Some(c) = value.chars().find(|c| matches!(c, '\0' | '\r' | '\n')) {
            bail!(
                "Invalid key expression `{}`: character {:?} is forbidden",
                value.escape_debug(),
                c
            );
        }
        if value.contains("***") {
            bail!(
                "Invalid key expression `{}`: `***` is not a valid wildcard",
                value
            );
        }
        Ok(unsafe { keyexpr::from_str_unchecked(value) })
    }
}

impl<'a> TryFrom<&'a mut str> for &'a keyexpr {
    type Error = crate::Error;
    fn try_from(value: &'a mut str) -> Result<Self, Self::Error> {
        (value as &'a str).try_into()
    }
}

impl<'a> TryFrom<&'a String> for &'a keyexpr {
    type Error = crate::Error;
    fn try_from(value: &'a String) -> Result<Self, Self::Error> {
        value.as_str().try_into()
    }
}

impl<'a> TryFrom<&'a mut String> for &'a keyexpr {
    type Error = crate::Error;
    fn try_from(value: &'a mut String) -> Result<Self, Self::Error> {
        value.as_str().try_into()
    }
}

impl<'a> TryFrom<&'a &'a str> for &'a keyexpr {
    type Error = crate::Error;
    fn try_from(value: &'a &'a str) -> Result<Self, Self::Error> {
        (*value).try_into()
    }
}

#[test]
fn autocanon() {
    let mut s = String::from("hello///there//");
    assert_eq!(keyexpr::autocanonize(&mut s).unwrap(), "hello/there");
}

impl Deref for keyexpr {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for keyexpr {
    fn as_ref(&self) -> &str {
        self
    }
}

impl PartialEq<str> for keyexpr {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<keyexpr> for str {
    fn eq(&self, other: &keyexpr) -> bool {
        self == other.as_str()
    }
}

impl Borrow<keyexpr> for OwnedKeyExpr {
    fn borrow(&self) -> &keyexpr {
        self
    }
}

impl ToOwned for keyexpr {
    type Owned = OwnedKeyExpr;
    fn to_owned(&self) -> Self::Owned {
        OwnedKeyExpr::from(self)
    }
}

impl fmt::Display for keyexpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Debug for keyexpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ke`{}`", self.as_str())
    }
}

impl Div<&keyexpr> for &keyexpr {
    type Output = OwnedKeyExpr;
    fn div(self, rhs: &keyexpr) -> Self::Output {
        self.join(rhs).unwrap() // Joining two valid key expressions only fails when both are all slashes.
    }
}
