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
use std::convert::{TryFrom, TryInto};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use std::sync::Arc;

use super::canon::Canonizable;
use super::keyexpr;

/// An owned, reference-counted version of [`keyexpr`].
///
/// `OwnedKeyExpr` derefs to [`keyexpr`], so the whole borrowed API is
/// available on it. Cloning is cheap.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct OwnedKeyExpr(Arc<str>);

impl OwnedKeyExpr {
    /// Validates `t` as a key expression and takes ownership of it.
    pub fn new<T, E>(t: T) -> Result<Self, E>
    where
        Self: TryFrom<T, Error = E>,
    {
        t.try_into()
    }

    /// Canonizes `t`, then validates it and takes ownership of it.
    pub fn autocanonize<T, E>(mut t: T) -> Result<Self, E>
    where
        Self: TryFrom<T, Error = E>,
        T: Canonizable,
    {
        t.canonize();
        t.try_into()
    }
}

impl TryFrom<String> for OwnedKeyExpr {
    type Error = crate::Error;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        <&keyexpr>::try_from(value.as_str())?;
        Ok(Self(value.into()))
    }
}

impl TryFrom<&str> for OwnedKeyExpr {
    type Error = crate::Error;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Ok(keyexpr::new(value)?.into())
    }
}

impl FromStr for OwnedKeyExpr {
    type Err = crate::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.try_into()
    }
}

impl From<&keyexpr> for OwnedKeyExpr {
    fn from(ke: &keyexpr) -> Self {
        Self(ke.as_str().into())
    }
}

impl From<OwnedKeyExpr> for String {
    fn from(ke: OwnedKeyExpr) -> Self {
        ke.as_str().to_owned()
    }
}

impl Deref for OwnedKeyExpr {
    type Target = keyexpr;
    fn deref(&self) -> &Self::Target {
        unsafe { keyexpr::from_str_unchecked(&self.0) }
    }
}

impl AsRef<keyexpr> for OwnedKeyExpr {
    fn as_ref(&self) -> &keyexpr {
        self
    }
}

impl fmt::Display for OwnedKeyExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.deref(), f)
    }
}

impl fmt::Debug for OwnedKeyExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.deref(), f)
    }
}

impl serde::Serialize for OwnedKeyExpr {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for OwnedKeyExpr {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s: String = serde::Deserialize::deserialize(deserializer)?;
        Self::try_from(s).map_err(serde::de::Error::custom)
    }
}
