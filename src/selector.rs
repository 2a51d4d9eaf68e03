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
use std::fmt;

use crate::key_expr::{keyexpr, OwnedKeyExpr};

/// The target of a query: a key expression and optional free-form parameters.
///
/// The string form is `<key_expr>[?<parameters>]`, split on the first `?`
/// after trimming surrounding whitespace. The parameters are carried to the
/// queryables verbatim; this library gives them no meaning of its own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    pub key_expr: OwnedKeyExpr,
    pub parameters: String,
}

impl Selector {
    pub fn parameters(&self) -> &str {
        &self.parameters
    }

    /// Returns a copy of `self` with the given parameters.
    pub fn with_parameters<P: Into<String>>(&self, parameters: P) -> Self {
        Selector {
            key_expr: self.key_expr.clone(),
            parameters: parameters.into(),
        }
    }

    /// Splits the selector back into its key expression and parameters.
    pub fn split(self) -> (OwnedKeyExpr, String) {
        (self.key_expr, self.parameters)
    }
}

impl TryFrom<&str> for Selector {
    type Error = crate::Error;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let value = value.trim();
        if value.is_empty() {
            bail!("Invalid selector ``: selectors must not be empty");
        }
        let (key_part, parameters) = match value.find('?') {
            Some(0) => bail!("Invalid selector `{}`: missing key expression", value),
            Some(i) => (&value[..i], &value[(i + 1)..]),
            None => (value, ""),
        };
        Ok(Selector {
            key_expr: OwnedKeyExpr::new(key_part)?,
            parameters: parameters.to_owned(),
        })
    }
}

impl TryFrom<String> for Selector {
    type Error = crate::Error;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl TryFrom<&String> for Selector {
    type Error = crate::Error;
    fn try_from(value: &String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<OwnedKeyExpr> for Selector {
    fn from(key_expr: OwnedKeyExpr) -> Self {
        Selector {
            key_expr,
            parameters: String::new(),
        }
    }
}

impl From<&keyexpr> for Selector {
    fn from(key_expr: &keyexpr) -> Self {
        OwnedKeyExpr::from(key_expr).into()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.parameters.is_empty() {
            write!(f, "{}", self.key_expr)
        } else {
            write!(f, "{}?{}", self.key_expr, self.parameters)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::TryFrom;

    #[test]
    fn selector_parsing() {
        let s = Selector::try_from("demo/example/**?arg=1").unwrap();
        assert_eq!(s.key_expr.as_str(), "demo/example/**");
        assert_eq!(s.parameters(), "arg=1");

        let s = Selector::try_from("demo/example").unwrap();
        assert_eq!(s.key_expr.as_str(), "demo/example");
        assert_eq!(s.parameters(), "");

        // Only the first `?` splits; the rest belongs to the parameters.
        let s = Selector::try_from("demo/**?a=1?b=2").unwrap();
        assert_eq!(s.parameters(), "a=1?b=2");

        // Surrounding whitespace is trimmed before parsing.
        let s = Selector::try_from("  demo/example?x  ").unwrap();
        assert_eq!(s.key_expr.as_str(), "demo/example");
        assert_eq!(s.parameters(), "x");

        assert!(Selector::try_from("").is_err());
        assert!(Selector::try_from("   ").is_err());
        assert!(Selector::try_from("?arg=1").is_err());
        assert!(Selector::try_from("demo/***?arg=1").is_err());
    }

    #[test]
    fn selector_display() {
        let s = Selector::try_from("demo/example?arg=1").unwrap();
        assert_eq!(s.to_string(), "demo/example?arg=1");
        let s = Selector::from(OwnedKeyExpr::new("demo/example").unwrap());
        assert_eq!(s.to_string(), "demo/example");
        assert_eq!(s.with_parameters("ok").to_string(), "demo/example?ok");
    }
}
