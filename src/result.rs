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

//! Error and result types used across the crate.

use std::fmt;

use anyhow::Error as AnyError;

/// The boxed error type carried by [`KResult`].
pub type Error = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The result type returned by all fallible operations of this crate.
pub type KResult<T> = std::result::Result<T, Error>;

/// An error remembering the site it was raised at and an optional cause.
///
/// `KError`s are built with the [`kerror!`](crate::kerror) macro, which fills
/// in `file!()` and `line!()`.
pub struct KError {
    error: AnyError,
    file: &'static str,
    line: u32,
    source: Option<Error>,
}

impl KError {
    pub fn new<E: Into<AnyError>>(error: E, file: &'static str, line: u32) -> KError {
        KError {
            error: error.into(),
            file,
            line,
            source: None,
        }
    }

    pub fn set_source<S: Into<Error>>(mut self, source: S) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl std::error::Error for KError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.source {
            Some(s) => Some(&**s),
            None => None,
        }
    }
}

impl fmt::Debug for KError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self, f)
    }
}

impl fmt::Display for KError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}:{}.", self.error, self.file, self.line)?;
        if let Some(s) = &self.source {
            write!(f, " - Caused by {}", *s)?;
        }
        Ok(())
    }
}

/// Builds a [`KError`] at the current source location.
#[macro_export]
macro_rules! kerror {
    ($source:expr => $($t:tt)*) => {
        $crate::result::KError::new($crate::anyhow!($($t)*), file!(), line!()).set_source($source)
    };
    ($t:literal) => {
        $crate::result::KError::new($crate::anyhow!($t), file!(), line!())
    };
    ($t:expr) => {
        $crate::result::KError::new($t, file!(), line!())
    };
    ($($t:tt)*) => {
        $crate::result::KError::new($crate::anyhow!($($t)*), file!(), line!())
    };
}

// This macro is a shorthand for an early return with a KError
#[macro_export]
macro_rules! bail {
    ($($t:tt)*) => {
        return Err($crate::kerror!($($t)*).into())
    };
}
