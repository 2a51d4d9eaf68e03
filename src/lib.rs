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

//! An in-process publish/subscribe and query bus addressed by key
//! expressions.
//!
//! See the [Session] struct for details, and the [key_expr] module for the
//! key expression algebra it dispatches with.
//!
//! # Quick start examples
//!
//! ### Put a key/value onto the bus
//! ```
//! use keybus::*;
//!
//! #[async_std::main]
//! async fn main() {
//!     let session = open(Config::default()).unwrap();
//!     session.put(
//!         keyexpr::new("demo/example/hello").unwrap(),
//!         "Hello World!".into()
//!     ).await.unwrap();
//!     session.close().unwrap();
//! }
//! ```
//!
//! ### Subscribe to key/value changes
//! ```no_run
//! use keybus::*;
//! use futures::prelude::*;
//!
//! #[async_std::main]
//! async fn main() {
//!     let session = open(Config::default()).unwrap();
//!     let mut subscriber = session
//!         .declare_subscriber(keyexpr::new("demo/example/**").unwrap())
//!         .unwrap();
//!     while let Some(sample) = subscriber.receiver().next().await {
//!         println!(">> {} : {} at {:?}",
//!             sample.key_expr, sample.value, sample.timestamp
//!         )
//!     }
//!     subscriber.undeclare().unwrap();
//!     session.close().unwrap();
//! }
//! ```
//!
//! ### Get keys/values from the bus
//! ```
//! use keybus::*;
//! use futures::prelude::*;
//!
//! #[async_std::main]
//! async fn main() {
//!     let session = open(Config::default()).unwrap();
//!     let mut replies = session
//!         .get("demo/example/**", QueryTarget::default(), ConsolidationMode::default())
//!         .await
//!         .unwrap();
//!     while let Some(reply) = replies.next().await {
//!         match reply.result {
//!             Ok(sample) => println!(">> {} : {}", sample.key_expr, sample.value),
//!             Err(value) => println!(">> ERROR : {}", value),
//!         }
//!     }
//!     session.close().unwrap();
//! }
//! ```
#[macro_use]
extern crate lazy_static;

use log::debug;

pub use anyhow::anyhow;

#[macro_use]
pub mod result;
#[macro_use]
mod macros;

pub mod collections;
pub mod key_expr;

mod config;
pub use config::Config;
mod encoding;
pub use encoding::Encoding;
mod selector;
pub use selector::Selector;
mod types;
pub use types::*;
mod session;
pub use session::*;

pub use key_expr::{keyexpr, OwnedKeyExpr};
pub use result::{Error, KResult};

/// Open a keybus [Session](Session).
///
/// # Examples
/// ```
/// use keybus::*;
///
/// let session = open(Config::default()).unwrap();
/// ```
pub fn open(config: Config) -> KResult<Session> {
    debug!("open({:?})", config);
    Session::new(config)
}
