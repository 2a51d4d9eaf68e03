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
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, RwLock, Weak};
use std::time::{Duration, Instant};

use flume::Sender;
use log::error;
use uuid::Uuid;

use crate::collections::RingBuffer;
use crate::encoding::Encoding;
use crate::key_expr::keyexpr;
use crate::result::KResult;
use crate::session::Session;

pub use flume::{Iter, RecvError, RecvTimeoutError, TryIter, TryRecvError, TrySendError};

/// A timestamp from the session's hybrid logical clock.
pub use uhlc::Timestamp;

pub trait Receiver<T> {
    fn recv(&self) -> Result<T, RecvError>;

    fn try_recv(&self) -> Result<T, TryRecvError>;

    fn recv_timeout(&self, timeout: Duration) -> Result<T, RecvTimeoutError>;

    fn recv_deadline(&self, deadline: Instant) -> Result<T, RecvTimeoutError>;

    fn iter(&self) -> Iter<'_, T>;

    fn try_iter(&self) -> TryIter<'_, T>;
}

macro_rules! receiver{
    (
     $(#[$meta:meta])*
     $vis:vis struct $struct_name:ident : Receiver<$recv_type:ident> {}
    ) => {
        $(#[$meta])*
        $vis struct $struct_name {
            pub(crate) receiver: flume::Receiver<$recv_type>,
            pub(crate) stream: flume::r#async::RecvStream<'static, $recv_type>,
        }

        impl $struct_name {
            pub(crate) fn new(receiver: flume::Receiver<$recv_type>) -> Self {
                $struct_name {
                    receiver: receiver.clone(),
                    stream: receiver.into_stream(),
                }
            }
        }

        impl Receiver<$recv_type> for $struct_name {
            #[inline(always)]
            fn recv(&self) -> Result<$recv_type, flume::RecvError> {
                self.receiver.recv()
            }

            #[inline(always)]
            fn try_recv(&self) -> Result<$recv_type, flume::TryRecvError> {
                self.receiver.try_recv()
            }

            #[inline(always)]
            fn recv_timeout(
                &self,
                timeout: std::time::Duration,
            ) -> Result<$recv_type, flume::RecvTimeoutError> {
                self.receiver.recv_timeout(timeout)
            }

            #[inline(always)]
            fn recv_deadline(
                &self,
                deadline: std::time::Instant,
            ) -> Result<$recv_type, flume::RecvTimeoutError> {
                self.receiver.recv_deadline(deadline)
            }

            #[inline(always)]
            fn iter(&self) -> flume::Iter<'_, $recv_type> {
                self.receiver.iter()
            }

            #[inline(always)]
            fn try_iter(&self) -> flume::TryIter<'_, $recv_type> {
                self.receiver.try_iter()
            }
        }

        impl futures::stream::Stream for $struct_name {
            type Item = $recv_type;

            #[inline(always)]
            fn poll_next(
                self: std::pin::Pin<&mut Self>,
                cx: &mut std::task::Context<'_>,
            ) -> std::task::Poll<Option<Self::Item>> {
                futures::stream::Stream::poll_next(
                    std::pin::Pin::new(&mut self.get_mut().stream),
                    cx,
                )
            }
        }
    }
}

/// The identifier of a [Session](Session).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionId {
    bytes: Vec<u8>,
}

impl SessionId {
    pub(crate) fn rand() -> SessionId {
        SessionId {
            bytes: Uuid::new_v4().as_bytes().to_vec(),
        }
    }

    pub(crate) fn from_hex(s: &str) -> KResult<SessionId> {
        let bytes =
            hex::decode(s).map_err(|e| kerror!(e => "Invalid session id `{}`: not hex", s))?;
        if bytes.is_empty() {
            bail!("Invalid session id ``: ids must not be empty");
        }
        Ok(SessionId { bytes })
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode_upper(&self.bytes))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A payload and the encoding it should be interpreted with.
#[derive(Clone, PartialEq, Eq)]
pub struct Value {
    pub payload: Vec<u8>,
    pub encoding: Encoding,
}

impl Value {
    /// Builds a value with the default encoding, `application/octet-stream`.
    pub fn new(payload: Vec<u8>) -> Value {
        Value {
            payload,
            encoding: Encoding::default(),
        }
    }

    /// Returns a copy of `self` with the given encoding.
    pub fn encoding(mut self, encoding: Encoding) -> Value {
        self.encoding = encoding;
        self
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value {
            payload: s.as_bytes().to_vec(),
            encoding: Encoding::TEXT_PLAIN,
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value {
            payload: s.into_bytes(),
            encoding: Encoding::TEXT_PLAIN,
        }
    }
}

impl From<Vec<u8>> for Value {
    fn from(payload: Vec<u8>) -> Self {
        Value::new(payload)
    }
}

impl From<&[u8]> for Value {
    fn from(payload: &[u8]) -> Self {
        Value::new(payload.to_vec())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.payload))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Value{{ payload: '{}', encoding: {} }}",
            String::from_utf8_lossy(&self.payload),
            self.encoding
        )
    }
}

/// The kind of a [Sample](Sample): the publication it reflects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    Put,
    Delete,
}

impl Default for SampleKind {
    fn default() -> Self {
        SampleKind::Put
    }
}

impl fmt::Display for SampleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleKind::Put => write!(f, "PUT"),
            SampleKind::Delete => write!(f, "DELETE"),
        }
    }
}

/// The unit of data received by subscribers and carried by replies.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    /// The concrete key this sample was published on.
    pub key_expr: String,
    pub value: Value,
    pub kind: SampleKind,
    /// Set by the publishing session's hybrid logical clock.
    pub timestamp: Option<Timestamp>,
}

impl Sample {
    pub fn new<IntoValue>(key_expr: String, value: IntoValue) -> Self
    where
        IntoValue: Into<Value>,
    {
        Sample {
            key_expr,
            value: value.into(),
            kind: SampleKind::default(),
            timestamp: None,
        }
    }
}

/// The callback that will be called on each data for a [CallbackSubscriber](CallbackSubscriber).
pub type DataHandler = dyn FnMut(Sample) + Send + Sync + 'static;

/// Structs received by a [Queryable](Queryable).
pub struct Query {
    pub key_expr: String,
    pub parameters: String,
    pub replies_sender: RepliesSender,
}

impl Query {
    #[inline(always)]
    pub fn reply(&'_ self, msg: Sample) {
        self.replies_sender.send(msg)
    }

    #[inline(always)]
    pub fn try_reply(&self, msg: Sample) -> Result<(), TrySendError<Sample>> {
        self.replies_sender.try_send(msg)
    }

    #[inline(always)]
    pub async fn reply_async(&'_ self, msg: Sample) {
        self.replies_sender.send_async(msg).await
    }

    /// Replies to the query with an application error value.
    #[inline(always)]
    pub fn reply_err(&self, value: Value) {
        self.replies_sender.send_err(value)
    }

    #[inline(always)]
    pub async fn reply_err_async(&self, value: Value) {
        self.replies_sender.send_err_async(value).await
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Query{{ key_expr: '{}', parameters: '{}' }}",
            self.key_expr, self.parameters
        )
    }
}

/// Struct used by a [Queryable](Queryable) to send replies to queries.
#[derive(Clone)]
pub struct RepliesSender {
    pub(crate) sender: Sender<Result<Sample, Value>>,
}

impl RepliesSender {
    #[inline(always)]
    pub fn send(&'_ self, msg: Sample) {
        if let Err(e) = self.sender.send(Ok(msg)) {
            error!("Error sending reply: {}", e);
        }
    }

    #[inline(always)]
    pub fn try_send(&self, msg: Sample) -> Result<(), TrySendError<Sample>> {
        match self.sender.try_send(Ok(msg)) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(Ok(msg))) => Err(TrySendError::Full(msg)),
            Err(TrySendError::Disconnected(Ok(msg))) => Err(TrySendError::Disconnected(msg)),
            // try_send hands back the value it was given, an Ok above
            Err(TrySendError::Full(Err(_))) | Err(TrySendError::Disconnected(Err(_))) => {
                unreachable!()
            }
        }
    }

    #[inline(always)]
    pub async fn send_async(&self, msg: Sample) {
        if let Err(e) = self.sender.send_async(Ok(msg)).await {
            error!("Error sending reply: {}", e);
        }
    }

    #[inline(always)]
    pub fn send_err(&self, value: Value) {
        if let Err(e) = self.sender.send(Err(value)) {
            error!("Error sending error reply: {}", e);
        }
    }

    #[inline(always)]
    pub async fn send_err_async(&self, value: Value) {
        if let Err(e) = self.sender.send_async(Err(value)).await {
            error!("Error sending error reply: {}", e);
        }
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.sender.capacity().unwrap_or(0)
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.sender.is_empty()
    }

    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.sender.is_full()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.sender.len()
    }
}

/// Structs returned by a [get](Session::get).
#[derive(Clone, Debug)]
pub struct Reply {
    /// The reply content: a sample from the queryable, or an application
    /// error value.
    pub result: Result<Sample, Value>,
    pub replier_id: SessionId,
}

receiver! {
    #[derive(Clone)]
    pub struct ReplyReceiver : Receiver<Reply> {}
}

pub(crate) struct QueryState {
    pub(crate) nb_final: usize,
    pub(crate) reception_mode: ConsolidationMode,
    pub(crate) replies: Option<HashMap<String, Reply>>,
    pub(crate) rep_sender: Sender<Reply>,
}

/// The queryables that should receive a [get](Session::get).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryTarget {
    /// Prefer complete queryables whose key covers the queried one, fall back
    /// to every intersecting queryable.
    BestMatching,
    All,
    AllComplete,
}

impl Default for QueryTarget {
    fn default() -> Self {
        QueryTarget::BestMatching
    }
}

/// The consolidation applied to replies of a [get](Session::get).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsolidationMode {
    /// Let the session pick; currently resolves to `Latest`.
    Auto,
    /// Forward every reply as it arrives.
    None,
    /// Forward a reply only if its timestamp is more recent than every reply
    /// already forwarded for the same key.
    Monotonic,
    /// Hold back replies until all queryables answered, keep the most recent
    /// one per key.
    Latest,
}

impl Default for ConsolidationMode {
    fn default() -> Self {
        ConsolidationMode::Auto
    }
}

/// Whether a [Publisher](Publisher) currently has intersecting subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchingStatus {
    pub(crate) matching: bool,
}

impl MatchingStatus {
    pub fn matching_subscribers(&self) -> bool {
        self.matching
    }
}

pub(crate) type Id = usize;

#[derive(Debug)]
pub(crate) struct PublisherState {
    pub(crate) id: Id,
    pub(crate) key_expr: String,
}

/// A publisher.
///
/// Publishers are automatically undeclared when dropped.
pub struct Publisher<'a> {
    pub(crate) session: &'a Session,
    pub(crate) state: Arc<PublisherState>,
    pub(crate) alive: bool,
}

impl Publisher<'_> {
    /// The key expression this publisher writes on, in canonical form.
    pub fn key_expr(&self) -> &keyexpr {
        // Declaration only stores validated canonical keys.
        unsafe { keyexpr::from_str_unchecked(&self.state.key_expr) }
    }

    /// Publish a value on this publisher's key expression.
    ///
    /// # Examples
    /// ```
    /// # async_std::task::block_on(async {
    /// use keybus::*;
    ///
    /// let session = open(Config::default()).unwrap();
    /// let publisher = session
    ///     .declare_publisher(keyexpr::new("demo/example").unwrap())
    ///     .unwrap();
    /// publisher.put("value".into()).await.unwrap();
    /// # })
    /// ```
    pub async fn put(&self, value: Value) -> KResult<()> {
        self.session.put(self.key_expr(), value).await
    }

    /// Publish a deletion on this publisher's key expression.
    pub async fn delete(&self) -> KResult<()> {
        self.session.delete(self.key_expr()).await
    }

    /// Returns whether at least one subscriber intersects this publisher's
    /// key expression.
    pub fn matching_status(&self) -> MatchingStatus {
        self.session.matching_status(self.key_expr())
    }

    /// Undeclare a [Publisher](Publisher) previously declared with [declare_publisher](Session::declare_publisher).
    ///
    /// Publishers are automatically undeclared when dropped, but you may want
    /// to use this function to handle errors.
    #[inline]
    pub fn undeclare(mut self) -> KResult<()> {
        self.alive = false;
        self.session.undeclare_publisher(self.state.id)
    }
}

impl Drop for Publisher<'_> {
    fn drop(&mut self) {
        if self.alive {
            let _ = self.session.undeclare_publisher(self.state.id);
        }
    }
}

impl fmt::Debug for Publisher<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.state.fmt(f)
    }
}

pub(crate) struct RingState {
    pub(crate) ring: Mutex<RingBuffer<Sample>>,
    pub(crate) not_empty: Sender<()>,
}

pub(crate) enum SubscriberInvoker {
    Sender(Sender<Sample>),
    Handler(Arc<RwLock<DataHandler>>),
    Ring(Arc<RingState>),
}

pub(crate) struct SubscriberState {
    pub(crate) id: Id,
    pub(crate) key_expr: String,
    pub(crate) invoker: SubscriberInvoker,
}

impl fmt::Debug for SubscriberState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Subscriber{{ id:{}, key_expr:{} }}",
            self.id, self.key_expr
        )
    }
}

receiver! {
    #[derive(Clone)]
    pub struct SampleReceiver : Receiver<Sample> {}
}

/// A subscriber that provides data through a stream.
///
/// Subscribers are automatically undeclared when dropped.
pub struct Subscriber<'a> {
    pub(crate) session: &'a Session,
    pub(crate) state: Arc<SubscriberState>,
    pub(crate) alive: bool,
    pub(crate) receiver: SampleReceiver,
}

impl Subscriber<'_> {
    /// Access the sample stream of this subscriber.
    ///
    /// # Examples
    /// ```
    /// # async_std::task::block_on(async {
    /// use keybus::*;
    /// use futures::prelude::*;
    ///
    /// let session = open(Config::default()).unwrap();
    /// let key = keyexpr::new("demo/example").unwrap();
    /// let mut subscriber = session.declare_subscriber(key).unwrap();
    /// session.put(key, "value".into()).await.unwrap();
    /// if let Some(sample) = subscriber.receiver().next().await {
    ///     println!("Received : {:?}", sample);
    /// }
    /// # })
    /// ```
    pub fn receiver(&mut self) -> &mut SampleReceiver {
        &mut self.receiver
    }

    /// The key expression this subscriber listens on, in canonical form.
    pub fn key_expr(&self) -> &keyexpr {
        // Declaration only stores validated canonical keys.
        unsafe { keyexpr::from_str_unchecked(&self.state.key_expr) }
    }

    /// Undeclare a [Subscriber](Subscriber) previously declared with [declare_subscriber](Session::declare_subscriber).
    ///
    /// Subscribers are automatically undeclared when dropped, but you may want
    /// to use this function to handle errors.
    #[inline]
    pub fn undeclare(mut self) -> KResult<()> {
        self.alive = false;
        self.session.undeclare_subscriber(self.state.id)
    }
}

impl Drop for Subscriber<'_> {
    fn drop(&mut self) {
        if self.alive {
            let _ = self.session.undeclare_subscriber(self.state.id);
        }
    }
}

impl fmt::Debug for Subscriber<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.state.fmt(f)
    }
}

/// A subscriber that provides data through a callback.
///
/// Subscribers are automatically undeclared when dropped.
pub struct CallbackSubscriber<'a> {
    pub(crate) session: &'a Session,
    pub(crate) state: Arc<SubscriberState>,
    pub(crate) alive: bool,
}

impl CallbackSubscriber<'_> {
    /// The key expression this subscriber listens on, in canonical form.
    pub fn key_expr(&self) -> &keyexpr {
        // Declaration only stores validated canonical keys.
        unsafe { keyexpr::from_str_unchecked(&self.state.key_expr) }
    }

    /// Undeclare a [CallbackSubscriber](CallbackSubscriber) previously declared with
    /// [declare_callback_subscriber](Session::declare_callback_subscriber).
    ///
    /// CallbackSubscribers are automatically undeclared when dropped, but you
    /// may want to use this function to handle errors.
    #[inline]
    pub fn undeclare(mut self) -> KResult<()> {
        self.alive = false;
        self.session.undeclare_subscriber(self.state.id)
    }
}

impl Drop for CallbackSubscriber<'_> {
    fn drop(&mut self) {
        if self.alive {
            let _ = self.session.undeclare_subscriber(self.state.id);
        }
    }
}

impl fmt::Debug for CallbackSubscriber<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.state.fmt(f)
    }
}

/// A subscriber that keeps the most recent samples in a bounded ring,
/// dropping the oldest ones when it overflows.
///
/// Subscribers are automatically undeclared when dropped.
pub struct RingSubscriber<'a> {
    pub(crate) session: &'a Session,
    pub(crate) state: Arc<SubscriberState>,
    pub(crate) ring: Weak<RingState>,
    pub(crate) not_empty: flume::Receiver<()>,
    pub(crate) alive: bool,
}

impl RingSubscriber<'_> {
    /// The key expression this subscriber listens on, in canonical form.
    pub fn key_expr(&self) -> &keyexpr {
        // Declaration only stores validated canonical keys.
        unsafe { keyexpr::from_str_unchecked(&self.state.key_expr) }
    }

    /// Pulls the oldest buffered sample, if any.
    pub fn try_recv(&self) -> KResult<Option<Sample>> {
        let ring = match self.ring.upgrade() {
            Some(ring) => ring,
            None => bail!("Ring subscriber dropped by the session"),
        };
        let sample = klock!(ring.ring).pull();
        Ok(sample)
    }

    /// Pulls the oldest buffered sample, blocking until one is available.
    pub fn recv(&self) -> KResult<Sample> {
        loop {
            if let Some(sample) = self.try_recv()? {
                return Ok(sample);
            }
            if self.not_empty.recv().is_err() {
                bail!("Ring subscriber dropped by the session");
            }
        }
    }

    /// Pulls the oldest buffered sample, awaiting one if the ring is empty.
    pub async fn recv_async(&self) -> KResult<Sample> {
        loop {
            if let Some(sample) = self.try_recv()? {
                return Ok(sample);
            }
            if self.not_empty.recv_async().await.is_err() {
                bail!("Ring subscriber dropped by the session");
            }
        }
    }

    /// Undeclare a [RingSubscriber](RingSubscriber) previously declared with
    /// [declare_ring_subscriber](Session::declare_ring_subscriber).
    ///
    /// Subscribers are automatically undeclared when dropped, but you may want
    /// to use this function to handle errors.
    #[inline]
    pub fn undeclare(mut self) -> KResult<()> {
        self.alive = false;
        self.session.undeclare_subscriber(self.state.id)
    }
}

impl Drop for RingSubscriber<'_> {
    fn drop(&mut self) {
        if self.alive {
            let _ = self.session.undeclare_subscriber(self.state.id);
        }
    }
}

impl fmt::Debug for RingSubscriber<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.state.fmt(f)
    }
}

pub(crate) struct QueryableState {
    pub(crate) id: Id,
    pub(crate) key_expr: String,
    pub(crate) complete: bool,
    pub(crate) sender: Sender<Query>,
}

impl fmt::Debug for QueryableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Queryable{{ id:{}, key_expr:{}, complete:{} }}",
            self.id, self.key_expr, self.complete
        )
    }
}

receiver! {
    #[derive(Clone)]
    pub struct QueryReceiver : Receiver<Query> {}
}

/// An entity able to reply to queries.
///
/// Queryables are automatically undeclared when dropped.
pub struct Queryable<'a> {
    pub(crate) session: &'a Session,
    pub(crate) state: Arc<QueryableState>,
    pub(crate) alive: bool,
    pub(crate) receiver: QueryReceiver,
}

impl Queryable<'_> {
    /// Access the query stream of this queryable.
    ///
    /// # Examples
    /// ```
    /// # async_std::task::block_on(async {
    /// use keybus::*;
    /// use futures::prelude::*;
    ///
    /// let session = open(Config::default()).unwrap();
    /// let mut queryable = session
    ///     .declare_queryable(keyexpr::new("demo/example").unwrap(), true)
    ///     .unwrap();
    /// async_std::task::spawn(queryable.receiver().clone().for_each(|query| async move {
    ///     query.reply_async(Sample::new("demo/example".into(), "value")).await;
    /// }));
    /// # })
    /// ```
    pub fn receiver(&mut self) -> &mut QueryReceiver {
        &mut self.receiver
    }

    /// The key expression this queryable answers on, in canonical form.
    pub fn key_expr(&self) -> &keyexpr {
        // Declaration only stores validated canonical keys.
        unsafe { keyexpr::from_str_unchecked(&self.state.key_expr) }
    }

    /// Undeclare a [Queryable](Queryable) previously declared with [declare_queryable](Session::declare_queryable).
    ///
    /// Queryables are automatically undeclared when dropped, but you may want
    /// to use this function to handle errors.
    #[inline]
    pub fn undeclare(mut self) -> KResult<()> {
        self.alive = false;
        self.session.undeclare_queryable(self.state.id)
    }
}

impl Drop for Queryable<'_> {
    fn drop(&mut self) {
        if self.alive {
            let _ = self.session.undeclare_queryable(self.state.id);
        }
    }
}

impl fmt::Debug for Queryable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.state.fmt(f)
    }
}
