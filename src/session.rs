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
use std::convert::TryInto;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_std::task;
use flume::{bounded, Sender};
use futures::StreamExt;
use log::{error, trace};
use uhlc::HLC;

use crate::collections::RingBuffer;
use crate::config::Config;
use crate::key_expr::{self, keyexpr};
use crate::result::KResult;
use crate::selector::Selector;
use crate::types::*;

pub(crate) struct SessionState {
    pub(crate) qid_counter: AtomicU64,
    pub(crate) decl_id_counter: AtomicUsize,
    pub(crate) publishers: HashMap<Id, Arc<PublisherState>>,
    pub(crate) subscribers: HashMap<Id, Arc<SubscriberState>>,
    pub(crate) queryables: HashMap<Id, Arc<QueryableState>>,
    pub(crate) queries: HashMap<u64, QueryState>,
    pub(crate) closed: bool,
}

impl SessionState {
    pub(crate) fn new() -> SessionState {
        SessionState {
            qid_counter: AtomicU64::new(0),
            decl_id_counter: AtomicUsize::new(0),
            publishers: HashMap::new(),
            subscribers: HashMap::new(),
            queryables: HashMap::new(),
            queries: HashMap::new(),
            closed: false,
        }
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SessionState{{ publishers: {}, subscribers: {}, queryables: {}, queries: {} }}",
            self.publishers.len(),
            self.subscribers.len(),
            self.queryables.len(),
            self.queries.len()
        )
    }
}

/// Returns the canonical form of `key_expr`, the form registries and dispatch
/// work on.
fn canonical_key(key_expr: &keyexpr) -> KResult<String> {
    let key = key_expr::canonize(key_expr.as_str())?;
    if key.is_empty() {
        bail!(
            "Invalid key expression `{}`: canonizes to the empty expression",
            key_expr
        );
    }
    Ok(key)
}

fn timestamp_of(reply: &Reply) -> Option<Timestamp> {
    match &reply.result {
        Ok(sample) => sample.timestamp.clone(),
        Err(_) => None,
    }
}

/// An in-process bus connecting publishers, subscribers and queryables
/// through the key expression algebra.
///
/// Sessions are cheap to share: every handle declared on a session borrows
/// it, and dropping the session undeclares whatever is left.
pub struct Session {
    pub(crate) id: SessionId,
    pub(crate) config: Config,
    pub(crate) hlc: Arc<HLC>,
    pub(crate) state: Arc<RwLock<SessionState>>,
    pub(crate) alive: bool,
}

impl Session {
    // Returns an internal handle on the same session that will not close it
    // on drop.
    pub(crate) fn clone(&self) -> Self {
        Session {
            id: self.id.clone(),
            config: self.config.clone(),
            hlc: self.hlc.clone(),
            state: self.state.clone(),
            alive: false,
        }
    }

    pub(crate) fn new(config: Config) -> KResult<Session> {
        let id = match &config.id {
            Some(hex) => SessionId::from_hex(hex)?,
            None => SessionId::rand(),
        };
        trace!("Session::new({})", id);
        Ok(Session {
            id,
            config,
            hlc: Arc::new(HLC::default()),
            state: Arc::new(RwLock::new(SessionState::new())),
            alive: true,
        })
    }

    /// The identifier of this session.
    pub fn id(&self) -> SessionId {
        self.id.clone()
    }

    /// The configuration this session was opened with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Close the session.
    ///
    /// Every remaining declaration is dropped: subscriber and queryable
    /// streams end, ring subscribers error on the next pull, pending
    /// reply streams are closed. Sessions are closed on drop as well, but you
    /// may want to use this function to handle errors.
    ///
    /// # Examples
    /// ```
    /// use keybus::*;
    ///
    /// let session = open(Config::default()).unwrap();
    /// session.close().unwrap();
    /// ```
    pub fn close(mut self) -> KResult<()> {
        self.alive = false;
        self.close_alive()
    }

    pub(crate) fn close_alive(&self) -> KResult<()> {
        trace!("close()");
        let mut state = kwrite!(self.state);
        state.closed = true;
        state.publishers.clear();
        state.subscribers.clear();
        state.queryables.clear();
        // Dropping the query states drops their reply senders, which ends
        // the corresponding reply streams.
        state.queries.clear();
        Ok(())
    }

    /// Declare a [Publisher](Publisher) on the given key expression.
    ///
    /// Publishing does not require a declared publisher ([put](Session::put)
    /// works on its own); the handle gives a stable canonical key and access
    /// to the [matching status](Publisher::matching_status).
    ///
    /// # Examples
    /// ```
    /// use keybus::*;
    ///
    /// let session = open(Config::default()).unwrap();
    /// let publisher = session
    ///     .declare_publisher(keyexpr::new("demo/example").unwrap())
    ///     .unwrap();
    /// ```
    pub fn declare_publisher(&self, key_expr: &keyexpr) -> KResult<Publisher<'_>> {
        trace!("declare_publisher({:?})", key_expr);
        let key = canonical_key(key_expr)?;
        let mut state = kwrite!(self.state);
        if state.closed {
            bail!("Unable to declare_publisher: the session is closed");
        }
        let id = state.decl_id_counter.fetch_add(1, Ordering::SeqCst);
        let pub_state = Arc::new(PublisherState { id, key_expr: key });
        state.publishers.insert(id, pub_state.clone());
        Ok(Publisher {
            session: self,
            state: pub_state,
            alive: true,
        })
    }

    pub(crate) fn undeclare_publisher(&self, pid: Id) -> KResult<()> {
        trace!("undeclare_publisher({:?})", pid);
        let mut state = kwrite!(self.state);
        state.publishers.remove(&pid);
        Ok(())
    }

    /// Declare a [Subscriber](Subscriber) receiving samples through a
    /// bounded channel.
    ///
    /// The subscriber receives every sample put on a key expression that
    /// intersects its own.
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
    pub fn declare_subscriber(&self, key_expr: &keyexpr) -> KResult<Subscriber<'_>> {
        trace!("declare_subscriber({:?})", key_expr);
        let key = canonical_key(key_expr)?;
        let (sender, receiver) = bounded(self.config.data_reception_channel_size);
        let mut state = kwrite!(self.state);
        if state.closed {
            bail!("Unable to declare_subscriber: the session is closed");
        }
        let id = state.decl_id_counter.fetch_add(1, Ordering::SeqCst);
        let sub_state = Arc::new(SubscriberState {
            id,
            key_expr: key,
            invoker: SubscriberInvoker::Sender(sender),
        });
        state.subscribers.insert(id, sub_state.clone());
        Ok(Subscriber {
            session: self,
            state: sub_state,
            alive: true,
            receiver: SampleReceiver::new(receiver),
        })
    }

    /// Declare a [CallbackSubscriber](CallbackSubscriber) invoking the given
    /// closure on each matching sample.
    ///
    /// The closure is invoked on the publishing task, before channel
    /// subscribers are fed.
    ///
    /// # Examples
    /// ```
    /// use keybus::*;
    ///
    /// let session = open(Config::default()).unwrap();
    /// let subscriber = session
    ///     .declare_callback_subscriber(keyexpr::new("demo/example").unwrap(), |sample| {
    ///         println!("Received : {:?}", sample);
    ///     })
    ///     .unwrap();
    /// ```
    pub fn declare_callback_subscriber<DataHandler>(
        &self,
        key_expr: &keyexpr,
        data_handler: DataHandler,
    ) -> KResult<CallbackSubscriber<'_>>
    where
        DataHandler: FnMut(Sample) + Send + Sync + 'static,
    {
        trace!("declare_callback_subscriber({:?})", key_expr);
        let key = canonical_key(key_expr)?;
        let dhandler = Arc::new(RwLock::new(data_handler));
        let mut state = kwrite!(self.state);
        if state.closed {
            bail!("Unable to declare_callback_subscriber: the session is closed");
        }
        let id = state.decl_id_counter.fetch_add(1, Ordering::SeqCst);
        let sub_state = Arc::new(SubscriberState {
            id,
            key_expr: key,
            invoker: SubscriberInvoker::Handler(dhandler),
        });
        state.subscribers.insert(id, sub_state.clone());
        Ok(CallbackSubscriber {
            session: self,
            state: sub_state,
            alive: true,
        })
    }

    /// Declare a [RingSubscriber](RingSubscriber) keeping the newest
    /// `capacity` matching samples.
    ///
    /// Unlike channel subscribers, a slow ring subscriber never blocks
    /// publishers: when the ring is full the oldest sample is dropped. A
    /// `capacity` of 0 is treated as 1.
    ///
    /// # Examples
    /// ```
    /// # async_std::task::block_on(async {
    /// use keybus::*;
    ///
    /// let session = open(Config::default()).unwrap();
    /// let key = keyexpr::new("demo/example").unwrap();
    /// let subscriber = session.declare_ring_subscriber(key, 8).unwrap();
    /// session.put(key, "value".into()).await.unwrap();
    /// let sample = subscriber.recv_async().await.unwrap();
    /// println!("Received : {:?}", sample);
    /// # })
    /// ```
    pub fn declare_ring_subscriber(
        &self,
        key_expr: &keyexpr,
        capacity: usize,
    ) -> KResult<RingSubscriber<'_>> {
        trace!("declare_ring_subscriber({:?}, {})", key_expr, capacity);
        let key = canonical_key(key_expr)?;
        let (not_empty_sender, not_empty_receiver) = bounded(1);
        let ring = Arc::new(RingState {
            ring: Mutex::new(RingBuffer::new(capacity.max(1))),
            not_empty: not_empty_sender,
        });
        let mut state = kwrite!(self.state);
        if state.closed {
            bail!("Unable to declare_ring_subscriber: the session is closed");
        }
        let id = state.decl_id_counter.fetch_add(1, Ordering::SeqCst);
        let sub_state = Arc::new(SubscriberState {
            id,
            key_expr: key,
            invoker: SubscriberInvoker::Ring(ring.clone()),
        });
        state.subscribers.insert(id, sub_state.clone());
        Ok(RingSubscriber {
            session: self,
            state: sub_state,
            ring: Arc::downgrade(&ring),
            not_empty: not_empty_receiver,
            alive: true,
        })
    }

    pub(crate) fn undeclare_subscriber(&self, sid: Id) -> KResult<()> {
        trace!("undeclare_subscriber({:?})", sid);
        let mut state = kwrite!(self.state);
        state.subscribers.remove(&sid);
        Ok(())
    }

    /// Declare a [Queryable](Queryable) answering [get](Session::get)s whose
    /// selector intersects the given key expression.
    ///
    /// `complete` advertises that this queryable holds the complete data set
    /// for its key expression; [get](Session::get) uses it to route
    /// `BestMatching` and `AllComplete` queries.
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
    pub fn declare_queryable(&self, key_expr: &keyexpr, complete: bool) -> KResult<Queryable<'_>> {
        trace!("declare_queryable({:?}, {})", key_expr, complete);
        let key = canonical_key(key_expr)?;
        let (sender, receiver) = bounded(self.config.query_reception_channel_size);
        let mut state = kwrite!(self.state);
        if state.closed {
            bail!("Unable to declare_queryable: the session is closed");
        }
        let id = state.decl_id_counter.fetch_add(1, Ordering::SeqCst);
        let qable_state = Arc::new(QueryableState {
            id,
            key_expr: key,
            complete,
            sender,
        });
        state.queryables.insert(id, qable_state.clone());
        Ok(Queryable {
            session: self,
            state: qable_state,
            alive: true,
            receiver: QueryReceiver::new(receiver),
        })
    }

    pub(crate) fn undeclare_queryable(&self, qid: Id) -> KResult<()> {
        trace!("undeclare_queryable({:?})", qid);
        let mut state = kwrite!(self.state);
        state.queryables.remove(&qid);
        Ok(())
    }

    /// Publish a value on the given key expression.
    ///
    /// The sample is stamped with this session's clock and delivered to every
    /// subscriber whose key expression intersects the published one.
    /// Publishing with no matching subscriber is not an error.
    ///
    /// # Examples
    /// ```
    /// # async_std::task::block_on(async {
    /// use keybus::*;
    ///
    /// let session = open(Config::default()).unwrap();
    /// session
    ///     .put(keyexpr::new("demo/example").unwrap(), "value".into())
    ///     .await
    ///     .unwrap();
    /// # })
    /// ```
    pub async fn put(&self, key_expr: &keyexpr, value: Value) -> KResult<()> {
        trace!("put({:?})", key_expr);
        self.handle_data(key_expr, value, SampleKind::Put).await
    }

    /// Publish a deletion on the given key expression.
    ///
    /// Subscribers receive a sample with an empty payload and
    /// [SampleKind::Delete](SampleKind::Delete).
    pub async fn delete(&self, key_expr: &keyexpr) -> KResult<()> {
        trace!("delete({:?})", key_expr);
        self.handle_data(key_expr, Value::new(Vec::new()), SampleKind::Delete)
            .await
    }

    async fn handle_data(&self, key_expr: &keyexpr, value: Value, kind: SampleKind) -> KResult<()> {
        let key = canonical_key(key_expr)?;
        let timestamp = self.hlc.new_timestamp();
        let (senders, rings) = {
            let state = kread!(self.state);
            if state.closed {
                bail!("Unable to publish on `{}`: the session is closed", key);
            }
            let mut senders = Vec::new();
            let mut rings = Vec::new();
            for sub in state.subscribers.values() {
                if key_expr::intersects(&sub.key_expr, &key) {
                    match &sub.invoker {
                        SubscriberInvoker::Handler(handler) => {
                            let handler = &mut *kwrite!(handler);
                            handler(Sample {
                                key_expr: key.clone(),
                                value: value.clone(),
                                kind,
                                timestamp: Some(timestamp.clone()),
                            });
                        }
                        SubscriberInvoker::Sender(sender) => {
                            senders.push(sender.clone());
                        }
                        SubscriberInvoker::Ring(ring) => {
                            rings.push(ring.clone());
                        }
                    }
                }
            }
            (senders, rings)
        };
        let sample = Sample {
            key_expr: key,
            value,
            kind,
            timestamp: Some(timestamp),
        };
        for ring in rings {
            if klock!(ring.ring).push_force(sample.clone()).is_some() {
                trace!("Ring subscriber overflow on {}", sample.key_expr);
            }
            // A full signal channel means a wakeup is already pending.
            let _ = ring.not_empty.try_send(());
        }
        for sender in senders {
            if let Err(e) = sender.send_async(sample.clone()).await {
                error!("Error sending sample: {}", e);
            }
        }
        Ok(())
    }

    pub(crate) fn matching_status(&self, key_expr: &keyexpr) -> MatchingStatus {
        let state = kread!(self.state);
        let matching = !state.closed
            && state
                .subscribers
                .values()
                .any(|sub| key_expr::intersects(&sub.key_expr, key_expr.as_str()));
        MatchingStatus { matching }
    }

    /// Query the queryables matching the given selector.
    ///
    /// Replies are delivered through the returned [ReplyReceiver](ReplyReceiver)
    /// after the chosen `consolidation` is applied; the stream ends once every
    /// targeted queryable has replied or dropped its query.
    ///
    /// # Examples
    /// ```
    /// # async_std::task::block_on(async {
    /// use keybus::*;
    /// use futures::prelude::*;
    ///
    /// let session = open(Config::default()).unwrap();
    /// let mut replies = session
    ///     .get("demo/example/**", QueryTarget::default(), ConsolidationMode::default())
    ///     .await
    ///     .unwrap();
    /// while let Some(reply) = replies.next().await {
    ///     println!("Received : {:?}", reply);
    /// }
    /// # })
    /// ```
    pub async fn get<IntoSelector>(
        &self,
        selector: IntoSelector,
        target: QueryTarget,
        consolidation: ConsolidationMode,
    ) -> KResult<ReplyReceiver>
    where
        IntoSelector: TryInto<Selector>,
        IntoSelector::Error: Into<crate::Error>,
    {
        let selector = selector.try_into().map_err(Into::into)?;
        trace!("get({}, {:?}, {:?})", selector, target, consolidation);
        let key = canonical_key(&selector.key_expr)?;
        let reception_mode = match consolidation {
            ConsolidationMode::Auto => ConsolidationMode::Latest,
            mode => mode,
        };
        let (rep_sender, rep_receiver) = bounded(self.config.reply_reception_channel_size);
        let (em_sender, em_receiver) = bounded(self.config.reply_emission_channel_size);
        let qid;
        let targets;
        {
            let mut state = kwrite!(self.state);
            if state.closed {
                bail!("Unable to get `{}`: the session is closed", selector);
            }
            qid = state.qid_counter.fetch_add(1, Ordering::SeqCst);
            targets = Session::target_queryables(&state, &key, target);
            state.queries.insert(
                qid,
                QueryState {
                    nb_final: 1,
                    reception_mode,
                    replies: if reception_mode == ConsolidationMode::None {
                        None
                    } else {
                        Some(HashMap::new())
                    },
                    rep_sender,
                },
            );
        }
        for sender in targets {
            let query = Query {
                key_expr: key.clone(),
                parameters: selector.parameters.clone(),
                replies_sender: RepliesSender {
                    sender: em_sender.clone(),
                },
            };
            if let Err(e) = sender.send_async(query).await {
                error!("Error sending query: {}", e);
            }
        }
        // All the emission senders need to be dropped for the channel to
        // close; the clones above live in the Query structs.
        drop(em_sender);
        let session = self.clone();
        task::spawn(async move {
            while let Ok(result) = em_receiver.recv_async().await {
                session.handle_reply_data(qid, result).await;
            }
            session.handle_reply_final(qid).await;
        });
        Ok(ReplyReceiver::new(rep_receiver))
    }

    /// Query the queryables matching the given selector, invoking the given
    /// closure on each consolidated reply.
    pub async fn get_callback<IntoSelector, ReplyHandler>(
        &self,
        selector: IntoSelector,
        target: QueryTarget,
        consolidation: ConsolidationMode,
        mut handler: ReplyHandler,
    ) -> KResult<()>
    where
        IntoSelector: TryInto<Selector>,
        IntoSelector::Error: Into<crate::Error>,
        ReplyHandler: FnMut(Reply) + Send + 'static,
    {
        let mut receiver = self.get(selector, target, consolidation).await?;
        task::spawn(async move {
            while let Some(reply) = receiver.next().await {
                handler(reply);
            }
        });
        Ok(())
    }

    fn target_queryables(
        state: &SessionState,
        key: &str,
        target: QueryTarget,
    ) -> Vec<Sender<Query>> {
        match target {
            QueryTarget::BestMatching => {
                let complete: Vec<_> = state
                    .queryables
                    .values()
                    .filter(|q| q.complete && key_expr::includes(&q.key_expr, key))
                    .map(|q| q.sender.clone())
                    .collect();
                if complete.is_empty() {
                    state
                        .queryables
                        .values()
                        .filter(|q| key_expr::intersects(&q.key_expr, key))
                        .map(|q| q.sender.clone())
                        .collect()
                } else {
                    complete
                }
            }
            QueryTarget::All => state
                .queryables
                .values()
                .filter(|q| key_expr::intersects(&q.key_expr, key))
                .map(|q| q.sender.clone())
                .collect(),
            QueryTarget::AllComplete => state
                .queryables
                .values()
                .filter(|q| q.complete && key_expr::intersects(&q.key_expr, key))
                .map(|q| q.sender.clone())
                .collect(),
        }
    }

    pub(crate) async fn handle_reply_data(&self, qid: u64, result: Result<Sample, Value>) {
        trace!("handle_reply_data({})", qid);
        let new_reply = Reply {
            result,
            replier_id: self.id.clone(),
        };
        let to_send = {
            let mut state = kwrite!(self.state);
            let query = match state.queries.get_mut(&qid) {
                Some(query) => query,
                None => {
                    error!("Received reply for unknown query: {}", qid);
                    return;
                }
            };
            match &new_reply.result {
                // Error replies bypass consolidation.
                Err(_) => Some((query.rep_sender.clone(), new_reply)),
                Ok(sample) => {
                    let key = sample.key_expr.clone();
                    match query.reception_mode {
                        ConsolidationMode::None => Some((query.rep_sender.clone(), new_reply)),
                        ConsolidationMode::Monotonic => {
                            let replies = query.replies.as_mut().unwrap();
                            let newer = match replies.get(&key) {
                                Some(old_reply) => {
                                    timestamp_of(&new_reply) > timestamp_of(old_reply)
                                }
                                None => true,
                            };
                            if newer {
                                replies.insert(key, new_reply.clone());
                                Some((query.rep_sender.clone(), new_reply))
                            } else {
                                None
                            }
                        }
                        ConsolidationMode::Auto | ConsolidationMode::Latest => {
                            let replies = query.replies.as_mut().unwrap();
                            let newer = match replies.get(&key) {
                                Some(old_reply) => {
                                    timestamp_of(&new_reply) > timestamp_of(old_reply)
                                }
                                None => true,
                            };
                            if newer {
                                replies.insert(key, new_reply);
                            }
                            None
                        }
                    }
                }
            }
        };
        if let Some((sender, reply)) = to_send {
            Session::forward_reply(sender, reply).await;
        }
    }

    async fn forward_reply(sender: Sender<Reply>, reply: Reply) {
        if let Err(e) = sender.send_async(reply).await {
            error!("Error sending reply: {}", e);
        }
    }

    pub(crate) async fn handle_reply_final(&self, qid: u64) {
        trace!("handle_reply_final({})", qid);
        let finished = {
            let mut state = kwrite!(self.state);
            match state.queries.get_mut(&qid) {
                Some(query) => {
                    query.nb_final -= 1;
                    if query.nb_final == 0 {
                        state.queries.remove(&qid)
                    } else {
                        None
                    }
                }
                None => {
                    error!("Received final reply for unknown query: {}", qid);
                    None
                }
            }
        };
        if let Some(query) = finished {
            if matches!(
                query.reception_mode,
                ConsolidationMode::Auto | ConsolidationMode::Latest
            ) {
                if let Some(replies) = query.replies {
                    for (_, reply) in replies {
                        Session::forward_reply(query.rep_sender.clone(), reply).await;
                    }
                }
            }
        }
        // The removed query state drops its reply sender here, ending the
        // reply stream.
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.alive {
            let _ = self.close_alive();
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        kread!(self.state).fmt(f)
    }
}
