//! The reader's `StreamRead` state machine (section 4.5): connect, init,
//! dispatch inbound frames, buffer decoded batches for [`TopicReader::read`],
//! and fold acknowledged messages into ordered `CommitOffsetRequest`s.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, Mutex, Notify, RwLock};
use tokio::task::JoinHandle;

use ydb_gax::cancel::CancellationToken;
use ydb_gax::conn::AcquireOptions;
use ydb_gax::retry::{default_backoff, BackoffStrategy, DefaultRetryPredicate, RetryDecision, RetryPredicate};
use ydb_proto::topic::{
    Batch, CommitOffsetRequest, EndPartitionSession, FromClientMessage, FromServerMessage, InitRequest,
    OffsetsRange, PartitionCommitOffset, ReadRequest, StartPartitionSessionRequest, StartPartitionSessionResponse,
    StopPartitionSessionRequest, StopPartitionSessionResponse, StreamReadFromClient, TopicReadSettings,
};

use ydb_driver::Driver;

use crate::error::TopicError;
use crate::message::TopicMessage;
use crate::session::{PartitionSession, PendingCommit, SessionState};
use crate::wire;

use super::ReaderConfig;

/// One decoded-but-not-yet-delivered server batch, still holding its raw
/// message bytes until [`TopicReader::read`] decompresses them.
struct BufferedPartition {
    partition_session_id: i64,
    bytes_size: i64,
    batches: Vec<Batch>,
}

/// What `read()` returns (section 4.5's read-iterator semantics, including
/// the decision that a `wait` timeout never ends iteration — only
/// cancellation or [`TopicReader::close`]/[`TopicReader::destroy`] do).
#[derive(Debug)]
pub enum ReadOutcome {
    Batch(Vec<TopicMessage>),
    TimedOut,
    Ended,
}

/// Options for one [`TopicReader::read`] call.
#[derive(Clone, Default)]
pub struct ReadOptions {
    /// Caps how many messages one call returns; `None` returns everything
    /// currently buffered from the next non-empty partition batch.
    pub limit: Option<usize>,
    /// How long to wait for data before returning [`ReadOutcome::TimedOut`].
    /// `None` waits indefinitely.
    pub wait: Option<Duration>,
    /// An additional per-call cancellation source, checked alongside the
    /// reader's own lifetime.
    pub cancel: Option<CancellationToken>,
}

struct Inner {
    driver: Driver,
    config: ReaderConfig,
    cancel: CancellationToken,
    outgoing: crate::queue::PriorityQueue<FromClientMessage>,
    sessions: RwLock<HashMap<i64, Arc<PartitionSession>>>,
    pending_commits: Mutex<HashMap<i64, VecDeque<PendingCommit>>>,
    buffer: Mutex<VecDeque<BufferedPartition>>,
    buffer_notify: Notify,
    free_buffer_size: AtomicI64,
    /// Per-partition `(min, max)` offset observed by `commit()` while
    /// `transactional` is set, reported via `UpdateOffsetsInTransaction`
    /// instead of `CommitOffsetRequest`.
    read_offsets: Mutex<HashMap<i64, (i64, i64)>>,
}

impl Inner {
    fn new(driver: Driver, config: ReaderConfig, cancel: CancellationToken) -> Arc<Self> {
        let max_buffer_bytes = config.max_buffer_bytes;
        Arc::new(Self {
            driver,
            config,
            cancel,
            outgoing: crate::queue::PriorityQueue::new(),
            sessions: RwLock::new(HashMap::new()),
            pending_commits: Mutex::new(HashMap::new()),
            buffer: Mutex::new(VecDeque::new()),
            buffer_notify: Notify::new(),
            free_buffer_size: AtomicI64::new(max_buffer_bytes),
            read_offsets: Mutex::new(HashMap::new()),
        })
    }

    async fn reset_for_connect(&self) {
        self.buffer.lock().await.clear();
        self.free_buffer_size.store(self.config.max_buffer_bytes, Ordering::Release);
        let mut sessions = self.sessions.write().await;
        for (_, session) in sessions.drain() {
            session.kill();
            session.set_state(SessionState::Stopped);
        }
        drop(sessions);
        self.reject_all_pending(TopicError::Reconnecting).await;
    }

    async fn reject_all_pending(&self, err: TopicError) {
        let mut pending = self.pending_commits.lock().await;
        for (_, fifo) in pending.drain() {
            for pc in fifo {
                let _ = pc.resolve.send(Err(err.clone()));
            }
        }
    }

    async fn reject_pending_for(&self, partition_session_id: i64, err: TopicError) {
        let mut pending = self.pending_commits.lock().await;
        if let Some(fifo) = pending.remove(&partition_session_id) {
            for pc in fifo {
                let _ = pc.resolve.send(Err(err.clone()));
            }
        }
    }

    async fn pending_is_empty(&self, partition_session_id: i64) -> bool {
        self.pending_commits
            .lock()
            .await
            .get(&partition_session_id)
            .map(|f| f.is_empty())
            .unwrap_or(true)
    }

    async fn all_pending_drained(&self) -> bool {
        self.pending_commits.lock().await.values().all(|f| f.is_empty())
    }

    async fn drop_buffered_for(&self, partition_session_id: i64) {
        self.buffer.lock().await.retain(|b| b.partition_session_id != partition_session_id);
    }

    async fn credit_back(&self, bytes: i64) {
        if bytes <= 0 {
            return;
        }
        self.free_buffer_size.fetch_add(bytes, Ordering::AcqRel);
        self.outgoing.push(FromClientMessage::ReadRequest(ReadRequest { bytes_size: bytes }), 1).await;
    }

    async fn dispatch(self: &Arc<Self>, frame: ydb_proto::topic::StreamReadFromServer) -> Result<(), TopicError> {
        if frame.status != ydb_proto::issue::StatusCode::Success as i32 {
            return Err(TopicError::Stream(wire::ydb_error_from_frame(frame.status, &frame.issues)));
        }
        match frame.server_message {
            Some(FromServerMessage::InitResponse(resp)) => {
                tracing::info!(session_id = %resp.session_id, "topic reader stream initialized");
                let credit = self.free_buffer_size.load(Ordering::Acquire);
                self.outgoing.push(FromClientMessage::ReadRequest(ReadRequest { bytes_size: credit }), 1).await;
            }
            Some(FromServerMessage::StartPartitionSessionRequest(req)) => self.handle_start(req).await,
            Some(FromServerMessage::StopPartitionSessionRequest(req)) => self.handle_stop(req).await,
            Some(FromServerMessage::EndPartitionSession(req)) => self.handle_end(req).await,
            Some(FromServerMessage::ReadResponse(resp)) => self.handle_read_response(resp).await,
            Some(FromServerMessage::CommitOffsetResponse(resp)) => self.handle_commit_response(resp).await,
            Some(FromServerMessage::UpdateTokenResponse(_)) => {}
            None => {}
        }
        Ok(())
    }

    async fn handle_start(self: &Arc<Self>, req: StartPartitionSessionRequest) {
        let offsets = req.partition_offsets.clone().unwrap_or(OffsetsRange { start: 0, end: 0 });
        let session = PartitionSession::new(
            req.partition_session_id,
            req.partition_id,
            req.path.clone(),
            req.committed_offset,
            offsets.start,
            offsets.end,
        );
        let overrides = self
            .config
            .on_partition_session_start
            .as_ref()
            .map(|cb| cb(&session, req.committed_offset, (offsets.start, offsets.end)))
            .unwrap_or_default();
        if let Some(commit_offset) = overrides.commit_offset {
            session.set_next_commit_start_offset(commit_offset);
            session.set_committed_offset(commit_offset);
        }
        self.sessions.write().await.insert(session.partition_session_id, session);
        self.outgoing
            .push(
                FromClientMessage::StartPartitionSessionResponse(StartPartitionSessionResponse {
                    partition_session_id: req.partition_session_id,
                    read_offset: overrides.read_offset,
                    commit_offset: overrides.commit_offset,
                }),
                0,
            )
            .await;
    }

    async fn handle_stop(self: &Arc<Self>, req: StopPartitionSessionRequest) {
        let session = self.sessions.read().await.get(&req.partition_session_id).cloned();
        let Some(session) = session else { return };
        if let Some(cb) = &self.config.on_partition_session_stop {
            cb(&session, req.committed_offset);
        }
        if !req.graceful {
            session.set_state(SessionState::Stopped);
            session.kill();
            self.drop_buffered_for(req.partition_session_id).await;
            self.reject_pending_for(req.partition_session_id, TopicError::DeadPartitionSession(req.partition_session_id))
                .await;
            self.sessions.write().await.remove(&req.partition_session_id);
            return;
        }
        session.set_state(SessionState::Stopping);
        let this = self.clone();
        let partition_session_id = req.partition_session_id;
        tokio::spawn(async move {
            let deadline = tokio::time::Instant::now() + Duration::from_secs(30);
            loop {
                if this.pending_is_empty(partition_session_id).await || tokio::time::Instant::now() >= deadline {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            this.outgoing
                .push(FromClientMessage::StopPartitionSessionResponse(StopPartitionSessionResponse { partition_session_id }), 0)
                .await;
            this.sessions.write().await.remove(&partition_session_id);
        });
    }

    async fn handle_end(self: &Arc<Self>, req: EndPartitionSession) {
        if let Some(session) = self.sessions.read().await.get(&req.partition_session_id) {
            session.set_state(SessionState::Ended);
        }
    }

    async fn handle_read_response(self: &Arc<Self>, resp: ydb_proto::topic::ReadResponse) {
        self.free_buffer_size.fetch_sub(resp.bytes_size, Ordering::AcqRel);
        let n = resp.partition_data.len().max(1) as i64;
        let share = resp.bytes_size / n;
        let mut remainder = resp.bytes_size - share * n;
        let mut buffer = self.buffer.lock().await;
        for pd in resp.partition_data {
            let mut bytes_size = share;
            if remainder > 0 {
                bytes_size += 1;
                remainder -= 1;
            }
            buffer.push_back(BufferedPartition { partition_session_id: pd.partition_session_id, bytes_size, batches: pd.batches });
        }
        drop(buffer);
        self.buffer_notify.notify_waiters();
    }

    async fn handle_commit_response(self: &Arc<Self>, resp: ydb_proto::topic::CommitOffsetResponse) {
        for entry in resp.partitions_committed_offsets {
            if let Some(session) = self.sessions.read().await.get(&entry.partition_session_id) {
                session.set_committed_offset(entry.committed_offset);
                if let Some(cb) = &self.config.on_committed_offset {
                    cb(session, entry.committed_offset);
                }
            }
            let mut pending = self.pending_commits.lock().await;
            if let Some(fifo) = pending.get_mut(&entry.partition_session_id) {
                while let Some(front) = fifo.front() {
                    if front.upper_offset <= entry.committed_offset {
                        let pc = fifo.pop_front().unwrap();
                        let _ = pc.resolve.send(Ok(()));
                    } else {
                        break;
                    }
                }
            }
        }
    }

    /// Pulls one non-empty decoded batch out of the buffer, decompressing
    /// lazily (section 4.5: "the iterator pulls from buffer ... decompresses
    /// payloads ... converts partitionData entries into TopicMessages").
    /// Skips (and credits back) entries whose session already died.
    async fn try_take_batch(&self, limit: Option<usize>) -> Option<Vec<TopicMessage>> {
        loop {
            let entry = {
                let mut buffer = self.buffer.lock().await;
                buffer.pop_front()?
            };
            let session = self.sessions.read().await.get(&entry.partition_session_id).cloned();
            let bytes_size = entry.bytes_size;
            let Some(session) = session else {
                self.credit_back(bytes_size).await;
                continue;
            };
            let messages = decode_partition_data(&self.config.codecs, &session, entry, limit);
            self.credit_back(bytes_size).await;
            if !messages.is_empty() {
                return Some(messages);
            }
        }
    }

    async fn run_one_connection(self: &Arc<Self>) -> Result<(), TopicError> {
        let options = AcquireOptions { allow_fallback: true, ..Default::default() };
        let mut client = self.driver.topic_client(&options).await?;

        let topics_read_settings: Vec<TopicReadSettings> = self
            .config
            .topics
            .iter()
            .map(|t| TopicReadSettings {
                path: t.path.clone(),
                partition_ids: t.partition_ids.clone(),
                max_lag_ms: t.max_lag_ms,
                read_from_ms: t.read_from_ms,
            })
            .collect();

        self.outgoing
            .push(
                FromClientMessage::InitRequest(InitRequest {
                    consumer: self.config.consumer.clone(),
                    topics_read_settings,
                    auto_partitioning_support: false,
                }),
                0,
            )
            .await;

        let this = self.clone();
        let outbound = async_stream::stream! {
            while let Some(frame) = this.outgoing.recv().await {
                yield StreamReadFromClient { client_message: Some(frame) };
            }
        };

        let mut stream = client
            .stream_read(outbound)
            .await
            .map_err(|e| TopicError::Stream(e.into()))?
            .into_inner();

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return Ok(()),
                frame = stream.message() => {
                    match frame.map_err(|e| TopicError::Stream(e.into()))? {
                        Some(frame) => self.dispatch(frame).await?,
                        None => return Err(TopicError::Stream(tonic::Status::unavailable("stream closed by server").into())),
                    }
                }
            }
        }
    }
}

fn decode_partition_data(
    codecs: &crate::codec::CodecRegistry,
    session: &Arc<PartitionSession>,
    entry: BufferedPartition,
    limit: Option<usize>,
) -> Vec<TopicMessage> {
    let mut out = Vec::new();
    'batches: for batch in entry.batches {
        let codec = match codecs.get(batch.codec) {
            Ok(c) => c.clone(),
            Err(err) => {
                tracing::warn!(error = %err, "skipping batch with unknown codec");
                continue;
            }
        };
        for md in batch.message_data {
            let payload = match codec.decompress(&md.data) {
                Ok(p) => p,
                Err(err) => {
                    tracing::warn!(error = %err, "skipping undecodable message");
                    continue;
                }
            };
            out.push(TopicMessage {
                partition_session: session.clone(),
                producer_id: md.message_group_id.clone(),
                codec: wire::codec_id_from_i32(batch.codec),
                seq_no: md.seq_no,
                offset: md.offset,
                payload: bytes::Bytes::from(payload),
                uncompressed_size: Some(md.uncompressed_size),
                created_at_ms: Some(md.created_at_ms),
                written_at_ms: Some(batch.produced_at_ms),
                metadata: wire::metadata_map(&md.metadata_items),
            });
            if let Some(limit) = limit {
                if out.len() >= limit {
                    break 'batches;
                }
            }
        }
    }
    out
}

fn classify_retry(err: &TopicError) -> bool {
    match err {
        TopicError::Stream(e) => matches!(
            DefaultRetryPredicate.classify(e),
            RetryDecision::Retry | RetryDecision::RetryIfIdempotent
        ),
        TopicError::Driver(_) => true,
        _ => false,
    }
}

async fn run(inner: Arc<Inner>) {
    let backoff = default_backoff();
    let mut attempt = 0u32;
    loop {
        if inner.cancel.is_cancelled() {
            return;
        }
        inner.reset_for_connect().await;
        match inner.run_one_connection().await {
            Ok(()) => return,
            Err(err) => {
                inner.reject_all_pending(err.clone()).await;
                if !classify_retry(&err) {
                    tracing::error!(error = %err, "topic reader stream failed terminally");
                    return;
                }
                tracing::warn!(error = %err, attempt, "topic reader stream failed, reconnecting");
                let delay = backoff.delay(attempt);
                attempt = attempt.saturating_add(1);
                tokio::select! {
                    _ = inner.cancel.cancelled() => return,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
    }
}

async fn wait_for_cancel(cancel: Option<&CancellationToken>) {
    match cancel {
        Some(c) => c.cancelled().await,
        None => std::future::pending().await,
    }
}

async fn wait_for_deadline(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(d) => tokio::time::sleep_until(d).await,
        None => std::future::pending().await,
    }
}

/// Folds a strictly-ascending offset list into contiguous `[start, end)`
/// ranges (section 4.5's commit grouping).
fn fold_ranges(offsets: &[i64]) -> Result<Vec<(i64, i64)>, TopicError> {
    let mut ranges = Vec::new();
    let mut start = offsets[0];
    let mut end = offsets[0] + 1;
    for &offset in &offsets[1..] {
        if offset == end {
            end = offset + 1;
        } else if offset > end {
            ranges.push((start, end));
            start = offset;
            end = offset + 1;
        } else {
            return Err(TopicError::OutOfOrder { prev: end - 1, next: offset });
        }
    }
    ranges.push((start, end));
    Ok(ranges)
}

/// A resumable reader attached to one or more topics under a consumer
/// (section 4.5). Reconnects transparently on retryable stream failures;
/// every partition session and buffered message from a prior connection is
/// invalidated across a reconnect, per section 9.
pub struct TopicReader {
    inner: Arc<Inner>,
    run_task: Mutex<Option<JoinHandle<()>>>,
}

impl TopicReader {
    /// Spawns the stream's connect/reconnect loop in the background and
    /// returns immediately; the first `InitRequest` is sent as soon as a
    /// connection is acquired.
    pub async fn connect(driver: Driver, config: ReaderConfig) -> Self {
        let cancel = CancellationToken::new();
        let inner = Inner::new(driver, config, cancel);
        let run_task = tokio::spawn(run(inner.clone()));
        Self { inner, run_task: Mutex::new(Some(run_task)) }
    }

    /// Pulls the next available batch of messages, all from a single
    /// partition's single server `ReadResponse` share. A `wait` timeout
    /// returns [`ReadOutcome::TimedOut`] without ending iteration; only
    /// [`TopicReader::close`]/[`TopicReader::destroy`] or a cancelled
    /// `opts.cancel` do that (section 9's open-question resolution).
    pub async fn read(&self, opts: ReadOptions) -> ReadOutcome {
        let deadline = opts.wait.map(|d| tokio::time::Instant::now() + d);
        loop {
            if self.inner.cancel.is_cancelled() {
                return ReadOutcome::Ended;
            }
            if let Some(cancel) = &opts.cancel {
                if cancel.is_cancelled() {
                    return ReadOutcome::Ended;
                }
            }
            let notified = self.inner.buffer_notify.notified();
            tokio::pin!(notified);
            if let Some(batch) = self.inner.try_take_batch(opts.limit).await {
                return ReadOutcome::Batch(batch);
            }
            tokio::select! {
                _ = &mut notified => continue,
                _ = self.inner.cancel.cancelled() => return ReadOutcome::Ended,
                _ = wait_for_cancel(opts.cancel.as_ref()) => return ReadOutcome::Ended,
                _ = wait_for_deadline(deadline) => return ReadOutcome::TimedOut,
            }
        }
    }

    /// Commits (or, in transactional mode, records the read range of) a set
    /// of messages. Groups by partition session, folds each group's offsets
    /// into contiguous ranges, and — per section 8's retention-gap scenario
    /// — forces the *first* range of each group to start at the session's
    /// `next_commit_start_offset` rather than the caller's own offset, so a
    /// commit after a retention-deleted gap still closes it.
    pub async fn commit(&self, messages: &[TopicMessage]) -> Result<(), TopicError> {
        if messages.is_empty() {
            return Ok(());
        }

        let mut groups: Vec<(Arc<PartitionSession>, Vec<i64>)> = Vec::new();
        for msg in messages {
            if !msg.alive() {
                return Err(TopicError::DeadMessage);
            }
            if !self.inner.sessions.read().await.contains_key(&msg.partition_session_id()) {
                return Err(TopicError::DeadPartitionSession(msg.partition_session_id()));
            }
            match groups.iter_mut().find(|(s, _)| s.partition_session_id == msg.partition_session_id()) {
                Some((_, offsets)) => offsets.push(msg.offset),
                None => groups.push((msg.partition_session.clone(), vec![msg.offset])),
            }
        }

        let mut commit_offsets = Vec::new();
        let mut waiters = Vec::new();

        for (session, offsets) in groups {
            let ranges = fold_ranges(&offsets)?;
            let mut wire_ranges = Vec::with_capacity(ranges.len());
            let mut first = true;
            let mut last_end = session.next_commit_start_offset();
            for (start, end) in ranges {
                let wire_start = if first { session.next_commit_start_offset() } else { start };
                first = false;
                wire_ranges.push(OffsetsRange { start: wire_start, end });
                last_end = end;
            }
            session.set_next_commit_start_offset(last_end);

            if self.inner.config.transactional {
                let mut read_offsets = self.inner.read_offsets.lock().await;
                let first_offset = *offsets.first().unwrap();
                let last_offset = *offsets.last().unwrap();
                let entry = read_offsets.entry(session.partition_session_id).or_insert((first_offset, last_offset));
                entry.0 = entry.0.min(first_offset);
                entry.1 = entry.1.max(last_offset);
            } else {
                let (tx, rx) = oneshot::channel();
                self.inner
                    .pending_commits
                    .lock()
                    .await
                    .entry(session.partition_session_id)
                    .or_default()
                    .push_back(PendingCommit { partition_session_id: session.partition_session_id, upper_offset: last_end, resolve: tx });
                waiters.push(rx);
            }

            commit_offsets.push(PartitionCommitOffset { partition_session_id: session.partition_session_id, offsets: wire_ranges });
        }

        if !self.inner.config.transactional {
            self.inner.outgoing.push(FromClientMessage::CommitOffsetRequest(CommitOffsetRequest { commit_offsets }), 1).await;
            for rx in waiters {
                match rx.await {
                    Ok(result) => result?,
                    Err(_) => return Err(TopicError::Destroyed("reader closed before commit was acknowledged".into())),
                }
            }
        }
        Ok(())
    }

    /// Binds this reader's pending offset updates to `tx`, registering a
    /// commit hook that issues `UpdateOffsetsInTransaction` and a rollback
    /// hook that discards them without contacting the server.
    pub async fn bind_transaction(&self, tx: Arc<crate::transaction::Transaction>) {
        let inner = self.inner.clone();
        let tx_for_commit = tx.clone();
        tx.on_commit(move || {
            let inner = inner.clone();
            let tx = tx_for_commit.clone();
            async move {
                let mut read_offsets = inner.read_offsets.lock().await;
                if read_offsets.is_empty() {
                    return Ok(());
                }
                let sessions = inner.sessions.read().await;
                let mut by_path: HashMap<String, Vec<ydb_proto::topic::OffsetsRangeUpdate>> = HashMap::new();
                for (partition_session_id, (min, max)) in read_offsets.drain() {
                    let Some(session) = sessions.get(&partition_session_id) else { continue };
                    by_path.entry(session.topic_path.clone()).or_default().push(ydb_proto::topic::OffsetsRangeUpdate {
                        partition_id: session.partition_id,
                        partition_offsets: vec![OffsetsRange { start: min, end: max + 1 }],
                    });
                }
                drop(sessions);
                let topics = by_path
                    .into_iter()
                    .map(|(path, partitions)| ydb_proto::topic::UpdateOffsetsInTransactionTopic { path, partitions })
                    .collect();
                let options = AcquireOptions { allow_fallback: true, ..Default::default() };
                let mut client = inner.driver.topic_client(&options).await?;
                let request = ydb_proto::topic::UpdateOffsetsInTransactionRequest {
                    tx: Some(ydb_proto::topic::UpdateOffsetsInTransactionRequestTx { id: tx.transaction_id.clone() }),
                    consumer: inner.config.consumer.clone(),
                    topics,
                };
                client
                    .update_offsets_in_transaction(tonic::Request::new(request))
                    .await
                    .map_err(|e| TopicError::Commit(e.into()))?;
                Ok(())
            }
        })
        .await;

        let inner = self.inner.clone();
        tx.on_rollback(move || {
            let inner = inner.clone();
            async move {
                inner.read_offsets.lock().await.clear();
                Ok(())
            }
        })
        .await;
    }

    /// Gracefully stops the reader: waits (up to `graceful_shutdown_timeout`)
    /// for outstanding commits to be acknowledged, then tears the stream
    /// down.
    pub async fn close(&self) {
        let deadline = tokio::time::Instant::now() + self.inner.config.graceful_shutdown_timeout;
        loop {
            if self.inner.all_pending_drained().await || tokio::time::Instant::now() >= deadline {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        self.destroy("reader closed").await;
    }

    /// Tears the stream down immediately, rejecting every outstanding commit
    /// with [`TopicError::Destroyed`] instead of waiting for them.
    pub async fn destroy(&self, reason: impl Into<String>) {
        let reason = reason.into();
        self.inner.reject_all_pending(TopicError::Destroyed(reason)).await;
        self.inner.outgoing.close().await;
        self.inner.cancel.cancel();
        if let Some(task) = self.run_task.lock().await.take() {
            let _ = task.await;
        }
    }
}
