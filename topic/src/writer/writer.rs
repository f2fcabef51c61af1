//! The writer's `StreamWrite` state machine: connect/init, accept writes
//! into a sliding buffered/inflight/garbage window, flush on a timer or
//! capacity pressure, and resolve acks in send order.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;

use ydb_gax::cancel::CancellationToken;
use ydb_gax::conn::AcquireOptions;
use ydb_gax::retry::{default_backoff, BackoffStrategy, DefaultRetryPredicate, RetryDecision, RetryPredicate};
use ydb_proto::topic::{
    FromClientWriteMessage, FromServerWriteMessage, StreamWriteFromClient, WriteAckKind, WriteInitRequest,
    WriteMessageData, WriteRequest,
};

use ydb_driver::Driver;

use crate::codec::CodecId;
use crate::error::TopicError;
use crate::message::{AckStatus, MessageState, WriterMessage};
use crate::wire;

use super::{SeqNoMode, WriteMessage, WriterConfig, MAX_PAYLOAD_SIZE};

/// What a pending [`TopicWriter::write`] call resolves to once the server
/// acknowledges it.
pub struct WriteAwaiter {
    rx: oneshot::Receiver<Result<AckStatus, TopicError>>,
}

impl WriteAwaiter {
    pub async fn wait(self) -> Result<AckStatus, TopicError> {
        match self.rx.await {
            Ok(result) => result,
            Err(_) => Err(TopicError::Destroyed("writer closed before this message was acknowledged".into())),
        }
    }
}

struct SeqNoManager {
    mode: Option<SeqNoMode>,
    last_seq_no: u64,
}

impl SeqNoManager {
    fn new() -> Self {
        Self { mode: None, last_seq_no: 0 }
    }

    fn next_auto(&mut self) -> Result<u64, TopicError> {
        match self.mode {
            Some(SeqNoMode::Manual) => return Err(TopicError::SeqNoModeMismatch(SeqNoMode::Auto)),
            Some(SeqNoMode::Auto) => {}
            None => self.mode = Some(SeqNoMode::Auto),
        }
        self.last_seq_no += 1;
        Ok(self.last_seq_no)
    }

    fn accept_manual(&mut self, seq_no: u64) -> Result<(), TopicError> {
        match self.mode {
            Some(SeqNoMode::Auto) => return Err(TopicError::SeqNoModeMismatch(SeqNoMode::Manual)),
            Some(SeqNoMode::Manual) => {}
            None => self.mode = Some(SeqNoMode::Manual),
        }
        if seq_no <= self.last_seq_no {
            return Err(TopicError::SeqNoNotIncreasing { prev: self.last_seq_no, next: seq_no });
        }
        self.last_seq_no = seq_no;
        Ok(())
    }

    /// Adopts the server's `lastSeqNo` only on the writer's very first
    /// successful `InitResponse` and only while in Auto mode (or undecided)
    /// — a later reconnect's `InitResponse` must never rewind sequence
    /// numbers already assigned to in-flight messages.
    fn adopt_last_seq_no(&mut self, server_last_seq_no: u64, first_connection: bool) {
        if first_connection && self.mode != Some(SeqNoMode::Manual) {
            self.last_seq_no = server_last_seq_no;
        }
    }
}

/// The buffered/inflight/garbage sliding window (section 4.6). `messages`
/// holds every message not yet compacted away, in send order:
/// `[0, acked_count)` is garbage, `[acked_count, acked_count+inflight_count)`
/// is inflight, and the rest is buffered.
struct Window {
    messages: VecDeque<WriterMessage>,
    acked_count: usize,
    inflight_count: usize,
    buffer_size: i64,
    inflight_size: i64,
    garbage_size: i64,
}

impl Window {
    fn new() -> Self {
        Self { messages: VecDeque::new(), acked_count: 0, inflight_count: 0, buffer_size: 0, inflight_size: 0, garbage_size: 0 }
    }

    fn buffered_start(&self) -> usize {
        self.acked_count + self.inflight_count
    }
}

struct Inner {
    driver: Driver,
    config: WriterConfig,
    codec_impl: Arc<dyn crate::codec::Codec>,
    cancel: CancellationToken,
    outgoing: crate::queue::PriorityQueue<FromClientWriteMessage>,
    window: Mutex<Window>,
    seq_no: Mutex<SeqNoManager>,
    partition_id: AtomicI64,
    has_connected_once: AtomicBool,
    accepting: AtomicBool,
    tx_ids: Mutex<Option<(String, String)>>,
}

impl Inner {
    fn new(driver: Driver, config: WriterConfig, cancel: CancellationToken) -> Result<Arc<Self>, TopicError> {
        let codec_impl = crate::codec::CodecRegistry::new().get(config.codec as i32)?.clone();
        Ok(Arc::new(Self {
            driver,
            config,
            codec_impl,
            cancel,
            outgoing: crate::queue::PriorityQueue::new(),
            window: Mutex::new(Window::new()),
            seq_no: Mutex::new(SeqNoManager::new()),
            partition_id: AtomicI64::new(0),
            has_connected_once: AtomicBool::new(false),
            accepting: AtomicBool::new(true),
            tx_ids: Mutex::new(None),
        }))
    }

    async fn tx_id(&self) -> Option<String> {
        self.tx_ids.lock().await.as_ref().map(|(_, tx_id)| tx_id.clone())
    }

    /// Moves up to `maxInflightCount - inflight_count` buffered messages
    /// into flight, grouped into one `WriteRequest` per contiguous run of
    /// messages sharing a codec (the wire format tags codec per request,
    /// not per message).
    async fn flush(self: &Arc<Self>) {
        let requests = {
            let mut win = self.window.lock().await;
            let capacity = self.config.max_inflight_count.saturating_sub(win.inflight_count);
            let start = win.buffered_start();
            let take = (win.messages.len() - start).min(capacity);
            if take == 0 {
                return;
            }
            let end = start + take;
            let mut requests: Vec<(i32, Vec<WriteMessageData>)> = Vec::new();
            let mut idx = start;
            while idx < end {
                let codec = win.messages[idx].codec as i32;
                let mut batch = Vec::new();
                while idx < end && win.messages[idx].codec as i32 == codec {
                    let byte_size = win.messages[idx].byte_size();
                    win.messages[idx].state = MessageState::Inflight;
                    win.buffer_size -= byte_size;
                    win.inflight_size += byte_size;
                    let m = &win.messages[idx];
                    batch.push(WriteMessageData {
                        seq_no: m.seq_no,
                        created_at_ms: m.created_at_ms,
                        data: m.data.to_vec(),
                        uncompressed_size: m.uncompressed_size,
                        message_group_id: self.config.message_group_id.clone().unwrap_or_default(),
                        metadata_items: wire::metadata_items(&m.metadata),
                    });
                    idx += 1;
                }
                requests.push((codec, batch));
            }
            win.inflight_count += take;
            requests
        };
        let tx_id = self.tx_id().await;
        for (codec, messages) in requests {
            self.outgoing
                .push(FromClientWriteMessage::WriteRequest(WriteRequest { codec, messages, tx_id: tx_id.clone() }), 1)
                .await;
        }
    }

    async fn handle_write_response(self: &Arc<Self>, resp: ydb_proto::topic::WriteResponse) {
        let mut completions = Vec::new();
        {
            let mut win = self.window.lock().await;
            for ack in resp.acks {
                if win.inflight_count == 0 {
                    tracing::warn!(seq_no = ack.seq_no, "ack received with no inflight message outstanding");
                    continue;
                }
                let pos = win.acked_count;
                if win.messages[pos].seq_no != ack.seq_no {
                    tracing::warn!(
                        expected = win.messages[pos].seq_no,
                        got = ack.seq_no,
                        "write ack seqNo out of the expected send order"
                    );
                }
                let byte_size = win.messages[pos].byte_size();
                win.inflight_size -= byte_size;
                win.garbage_size += byte_size;
                win.messages[pos].state = MessageState::Garbage;
                win.acked_count += 1;
                win.inflight_count -= 1;
                let status = match ack.kind {
                    Some(WriteAckKind::Written(w)) => {
                        AckStatus::Written { offset: w.offset, partition_id: self.partition_id.load(Ordering::Acquire) }
                    }
                    Some(WriteAckKind::Skipped(_)) => AckStatus::Skipped,
                    Some(WriteAckKind::WrittenInTx(_)) => AckStatus::WrittenInTx,
                    None => AckStatus::Skipped,
                };
                if let Some(sender) = win.messages[pos].ack.take() {
                    completions.push((sender, status));
                }
            }
            self.maybe_compact(&mut win);
        }
        for (sender, status) in completions {
            let _ = sender.send(Ok(status));
        }
    }

    fn maybe_compact(&self, win: &mut Window) {
        let gc = &self.config.garbage_collection;
        if win.acked_count >= gc.max_garbage_count || win.garbage_size >= gc.max_garbage_size {
            win.messages.drain(0..win.acked_count);
            win.acked_count = 0;
            win.garbage_size = 0;
            if gc.force_gc {
                tracing::debug!("writer window compacted (forced GC pass requested)");
            }
        }
    }

    /// Rolls every inflight message back to buffered (section 4.6's
    /// reconnect rule); they keep their original `seqNo` and are resent,
    /// relying on server-side `(producerId, seqNo)` deduplication.
    async fn rollback_inflight_to_buffered(&self) {
        let mut win = self.window.lock().await;
        let start = win.acked_count;
        let end = start + win.inflight_count;
        for i in start..end {
            win.messages[i].state = MessageState::Buffered;
        }
        win.buffer_size += win.inflight_size;
        win.inflight_size = 0;
        win.inflight_count = 0;
    }

    async fn reject_all_pending(&self, reason: &str) {
        let mut win = self.window.lock().await;
        for message in win.messages.iter_mut() {
            if let Some(sender) = message.ack.take() {
                let _ = sender.send(Err(TopicError::Destroyed(reason.to_string())));
            }
        }
    }

    async fn dispatch(self: &Arc<Self>, frame: ydb_proto::topic::StreamWriteFromServer) -> Result<(), TopicError> {
        if frame.status != ydb_proto::issue::StatusCode::Success as i32 {
            return Err(TopicError::Stream(wire::ydb_error_from_frame(frame.status, &frame.issues)));
        }
        match frame.server_message {
            Some(FromServerWriteMessage::InitResponse(resp)) => {
                let first_connection = !self.has_connected_once.swap(true, Ordering::AcqRel);
                self.partition_id.store(resp.partition_id, Ordering::Release);
                if let Some(last_seq_no) = resp.last_seq_no {
                    self.seq_no.lock().await.adopt_last_seq_no(last_seq_no, first_connection);
                }
                tracing::info!(session_id = %resp.session_id, partition_id = resp.partition_id, "topic writer stream initialized");
                self.flush().await;
            }
            Some(FromServerWriteMessage::WriteResponse(resp)) => self.handle_write_response(resp).await,
            Some(FromServerWriteMessage::UpdateTokenResponse(_)) => {}
            None => {}
        }
        Ok(())
    }

    async fn run_one_connection(self: &Arc<Self>) -> Result<(), TopicError> {
        let options = AcquireOptions { allow_fallback: true, ..Default::default() };
        let mut client = self.driver.topic_client(&options).await?;

        let tx = self.tx_ids.lock().await.clone().map(|(session_id, tx_id)| ydb_proto::topic::TransactionIdentifiers {
            session_id,
            tx_id,
        });

        self.outgoing
            .push(
                FromClientWriteMessage::InitRequest(WriteInitRequest {
                    path: self.config.topic_path.clone(),
                    producer_id: self.config.producer_id.clone(),
                    partition_id: self.config.partition_id,
                    message_group_id: self.config.message_group_id.clone(),
                    get_last_seq_no: true,
                    tx,
                }),
                0,
            )
            .await;

        let this = self.clone();
        let outbound = async_stream::stream! {
            while let Some(frame) = this.outgoing.recv().await {
                yield StreamWriteFromClient { client_message: Some(frame) };
            }
        };

        let mut stream = client
            .stream_write(outbound)
            .await
            .map_err(|e| TopicError::Stream(e.into()))?
            .into_inner();

        let flush_interval = self.config.flush_interval;
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return Ok(()),
                frame = stream.message() => {
                    match frame.map_err(|e| TopicError::Stream(e.into()))? {
                        Some(frame) => self.dispatch(frame).await?,
                        None => return Err(TopicError::Stream(tonic::Status::unavailable("stream closed by server").into())),
                    }
                }
                _ = tokio::time::sleep(flush_interval) => self.flush().await,
            }
        }
    }
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
        match inner.run_one_connection().await {
            Ok(()) => return,
            Err(err) => {
                inner.rollback_inflight_to_buffered().await;
                if !classify_retry(&err) {
                    tracing::error!(error = %err, "topic writer stream failed terminally");
                    inner.reject_all_pending(&err.to_string()).await;
                    return;
                }
                tracing::warn!(error = %err, attempt, "topic writer stream failed, reconnecting");
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

/// A resumable writer bound to one topic path and producer id (section
/// 4.6). `write()` is synchronous (it never awaits the network); the
/// returned [`WriteAwaiter`] resolves once the server acknowledges the
/// assigned `seqNo`.
pub struct TopicWriter {
    inner: Arc<Inner>,
    run_task: Mutex<Option<JoinHandle<()>>>,
}

impl TopicWriter {
    pub async fn connect(driver: Driver, config: WriterConfig) -> Result<Self, TopicError> {
        let cancel = CancellationToken::new();
        let inner = Inner::new(driver, config, cancel)?;
        let run_task = tokio::spawn(run(inner.clone()));
        Ok(Self { inner, run_task: Mutex::new(Some(run_task)) })
    }

    pub async fn write(&self, msg: WriteMessage) -> Result<WriteAwaiter, TopicError> {
        if !self.inner.accepting.load(Ordering::Acquire) {
            return Err(TopicError::Destroyed("writer is closed".into()));
        }
        if msg.data.len() > MAX_PAYLOAD_SIZE {
            return Err(TopicError::PayloadTooLarge { size: msg.data.len(), max: MAX_PAYLOAD_SIZE });
        }

        let seq_no = {
            let mut seq_no_mgr = self.inner.seq_no.lock().await;
            match msg.seq_no {
                Some(seq_no) => {
                    seq_no_mgr.accept_manual(seq_no)?;
                    seq_no
                }
                None => seq_no_mgr.next_auto()?,
            }
        };

        let uncompressed_size = msg.data.len() as i64;
        let (codec, data) = if msg.data.len() >= self.inner.config.min_raw_size {
            (self.inner.config.codec, self.inner.codec_impl.compress(&msg.data)?)
        } else {
            (CodecId::Raw, msg.data.to_vec())
        };

        let (tx, rx) = oneshot::channel();
        let created_at_ms = msg.created_at_ms.unwrap_or(0);

        {
            let mut win = self.inner.window.lock().await;
            win.messages.push_back(WriterMessage {
                seq_no,
                data: bytes::Bytes::from(data),
                codec,
                created_at_ms,
                metadata: msg.metadata,
                uncompressed_size,
                state: MessageState::Buffered,
                ack: Some(tx),
            });
            let byte_size = win.messages.back().unwrap().byte_size();
            win.buffer_size += byte_size;
            let over_budget = win.buffer_size > self.inner.config.max_buffer_bytes;
            drop(win);
            if over_budget {
                self.inner.flush().await;
            }
        }

        Ok(WriteAwaiter { rx })
    }

    /// Forces an immediate flush pass instead of waiting for the next
    /// timer tick.
    pub async fn flush(&self) {
        self.inner.flush().await;
    }

    /// Binds this writer to a transaction: acks return `WrittenInTx`, the
    /// commit hook flushes and awaits every outstanding ack before the host
    /// transaction commits, and the rollback hook cancels the stream.
    pub async fn bind_transaction(&self, tx: Arc<crate::transaction::Transaction>) {
        *self.inner.tx_ids.lock().await = Some((tx.session_id.clone(), tx.transaction_id.clone()));

        let inner = self.inner.clone();
        tx.on_commit(move || {
            let inner = inner.clone();
            async move {
                inner.flush().await;
                let deadline = tokio::time::Instant::now() + inner.config.graceful_shutdown_timeout;
                loop {
                    let drained = {
                        let win = inner.window.lock().await;
                        win.buffer_size == 0 && win.inflight_size == 0
                    };
                    if drained || tokio::time::Instant::now() >= deadline {
                        break;
                    }
                    tokio::time::sleep(Duration::from_millis(50)).await;
                }
                Ok(())
            }
        })
        .await;

        let inner = self.inner.clone();
        tx.on_rollback(move || {
            let inner = inner.clone();
            async move {
                inner.cancel.cancel();
                Ok(())
            }
        })
        .await;
    }

    /// Graceful shutdown: stop accepting writes, flush until buffered and
    /// inflight both drain (or the timeout elapses), then destroy.
    pub async fn close(&self) {
        self.inner.accepting.store(false, Ordering::Release);
        let deadline = tokio::time::Instant::now() + self.inner.config.graceful_shutdown_timeout;
        loop {
            self.inner.flush().await;
            let drained = {
                let win = self.inner.window.lock().await;
                win.buffer_size == 0 && win.inflight_size == 0
            };
            if drained || tokio::time::Instant::now() >= deadline {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        self.destroy("writer closed").await;
    }

    /// Immediate shutdown: rejects every pending ack with `reason` and
    /// tears the stream down without waiting for drainage.
    pub async fn destroy(&self, reason: impl Into<String>) {
        self.inner.accepting.store(false, Ordering::Release);
        let reason = reason.into();
        self.inner.reject_all_pending(&reason).await;
        self.inner.outgoing.close().await;
        self.inner.cancel.cancel();
        if let Some(task) = self.run_task.lock().await.take() {
            let _ = task.await;
        }
    }
}
