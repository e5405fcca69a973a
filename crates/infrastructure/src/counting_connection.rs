use custos_application::ports::StorePort;
use custos_domain::{LogStatus, LogUpdate};
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;

const FLUSH_INTERVAL_MS: u64 = 1_000;

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Wraps the upstream TCP stream bound to one log row, counting bytes in
/// both directions and flushing the totals to the store at most once per
/// second while the connection is open (C6, §4.5). A final flush on drop is
/// unconditional and happens synchronously via `finish()` — callers must call
/// it before letting the connection go, since `Drop` cannot run async code.
pub struct CountingConnection {
    inner: TcpStream,
    bytes_sent: Arc<AtomicI64>,
    bytes_recv: Arc<AtomicI64>,
    reported_sent: AtomicI64,
    reported_recv: AtomicI64,
    last_flush_ms: AtomicU64,
    flushing: std::sync::atomic::AtomicBool,
    log_id: String,
    store: Arc<dyn StorePort>,
}

impl CountingConnection {
    pub fn new(inner: TcpStream, log_id: String, store: Arc<dyn StorePort>) -> Self {
        Self {
            inner,
            bytes_sent: Arc::new(AtomicI64::new(0)),
            bytes_recv: Arc::new(AtomicI64::new(0)),
            reported_sent: AtomicI64::new(0),
            reported_recv: AtomicI64::new(0),
            last_flush_ms: AtomicU64::new(0),
            flushing: std::sync::atomic::AtomicBool::new(false),
            log_id,
            store,
        }
    }

    /// Attempts a throttled flush: at most once per `FLUSH_INTERVAL_MS`,
    /// gated by a CAS on `flushing` so concurrent read/write polls never race
    /// each other into double-flushing the same deltas.
    fn maybe_flush(&self) {
        let now = now_ms();
        let last = self.last_flush_ms.load(Ordering::Acquire);
        if now.saturating_sub(last) < FLUSH_INTERVAL_MS {
            return;
        }
        if self
            .flushing
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return;
        }

        self.last_flush_ms.store(now, Ordering::Release);
        self.flush_deltas();
        self.flushing.store(false, Ordering::Release);
    }

    fn flush_deltas(&self) {
        let sent = self.bytes_sent.load(Ordering::Acquire);
        let recv = self.bytes_recv.load(Ordering::Acquire);
        let reported_sent = self.reported_sent.load(Ordering::Acquire);
        let reported_recv = self.reported_recv.load(Ordering::Acquire);

        let delta_sent = sent - reported_sent;
        let delta_recv = recv - reported_recv;
        if delta_sent == 0 && delta_recv == 0 {
            return;
        }

        self.reported_sent.store(sent, Ordering::Release);
        self.reported_recv.store(recv, Ordering::Release);

        let store = self.store.clone();
        let log_id = self.log_id.clone();
        tokio::spawn(async move {
            let _ = store.add_traffic(delta_sent, delta_recv).await;
            let _ = store
                .update_log(LogUpdate::new(log_id).with_bytes(sent, recv))
                .await;
        });
    }

    /// Unconditional final flush, awaited synchronously. Must be called
    /// before the connection is dropped so the row's totals and the global
    /// Stats never lag the socket's actual lifetime.
    pub async fn finish(&self, final_status: Option<LogStatus>) {
        let sent = self.bytes_sent.load(Ordering::Acquire);
        let recv = self.bytes_recv.load(Ordering::Acquire);
        let reported_sent = self.reported_sent.swap(sent, Ordering::AcqRel);
        let reported_recv = self.reported_recv.swap(recv, Ordering::AcqRel);

        let delta_sent = sent - reported_sent;
        let delta_recv = recv - reported_recv;
        if delta_sent != 0 || delta_recv != 0 {
            let _ = self.store.add_traffic(delta_sent, delta_recv).await;
        }

        let mut update = LogUpdate::new(self.log_id.clone()).with_bytes(sent, recv);
        if let Some(status) = final_status {
            update = update.with_status(status);
        }
        let _ = self.store.update_log(update).await;
    }
}

impl AsyncRead for CountingConnection {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let before = buf.filled().len();
        let result = Pin::new(&mut self.inner).poll_read(cx, buf);
        if let Poll::Ready(Ok(())) = &result {
            let read = buf.filled().len() - before;
            if read > 0 {
                self.bytes_recv.fetch_add(read as i64, Ordering::Relaxed);
                self.maybe_flush();
            }
        }
        result
    }
}

impl AsyncWrite for CountingConnection {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let result = Pin::new(&mut self.inner).poll_write(cx, buf);
        if let Poll::Ready(Ok(n)) = &result {
            self.bytes_sent.fetch_add(*n as i64, Ordering::Relaxed);
            self.maybe_flush();
        }
        result
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}
