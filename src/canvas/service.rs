use crate::canvas::error::is_not_found;
use crate::canvas::messages::{StoreReply, StoreRequest};
use crate::canvas::store::DrawingStore;
use anyhow::{anyhow, Context, Result};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::JoinHandle;
use std::time::Duration;

const WORKER_JOIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Runs [`DrawingStore`] calls on a background thread. Completions are
/// handed back in request order through [`StoreWorker::try_recv`] or
/// [`StoreWorker::recv_timeout`] so the session owner can apply them
/// between drawing operations.
pub struct StoreWorker {
    request_tx: Option<Sender<StoreRequest>>,
    reply_rx: Receiver<StoreReply>,
    handle: Option<JoinHandle<()>>,
}

impl StoreWorker {
    pub fn spawn<S>(store: S) -> Result<Self>
    where
        S: DrawingStore + Send + 'static,
    {
        let (request_tx, request_rx) = mpsc::channel();
        let (reply_tx, reply_rx) = mpsc::channel();
        let handle = std::thread::Builder::new()
            .name("drawing-store".into())
            .spawn(move || run_worker(store, request_rx, reply_tx))
            .context("spawn drawing store worker thread")?;
        Ok(Self {
            request_tx: Some(request_tx),
            reply_rx,
            handle: Some(handle),
        })
    }

    pub fn send(&self, request: StoreRequest) -> Result<()> {
        let tx = self
            .request_tx
            .as_ref()
            .ok_or_else(|| anyhow!("drawing store worker already shut down"))?;
        tx.send(request)
            .map_err(|_| anyhow!("drawing store worker is not running"))
    }

    pub fn try_recv(&self) -> Option<StoreReply> {
        match self.reply_rx.try_recv() {
            Ok(reply) => Some(reply),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                tracing::warn!("drawing store worker reply channel disconnected");
                None
            }
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<StoreReply> {
        match self.reply_rx.recv_timeout(timeout) {
            Ok(reply) => Some(reply),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                tracing::warn!("drawing store worker reply channel disconnected");
                None
            }
        }
    }

    /// Asks the worker to stop after already queued requests and waits for it.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(tx) = self.request_tx.take() {
            let _ = tx.send(StoreRequest::Shutdown);
        }
        join_with_timeout(self.handle.take());
    }
}

impl Drop for StoreWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker<S: DrawingStore>(
    mut store: S,
    requests: Receiver<StoreRequest>,
    replies: Sender<StoreReply>,
) {
    tracing::debug!("drawing store worker started");
    while let Ok(request) = requests.recv() {
        let reply = match request {
            StoreRequest::Save {
                name,
                pixels,
                revision,
                generation,
            } => match store.save(&name, &pixels) {
                Ok(()) => StoreReply::Saved {
                    name,
                    revision,
                    generation,
                },
                Err(err) => {
                    tracing::error!(name, ?err, "background save failed");
                    StoreReply::SaveFailed {
                        name,
                        error: format!("{err:#}"),
                    }
                }
            },
            StoreRequest::Load { name } => match store.load(&name) {
                Ok(pixels) => StoreReply::Loaded { name, pixels },
                Err(err) => {
                    let not_found = is_not_found(&err);
                    if !not_found {
                        tracing::error!(name, ?err, "background load failed");
                    }
                    StoreReply::LoadFailed {
                        name,
                        error: format!("{err:#}"),
                        not_found,
                    }
                }
            },
            StoreRequest::ListNames => StoreReply::Names(store.list_names()),
            StoreRequest::Shutdown => break,
        };
        if replies.send(reply).is_err() {
            break;
        }
    }
    tracing::debug!("drawing store worker stopped");
}

fn join_with_timeout(handle: Option<JoinHandle<()>>) {
    let Some(handle) = handle else {
        return;
    };

    let (done_tx, done_rx) = mpsc::channel();
    std::thread::spawn(move || {
        let join_result = handle.join();
        let _ = done_tx.send(join_result);
    });

    match done_rx.recv_timeout(WORKER_JOIN_TIMEOUT) {
        Ok(Ok(())) => {}
        Ok(Err(_)) => tracing::error!("drawing store worker panicked"),
        Err(RecvTimeoutError::Timeout) => {
            tracing::error!("drawing store worker join timed out")
        }
        Err(RecvTimeoutError::Disconnected) => {
            tracing::error!("drawing store worker join channel disconnected")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::buffer::PixelBuffer;
    use crate::canvas::model::Color;
    use crate::canvas::store::MemoryStore;

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn replies_arrive_in_request_order() {
        let worker = StoreWorker::spawn(MemoryStore::new()).expect("spawn");
        let pixels = PixelBuffer::new(2, 2, Color::BLACK).expect("pixels");
        worker
            .send(StoreRequest::Save {
                name: "one".into(),
                pixels: pixels.clone(),
                revision: 3,
                generation: 1,
            })
            .expect("send save");
        worker
            .send(StoreRequest::Load { name: "one".into() })
            .expect("send load");
        worker.send(StoreRequest::ListNames).expect("send list");

        assert_eq!(
            worker.recv_timeout(WAIT),
            Some(StoreReply::Saved {
                name: "one".into(),
                revision: 3,
                generation: 1,
            })
        );
        assert_eq!(
            worker.recv_timeout(WAIT),
            Some(StoreReply::Loaded {
                name: "one".into(),
                pixels
            })
        );
        assert_eq!(
            worker.recv_timeout(WAIT),
            Some(StoreReply::Names(vec!["one".into()]))
        );
        worker.shutdown();
    }

    #[test]
    fn missing_drawing_reply_is_flagged_not_found() {
        let worker = StoreWorker::spawn(MemoryStore::new()).expect("spawn");
        worker
            .send(StoreRequest::Load {
                name: "ghost".into(),
            })
            .expect("send");
        match worker.recv_timeout(WAIT) {
            Some(StoreReply::LoadFailed { not_found, .. }) => assert!(not_found),
            other => panic!("unexpected reply {other:?}"),
        }
    }

    #[test]
    fn try_recv_is_empty_when_idle() {
        let worker = StoreWorker::spawn(MemoryStore::new()).expect("spawn");
        assert_eq!(worker.try_recv(), None);
    }
}
