/// Background asset loading.
///
/// One worker thread reads asset bytes from the `AssetSource` and runs the
/// requested deserializer; results come back through one-shot channels.

use std::sync::Arc;
use std::thread::JoinHandle;
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use crate::error::{Error, Result};
use crate::{engine_debug, engine_error};
use super::{AssetId, AssetSource};

type StreamerJob = Box<dyn FnOnce(&dyn AssetSource) + Send>;

/// Completion handle of one streamed load
pub struct PendingLoad<T> {
    asset_id: AssetId,
    receiver: Receiver<Result<T>>,
}

impl<T> PendingLoad<T> {
    pub fn asset_id(&self) -> AssetId {
        self.asset_id
    }

    /// Non-blocking poll. `None` while the load is still in flight.
    pub fn try_take(&self) -> Option<Result<T>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(Error::BackendError(format!(
                "Resource streamer dropped the load of asset {:#010x}", self.asset_id
            )))),
        }
    }

    /// Block until the load finished
    pub fn wait(self) -> Result<T> {
        self.receiver.recv().map_err(|_| Error::BackendError(format!(
            "Resource streamer dropped the load of asset {:#010x}", self.asset_id
        )))?
    }
}

/// Asset streamer with a single worker thread
pub struct ResourceStreamer {
    job_sender: Option<Sender<StreamerJob>>,
    worker: Option<JoinHandle<()>>,
}

impl ResourceStreamer {
    /// Start the worker thread
    pub fn new(asset_source: Arc<dyn AssetSource>) -> Result<Self> {
        let (job_sender, job_receiver) = crossbeam_channel::unbounded::<StreamerJob>();
        let worker = std::thread::Builder::new()
            .name("nebula-resource-streamer".to_string())
            .spawn(move || {
                while let Ok(job) = job_receiver.recv() {
                    job(asset_source.as_ref());
                }
            })
            .map_err(|e| Error::InitializationFailed(format!("Resource streamer thread: {}", e)))?;

        engine_debug!("nebula::ResourceStreamer", "Worker thread started");

        Ok(Self {
            job_sender: Some(job_sender),
            worker: Some(worker),
        })
    }

    /// Queue the load of `asset_id`; `deserialize` runs on the worker thread
    pub fn request<T, F>(&self, asset_id: AssetId, deserialize: F) -> Result<PendingLoad<T>>
    where
        T: Send + 'static,
        F: FnOnce(&[u8]) -> Result<T> + Send + 'static,
    {
        let (result_sender, result_receiver) = crossbeam_channel::bounded::<Result<T>>(1);
        let job: StreamerJob = Box::new(move |asset_source: &dyn AssetSource| {
            let result = asset_source.read_asset(asset_id)
                .and_then(|bytes| deserialize(&bytes));
            if let Err(error) = &result {
                engine_error!("nebula::ResourceStreamer",
                    "Loading asset {:#010x} failed: {}", asset_id, error);
            }
            // The requester may have gone away, nothing to report then
            let _ = result_sender.send(result);
        });

        self.job_sender.as_ref()
            .ok_or_else(|| Error::BackendError("Resource streamer is shut down".to_string()))?
            .send(job)
            .map_err(|_| Error::BackendError("Resource streamer worker is gone".to_string()))?;

        Ok(PendingLoad { asset_id, receiver: result_receiver })
    }
}

impl Drop for ResourceStreamer {
    fn drop(&mut self) {
        // Closing the job channel ends the worker loop
        self.job_sender = None;
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
#[path = "resource_streamer_tests.rs"]
mod tests;
