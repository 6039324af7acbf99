use std::any::Any;
use std::fmt::{Debug, Formatter};
use std::panic::{self, AssertUnwindSafe};
use std::thread::JoinHandle;

use crate::error::ModelStoreError;

type BoxAny = Box<dyn Any + Send>;

struct Call<M> {
    f: Box<dyn FnOnce(&mut M) -> BoxAny + Send>,
    ret: crossbeam::channel::Sender<std::thread::Result<BoxAny>>,
}

/// Owns a model on a dedicated thread for the lifetime of the host.
///
/// The model type only needs to be `Send`: every access is shipped to the host
/// thread as a closure, so callers on any number of threads share it through
/// [`ModelAccessor`] without the model itself being `Sync`.
pub struct ModelHost<M> {
    accessor: ModelAccessor<M>,
    abort_tx: crossbeam::channel::Sender<()>,
    join_handle: Option<JoinHandle<()>>,
}

impl<M: Send + 'static> ModelHost<M> {
    pub fn spawn(model: M) -> Self {
        let (abort_tx, abort_rx) = crossbeam::channel::bounded::<()>(1);
        let (tx, rx) = crossbeam::channel::unbounded::<Call<M>>();
        let join_handle = std::thread::Builder::new()
            .name("model-host".to_string())
            .spawn(move || {
                let mut model = model;
                loop {
                    crossbeam::channel::select! {
                        recv(rx) -> call => match call {
                            Ok(Call { f, ret }) => {
                                // A panicking call must not take the host down with it.
                                let result = panic::catch_unwind(AssertUnwindSafe(|| f(&mut model)));
                                let _ = ret.send(result);
                            }
                            Err(_) => break,
                        },
                        recv(abort_rx) -> _ => break,
                    }
                }
                log::debug!("Model host thread stopped");
            })
            .ok();

        if join_handle.is_none() {
            log::error!("Failed to spawn the model host thread");
        }

        Self {
            accessor: ModelAccessor { tx },
            abort_tx,
            join_handle,
        }
    }
}

impl<M> ModelHost<M> {
    pub fn accessor(&self) -> ModelAccessor<M> {
        self.accessor.clone()
    }
}

impl<M> std::ops::Deref for ModelHost<M> {
    type Target = ModelAccessor<M>;

    fn deref(&self) -> &Self::Target {
        &self.accessor
    }
}

impl<M> Drop for ModelHost<M> {
    fn drop(&mut self) {
        let _ = self.abort_tx.send(());
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.join();
        }
    }
}

/// Cloneable handle used to run closures against a hosted model.
pub struct ModelAccessor<M> {
    tx: crossbeam::channel::Sender<Call<M>>,
}

impl<M> Clone for ModelAccessor<M> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<M> Debug for ModelAccessor<M> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelAccessor")
            .field("model", &std::any::type_name::<M>())
            .finish()
    }
}

impl<M> ModelAccessor<M> {
    /// Runs `f` on the host thread and blocks until it returns.
    pub fn with<R: Send + 'static>(
        &self,
        f: impl FnOnce(&mut M) -> R + Send + 'static,
    ) -> Result<R, ModelStoreError> {
        let (ret_tx, ret_rx) = crossbeam::channel::bounded(1);
        self.tx
            .send(Call {
                f: Box::new(move |m| Box::new(f(m)) as BoxAny),
                ret: ret_tx,
            })
            .map_err(|_| ModelStoreError::HostUnavailable)?;

        let ret = ret_rx
            .recv()
            .map_err(|_| ModelStoreError::HostUnavailable)?
            .map_err(|payload| ModelStoreError::Inference(panic_message(payload.as_ref())))?;

        ret.downcast::<R>()
            .map(|r| *r)
            .map_err(|_| ModelStoreError::HostUnavailable)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "model call panicked".to_string()
    }
}
