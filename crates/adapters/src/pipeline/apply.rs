use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use film_tagger_application::{
    ApplicationError, ApplyEvent, ApplyPipeline, ApplyRunner, BackupStore, Clock, MetadataWriter,
};
use film_tagger_domain::{ApplyOptions, ApplyProgress, WriteTask};
use log::info;

/// Runs one apply at a time on a dedicated worker thread and streams its
/// progress back over a channel.
pub struct BackgroundApplyPipeline {
    writer: Arc<dyn MetadataWriter>,
    backups: Arc<dyn BackupStore>,
    clock: Arc<dyn Clock>,
    cancel: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    events: Mutex<Option<mpsc::Receiver<ApplyEvent>>>,
}

impl BackgroundApplyPipeline {
    pub fn new(
        writer: Arc<dyn MetadataWriter>,
        backups: Arc<dyn BackupStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            writer,
            backups,
            clock,
            cancel: Arc::new(AtomicBool::new(false)),
            running: Arc::new(AtomicBool::new(false)),
            events: Mutex::new(None),
        }
    }
}

impl ApplyPipeline for BackgroundApplyPipeline {
    fn start(&self, tasks: Vec<WriteTask>, options: ApplyOptions) -> Result<(), ApplicationError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(ApplicationError::Busy(
                "an apply is already running".to_string(),
            ));
        }
        self.cancel.store(false, Ordering::SeqCst);

        let (event_tx, event_rx) = mpsc::channel();
        let writer = Arc::clone(&self.writer);
        let backups = Arc::clone(&self.backups);
        let clock = Arc::clone(&self.clock);
        let cancel = Arc::clone(&self.cancel);
        let running = Arc::clone(&self.running);

        let spawned = thread::Builder::new()
            .name("apply-worker".to_string())
            .spawn(move || {
                info!("apply worker started with {} task(s)", tasks.len());
                let runner = ApplyRunner::new(&*writer, &*backups, &*clock);
                let outcome = runner.run(&tasks, &options, &cancel, &mut |update: ApplyProgress| {
                    let _ = event_tx.send(ApplyEvent::Progress(update));
                });
                running.store(false, Ordering::SeqCst);
                let _ = event_tx.send(ApplyEvent::Finished(outcome));
            });

        if let Err(error) = spawned {
            self.running.store(false, Ordering::SeqCst);
            return Err(ApplicationError::Io(format!(
                "could not start apply worker: {error}"
            )));
        }

        let mut events = self
            .events
            .lock()
            .map_err(|_| ApplicationError::Io("apply event lock poisoned".to_string()))?;
        *events = Some(event_rx);
        Ok(())
    }

    fn try_receive(&self) -> Result<Option<ApplyEvent>, ApplicationError> {
        let mut events = self
            .events
            .lock()
            .map_err(|_| ApplicationError::Io("apply event lock poisoned".to_string()))?;
        let Some(receiver) = events.as_ref() else {
            return Ok(None);
        };

        match receiver.try_recv() {
            Ok(event) => {
                if matches!(event, ApplyEvent::Finished(_)) {
                    *events = None;
                }
                Ok(Some(event))
            }
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => {
                *events = None;
                self.running.store(false, Ordering::SeqCst);
                Err(ApplicationError::Io(
                    "apply worker stopped without reporting an outcome".to_string(),
                ))
            }
        }
    }

    fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }
}
