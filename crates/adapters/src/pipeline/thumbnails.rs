use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex};

use film_tagger_application::{ApplicationError, ThumbnailGenerator, ThumbnailPipeline};
use film_tagger_domain::ThumbnailResult;
use log::{debug, warn};
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Decodes thumbnails on a rayon pool. Every submit or cancel starts a new
/// generation; queued jobs of older generations are skipped, while a job that
/// already started still reports.
pub struct BackgroundThumbnailPipeline {
    pool: ThreadPool,
    generator: Arc<dyn ThumbnailGenerator>,
    generation: Arc<AtomicU64>,
    result_tx: mpsc::Sender<ThumbnailResult>,
    result_rx: Mutex<mpsc::Receiver<ThumbnailResult>>,
}

impl BackgroundThumbnailPipeline {
    /// `threads == 0` lets rayon pick the pool size.
    pub fn new(
        generator: Arc<dyn ThumbnailGenerator>,
        threads: usize,
    ) -> Result<Self, ApplicationError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("thumbnail-{index}"))
            .build()
            .map_err(|error| ApplicationError::Io(format!("thumbnail pool: {error}")))?;
        let (result_tx, result_rx) = mpsc::channel();
        Ok(Self {
            pool,
            generator,
            generation: Arc::new(AtomicU64::new(0)),
            result_tx,
            result_rx: Mutex::new(result_rx),
        })
    }
}

impl ThumbnailPipeline for BackgroundThumbnailPipeline {
    fn submit(&self, paths: Vec<PathBuf>, size: u32) -> Result<(), ApplicationError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("queueing {} thumbnail job(s), generation {generation}", paths.len());

        for path in paths {
            let generator = Arc::clone(&self.generator);
            let current = Arc::clone(&self.generation);
            let result_tx = self.result_tx.clone();
            self.pool.spawn(move || {
                if current.load(Ordering::SeqCst) != generation {
                    return;
                }
                let generated =
                    panic::catch_unwind(AssertUnwindSafe(|| generator.generate(&path, size)));
                let thumbnail = match generated {
                    Ok(Ok(thumbnail)) => Some(thumbnail),
                    Ok(Err(error)) => {
                        warn!("thumbnail failed for {}: {error}", path.display());
                        None
                    }
                    Err(_) => {
                        warn!("thumbnail decoder panicked on {}", path.display());
                        None
                    }
                };
                let _ = result_tx.send(ThumbnailResult { path, thumbnail });
            });
        }
        Ok(())
    }

    fn try_receive(&self) -> Result<Option<ThumbnailResult>, ApplicationError> {
        let receiver = self
            .result_rx
            .lock()
            .map_err(|_| ApplicationError::Io("thumbnail result lock poisoned".to_string()))?;
        match receiver.try_recv() {
            Ok(result) => Ok(Some(result)),
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => Err(ApplicationError::Io(
                "thumbnail result channel disconnected".to_string(),
            )),
        }
    }

    fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}
