use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, unbounded};
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

use atoll_geom::GridCoord;
use atoll_world::{GenError, GenOutcome, TerrainGenerator};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenJob {
    pub coord: GridCoord,
    pub job_id: u64,
}

#[derive(Debug)]
pub struct GenOut {
    pub coord: GridCoord,
    pub job_id: u64,
    pub result: Result<GenOutcome, GenError>,
    pub t_gen_ms: u32,
}

fn process_gen_job(job: GenJob, generator: &TerrainGenerator, tx: &Sender<GenOut>) {
    let t0 = Instant::now();
    let result = generator.generate(job.coord);
    let t_gen_ms = t0.elapsed().as_millis().min(u128::from(u32::MAX)) as u32;
    let _ = tx.send(GenOut {
        coord: job.coord,
        job_id: job.job_id,
        result,
        t_gen_ms,
    });
}

/// Background heightmap synthesis. Jobs go in over one channel, results come
/// back over another and are drained by the owning thread.
pub struct GenWorkers {
    job_tx: Sender<GenJob>,
    res_rx: Receiver<GenOut>,
    _pool: ThreadPool,
    queued: Arc<AtomicUsize>,
    inflight: Arc<AtomicUsize>,
    workers: usize,
}

impl GenWorkers {
    /// `workers == 0` sizes the pool from the available parallelism.
    pub fn new(generator: Arc<TerrainGenerator>, workers: usize) -> Result<Self, ThreadPoolBuildError> {
        let workers = if workers == 0 {
            thread::available_parallelism().map(|n| n.get()).unwrap_or(4)
        } else {
            workers
        };
        let (job_tx, job_rx) = unbounded::<GenJob>();
        let (res_tx, res_rx) = unbounded::<GenOut>();
        let queued = Arc::new(AtomicUsize::new(0));
        let inflight = Arc::new(AtomicUsize::new(0));
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("atoll-gen-{i}"))
            .build()?;
        for _ in 0..workers {
            let rx = job_rx.clone();
            let tx = res_tx.clone();
            let generator = generator.clone();
            let queued = queued.clone();
            let inflight = inflight.clone();
            pool.spawn(move || {
                while let Ok(job) = rx.recv() {
                    queued.fetch_sub(1, Ordering::Relaxed);
                    inflight.fetch_add(1, Ordering::Relaxed);
                    process_gen_job(job, generator.as_ref(), &tx);
                    inflight.fetch_sub(1, Ordering::Relaxed);
                }
            });
        }
        log::info!(target: "runtime", "generation pool started with {workers} workers");
        Ok(Self {
            job_tx,
            res_rx,
            _pool: pool,
            queued,
            inflight,
            workers,
        })
    }

    #[inline]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Returns false if the pool has shut down.
    pub fn submit(&self, job: GenJob) -> bool {
        self.queued.fetch_add(1, Ordering::Relaxed);
        if self.job_tx.send(job).is_err() {
            self.queued.fetch_sub(1, Ordering::Relaxed);
            return false;
        }
        true
    }

    pub fn drain_results(&self) -> Vec<GenOut> {
        self.res_rx.try_iter().collect()
    }

    /// `(queued, inflight)`.
    pub fn queue_counts(&self) -> (usize, usize) {
        (
            self.queued.load(Ordering::Relaxed),
            self.inflight.load(Ordering::Relaxed),
        )
    }
}
