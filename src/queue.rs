//! Bounded shape processing queue.
//!
//! ```text
//!              ┌──────────┐
//!  enqueue ──► │ pending  │
//!              └────┬─────┘
//!                   │ work channel
//!     ┌─────────────┼─────────────┐
//!     ▼             ▼             ▼
//!  worker 1  ...  worker n   (n = min(limit, jobs))
//!     │             │             │
//!     └─────────────┼─────────────┘
//!                   │ completion channel
//!                   ▼
//!            coordinating thread ──► distribute ──► ShapeCollection
//! ```
//!
//! Each worker owns the shape it is processing until it sends the outcome on
//! the completion channel, so at most `limit` shapes are inside the pipeline
//! at any time. The worker scope ending is the "drained" signal. Outcomes are
//! then distributed in submission order, which keeps duplicate handling
//! deterministic.

use std::sync::Arc;
use std::thread;

use crossbeam::channel;

use crate::collection::ShapeCollection;
use crate::config::ShapeConfig;
use crate::error::{Result, SpriteError};
use crate::shape::{Shape, SkippedShape, distribute};
use crate::transform::{Cleaner, DimensionRenderer};
use crate::{debug, log};

/// Default number of concurrently processed shapes.
pub const DEFAULT_LIMIT: usize = 4;

/// A source document waiting to be processed.
#[derive(Debug, Clone)]
pub struct Job {
    pub name: String,
    pub source: Vec<u8>,
    pub config: Arc<ShapeConfig>,
}

#[derive(Debug)]
pub struct ProcessingQueue {
    limit: usize,
    pending: Vec<Job>,
}

impl Default for ProcessingQueue {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT)
    }
}

impl ProcessingQueue {
    /// A queue running at most `limit` workers (`0` is treated as `1`).
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            pending: Vec::new(),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn enqueue(&mut self, name: impl Into<String>, source: Vec<u8>, config: Arc<ShapeConfig>) {
        self.pending.push(Job {
            name: name.into(),
            source,
            config,
        });
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Process all pending jobs and append the results to `collection`.
    ///
    /// Returns the shapes that were dropped, in submission order.
    pub fn run(
        &mut self,
        cleaner: &dyn Cleaner,
        renderer: &dyn DimensionRenderer,
        collection: &mut ShapeCollection,
    ) -> Vec<SkippedShape> {
        let jobs = std::mem::take(&mut self.pending);
        if jobs.is_empty() {
            return Vec::new();
        }

        let total = jobs.len();
        let workers = self.limit.min(total);
        debug!("queue"; "processing {} shapes with {} workers", total, workers);

        let outcomes = Self::process_all(jobs, workers, cleaner, renderer);

        let mut skipped = Vec::new();
        for (job, outcome) in outcomes {
            match outcome {
                Ok(shape) => Self::append(shape, &job, collection, &mut skipped),
                Err(reason) => {
                    log!("skip"; "{}: {}", job.name, reason);
                    skipped.push(SkippedShape {
                        name: job.name,
                        reason,
                    });
                }
            }
        }
        skipped
    }

    /// Run the pipeline on a bounded pool; outcomes come back in submission order.
    fn process_all(
        jobs: Vec<Job>,
        workers: usize,
        cleaner: &dyn Cleaner,
        renderer: &dyn DimensionRenderer,
    ) -> Vec<(Job, Result<Shape>)> {
        let total = jobs.len();
        let (work_tx, work_rx) = channel::unbounded::<(usize, Job)>();
        let (done_tx, done_rx) = channel::unbounded::<(usize, Job, Result<Shape>)>();

        for entry in jobs.into_iter().enumerate() {
            // Cannot fail: the receiver is alive until the scope below ends
            work_tx.send(entry).ok();
        }
        drop(work_tx);

        let mut slots: Vec<Option<(Job, Result<Shape>)>> = (0..total).map(|_| None).collect();

        thread::scope(|scope| {
            for _ in 0..workers {
                let work = work_rx.clone();
                let done = done_tx.clone();
                scope.spawn(move || {
                    for (index, job) in work.iter() {
                        let outcome =
                            Shape::process(&job.name, &job.source, &job.config, cleaner, renderer);
                        if done.send((index, job, outcome)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(done_tx);

            for (index, job, outcome) in done_rx.iter() {
                debug!("queue"; "finished {}", job.name);
                slots[index] = Some((job, outcome));
            }
        });

        slots.into_iter().flatten().collect()
    }

    fn append(
        shape: Shape,
        job: &Job,
        collection: &mut ShapeCollection,
        skipped: &mut Vec<SkippedShape>,
    ) {
        let alignments = job.config.alignment.resolve(shape.id());
        for shape in distribute(shape, &alignments, &job.config.id.pseudo) {
            if collection.contains(shape.id()) {
                log!("skip"; "{}: duplicate shape id `{}`", job.name, shape.id());
                skipped.push(SkippedShape {
                    name: job.name.clone(),
                    reason: SpriteError::invalid_input(
                        &job.name,
                        format!("duplicate shape id `{}`", shape.id()),
                    ),
                });
                continue;
            }
            collection.push(shape);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AlignmentRules;
    use crate::error::TransformError;
    use crate::shape::Alignment;
    use crate::transform::{Passthrough, UsvgRenderer};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Cleaner that records how many calls run at the same time.
    #[derive(Default)]
    struct Tracker {
        active: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    impl Cleaner for Tracker {
        fn clean(&self, svg: &[u8]) -> std::result::Result<Vec<u8>, TransformError> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(15));
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(svg.to_vec())
        }
    }

    fn square(size: u32) -> Vec<u8> {
        format!(r#"<svg width="{size}" height="{size}"/>"#).into_bytes()
    }

    fn fill(queue: &mut ProcessingQueue, count: usize) {
        let config = Arc::new(ShapeConfig::default());
        for i in 0..count {
            queue.enqueue(format!("shape-{i:02}.svg"), square(10), Arc::clone(&config));
        }
    }

    #[test]
    fn test_concurrency_is_bounded() {
        let tracker = Tracker::default();
        let mut queue = ProcessingQueue::new(3);
        fill(&mut queue, 12);

        let mut collection = ShapeCollection::new();
        let skipped = queue.run(&tracker, &UsvgRenderer::default(), &mut collection);

        assert!(skipped.is_empty());
        assert_eq!(collection.len(), 12);
        assert_eq!(tracker.calls.load(Ordering::SeqCst), 12);
        let peak = tracker.peak.load(Ordering::SeqCst);
        assert!(peak >= 1 && peak <= 3, "peak concurrency {peak}");
        assert!(queue.is_empty());
    }

    #[test]
    fn test_zero_limit_runs_serially() {
        let tracker = Tracker::default();
        let mut queue = ProcessingQueue::new(0);
        assert_eq!(queue.limit(), 1);
        fill(&mut queue, 4);

        let mut collection = ShapeCollection::new();
        queue.run(&tracker, &UsvgRenderer::default(), &mut collection);
        assert_eq!(tracker.peak.load(Ordering::SeqCst), 1);
        assert_eq!(collection.len(), 4);
    }

    struct Unmeasurable;

    impl DimensionRenderer for Unmeasurable {
        fn bounds(&self, _svg: &[u8]) -> std::result::Result<crate::svg::ViewBox, TransformError> {
            Err(TransformError::new("no content"))
        }
    }

    #[test]
    fn test_failures_are_isolated() {
        let mut queue = ProcessingQueue::default();
        let config = Arc::new(ShapeConfig::default());
        queue.enqueue("good.svg", square(5), Arc::clone(&config));
        queue.enqueue("bad.svg", b"<html/>".to_vec(), Arc::clone(&config));
        queue.enqueue("empty.svg", b"<svg/>".to_vec(), Arc::clone(&config));

        let mut collection = ShapeCollection::new();
        let skipped = queue.run(&Passthrough, &Unmeasurable, &mut collection);

        assert_eq!(collection.len(), 1);
        assert_eq!(collection.shapes()[0].id(), "good");
        let names: Vec<_> = skipped.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["bad.svg", "empty.svg"]);
        assert!(matches!(skipped[0].reason, SpriteError::InvalidInput { .. }));
        assert!(matches!(
            skipped[1].reason,
            SpriteError::DimensionsCalculation { .. }
        ));
    }

    #[test]
    fn test_distribution_and_duplicates() {
        let mut alignment = AlignmentRules::default();
        alignment.push(
            "arrow",
            vec![Alignment::new("%s", 0.0), Alignment::new("%s-right", 1.0)],
        );
        let config = Arc::new(ShapeConfig {
            alignment,
            ..ShapeConfig::default()
        });

        let mut queue = ProcessingQueue::default();
        queue.enqueue("arrow.svg", square(8), Arc::clone(&config));
        queue.enqueue("arrow-right.svg", square(8), Arc::clone(&config));
        queue.enqueue("other.svg", square(8), Arc::clone(&config));

        let mut collection = ShapeCollection::new();
        let skipped = queue.run(&Passthrough, &UsvgRenderer::default(), &mut collection);

        // arrow + its copy; the later `arrow-right` source collides with the copy
        assert_eq!(collection.len(), 3);
        assert!(collection.get("arrow-right").unwrap().master() == Some("arrow"));
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].name, "arrow-right.svg");
    }
}
