/// Performance measurement utilities
/// Frame stats are always collected; global counters only with `profiling`.
use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

pub struct PerfTimer {
    name: &'static str,
    start: Instant,
}

impl PerfTimer {
    #[inline]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for PerfTimer {
    fn drop(&mut self) {
        debug!("[PERF] {}: {}μs", self.name, self.elapsed().as_micros());
    }
}

/// Per-frame render statistics, returned by `Renderer::render`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    pub rays_cast: u64,
    pub dda_steps: u64,
    pub hits: u64,
    pub frame_time: Duration,
}

impl FrameStats {
    #[inline]
    pub fn merge(&mut self, other: &FrameStats) {
        self.rays_cast += other.rays_cast;
        self.dda_steps += other.dda_steps;
        self.hits += other.hits;
    }

    /// Average DDA iterations per ray
    pub fn average_steps(&self) -> f64 {
        if self.rays_cast == 0 {
            0.0
        } else {
            self.dda_steps as f64 / self.rays_cast as f64
        }
    }

    pub fn hit_ratio(&self) -> f64 {
        if self.rays_cast == 0 {
            0.0
        } else {
            self.hits as f64 / self.rays_cast as f64
        }
    }
}

/// Process-wide counters, bumped only when built with `profiling`
pub struct EngineCounters {
    pub frames_rendered: AtomicU64,
    pub rays_cast: AtomicU64,
    pub dda_steps: AtomicU64,
    pub chunks_generated: AtomicU64,
    pub chunks_evicted: AtomicU64,
}

impl EngineCounters {
    pub const fn new() -> Self {
        Self {
            frames_rendered: AtomicU64::new(0),
            rays_cast: AtomicU64::new(0),
            dda_steps: AtomicU64::new(0),
            chunks_generated: AtomicU64::new(0),
            chunks_evicted: AtomicU64::new(0),
        }
    }

    pub fn reset(&self) {
        self.frames_rendered.store(0, Ordering::Relaxed);
        self.rays_cast.store(0, Ordering::Relaxed);
        self.dda_steps.store(0, Ordering::Relaxed);
        self.chunks_generated.store(0, Ordering::Relaxed);
        self.chunks_evicted.store(0, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            frames_rendered: self.frames_rendered.load(Ordering::Relaxed),
            rays_cast: self.rays_cast.load(Ordering::Relaxed),
            dda_steps: self.dda_steps.load(Ordering::Relaxed),
            chunks_generated: self.chunks_generated.load(Ordering::Relaxed),
            chunks_evicted: self.chunks_evicted.load(Ordering::Relaxed),
        }
    }
}

impl Default for EngineCounters {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CounterSnapshot {
    pub frames_rendered: u64,
    pub rays_cast: u64,
    pub dda_steps: u64,
    pub chunks_generated: u64,
    pub chunks_evicted: u64,
}

pub static ENGINE_COUNTERS: EngineCounters = EngineCounters::new();

/// Scoped timer, logs on drop
#[macro_export]
macro_rules! perf_scope {
    ($name:expr) => {
        let _timer = $crate::perf::PerfTimer::new($name);
    };
}

/// Add to a counter (only when profiling feature is enabled)
#[macro_export]
macro_rules! count_add {
    ($counter:expr, $value:expr) => {
        #[cfg(feature = "profiling")]
        {
            $counter.fetch_add($value as u64, std::sync::atomic::Ordering::Relaxed);
        }
    };
}
