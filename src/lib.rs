//! # taskloom
//!
//! **Taskloom** is an in-process task orchestration library.
//!
//! It provides a unified surface for three scheduling disciplines —
//! one-shot, periodic and event-triggered — together with
//! level-partitioned task flows and a lightweight pub/sub bus. A program
//! composes units of work, expresses dependencies and timing, and hands
//! them to the library; the library executes them on a shared worker
//! pool according to priority and readiness.
//!
//! ## Features
//!
//! | Area            | Description                                                        | Key types / functions                          |
//! |-----------------|--------------------------------------------------------------------|------------------------------------------------|
//! | **Tasks**       | Units of work with a kind, priority and completion handle.         | [`Task`], [`make_once_task`], [`CompletionHandle`] |
//! | **Flows**       | Level-partitioned DAGs of one-shot tasks, submitted atomically.    | [`Flow`]                                       |
//! | **Scheduling**  | Immediate, delayed, periodic and event-triggered execution.        | [`Scheduler`], [`schedule_at`], [`emit_event`] |
//! | **Worker pool** | Fixed threads draining a priority-ordered ready queue.             | [`WorkerPool`]                                 |
//! | **Pub/sub**     | Topic-keyed fan-out into bounded per-subscriber queues.            | [`Bus`], [`Subscriber`], [`publish`]           |
//! | **Errors**      | Typed, call-site-local errors with stable log labels.              | [`ScheduleError`], [`FlowError`], [`TaskError`]|
//! | **Configuration** | Worker count, queue capacity, timer spin threshold.              | [`Config`]                                     |
//!
//! Everything runs on plain OS threads: the worker pool, a single
//! dedicated timer thread and any number of submitter threads
//! (completion hooks re-enter the scheduler from workers). There is no
//! async surface.
//!
//! ```no_run
//! use taskloom::{make_once_task, Config, Flow, Runtime};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let rt = Runtime::new(Config::default());
//!     rt.start();
//!
//!     // A bare one-shot with a typed completion handle.
//!     let (task, answer) = make_once_task(|| 6 * 7);
//!     rt.scheduler().schedule_now(&task)?;
//!     assert_eq!(answer.wait()?, 42);
//!
//!     // A two-level flow: level 0 completes before level 1 starts.
//!     let mut flow = Flow::new(2);
//!     let (load, _) = make_once_task(|| println!("load"));
//!     let (report, report_done) = make_once_task(|| println!("report"));
//!     flow.add(0, &load)?;
//!     flow.add(1, &report)?;
//!     flow.finish();
//!     rt.scheduler().schedule_flow(&flow)?;
//!     report_done.wait()?;
//!
//!     rt.shutdown();
//!     Ok(())
//! }
//! ```
//!
//! A process-wide default runtime backs the crate-level free functions
//! ([`schedule_now`], [`publish`], [`run`], …); it is built lazily on
//! first use and torn down by [`shutdown`].
//!
//! ---

mod bus;
mod config;
mod error;
mod global;
mod pool;
mod runtime;
mod sched;
mod sync;
mod tasks;

pub mod time;

// ---- Public re-exports ----

pub use bus::{Bus, Subscriber};
pub use config::{Config, DEFAULT_QUEUE_CAPACITY, DEFAULT_SPIN_THRESHOLD, DEFAULT_WORKERS};
pub use error::{FlowError, ScheduleError, TaskError};
pub use global::{
    default_runtime, emit_event, publish, run, schedule_at, schedule_event, schedule_flow,
    schedule_interval, schedule_now, shutdown, subscribe, unsubscribe,
};
pub use pool::WorkerPool;
pub use runtime::Runtime;
pub use sched::Scheduler;
pub use tasks::{
    make_event_task, make_interval_task, make_once_task, CompletionHandle, Flow, Task, TaskId,
    TaskKind,
};
