extern crate alloc;

use alloc::boxed::Box;
use core::cell::RefCell;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

use critical_section::Mutex;
use defmt::{info, warn, Format, Formatter};
use futures::task::noop_waker;
use heapless::spsc::Queue;

// spsc::Queue keeps one slot free
const TASK_CAPACITY: usize = 8;

type Task = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Round-robin executor: every pending task is polled once per pass.
pub struct Executor {
    tasks: Mutex<RefCell<Queue<Task, TASK_CAPACITY>>>,
}

impl Format for Executor {
    fn format(&self, fmt: Formatter) {
        defmt::write!(fmt, "Executor: task_num = {}", self.len());
    }
}

impl Executor {
    pub const fn new() -> Self {
        Executor { tasks: Mutex::new(RefCell::new(Queue::new())) }
    }

    fn len(&self) -> usize {
        critical_section::with(|cs| self.tasks.borrow(cs).borrow().len())
    }

    fn pop(&self) -> Option<Task> {
        critical_section::with(|cs| self.tasks.borrow(cs).borrow_mut().dequeue())
    }

    fn push(&self, task: Task) -> Result<(), Task> {
        critical_section::with(|cs| self.tasks.borrow(cs).borrow_mut().enqueue(task))
    }

    pub fn spawn(&self, fut: impl Future<Output = ()> + Send + 'static) {
        match self.push(Box::pin(fut)) {
            Ok(()) => info!("Added one task, task num = {}", self.len()),
            Err(_) => warn!("Too many tasks, ignoring new task"),
        }
    }

    /// Poll until every task has completed.
    pub fn run(&self) {
        let waker = noop_waker();
        let mut context = Context::from_waker(&waker);

        while let Some(mut task) = self.pop() {
            match task.as_mut().poll(&mut context) {
                Poll::Ready(()) => info!("Task completed, task num = {}", self.len()),
                Poll::Pending => {
                    // the slot just freed by pop() is still available
                    let _ = self.push(task);
                }
            }
        }
    }
}

static GLOBAL_EXECUTOR: Executor = Executor::new();

pub fn spawn_task(fut: impl Future<Output = ()> + Send + 'static) {
    GLOBAL_EXECUTOR.spawn(fut);
}

pub fn start_global_executor() {
    info!("start_global_executor(): {}", GLOBAL_EXECUTOR);
    GLOBAL_EXECUTOR.run();
}
