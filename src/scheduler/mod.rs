mod local_scheduler;
mod stage;
mod task;

pub(self) use self::stage::Stage;
pub(self) use self::task::{ResultTask, ShuffleMapTask};

pub(crate) use self::local_scheduler::LocalScheduler;
pub use self::task::TaskContext;
