//! TaskStore - in-memory task collection
//!
//! Holds the ordered list of tasks behind the to-do application and the only
//! operations that change it: add, toggle-complete and delete. Progress is
//! derived on every read.
//!
//! # Example
//!
//! ```
//! use taskstore::{Priority, TaskStore};
//!
//! let mut store = TaskStore::new();
//! let task = store.add("Buy milk", Priority::Low).unwrap();
//! store.toggle_complete(task.id()).unwrap();
//! assert_eq!(store.progress().completed, 1);
//! ```

mod error;
mod id;
mod priority;
mod store;
mod task;

pub use error::StoreError;
pub use id::{SHORT_ID_LEN, TaskId};
pub use priority::Priority;
pub use store::{Progress, TaskStore};
pub use task::Task;
