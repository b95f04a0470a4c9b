//! Worker Lambda: runs queued curated-feed and Substack jobs

pub mod handler;

pub use handler::{
    WorkerState, batch_item_failures, function_handler, process_records, process_task,
};
