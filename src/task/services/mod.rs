//! Application services for the task front door.

mod cursor;
mod lifecycle;

pub use cursor::{decode_cursor, encode_cursor};
pub use lifecycle::{
    CreatedTask, DEFAULT_PAGE_LIMIT, ListTasksRequest, MAX_PAGE_LIMIT, TaskPage, TaskService,
    TaskServiceError, TaskServiceResult,
};
