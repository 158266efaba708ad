pub mod task;
pub mod user;

pub use task::{CreateTaskRequest, NewTask, Task, TaskChanges, UpdateTaskRequest};
pub use user::{NewUser, PublicUser, UpdateUserRequest, User, UserChanges};
