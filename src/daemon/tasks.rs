//! In-memory task list served next to the timer.

use crate::types::Task;

/// Maximum length of a task description in characters.
const MAX_DESCRIPTION_LENGTH: usize = 200;

/// Errors returned by task board operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    /// Description missing or blank
    #[error("タスクの説明は必須です")]
    EmptyDescription,

    /// Description over the length limit
    #[error("タスクの説明は200文字以内にしてください")]
    DescriptionTooLong,

    /// No task with the given id
    #[error("タスクが見つかりません: #{0}")]
    NotFound(u64),
}

/// Ordered list of tasks with monotonically increasing ids.
#[derive(Debug)]
pub struct TaskBoard {
    tasks: Vec<Task>,
    next_id: u64,
}

impl Default for TaskBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskBoard {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
        }
    }

    /// Adds a task and returns it.
    ///
    /// Surrounding whitespace is trimmed before validation.
    pub fn add(&mut self, description: &str) -> Result<Task, TaskError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(TaskError::EmptyDescription);
        }
        if description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(TaskError::DescriptionTooLong);
        }

        let task = Task {
            id: self.next_id,
            description: description.to_string(),
            completed: false,
        };
        self.next_id += 1;
        self.tasks.push(task.clone());
        Ok(task)
    }

    /// Marks a task as completed.
    pub fn complete(&mut self, id: u64) -> Result<(), TaskError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(TaskError::NotFound(id))?;
        task.completed = true;
        Ok(())
    }

    /// Removes a task.
    pub fn delete(&mut self, id: u64) -> Result<(), TaskError> {
        let index = self
            .tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or(TaskError::NotFound(id))?;
        self.tasks.remove(index);
        Ok(())
    }

    /// Returns all tasks in insertion order.
    pub fn list(&self) -> Vec<Task> {
        self.tasks.clone()
    }
}
