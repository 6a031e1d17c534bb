use crate::models::{Identified, Task};
use crate::Repository;

pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    pub fn create(&mut self, title: &str) -> u64 {
        let task = Task::new(title);
        let id = task.id();
        self.tasks.push(task);
        id
    }
}

impl Repository<Task> for TaskStore {
    fn insert(&mut self, item: Task) {
        self.tasks.push(item);
    }

    fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }
}
