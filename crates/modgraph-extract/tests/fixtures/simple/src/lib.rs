mod models;
mod store;
mod util;

pub use crate::models::Task;

use crate::store::TaskStore;

pub fn open() -> TaskStore {
    TaskStore::new()
}

pub trait Repository<T> {
    fn insert(&mut self, item: T);
    fn get(&self, id: u64) -> Option<&T>;
}
