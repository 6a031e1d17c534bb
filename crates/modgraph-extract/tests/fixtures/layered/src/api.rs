use crate::engine::Engine;

pub struct Client {
    engine: Engine,
}

pub enum Mode {
    Fast,
    Careful,
}

pub trait Runner {
    fn run(&self) -> Mode;
}

impl Runner for Client {
    fn run(&self) -> Mode {
        Mode::Fast
    }
}
