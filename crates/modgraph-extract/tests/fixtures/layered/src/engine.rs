mod parts;

use self::parts::Gear;

pub struct Engine {
    gears: Vec<Gear>,
}

impl Engine {
    pub fn new() -> Self {
        Self { gears: Vec::new() }
    }

    pub fn spin(&mut self) -> usize {
        self.gears.len()
    }
}
