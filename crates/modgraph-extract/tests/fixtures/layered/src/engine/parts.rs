use super::Engine;

pub struct Gear {
    pub teeth: u32,
}

pub fn attach(engine: &mut Engine, gear: Gear) -> usize {
    drop(gear);
    engine.spin()
}
