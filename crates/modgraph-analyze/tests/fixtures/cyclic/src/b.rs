use crate::a::T;

pub struct U {
    pub partner: Option<Box<T>>,
}
