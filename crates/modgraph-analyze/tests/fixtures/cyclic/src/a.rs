use crate::b::U;

pub struct T {
    pub partner: Option<U>,
}
