pub struct Widget;
