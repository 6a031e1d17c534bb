mod a;

use crate::a::Foo;

pub fn make() -> Foo {
    Foo
}
