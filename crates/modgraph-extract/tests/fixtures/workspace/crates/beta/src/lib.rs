use alpha::Widget;

fn install(w: Widget) {
    drop(w);
}
