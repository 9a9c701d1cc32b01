fn main() {
    if let Err(err) = gesture_select_lib::run() {
        eprintln!("gesture-select: {err:#}");
        std::process::exit(1);
    }
}
