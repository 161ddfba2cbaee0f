fn main() {
    if let Err(err) = taskgate_lib::run() {
        eprintln!("taskgate: {err:?}");
        std::process::exit(1);
    }
}
