fn main() {
    if let Err(err) = change_topology::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
