fn main() {
    if let Err(err) = svg2path::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
