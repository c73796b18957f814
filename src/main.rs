fn main() {
    if let Err(err) = restock_recon::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
