fn main() {
    if let Err(err) = lineage_flow_renderer::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
