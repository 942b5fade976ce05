fn main() {
    if let Err(err) = flow_canvas_renderer::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
