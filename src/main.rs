use curlfield::Simulator;

fn main() {
    env_logger::init();

    if let Err(e) = Simulator::new().run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
