fn main() {
    if let Err(err) = rfm_review_lib::run() {
        eprintln!("rfm-review: {}", err);
        std::process::exit(1);
    }
}
